use crate::decode::node::{AstNode, ContainerKind};
use crate::defs::{resolve_node, Definitions};
use crate::error::{Error, ErrorCode, Position, Result};
use crate::schema::registry::{load_member, parse_member, TypeDef};
use crate::schema::{check_common, CommonCheck, MemberDef};
use crate::value::Value;

pub(crate) struct ArrayDef;

impl ArrayDef {
    fn check_length(
        &self,
        length: usize,
        member: &MemberDef,
        position: Option<Position>,
    ) -> Result<()> {
        if let Some(min_length) = member.min_length {
            if length < min_length {
                return Err(Error::new(
                    ErrorCode::InvalidMinLength,
                    format!(
                        "length of '{}' is below the minimum of {min_length}",
                        member.path
                    ),
                )
                .or_position(position));
            }
        }
        if let Some(max_length) = member.max_length {
            if length > max_length {
                return Err(Error::new(
                    ErrorCode::InvalidMaxLength,
                    format!(
                        "length of '{}' exceeds the maximum of {max_length}",
                        member.path
                    ),
                )
                .or_position(position));
            }
        }
        Ok(())
    }

    fn not_an_array(&self, member: &MemberDef, found: &str, position: Option<Position>) -> Error {
        Error::new(
            ErrorCode::InvalidArray,
            format!("expected an array for '{}', found {found}", member.path),
        )
        .or_position(position)
    }
}

impl TypeDef for ArrayDef {
    fn type_name(&self) -> &str {
        "array"
    }

    fn parse(
        &self,
        node: &AstNode,
        member: &MemberDef,
        defs: Option<&dyn Definitions>,
    ) -> Result<Value> {
        let node = resolve_node(node, defs);
        let position = node.position();

        match node {
            AstNode::Container {
                kind: ContainerKind::Array,
                children,
            } => {
                let value = node.value();
                match check_common(member, Some(&value), position)? {
                    CommonCheck::Value(resolved) => return Ok(resolved),
                    CommonCheck::Absent => return Ok(Value::Null),
                    CommonCheck::Continue => {}
                }
                self.check_length(children.len(), member, position)?;
                match &member.of {
                    Some(of) => {
                        let mut items = Vec::with_capacity(children.len());
                        for child in children {
                            items.push(parse_member(child, of, defs)?);
                        }
                        Ok(Value::Array(items))
                    }
                    None => Ok(value),
                }
            }
            other => {
                let value = other.value();
                match check_common(member, Some(&value), position)? {
                    CommonCheck::Value(resolved) => Ok(resolved),
                    CommonCheck::Absent => Ok(Value::Null),
                    CommonCheck::Continue => {
                        Err(self.not_an_array(member, value.type_name(), position))
                    }
                }
            }
        }
    }

    fn load(&self, data: &Value, member: &MemberDef) -> Result<Value> {
        match check_common(member, Some(data), None)? {
            CommonCheck::Value(resolved) => return Ok(resolved),
            CommonCheck::Absent => return Ok(Value::Null),
            CommonCheck::Continue => {}
        }
        let items = match data.as_array() {
            Some(items) => items,
            None => return Err(self.not_an_array(member, data.type_name(), None)),
        };
        self.check_length(items.len(), member, None)?;
        match &member.of {
            Some(of) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(load_member(item, of)?);
                }
                Ok(Value::Array(out))
            }
            None => Ok(data.clone()),
        }
    }
}
