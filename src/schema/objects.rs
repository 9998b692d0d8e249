use crate::decode::node::{AstNode, ContainerKind};
use crate::defs::{resolve_node, Definitions};
use crate::error::{Error, ErrorCode, Position, Result};
use crate::schema::registry::{load_member, parse_member, TypeDef};
use crate::schema::{check_common, CommonCheck, MemberDef, Schema};
use crate::value::{Object, Value};

pub(crate) struct ObjectDef;

impl ObjectDef {
    /// Walk the declared members in order. Pairs are looked up by key; bare
    /// members are claimed by their position. Anything left unclaimed is an
    /// unknown member.
    fn parse_members(
        &self,
        children: &[AstNode],
        schema: &Schema,
        member: &MemberDef,
        defs: Option<&dyn Definitions>,
        position: Option<Position>,
        keyed: bool,
    ) -> Result<Value> {
        let mut used = vec![false; children.len()];
        let mut out = Object::new();

        for (index, (name, child_def)) in schema.members().iter().enumerate() {
            let mut found: Option<Option<&AstNode>> = None;
            if keyed {
                if let Some(idx) = children
                    .iter()
                    .position(|child| child.pair_key() == Some(name.as_str()))
                {
                    used[idx] = true;
                    found = children[idx].pair_parts().map(|(_, value)| value);
                }
            }
            if found.is_none() {
                if let Some(child) = children.get(index) {
                    if !(keyed && child.is_pair()) {
                        used[index] = true;
                        found = Some(Some(child));
                    }
                }
            }

            match found {
                Some(Some(node)) => {
                    out.insert(name.to_string(), parse_member(node, child_def, defs)?);
                }
                // A pair whose value slot was never filled is an explicit null.
                Some(None) => {
                    if let CommonCheck::Value(value) =
                        check_common(child_def, Some(&Value::Null), position)?
                    {
                        out.insert(name.to_string(), value);
                    }
                }
                None => {
                    if let CommonCheck::Value(value) = check_common(child_def, None, position)? {
                        out.insert(name.to_string(), value);
                    }
                }
            }
        }

        for (idx, child) in children.iter().enumerate() {
            if !used[idx] {
                let what = match child.pair_key() {
                    Some(key) => format!("unknown member '{key}'"),
                    None => format!("unexpected member at position {idx}"),
                };
                return Err(Error::new(
                    ErrorCode::InvalidObject,
                    format!("{what} in '{}'", member.path),
                )
                .or_position(child.position().or(position)));
            }
        }

        Ok(Value::Object(out))
    }

    fn load_members(
        &self,
        data: &Value,
        schema: &Schema,
        member: &MemberDef,
    ) -> Result<Value> {
        let mut out = Object::new();
        match data {
            Value::Object(map) => {
                for (name, child_def) in schema.members() {
                    match map.get(name.as_str()) {
                        Some(value) => {
                            out.insert(name.to_string(), load_member(value, child_def)?);
                        }
                        None => {
                            if let CommonCheck::Value(value) = check_common(child_def, None, None)? {
                                out.insert(name.to_string(), value);
                            }
                        }
                    }
                }
                for key in map.keys() {
                    if schema.get(key).is_none() {
                        return Err(Error::new(
                            ErrorCode::InvalidObject,
                            format!("unknown member '{key}' in '{}'", member.path),
                        ));
                    }
                }
            }
            Value::Array(items) => {
                for (index, (name, child_def)) in schema.members().iter().enumerate() {
                    match items.get(index) {
                        Some(value) => {
                            out.insert(name.to_string(), load_member(value, child_def)?);
                        }
                        None => {
                            if let CommonCheck::Value(value) = check_common(child_def, None, None)? {
                                out.insert(name.to_string(), value);
                            }
                        }
                    }
                }
                if items.len() > schema.len() {
                    return Err(Error::new(
                        ErrorCode::InvalidObject,
                        format!(
                            "unexpected member at position {} in '{}'",
                            schema.len(),
                            member.path
                        ),
                    ));
                }
            }
            other => {
                return Err(self.not_an_object(member, other.type_name(), None));
            }
        }
        Ok(Value::Object(out))
    }

    fn not_an_object(&self, member: &MemberDef, found: &str, position: Option<Position>) -> Error {
        Error::new(
            ErrorCode::InvalidObject,
            format!("expected an object for '{}', found {found}", member.path),
        )
        .or_position(position)
    }
}

impl TypeDef for ObjectDef {
    fn type_name(&self) -> &str {
        "object"
    }

    fn parse(
        &self,
        node: &AstNode,
        member: &MemberDef,
        defs: Option<&dyn Definitions>,
    ) -> Result<Value> {
        let node = resolve_node(node, defs);
        let position = node.position();
        let value = node.value();
        match check_common(member, Some(&value), position)? {
            CommonCheck::Value(resolved) => return Ok(resolved),
            CommonCheck::Absent => return Ok(Value::Null),
            CommonCheck::Continue => {}
        }

        let schema = match &member.schema {
            Some(schema) => schema,
            None => {
                // No declared members: any object shape passes through.
                return if value.is_object() {
                    Ok(value)
                } else {
                    Err(self.not_an_object(member, value.type_name(), position))
                };
            }
        };

        match node {
            AstNode::Container {
                kind: ContainerKind::Object,
                children,
            } => self.parse_members(children, schema, member, defs, position, true),
            AstNode::Container {
                kind: ContainerKind::Array,
                children,
            } => self.parse_members(children, schema, member, defs, position, false),
            other => Err(self.not_an_object(member, other.value().type_name(), position)),
        }
    }

    fn load(&self, data: &Value, member: &MemberDef) -> Result<Value> {
        match check_common(member, Some(data), None)? {
            CommonCheck::Value(resolved) => return Ok(resolved),
            CommonCheck::Absent => return Ok(Value::Null),
            CommonCheck::Continue => {}
        }
        match &member.schema {
            Some(schema) => self.load_members(data, schema, member),
            None => {
                if data.is_object() {
                    Ok(data.clone())
                } else {
                    Err(self.not_an_object(member, data.type_name(), None))
                }
            }
        }
    }
}
