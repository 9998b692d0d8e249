use crate::decode::node::AstNode;
use crate::defs::{resolve_node, Definitions};
use crate::error::{Error, ErrorCode, Position, Result};
use crate::schema::registry::TypeDef;
use crate::schema::{check_common, CommonCheck, MemberDef};
use crate::value::Value;

pub(crate) struct BoolDef;

impl BoolDef {
    fn validate(
        &self,
        value: Value,
        member: &MemberDef,
        position: Option<Position>,
    ) -> Result<Value> {
        match check_common(member, Some(&value), position)? {
            CommonCheck::Value(resolved) => return Ok(resolved),
            CommonCheck::Absent => return Ok(Value::Null),
            CommonCheck::Continue => {}
        }
        if value.is_bool() {
            Ok(value)
        } else {
            Err(Error::new(
                ErrorCode::InvalidType,
                format!(
                    "expected a boolean for '{}', found {}",
                    member.path,
                    value.type_name()
                ),
            )
            .or_position(position))
        }
    }
}

impl TypeDef for BoolDef {
    fn type_name(&self) -> &str {
        "bool"
    }

    fn parse(
        &self,
        node: &AstNode,
        member: &MemberDef,
        defs: Option<&dyn Definitions>,
    ) -> Result<Value> {
        let node = resolve_node(node, defs);
        self.validate(node.value(), member, node.position())
    }

    fn load(&self, data: &Value, member: &MemberDef) -> Result<Value> {
        self.validate(data.clone(), member, None)
    }
}
