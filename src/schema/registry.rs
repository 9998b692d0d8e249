use std::sync::OnceLock;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::decode::node::AstNode;
use crate::defs::{resolve_node, Definitions};
use crate::error::{Error, ErrorCode, Result};
use crate::schema::arrays::ArrayDef;
use crate::schema::booleans::BoolDef;
use crate::schema::numbers::{NumberDef, NUMBER_TYPE_NAMES};
use crate::schema::objects::ObjectDef;
use crate::schema::strings::{StringDef, STRING_TYPE_NAMES};
use crate::schema::{check_common, CommonCheck, MemberDef};
use crate::value::Value;

/// A named type: parse validates a tree node, load validates already
/// materialized data. Both produce the coerced value.
pub trait TypeDef: Send + Sync {
    fn type_name(&self) -> &str;

    fn parse(
        &self,
        node: &AstNode,
        member: &MemberDef,
        defs: Option<&dyn Definitions>,
    ) -> Result<Value>;

    fn load(&self, data: &Value, member: &MemberDef) -> Result<Value>;
}

/// Lookup from type name to validator.
pub struct TypeRegistry {
    types: IndexMap<SmolStr, Box<dyn TypeDef>>,
}

impl TypeRegistry {
    /// The standard registrations: the string family, the number family,
    /// `bool`, `array`, `object` and the `any` passthrough.
    pub fn standard() -> Self {
        let mut registry = Self {
            types: IndexMap::new(),
        };
        for name in STRING_TYPE_NAMES {
            registry.register(Box::new(StringDef::new(name)));
        }
        for name in NUMBER_TYPE_NAMES {
            registry.register(Box::new(NumberDef::new(name)));
        }
        registry.register(Box::new(BoolDef));
        registry.register(Box::new(ArrayDef));
        registry.register(Box::new(ObjectDef));
        registry.register(Box::new(AnyDef));
        registry
    }

    pub fn register(&mut self, def: Box<dyn TypeDef>) {
        self.types.insert(SmolStr::new(def.type_name()), def);
    }

    pub fn get(&self, name: &str) -> Option<&dyn TypeDef> {
        self.types.get(name).map(Box::as_ref)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(SmolStr::as_str)
    }
}

pub fn global_registry() -> &'static TypeRegistry {
    static REGISTRY: OnceLock<TypeRegistry> = OnceLock::new();
    REGISTRY.get_or_init(TypeRegistry::standard)
}

/// Dispatch a node through the registry using the member's declared type.
pub(crate) fn parse_member(
    node: &AstNode,
    member: &MemberDef,
    defs: Option<&dyn Definitions>,
) -> Result<Value> {
    let def = global_registry().get(&member.type_name).ok_or_else(|| {
        Error::new(
            ErrorCode::InvalidType,
            format!("unknown type '{}' for '{}'", member.type_name, member.path),
        )
        .or_position(node.position())
    })?;
    def.parse(node, member, defs)
}

pub(crate) fn load_member(data: &Value, member: &MemberDef) -> Result<Value> {
    let def = global_registry().get(&member.type_name).ok_or_else(|| {
        Error::new(
            ErrorCode::InvalidType,
            format!("unknown type '{}' for '{}'", member.type_name, member.path),
        )
    })?;
    def.load(data, member)
}

/// Passthrough type: only the common checks apply.
struct AnyDef;

impl TypeDef for AnyDef {
    fn type_name(&self) -> &str {
        "any"
    }

    fn parse(
        &self,
        node: &AstNode,
        member: &MemberDef,
        defs: Option<&dyn Definitions>,
    ) -> Result<Value> {
        let node = resolve_node(node, defs);
        let value = node.value();
        match check_common(member, Some(&value), node.position())? {
            CommonCheck::Value(resolved) => Ok(resolved),
            CommonCheck::Absent => Ok(Value::Null),
            CommonCheck::Continue => Ok(value),
        }
    }

    fn load(&self, data: &Value, member: &MemberDef) -> Result<Value> {
        match check_common(member, Some(data), None)? {
            CommonCheck::Value(resolved) => Ok(resolved),
            CommonCheck::Absent => Ok(Value::Null),
            CommonCheck::Continue => Ok(data.clone()),
        }
    }
}
