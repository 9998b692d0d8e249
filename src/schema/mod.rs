mod arrays;
mod booleans;
mod common;
mod numbers;
mod objects;
mod registry;
mod strings;

pub use common::{check_common, CommonCheck};
pub use registry::{global_registry, TypeDef, TypeRegistry};
pub(crate) use registry::{load_member, parse_member};

use std::sync::OnceLock;

use regex::Regex;
use smol_str::SmolStr;

use crate::decode::node::{AstNode, ContainerKind};
use crate::error::{Error, ErrorCode, Result};
use crate::value::Value;

/// Declarative description of a single schema member: its type plus the
/// recognized constraint bag.
#[derive(Debug)]
pub struct MemberDef {
    pub type_name: SmolStr,
    /// Dotted path used in diagnostics.
    pub path: String,
    pub optional: bool,
    pub null: bool,
    pub default: Option<Value>,
    pub choices: Option<Vec<Value>>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
    /// Element definition for `array` members.
    pub of: Option<Box<MemberDef>>,
    /// Member schema for `object` members.
    pub schema: Option<Schema>,
    compiled_pattern: OnceLock<Regex>,
}

impl MemberDef {
    pub fn new(type_name: impl AsRef<str>) -> Self {
        let type_name = SmolStr::new(type_name.as_ref());
        Self {
            path: type_name.to_string(),
            type_name,
            optional: false,
            null: false,
            default: None,
            choices: None,
            min: None,
            max: None,
            min_length: None,
            max_length: None,
            pattern: None,
            of: None,
            schema: None,
            compiled_pattern: OnceLock::new(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn with_null(mut self, null: bool) -> Self {
        self.null = null;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_choices(mut self, choices: Vec<Value>) -> Self {
        self.choices = Some(choices);
        self
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = Some(min_length);
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_of(mut self, of: MemberDef) -> Self {
        self.of = Some(Box::new(of));
        self
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// The member's pattern compiled once and cached. Anchors with `^`/`$`
    /// when the pattern does not already carry them.
    pub fn compiled_pattern(&self) -> Result<Option<&Regex>> {
        let Some(pattern) = &self.pattern else {
            return Ok(None);
        };
        if let Some(compiled) = self.compiled_pattern.get() {
            return Ok(Some(compiled));
        }
        let mut anchored = String::with_capacity(pattern.len() + 2);
        if !pattern.starts_with('^') {
            anchored.push('^');
        }
        anchored.push_str(pattern);
        if !pattern.ends_with('$') {
            anchored.push('$');
        }
        let compiled = Regex::new(&anchored).map_err(|err| {
            Error::new(
                ErrorCode::InvalidSchema,
                format!("invalid pattern for '{}': {err}", self.path),
            )
        })?;
        Ok(Some(self.compiled_pattern.get_or_init(|| compiled)))
    }
}

impl Clone for MemberDef {
    fn clone(&self) -> Self {
        Self {
            type_name: self.type_name.clone(),
            path: self.path.clone(),
            optional: self.optional,
            null: self.null,
            default: self.default.clone(),
            choices: self.choices.clone(),
            min: self.min,
            max: self.max,
            min_length: self.min_length,
            max_length: self.max_length,
            pattern: self.pattern.clone(),
            of: self.of.clone(),
            schema: self.schema.clone(),
            // The clone recompiles lazily on first use.
            compiled_pattern: OnceLock::new(),
        }
    }
}

/// An ordered sequence of named member definitions.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    members: Vec<(SmolStr, MemberDef)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(mut self, name: impl AsRef<str>, def: MemberDef) -> Self {
        self.push(name, def);
        self
    }

    pub fn push(&mut self, name: impl AsRef<str>, def: MemberDef) {
        self.members.push((SmolStr::new(name.as_ref()), def));
    }

    pub fn members(&self) -> &[(SmolStr, MemberDef)] {
        &self.members
    }

    pub fn get(&self, name: &str) -> Option<&MemberDef> {
        self.members
            .iter()
            .find(|(member, _)| member.as_str() == name)
            .map(|(_, def)| def)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Compile a parsed schema document into a `Schema`. Members come from
    /// bare names (`name`, type `any`), `name: type` pairs, option bags
    /// (`name: {string, maxLength: 10}`) and element forms (`name: [int]`).
    /// Trailing `?` marks optional, trailing `*` allows null.
    pub fn from_members(children: &[AstNode]) -> Result<Schema> {
        Self::compile(children, "")
    }

    fn compile(children: &[AstNode], prefix: &str) -> Result<Schema> {
        let mut schema = Schema::new();
        for child in children {
            match child {
                AstNode::Leaf(token) => {
                    let raw = token.value.as_str().ok_or_else(|| {
                        Error::new(ErrorCode::InvalidSchema, "member name must be a string")
                            .with_position(token.position())
                    })?;
                    let (name, optional, null) = split_markers(raw);
                    let path = join_path(prefix, &name);
                    let def = MemberDef::new("any")
                        .with_path(path)
                        .with_optional(optional)
                        .with_null(null);
                    schema.push(name, def);
                }
                AstNode::Pair { key, value, .. } => {
                    let (name, optional, null) = split_markers(key);
                    let path = join_path(prefix, &name);
                    let mut def = match value.as_deref() {
                        None => MemberDef::new("any").with_path(path.as_str()),
                        Some(node) => member_from_node(node, &path)?,
                    };
                    def.optional |= optional;
                    def.null |= null;
                    validate_bounds(&def)?;
                    schema.push(name, def);
                }
                AstNode::Container { .. } => {
                    return Err(Error::new(
                        ErrorCode::InvalidSchema,
                        "unexpected container in schema position",
                    )
                    .or_position(child.position()));
                }
            }
        }
        Ok(schema)
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// Strip `?` (optional) and `*` (nullable) markers from a member name.
fn split_markers(raw: &str) -> (String, bool, bool) {
    let mut name = raw;
    let mut optional = false;
    let mut null = false;
    loop {
        if let Some(stripped) = name.strip_suffix('?') {
            optional = true;
            name = stripped;
        } else if let Some(stripped) = name.strip_suffix('*') {
            null = true;
            name = stripped;
        } else {
            break;
        }
    }
    (name.to_string(), optional, null)
}

fn member_from_node(node: &AstNode, path: &str) -> Result<MemberDef> {
    match node {
        AstNode::Leaf(token) => {
            let name = token.value.as_str().ok_or_else(|| {
                Error::new(
                    ErrorCode::InvalidSchema,
                    format!("expected a type name for '{path}'"),
                )
                .with_position(token.position())
            })?;
            known_type(name, token)?;
            Ok(MemberDef::new(name).with_path(path))
        }
        AstNode::Container {
            kind: ContainerKind::Array,
            children,
        } => {
            let mut def = MemberDef::new("array").with_path(path);
            if let Some(first) = children.first() {
                def = def.with_of(member_from_node(first, path)?);
            }
            Ok(def)
        }
        AstNode::Container {
            kind: ContainerKind::Object,
            children,
        } => member_from_bag(children, path),
        AstNode::Pair { key_token, .. } => Err(Error::new(
            ErrorCode::InvalidSchema,
            format!("unexpected key-value pair in type position for '{path}'"),
        )
        .with_position(key_token.position())),
    }
}

/// An option bag: the first bare string is the type name, named entries are
/// constraints, a bare object is the nested member schema.
fn member_from_bag(children: &[AstNode], path: &str) -> Result<MemberDef> {
    let mut def = MemberDef::new("any").with_path(path);
    for child in children {
        match child {
            AstNode::Leaf(token) => {
                let name = token.value.as_str().ok_or_else(|| {
                    Error::new(
                        ErrorCode::InvalidSchema,
                        format!("expected a type name for '{path}'"),
                    )
                    .with_position(token.position())
                })?;
                known_type(name, token)?;
                def.type_name = SmolStr::new(name);
            }
            AstNode::Container {
                kind: ContainerKind::Object,
                children,
            } => {
                def.schema = Some(Schema::compile(children, path)?);
                if def.type_name == "any" {
                    def.type_name = SmolStr::new("object");
                }
            }
            AstNode::Container {
                kind: ContainerKind::Array,
                children,
            } => {
                if let Some(first) = children.first() {
                    def.of = Some(Box::new(member_from_node(first, path)?));
                }
                if def.type_name == "any" {
                    def.type_name = SmolStr::new("array");
                }
            }
            AstNode::Pair { key, value, .. } => {
                apply_option(&mut def, key, value.as_deref(), path)?;
            }
        }
    }
    Ok(def)
}

fn apply_option(
    def: &mut MemberDef,
    key: &str,
    value: Option<&AstNode>,
    path: &str,
) -> Result<()> {
    let node = value.ok_or_else(|| {
        Error::new(
            ErrorCode::InvalidSchema,
            format!("missing value for option '{key}' of '{path}'"),
        )
    })?;
    let value = node.value();
    match key {
        "type" => {
            let name = expect_str(&value, key, path)?;
            def.type_name = SmolStr::new(name);
        }
        "optional" => def.optional = expect_bool(&value, key, path)?,
        "null" => def.null = expect_bool(&value, key, path)?,
        "default" => def.default = Some(value),
        "choices" => match value {
            Value::Array(items) => def.choices = Some(items),
            _ => {
                return Err(invalid_option(key, path, "an array"));
            }
        },
        "min" => def.min = Some(expect_number(&value, key, path)?),
        "max" => def.max = Some(expect_number(&value, key, path)?),
        "minLength" => def.min_length = Some(expect_length(&value, key, path)?),
        "maxLength" => def.max_length = Some(expect_length(&value, key, path)?),
        "pattern" => {
            def.pattern = Some(expect_str(&value, key, path)?.to_string());
        }
        "of" => def.of = Some(Box::new(member_from_node(node, path)?)),
        "schema" => match node {
            AstNode::Container {
                kind: ContainerKind::Object,
                children,
            } => def.schema = Some(Schema::compile(children, path)?),
            _ => {
                return Err(invalid_option(key, path, "an object"));
            }
        },
        other => {
            return Err(Error::new(
                ErrorCode::InvalidSchema,
                format!("unknown option '{other}' for '{path}'"),
            )
            .or_position(node.position()));
        }
    }
    Ok(())
}

fn known_type(name: &str, token: &crate::decode::token::Token) -> Result<()> {
    if global_registry().contains(name) {
        Ok(())
    } else {
        Err(Error::new(
            ErrorCode::InvalidType,
            format!("unknown type '{name}'"),
        )
        .with_position(token.position()))
    }
}

fn validate_bounds(def: &MemberDef) -> Result<()> {
    if let (Some(min), Some(max)) = (def.min, def.max) {
        if min > max {
            return Err(Error::new(
                ErrorCode::InvalidRange,
                format!("min {min} exceeds max {max} for '{}'", def.path),
            ));
        }
    }
    if let (Some(min), Some(max)) = (def.min_length, def.max_length) {
        if min > max {
            return Err(Error::new(
                ErrorCode::InvalidRange,
                format!("minLength {min} exceeds maxLength {max} for '{}'", def.path),
            ));
        }
    }
    Ok(())
}

fn invalid_option(key: &str, path: &str, expected: &str) -> Error {
    Error::new(
        ErrorCode::InvalidSchema,
        format!("option '{key}' of '{path}' must be {expected}"),
    )
}

fn expect_str<'a>(value: &'a Value, key: &str, path: &str) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| invalid_option(key, path, "a string"))
}

fn expect_bool(value: &Value, key: &str, path: &str) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| invalid_option(key, path, "a boolean"))
}

fn expect_number(value: &Value, key: &str, path: &str) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| invalid_option(key, path, "a number"))
}

fn expect_length(value: &Value, key: &str, path: &str) -> Result<usize> {
    match value.as_i64() {
        Some(length) if length >= 0 => Ok(length as usize),
        _ => Err(invalid_option(key, path, "a non-negative integer")),
    }
}
