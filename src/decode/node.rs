use smol_str::SmolStr;

use crate::decode::token::Token;
use crate::error::Position;
use crate::value::{Object, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Object,
    Array,
}

/// A node of the parsed tree. Leaves keep their originating token so later
/// stages can report positions and inspect the raw text.
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    Container {
        kind: ContainerKind,
        children: Vec<AstNode>,
    },
    Pair {
        key: SmolStr,
        key_token: Box<Token>,
        value: Option<Box<AstNode>>,
    },
    Leaf(Token),
}

impl AstNode {
    /// Wrap an already materialized value in synthetic nodes. Positions are
    /// zeroed; useful for programmatic definitions and loaded data.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => {
                AstNode::array(items.into_iter().map(AstNode::from_value).collect())
            }
            Value::Object(object) => {
                let children = object
                    .into_iter()
                    .map(|(key, value)| AstNode::Pair {
                        key: SmolStr::new(&key),
                        key_token: Box::new(synthetic_token(Value::String(key))),
                        value: Some(Box::new(AstNode::from_value(value))),
                    })
                    .collect();
                AstNode::object(children)
            }
            other => AstNode::Leaf(synthetic_token(other)),
        }
    }

    pub fn object(children: Vec<AstNode>) -> Self {
        AstNode::Container {
            kind: ContainerKind::Object,
            children,
        }
    }

    pub fn array(children: Vec<AstNode>) -> Self {
        AstNode::Container {
            kind: ContainerKind::Array,
            children,
        }
    }

    pub fn token(&self) -> Option<&Token> {
        match self {
            AstNode::Leaf(token) => Some(token),
            _ => None,
        }
    }

    /// Position of the node's first character, when one is known.
    pub fn position(&self) -> Option<Position> {
        match self {
            AstNode::Leaf(token) => Some(token.position()),
            AstNode::Pair { key_token, .. } => Some(key_token.position()),
            AstNode::Container { children, .. } => {
                children.first().and_then(AstNode::position)
            }
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, AstNode::Container { .. })
    }

    pub fn is_pair(&self) -> bool {
        matches!(self, AstNode::Pair { .. })
    }

    pub fn pair_key(&self) -> Option<&str> {
        match self {
            AstNode::Pair { key, .. } => Some(key.as_str()),
            _ => None,
        }
    }

    /// Key and value node of a pair; the value is `None` when the `:` was
    /// never followed by one.
    pub fn pair_parts(&self) -> Option<(&str, Option<&AstNode>)> {
        match self {
            AstNode::Pair { key, value, .. } => Some((key.as_str(), value.as_deref())),
            _ => None,
        }
    }

    /// Materialize the subtree. Objects become ordered maps: pairs keep
    /// their key, bare members are keyed by their position index. Pairs in
    /// sequence position become single-entry maps; an unfilled pair value
    /// is null.
    pub fn value(&self) -> Value {
        match self {
            AstNode::Leaf(token) => token.value.clone(),
            AstNode::Pair { key, value, .. } => {
                let mut object = Object::new();
                object.insert(key.to_string(), pair_value(value));
                Value::Object(object)
            }
            AstNode::Container { kind, children } => match kind {
                ContainerKind::Object => {
                    let mut object = Object::new();
                    for (index, child) in children.iter().enumerate() {
                        match child {
                            AstNode::Pair { key, value, .. } => {
                                object.insert(key.to_string(), pair_value(value));
                            }
                            other => {
                                object.insert(index.to_string(), other.value());
                            }
                        }
                    }
                    Value::Object(object)
                }
                ContainerKind::Array => {
                    Value::Array(children.iter().map(AstNode::value).collect())
                }
            },
        }
    }
}

fn pair_value(value: &Option<Box<AstNode>>) -> Value {
    value.as_deref().map(AstNode::value).unwrap_or(Value::Null)
}

fn synthetic_token(value: Value) -> Token {
    use crate::decode::token::TokenType;
    let token_type = match &value {
        Value::Null => TokenType::Null,
        Value::Bool(_) => TokenType::Boolean,
        Value::Int(_) | Value::Float(_) | Value::BigInt(_) => TokenType::Number,
        Value::Bytes(_) => TokenType::Binary,
        _ => TokenType::String,
    };
    Token {
        index: 0,
        row: 0,
        col: 0,
        text: String::new(),
        value,
        token_type,
        sub_type: None,
    }
}
