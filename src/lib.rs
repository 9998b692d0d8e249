//! Lexer, parser and schema validator for the Internet Object
//! data-interchange format.
//!
//! Source text flows through three layers: the [`Tokenizer`] turns UTF-8
//! text into typed tokens, the [`AstParser`] assembles objects, arrays and
//! key-value pairs, and the type registry coerces the tree against a
//! [`Schema`].
//!
//! # Examples
//!
//! Parse without a schema:
//!
//! ```rust
//! let value = internet_object::parse("name: Ada, age: 36")?;
//! assert_eq!(value.get("name").and_then(|v| v.as_str()), Some("Ada"));
//! assert_eq!(value.get("age").and_then(|v| v.as_i64()), Some(36));
//! # Ok::<(), internet_object::Error>(())
//! ```
//!
//! Validate against a schema written in the same notation:
//!
//! ```rust
//! let schema = internet_object::compile_schema("name: string, age: {int, min: 0}")?;
//! let value = internet_object::parse_with_schema("Ada, 36", &schema, None)?;
//! assert_eq!(value.get("age").and_then(|v| v.as_i64()), Some(36));
//!
//! let err = internet_object::parse_with_schema("Ada, -1", &schema, None).unwrap_err();
//! assert_eq!(err.code.as_str(), "invalid-min-value");
//! # Ok::<(), internet_object::Error>(())
//! ```
//!
//! Definitions substitute named values before validation:
//!
//! ```rust
//! use internet_object::{MapDefinitions, Value};
//!
//! let mut defs = MapDefinitions::new();
//! defs.define("@active", Value::Bool(true));
//!
//! let schema = internet_object::compile_schema("flag: bool")?;
//! let value = internet_object::parse_with_schema("flag: @active", &schema, Some(&defs))?;
//! assert_eq!(value.get("flag").and_then(|v| v.as_bool()), Some(true));
//! # Ok::<(), internet_object::Error>(())
//! ```
//!
//! Work with the raw token stream:
//!
//! ```rust
//! use internet_object::TokenType;
//!
//! let tokens = internet_object::tokenize("[1, 2]")?;
//! assert_eq!(tokens.len(), 5);
//! assert_eq!(tokens[0].token_type, TokenType::BracketOpen);
//! # Ok::<(), internet_object::Error>(())
//! ```

pub mod constants;
pub mod decode;
pub mod defs;
pub mod error;
pub mod options;
pub mod schema;
pub mod value;

pub use crate::decode::node::{AstNode, ContainerKind};
pub use crate::decode::parser::AstParser;
pub use crate::decode::token::{Token, TokenSubType, TokenType};
pub use crate::decode::tokenizer::Tokenizer;
pub use crate::decode::Document;
pub use crate::defs::{Definitions, MapDefinitions};
pub use crate::error::{Error, ErrorCode, Position, Result};
pub use crate::options::ParseOptions;
pub use crate::schema::{global_registry, MemberDef, Schema, TypeDef, TypeRegistry};
pub use crate::value::{Object, Value};

pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    decode::tokenize(input)
}

pub fn parse(input: &str) -> Result<Value> {
    parse_with_options(input, &ParseOptions::default())
}

pub fn parse_with_options(input: &str, options: &ParseOptions) -> Result<Value> {
    decode::parse_document(input, options).map(Document::into_value)
}

pub fn parse_document(input: &str, options: &ParseOptions) -> Result<Document> {
    decode::parse_document(input, options)
}

/// Parse a single-section document and coerce it against `schema`, with an
/// optional [`Definitions`] source for variable substitution.
pub fn parse_with_schema(
    input: &str,
    schema: &Schema,
    defs: Option<&dyn Definitions>,
) -> Result<Value> {
    let tokens = tokenize(input)?;
    let mut parser = AstParser::default();
    for token in tokens {
        parser.process(token)?;
    }
    parser.finish()?;
    let root = parser.into_ast()?;
    let member = MemberDef::new("object")
        .with_path("document")
        .with_schema(schema.clone());
    schema::parse_member(&root, &member, defs)
}

/// Validate already materialized data against `schema`.
pub fn load_with_schema(data: &Value, schema: &Schema) -> Result<Value> {
    let member = MemberDef::new("object")
        .with_path("document")
        .with_schema(schema.clone());
    schema::load_member(data, &member)
}

/// Compile schema notation (`name: string, age: {int, min: 0}`) into a
/// [`Schema`].
pub fn compile_schema(input: &str) -> Result<Schema> {
    let tokens = tokenize(input)?;
    let mut parser = AstParser::default();
    for token in tokens {
        parser.process(token)?;
    }
    parser.finish()?;
    parser.to_schema()
}
