pub mod node;
pub mod parser;
pub mod token;
pub mod tokenizer;

use crate::decode::parser::AstParser;
use crate::decode::token::{Token, TokenType};
use crate::decode::tokenizer::Tokenizer;
use crate::error::Result;
use crate::options::ParseOptions;
use crate::value::Value;

/// A parsed document: one value per `---`-separated section.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    sections: Vec<Value>,
}

impl Document {
    pub fn sections(&self) -> &[Value] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn first(&self) -> Option<&Value> {
        self.sections.first()
    }

    /// Collapse to a single value: the lone section's value, or an array of
    /// section values when separators were present.
    pub fn into_value(self) -> Value {
        let mut sections = self.sections;
        match sections.len() {
            0 => Value::Null,
            1 => sections.remove(0),
            _ => Value::Array(sections),
        }
    }
}

pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    Tokenizer::new(input).tokenize()
}

/// Lex the input and run one tree construction per section.
pub fn parse_document(input: &str, options: &ParseOptions) -> Result<Document> {
    let tokens = tokenize(input)?;
    let mut sections = Vec::new();
    let mut parser = AstParser::new(options.clone());
    for token in tokens {
        if token.token_type == TokenType::SectionSep {
            parser.finish()?;
            sections.push(parser.to_value()?);
            parser = AstParser::new(options.clone());
        } else {
            parser.process(token)?;
        }
    }
    parser.finish()?;
    sections.push(parser.to_value()?);
    Ok(Document { sections })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;

    #[rstest::rstest]
    fn test_single_section_document() {
        let doc = parse_document("a: 1", &ParseOptions::default()).unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(
            serde_json::Value::from(doc.into_value()),
            json!({"a": 1})
        );
    }

    #[rstest::rstest]
    fn test_multi_section_document() {
        let doc = parse_document("a: 1\n---\n2, 3", &ParseOptions::default()).unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(
            serde_json::Value::from(doc.into_value()),
            json!([{"a": 1}, {"0": 2, "1": 3}])
        );
    }

    #[rstest::rstest]
    fn test_leading_separator_yields_empty_first_section() {
        let doc = parse_document("---\n1", &ParseOptions::default()).unwrap();
        assert_eq!(doc.sections(), &[Value::Null, Value::Int(1)]);
    }

    #[rstest::rstest]
    fn test_separator_inside_bracket_is_an_open_bracket_error() {
        let err = parse_document("[1, ---, 2]", &ParseOptions::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::OpenBracket);
    }

    #[rstest::rstest]
    fn test_empty_document() {
        let doc = parse_document("", &ParseOptions::default()).unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.into_value(), Value::Null);
    }
}
