use crate::error::Position;
use crate::value::Value;

/// Coarse token kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    String,
    Number,
    Boolean,
    Null,
    Binary,
    SectionSep,
    CurlyOpen,
    CurlyClose,
    BracketOpen,
    BracketClose,
    Comma,
    Colon,
    Tilde,
}

impl TokenType {
    /// Total over the special-symbol set; `None` for anything else.
    pub fn from_symbol(ch: char) -> Option<TokenType> {
        match ch {
            '{' => Some(TokenType::CurlyOpen),
            '}' => Some(TokenType::CurlyClose),
            '[' => Some(TokenType::BracketOpen),
            ']' => Some(TokenType::BracketClose),
            ',' => Some(TokenType::Comma),
            ':' => Some(TokenType::Colon),
            '~' => Some(TokenType::Tilde),
            _ => None,
        }
    }
}

/// Refinement of string and number tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSubType {
    RegularString,
    RawString,
    OpenString,
    Hex,
    Octal,
    Binary,
}

/// A single lexed token. Immutable once emitted: `text` is the exact source
/// substring (quotes and prefixes included), `value` the decoded form.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub index: usize,
    pub row: usize,
    pub col: usize,
    pub text: String,
    pub value: Value,
    pub token_type: TokenType,
    pub sub_type: Option<TokenSubType>,
}

impl Token {
    pub fn position(&self) -> Position {
        Position::new(self.index, self.row, self.col)
    }

    /// The string form a primitive takes when promoted to an object key.
    /// Containers and nulls have no key form.
    pub fn key_string(&self) -> Option<String> {
        match (&self.token_type, &self.value) {
            (TokenType::String, Value::String(s)) => Some(s.clone()),
            (TokenType::Number, v) if v.is_number() => Some(v.to_string()),
            (TokenType::Boolean, Value::Bool(b)) => Some(b.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    fn test_symbol_mapping_is_total_over_the_set() {
        for (ch, expected) in [
            ('{', TokenType::CurlyOpen),
            ('}', TokenType::CurlyClose),
            ('[', TokenType::BracketOpen),
            (']', TokenType::BracketClose),
            (',', TokenType::Comma),
            (':', TokenType::Colon),
            ('~', TokenType::Tilde),
        ] {
            assert_eq!(TokenType::from_symbol(ch), Some(expected));
        }
        assert_eq!(TokenType::from_symbol('@'), None);
        assert_eq!(TokenType::from_symbol('-'), None);
    }

    #[rstest::rstest]
    fn test_key_string_forms() {
        let token = Token {
            index: 0,
            row: 1,
            col: 1,
            text: "42".to_string(),
            value: Value::Int(42),
            token_type: TokenType::Number,
            sub_type: None,
        };
        assert_eq!(token.key_string(), Some("42".to_string()));

        let token = Token {
            value: Value::Bool(true),
            token_type: TokenType::Boolean,
            text: "T".to_string(),
            ..token
        };
        assert_eq!(token.key_string(), Some("true".to_string()));

        let token = Token {
            value: Value::Null,
            token_type: TokenType::Null,
            text: "N".to_string(),
            ..token
        };
        assert_eq!(token.key_string(), None);
    }
}
