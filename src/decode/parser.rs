use smallvec::SmallVec;
use smol_str::SmolStr;

use crate::decode::node::{AstNode, ContainerKind};
use crate::decode::token::{Token, TokenType};
use crate::error::{Error, ErrorCode, Result};
use crate::options::ParseOptions;
use crate::schema::Schema;
use crate::value::Value;

struct Frame {
    kind: ContainerKind,
    children: Vec<AstNode>,
    /// False only for the lazily created document root.
    explicit: bool,
    /// Close fills the pending pair in the parent instead of appending.
    fills_pair: bool,
    open_token: Option<Token>,
}

/// Shift/reduce construction over the token stream. Containers live on an
/// explicit stack; the document root object is pushed lazily on the first
/// insertion and is never closed by a bracket.
pub struct AstParser {
    options: ParseOptions,
    stack: SmallVec<[Frame; 8]>,
    last_type: Option<TokenType>,
}

impl AstParser {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            stack: SmallVec::new(),
            last_type: None,
        }
    }

    pub fn process(&mut self, token: Token) -> Result<()> {
        let token_type = token.token_type;
        match token_type {
            TokenType::CurlyOpen => self.open_container(ContainerKind::Object, token)?,
            TokenType::BracketOpen => self.open_container(ContainerKind::Array, token)?,
            TokenType::CurlyClose => self.close_container(ContainerKind::Object, &token)?,
            TokenType::BracketClose => self.close_container(ContainerKind::Array, &token)?,
            TokenType::Colon => self.bind_key(&token)?,
            TokenType::Comma => self.handle_comma(&token),
            TokenType::SectionSep => {
                return Err(Error::new(
                    ErrorCode::InvalidValue,
                    "unexpected section separator",
                )
                .with_position(token.position()));
            }
            _ => self.add_value(token),
        }
        self.last_type = Some(token_type);
        Ok(())
    }

    /// Signal end of input: every explicitly opened container must be closed.
    pub fn finish(&mut self) -> Result<()> {
        self.check_balanced()
    }

    pub fn to_value(&self) -> Result<Value> {
        self.check_balanced()?;
        let root = match self.stack.first() {
            Some(root) => root,
            None => return Ok(Value::Null),
        };
        match root.children.as_slice() {
            [] => Ok(Value::Null),
            [only] => Ok(only.value()),
            _ => Ok(AstNode::object(root.children.clone()).value()),
        }
    }

    pub fn to_schema(&self) -> Result<Schema> {
        self.check_balanced()?;
        let children = self
            .stack
            .first()
            .map(|root| root.children.as_slice())
            .unwrap_or(&[]);
        Schema::from_members(children)
    }

    /// Consume the parser and yield the root object node.
    pub fn into_ast(mut self) -> Result<AstNode> {
        self.check_balanced()?;
        match self.stack.pop() {
            Some(root) => Ok(AstNode::object(root.children)),
            None => Ok(AstNode::object(Vec::new())),
        }
    }

    fn check_balanced(&self) -> Result<()> {
        if self.stack.len() > 1 {
            let open = self.stack.last().expect("len checked");
            let mut err = Error::new(ErrorCode::OpenBracket, "missing closing bracket");
            if let Some(token) = &open.open_token {
                err = err.with_position(token.position());
            }
            return Err(err);
        }
        Ok(())
    }

    fn ensure_root(&mut self) {
        if self.stack.is_empty() {
            self.stack.push(Frame {
                kind: ContainerKind::Object,
                children: Vec::new(),
                explicit: false,
                fills_pair: false,
                open_token: None,
            });
        }
    }

    fn open_container(&mut self, kind: ContainerKind, token: Token) -> Result<()> {
        self.ensure_root();
        if self.stack.len() >= self.options.max_depth {
            let code = match kind {
                ContainerKind::Object => ErrorCode::InvalidObject,
                ContainerKind::Array => ErrorCode::InvalidArray,
            };
            return Err(Error::new(
                code,
                format!("maximum nesting depth of {} exceeded", self.options.max_depth),
            )
            .with_position(token.position()));
        }
        let fills_pair = self.pending_pair();
        self.stack.push(Frame {
            kind,
            children: Vec::new(),
            explicit: true,
            fills_pair,
            open_token: Some(token),
        });
        Ok(())
    }

    fn close_container(&mut self, kind: ContainerKind, token: &Token) -> Result<()> {
        let matches_top = self
            .stack
            .last()
            .map(|top| top.explicit && top.kind == kind)
            .unwrap_or(false);
        if !matches_top {
            return Err(Error::new(
                ErrorCode::InvalidBracket,
                format!("unexpected '{}'", token.text),
            )
            .with_position(token.position()));
        }

        let frame = self.stack.pop().expect("matched top exists");
        let node = AstNode::Container {
            kind: frame.kind,
            children: frame.children,
        };
        let parent = self.stack.last_mut().expect("root sits below");
        if frame.fills_pair {
            if let Some(AstNode::Pair { value, .. }) = parent.children.last_mut() {
                *value = Some(Box::new(node));
                return Ok(());
            }
        }
        parent.children.push(node);
        Ok(())
    }

    /// `:` promotes the preceding primitive into the key of a fresh pair.
    fn bind_key(&mut self, token: &Token) -> Result<()> {
        self.ensure_root();
        let top = self.stack.last_mut().expect("root ensured");
        let replacement = match top.children.last() {
            Some(AstNode::Leaf(leaf)) => leaf.key_string().map(|key| AstNode::Pair {
                key: SmolStr::new(&key),
                key_token: Box::new(leaf.clone()),
                value: None,
            }),
            _ => None,
        };
        match replacement {
            Some(pair) => {
                *top.children.last_mut().expect("leaf inspected") = pair;
                Ok(())
            }
            None => Err(Error::new(ErrorCode::InvalidValue, "invalid key")
                .with_position(token.position())),
        }
    }

    /// Two consecutive commas leave an empty-string member in the gap.
    fn handle_comma(&mut self, token: &Token) {
        self.ensure_root();
        if self.last_type == Some(TokenType::Comma) {
            let gap = Token {
                index: token.index,
                row: token.row,
                col: token.col,
                text: String::new(),
                value: Value::String(String::new()),
                token_type: TokenType::String,
                sub_type: None,
            };
            let top = self.stack.last_mut().expect("root ensured");
            top.children.push(AstNode::Leaf(gap));
        }
    }

    fn add_value(&mut self, token: Token) {
        self.ensure_root();
        let fills = self.pending_pair();
        let top = self.stack.last_mut().expect("root ensured");
        let node = AstNode::Leaf(token);
        if fills {
            if let Some(AstNode::Pair { value, .. }) = top.children.last_mut() {
                *value = Some(Box::new(node));
                return;
            }
        }
        top.children.push(node);
    }

    /// True when the previous token was `:` and the open container ends in
    /// a pair still waiting for its value.
    fn pending_pair(&self) -> bool {
        self.last_type == Some(TokenType::Colon)
            && matches!(
                self.stack.last().and_then(|top| top.children.last()),
                Some(AstNode::Pair { value: None, .. })
            )
    }
}

impl Default for AstParser {
    fn default() -> Self {
        Self::new(ParseOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::tokenizer::Tokenizer;
    use serde_json::json;

    fn parse(input: &str) -> Result<Value> {
        let tokens = Tokenizer::new(input).tokenize()?;
        let mut parser = AstParser::default();
        for token in tokens {
            parser.process(token)?;
        }
        parser.finish()?;
        parser.to_value()
    }

    fn parse_json(input: &str) -> serde_json::Value {
        parse(input).unwrap().into()
    }

    #[rstest::rstest]
    fn test_key_value_document() {
        assert_eq!(parse_json("a: 1, b: 2"), json!({"a": 1, "b": 2}));
    }

    #[rstest::rstest]
    fn test_single_scalar_document() {
        assert_eq!(parse_json("42"), json!(42));
        assert_eq!(parse_json("hello"), json!("hello"));
    }

    #[rstest::rstest]
    fn test_empty_document() {
        assert_eq!(parse("").unwrap(), Value::Null);
    }

    #[rstest::rstest]
    fn test_nested_containers() {
        assert_eq!(
            parse_json("a: {b: [1, 2], c: {d: T}}"),
            json!({"a": {"b": [1, 2], "c": {"d": true}}})
        );
    }

    #[rstest::rstest]
    fn test_positional_members() {
        assert_eq!(parse_json("1, 2, 3"), json!({"0": 1, "1": 2, "2": 3}));
        assert_eq!(parse_json("a: 1, 2"), json!({"a": 1, "1": 2}));
    }

    #[rstest::rstest]
    fn test_comma_gap_inserts_empty_string() {
        assert_eq!(parse_json("[1, , 3]"), json!([1, "", 3]));
        assert_eq!(parse_json("[1, , , 3]"), json!([1, "", "", 3]));
    }

    #[rstest::rstest]
    fn test_trailing_comma_is_no_gap() {
        assert_eq!(parse_json("[1, 2,]"), json!([1, 2]));
    }

    #[rstest::rstest]
    fn test_number_and_bool_keys() {
        assert_eq!(parse_json("1: a"), json!({"1": "a"}));
        assert_eq!(parse_json("{T: x}"), json!({"true": "x"}));
    }

    #[rstest::rstest]
    fn test_bracket_mismatch() {
        let err = parse("[1}").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidBracket);

        let err = parse("{a: 1]").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidBracket);

        let err = parse("}").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidBracket);
    }

    #[rstest::rstest]
    fn test_unclosed_bracket() {
        let err = parse("[1, 2").unwrap_err();
        assert_eq!(err.code, ErrorCode::OpenBracket);

        let err = parse("{a: {b: 1}").unwrap_err();
        assert_eq!(err.code, ErrorCode::OpenBracket);
    }

    #[rstest::rstest]
    fn test_invalid_key_positions() {
        let err = parse(": 1").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidValue);

        let err = parse("N: 1").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidValue);

        let err = parse("{a: 1}: 2").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidValue);

        // A second colon lands on an already formed pair.
        let err = parse("a: b: c").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidValue);
    }

    #[rstest::rstest]
    fn test_unfilled_pair_materializes_null() {
        assert_eq!(parse_json("a:"), json!({"a": null}));
    }

    #[rstest::rstest]
    fn test_pair_in_array_is_single_entry_map() {
        assert_eq!(parse_json("[a: 1, 2]"), json!([{"a": 1}, 2]));
    }

    #[rstest::rstest]
    fn test_depth_guard() {
        let mut input = String::new();
        for _ in 0..8 {
            input.push('[');
        }
        let tokens = Tokenizer::new(&input).tokenize().unwrap();
        let mut parser = AstParser::new(ParseOptions::new().with_max_depth(4));
        let mut result = Ok(());
        for token in tokens {
            result = parser.process(token);
            if result.is_err() {
                break;
            }
        }
        let err = result.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidArray);
        assert!(err.message.contains("depth"));
    }

    #[rstest::rstest]
    fn test_tilde_is_a_plain_value() {
        assert_eq!(parse_json("~ 1, 2, 3"), json!({"0": "~", "1": 1, "2": 2, "3": 3}));
    }

    #[rstest::rstest]
    fn test_section_separator_rejected_mid_section() {
        let tokens = Tokenizer::new("---").tokenize().unwrap();
        let mut parser = AstParser::default();
        let err = parser.process(tokens.into_iter().next().unwrap()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidValue);
    }

    #[rstest::rstest]
    fn test_bytes_flow_through() {
        let value = parse(r#"data: b"aGk=""#).unwrap();
        assert_eq!(value.get("data"), Some(&Value::Bytes(b"hi".to_vec())));
    }
}
