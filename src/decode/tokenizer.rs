use std::sync::Arc;

use memchr::memchr;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use unicode_normalization::UnicodeNormalization;

use crate::constants::{
    is_special_symbol, is_valid_open_string_char, is_whitespace, SECTION_SEP,
};
use crate::decode::token::{Token, TokenSubType, TokenType};
use crate::error::{Error, ErrorCode, Position, Result};
use crate::value::Value;

/// Position-indexed lexer. A single `tokenize` call runs to completion over
/// the whole input; the tokenizer is not restartable.
pub struct Tokenizer {
    input: Arc<str>,
    position: usize,
    row: usize,
    col: usize,
    end_reached: bool,
}

impl Tokenizer {
    pub fn new(input: &str) -> Self {
        Self::from_shared_input(Arc::from(input))
    }

    pub fn from_shared_input(input: Arc<str>) -> Self {
        Self {
            input,
            position: 0,
            row: 1,
            col: 1,
            end_reached: false,
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn current_position(&self) -> Position {
        Position::new(self.position, self.row, self.col)
    }

    fn peek(&self) -> Option<char> {
        let bytes = self.input.as_bytes();
        match bytes.get(self.position) {
            Some(&byte) if byte.is_ascii() => Some(byte as char),
            Some(_) => self.input[self.position..].chars().next(),
            None => None,
        }
    }

    /// The character after the current one, without advancing.
    fn peek_second(&self) -> Option<char> {
        let mut chars = self.input[self.position..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += ch.len_utf8();
        if ch == '\n' {
            self.row += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn rest(&self) -> &str {
        &self.input[self.position..]
    }

    fn next_token(&mut self) -> Result<Option<Token>> {
        if self.end_reached {
            return Ok(None);
        }
        loop {
            match self.peek() {
                None => {
                    self.end_reached = true;
                    return Ok(None);
                }
                Some(ch) if is_whitespace(ch) => {
                    self.advance();
                }
                Some('#') => self.skip_comment(),
                Some(ch) => return self.dispatch(ch).map(Some),
            }
        }
    }

    /// Consume `#` up to and including the next newline.
    fn skip_comment(&mut self) {
        let bytes = &self.input.as_bytes()[self.position..];
        match memchr(b'\n', bytes) {
            Some(offset) => {
                self.position += offset + 1;
                self.row += 1;
                self.col = 1;
            }
            None => {
                self.col += self.rest().chars().count();
                self.position = self.input.len();
            }
        }
    }

    fn dispatch(&mut self, ch: char) -> Result<Token> {
        match ch {
            '"' | '\'' => self.scan_regular_string(),
            'r' if matches!(self.peek_second(), Some('"') | Some('\'')) => self.scan_raw_string(),
            'b' if matches!(self.peek_second(), Some('"') | Some('\'')) => self.scan_byte_string(),
            _ if is_special_symbol(ch) => Ok(self.scan_symbol(ch)),
            '-' | '+' | '0'..='9' => {
                if self.rest().starts_with(SECTION_SEP) {
                    return Ok(self.scan_section_sep());
                }
                match self.scan_number()? {
                    Some(token) => Ok(token),
                    None => self.scan_open_string(),
                }
            }
            _ => self.scan_open_string(),
        }
    }

    fn scan_symbol(&mut self, ch: char) -> Token {
        let pos = self.current_position();
        self.advance();
        Token {
            index: pos.index,
            row: pos.row,
            col: pos.col,
            text: ch.to_string(),
            value: Value::String(ch.to_string()),
            token_type: TokenType::from_symbol(ch).expect("caller checked the symbol set"),
            sub_type: None,
        }
    }

    fn scan_section_sep(&mut self) -> Token {
        let pos = self.current_position();
        self.position += SECTION_SEP.len();
        self.col += SECTION_SEP.len();
        Token {
            index: pos.index,
            row: pos.row,
            col: pos.col,
            text: SECTION_SEP.to_string(),
            value: Value::String(SECTION_SEP.to_string()),
            token_type: TokenType::SectionSep,
            sub_type: None,
        }
    }

    fn scan_regular_string(&mut self) -> Result<Token> {
        let pos = self.current_position();
        let quote = self.advance().expect("caller saw the opening quote");

        let mut value = String::new();
        let mut numeric_escape = false;
        loop {
            let ch = self.advance().ok_or_else(|| {
                Error::lex(ErrorCode::InvalidChar, "unterminated string", pos)
            })?;
            if ch == quote {
                break;
            }
            if ch == '\\' {
                self.decode_escape(&mut value, &mut numeric_escape)?;
            } else {
                value.push(ch);
            }
        }

        // Normalized exactly once, and only when an escape produced raw
        // code points.
        if numeric_escape {
            value = value.nfc().collect();
        }

        Ok(Token {
            index: pos.index,
            row: pos.row,
            col: pos.col,
            text: self.input[pos.index..self.position].to_string(),
            value: Value::String(value),
            token_type: TokenType::String,
            sub_type: Some(TokenSubType::RegularString),
        })
    }

    fn decode_escape(&mut self, out: &mut String, numeric_escape: &mut bool) -> Result<()> {
        let escape_pos = self.current_position();
        let ch = self.advance().ok_or_else(|| {
            Error::lex(
                ErrorCode::IncompleteEscapeSequence,
                "input ended inside an escape sequence",
                escape_pos,
            )
        })?;
        match ch {
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'u' => {
                *numeric_escape = true;
                let unit = self.read_hex_digits(4, escape_pos)?;
                let code_point = if (0xd800..0xdc00).contains(&unit) {
                    self.combine_surrogate(unit, escape_pos)?
                } else if (0xdc00..0xe000).contains(&unit) {
                    return Err(Error::lex(
                        ErrorCode::InvalidChar,
                        "invalid unicode escape: lone low surrogate",
                        escape_pos,
                    ));
                } else {
                    unit
                };
                let decoded = char::from_u32(code_point).ok_or_else(|| {
                    Error::lex(ErrorCode::InvalidChar, "invalid unicode escape", escape_pos)
                })?;
                out.push(decoded);
            }
            'x' => {
                *numeric_escape = true;
                let code_point = self.read_hex_digits(2, escape_pos)?;
                let decoded = char::from_u32(code_point).ok_or_else(|| {
                    Error::lex(ErrorCode::InvalidChar, "invalid hex escape", escape_pos)
                })?;
                out.push(decoded);
            }
            other => out.push(other),
        }
        Ok(())
    }

    fn read_hex_digits(&mut self, count: usize, escape_pos: Position) -> Result<u32> {
        let mut value = 0u32;
        for _ in 0..count {
            let ch = self.advance().ok_or_else(|| {
                Error::lex(
                    ErrorCode::IncompleteEscapeSequence,
                    "input ended inside an escape sequence",
                    escape_pos,
                )
            })?;
            let digit = ch.to_digit(16).ok_or_else(|| {
                Error::lex(
                    ErrorCode::InvalidChar,
                    format!("invalid hex digit '{ch}' in escape sequence"),
                    escape_pos,
                )
            })?;
            value = value * 16 + digit;
        }
        Ok(value)
    }

    /// A high surrogate must be chased by a `\uXXXX` low surrogate; the pair
    /// combines into a single supplementary-plane code point.
    fn combine_surrogate(&mut self, high: u32, escape_pos: Position) -> Result<u32> {
        if self.peek() == Some('\\') && self.peek_second() == Some('u') {
            self.advance();
            self.advance();
            let low = self.read_hex_digits(4, escape_pos)?;
            if (0xdc00..0xe000).contains(&low) {
                return Ok(0x10000 + ((high - 0xd800) << 10) + (low - 0xdc00));
            }
        }
        Err(Error::lex(
            ErrorCode::InvalidChar,
            "invalid unicode escape: unpaired high surrogate",
            escape_pos,
        ))
    }

    fn scan_raw_string(&mut self) -> Result<Token> {
        let pos = self.current_position();
        self.advance(); // r
        let quote = self.advance().expect("caller saw the opening quote");

        let mut value = String::new();
        loop {
            let ch = self.advance().ok_or_else(|| {
                Error::lex(ErrorCode::InvalidChar, "unterminated raw string", pos)
            })?;
            if ch == '\\' {
                // Verbatim: the backslash stays, and a quote right after it
                // does not terminate the string.
                value.push('\\');
                if self.peek() == Some(quote) {
                    value.push(self.advance().expect("peeked"));
                }
                continue;
            }
            if ch == quote {
                break;
            }
            value.push(ch);
        }

        Ok(Token {
            index: pos.index,
            row: pos.row,
            col: pos.col,
            text: self.input[pos.index..self.position].to_string(),
            value: Value::String(value),
            token_type: TokenType::String,
            sub_type: Some(TokenSubType::RawString),
        })
    }

    fn scan_byte_string(&mut self) -> Result<Token> {
        let pos = self.current_position();
        self.advance(); // b
        let quote = self.advance().expect("caller saw the opening quote");

        let content_start = self.position;
        loop {
            let ch = self.advance().ok_or_else(|| {
                Error::lex(ErrorCode::InvalidChar, "unterminated byte string", pos)
            })?;
            if ch == quote {
                break;
            }
        }
        let encoded = self.input[content_start..self.position - quote.len_utf8()].trim();
        let bytes = base64::decode(encoded).map_err(|err| {
            Error::lex(ErrorCode::InvalidChar, format!("invalid base64: {err}"), pos)
        })?;

        Ok(Token {
            index: pos.index,
            row: pos.row,
            col: pos.col,
            text: self.input[pos.index..self.position].to_string(),
            value: Value::Bytes(bytes),
            token_type: TokenType::Binary,
            sub_type: None,
        })
    }

    /// Attempt a numeric literal without committing. Returns `None` when the
    /// text at the cursor is not a well-terminated number, in which case the
    /// open-string path takes over from the same position.
    fn scan_number(&mut self) -> Result<Option<Token>> {
        let rest = self.rest();
        let bytes = rest.as_bytes();
        let mut i = 0;

        let negative = match bytes.first() {
            Some(b'-') => {
                i += 1;
                true
            }
            Some(b'+') => {
                i += 1;
                false
            }
            _ => false,
        };
        if i >= bytes.len() || !bytes[i].is_ascii_digit() {
            return Ok(None);
        }

        let mut radix = 10u32;
        let mut sub_type = None;
        if bytes[i] == b'0' && i + 1 < bytes.len() {
            match bytes[i + 1].to_ascii_lowercase() {
                b'x' => {
                    radix = 16;
                    sub_type = Some(TokenSubType::Hex);
                }
                b'c' => {
                    radix = 8;
                    sub_type = Some(TokenSubType::Octal);
                }
                b'b' => {
                    radix = 2;
                    sub_type = Some(TokenSubType::Binary);
                }
                _ => {}
            }
        }

        let mut is_float = false;
        let digits_start;
        if radix != 10 {
            i += 2;
            digits_start = i;
            while i < bytes.len() && (bytes[i] as char).is_digit(radix) {
                i += 1;
            }
            if i == digits_start {
                return Ok(None);
            }
        } else {
            digits_start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
                is_float = true;
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
            }
            if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
                let mut j = i + 1;
                if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
                    j += 1;
                }
                if j < bytes.len() && bytes[j].is_ascii_digit() {
                    is_float = true;
                    i = j;
                    while i < bytes.len() && bytes[i].is_ascii_digit() {
                        i += 1;
                    }
                }
            }
        }

        // A number must end at whitespace, a structural character, a quote,
        // a comment, or the end of input. Anything else means the whole run
        // is an open string ("1x", "1.2.3").
        if let Some(next) = rest[i..].chars().next() {
            let terminates = is_whitespace(next)
                || is_special_symbol(next)
                || matches!(next, '"' | '\'' | '#');
            if !terminates {
                return Ok(None);
            }
        }

        let text = rest[..i].to_string();
        let value = if radix != 10 {
            let digits = &rest[digits_start..i];
            int_value_radix(digits, radix, negative)
        } else if is_float {
            match text.parse::<f64>() {
                Ok(f) => Value::Float(f),
                Err(_) => return Ok(None),
            }
        } else {
            int_value_decimal(&text)
        };

        let pos = self.current_position();
        self.position += i;
        self.col += i;
        Ok(Some(Token {
            index: pos.index,
            row: pos.row,
            col: pos.col,
            text,
            value,
            token_type: TokenType::Number,
            sub_type,
        }))
    }

    fn scan_open_string(&mut self) -> Result<Token> {
        let pos = self.current_position();
        let mut last_non_ws_end = self.position;

        while let Some(ch) = self.peek() {
            if !is_valid_open_string_char(ch) || self.rest().starts_with(SECTION_SEP) {
                break;
            }
            self.advance();
            if !is_whitespace(ch) {
                last_non_ws_end = self.position;
            }
        }

        if last_non_ws_end == pos.index {
            return Err(Error::lex(
                ErrorCode::InvalidChar,
                "unexpected character",
                pos,
            ));
        }

        let raw = &self.input[pos.index..last_non_ws_end];
        let (value, token_type) = match raw {
            "T" | "true" => (Value::Bool(true), TokenType::Boolean),
            "F" | "false" => (Value::Bool(false), TokenType::Boolean),
            "N" | "null" => (Value::Null, TokenType::Null),
            other => (Value::String(other.to_string()), TokenType::String),
        };
        let sub_type = match token_type {
            TokenType::String => Some(TokenSubType::OpenString),
            _ => None,
        };

        Ok(Token {
            index: pos.index,
            row: pos.row,
            col: pos.col,
            text: raw.to_string(),
            value,
            token_type,
            sub_type,
        })
    }
}

fn int_value_radix(digits: &str, radix: u32, negative: bool) -> Value {
    if let Ok(magnitude) = i64::from_str_radix(digits, radix) {
        return Value::Int(if negative { -magnitude } else { magnitude });
    }
    let big = BigInt::parse_bytes(digits.as_bytes(), radix)
        .map(|big| if negative { -big } else { big })
        .unwrap_or_default();
    normalize_big(big)
}

fn int_value_decimal(text: &str) -> Value {
    if let Ok(value) = text.parse::<i64>() {
        return Value::Int(value);
    }
    let big = BigInt::parse_bytes(text.as_bytes(), 10).unwrap_or_default();
    normalize_big(big)
}

/// Overflowed literals come back as big integers; anything that still fits
/// an i64 (the `i64::MIN` corner) is folded back down.
fn normalize_big(big: BigInt) -> Value {
    match big.to_i64() {
        Some(i) => Value::Int(i),
        None => Value::BigInt(big),
    }
}
