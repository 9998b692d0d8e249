use std::sync::OnceLock;

use regex::Regex;

use crate::decode::node::AstNode;
use crate::defs::{resolve_node, Definitions};
use crate::error::{Error, ErrorCode, Position, Result};
use crate::schema::registry::TypeDef;
use crate::schema::{check_common, CommonCheck, MemberDef};
use crate::value::Value;

pub(crate) const STRING_TYPE_NAMES: &[&str] = &["string", "email", "url"];

// RFC 5322 approximation, the practical subset mail software agrees on.
const EMAIL_PATTERN: &str = "^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$";

const URL_PATTERN: &str =
    "^[a-zA-Z][a-zA-Z0-9+.-]*://(?:[^\\s:@/]+(?::[^\\s:@/]*)?@)?(?:[A-Za-z0-9._~%-]+|\\[[0-9A-Fa-f:.]+\\])(?::[0-9]+)?(?:[/?#][^\\s]*)?$";

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("built-in email pattern is valid"))
}

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(URL_PATTERN).expect("built-in url pattern is valid"))
}

/// Validator behind `string`, `email` and `url`.
pub(crate) struct StringDef {
    name: &'static str,
}

impl StringDef {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }

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

        let text = match value.as_str() {
            Some(text) => text,
            None => {
                return Err(Error::new(
                    ErrorCode::NotAString,
                    format!(
                        "expected a string for '{}', found {}",
                        member.path,
                        value.type_name()
                    ),
                )
                .or_position(position));
            }
        };

        match self.name {
            "email" => {
                if !email_regex().is_match(text) {
                    return Err(Error::new(
                        ErrorCode::InvalidValue,
                        format!("'{}' is not a valid email address", member.path),
                    )
                    .or_position(position));
                }
            }
            "url" => {
                if !url_regex().is_match(text) {
                    return Err(Error::new(
                        ErrorCode::InvalidValue,
                        format!("'{}' is not a valid url", member.path),
                    )
                    .or_position(position));
                }
            }
            _ => {
                if let Some(pattern) = member.compiled_pattern()? {
                    if !pattern.is_match(text) {
                        return Err(Error::new(
                            ErrorCode::InvalidValue,
                            format!("value of '{}' does not match the pattern", member.path),
                        )
                        .or_position(position));
                    }
                }
            }
        }

        let length = text.chars().count();
        if let Some(max_length) = member.max_length {
            if length > max_length {
                return Err(Error::new(
                    ErrorCode::InvalidMaxLength,
                    format!(
                        "length of '{}' exceeds the maximum of {max_length}",
                        member.path
                    ),
                )
                .or_position(position));
            }
        }
        if let Some(min_length) = member.min_length {
            if length < min_length {
                return Err(Error::new(
                    ErrorCode::InvalidMinLength,
                    format!(
                        "length of '{}' is below the minimum of {min_length}",
                        member.path
                    ),
                )
                .or_position(position));
            }
        }

        Ok(value)
    }
}

impl TypeDef for StringDef {
    fn type_name(&self) -> &str {
        self.name
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

#[cfg(test)]
mod tests {
    use super::*;

    fn string_def() -> StringDef {
        StringDef::new("string")
    }

    fn load(def: &StringDef, member: &MemberDef, value: Value) -> Result<Value> {
        def.load(&value, member)
    }

    #[rstest::rstest]
    fn test_accepts_strings_only() {
        let member = MemberDef::new("string").with_path("s");
        let ok = load(&string_def(), &member, Value::String("x".to_string())).unwrap();
        assert_eq!(ok, Value::String("x".to_string()));

        let err = load(&string_def(), &member, Value::Int(3)).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotAString);
    }

    #[rstest::rstest]
    fn test_length_bounds() {
        let member = MemberDef::new("string")
            .with_path("s")
            .with_min_length(2)
            .with_max_length(4);

        assert!(load(&string_def(), &member, Value::String("ab".to_string())).is_ok());
        assert!(load(&string_def(), &member, Value::String("abcd".to_string())).is_ok());

        let err = load(&string_def(), &member, Value::String("a".to_string())).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidMinLength);

        let err = load(&string_def(), &member, Value::String("abcde".to_string())).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidMaxLength);
    }

    #[rstest::rstest]
    fn test_length_counts_chars_not_bytes() {
        let member = MemberDef::new("string").with_path("s").with_max_length(2);
        assert!(load(&string_def(), &member, Value::String("éé".to_string())).is_ok());
    }

    #[rstest::rstest]
    fn test_pattern() {
        let member = MemberDef::new("string")
            .with_path("code")
            .with_pattern("[A-Z]{3}");
        assert!(load(&string_def(), &member, Value::String("ABC".to_string())).is_ok());

        let err = load(&string_def(), &member, Value::String("ABCD".to_string())).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidValue);
    }

    #[rstest::rstest]
    fn test_email() {
        let def = StringDef::new("email");
        let member = MemberDef::new("email").with_path("contact");
        assert!(load(&def, &member, Value::String("a.b@example.com".to_string())).is_ok());

        for bad in ["plainaddress", "a@@b.com", "a b@c.com", "a@"] {
            let err = load(&def, &member, Value::String(bad.to_string())).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidValue, "accepted {bad:?}");
        }
    }

    #[rstest::rstest]
    fn test_url() {
        let def = StringDef::new("url");
        let member = MemberDef::new("url").with_path("homepage");
        for good in [
            "https://example.com",
            "http://example.com:8080/path?q=1#frag",
            "ftp://files.example.org/pub",
        ] {
            assert!(
                load(&def, &member, Value::String(good.to_string())).is_ok(),
                "rejected {good:?}"
            );
        }
        for bad in ["not a url", "://missing.scheme", "http//example.com"] {
            let err = load(&def, &member, Value::String(bad.to_string())).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidValue, "accepted {bad:?}");
        }
    }

    #[rstest::rstest]
    fn test_null_and_optional_short_circuit() {
        let member = MemberDef::new("string").with_path("s").with_null(true);
        assert_eq!(load(&string_def(), &member, Value::Null).unwrap(), Value::Null);
    }
}
