use crate::error::{Error, ErrorCode, Position, Result};
use crate::schema::MemberDef;
use crate::value::Value;

/// Outcome of the shared nullability/optionality/choice checks.
#[derive(Debug, Clone, PartialEq)]
pub enum CommonCheck {
    /// The check fully resolved the member; use this value.
    Value(Value),
    /// Absent and optional with no default: the member is simply omitted.
    Absent,
    /// Proceed with the type-specific validation.
    Continue,
}

/// The common head of every typed parse: absence against `optional` and
/// `default`, explicit null against `null`, then `choices` membership.
pub fn check_common(
    member: &MemberDef,
    value: Option<&Value>,
    position: Option<Position>,
) -> Result<CommonCheck> {
    let value = match value {
        None => {
            if member.optional {
                return Ok(match &member.default {
                    Some(default) => CommonCheck::Value(default.clone()),
                    None => CommonCheck::Absent,
                });
            }
            return Err(Error::new(
                ErrorCode::ValueRequired,
                format!("value required for '{}'", member.path),
            )
            .or_position(position));
        }
        Some(value) => value,
    };

    if value.is_null() {
        if member.null {
            return Ok(CommonCheck::Value(Value::Null));
        }
        return Err(Error::new(
            ErrorCode::NullNotAllowed,
            format!("null is not allowed for '{}'", member.path),
        )
        .or_position(position));
    }

    if let Some(choices) = &member.choices {
        if !choices.contains(value) {
            return Err(Error::new(
                ErrorCode::ValueNotInChoice,
                format!("value {value} is not a valid choice for '{}'", member.path),
            )
            .or_position(position));
        }
    }

    Ok(CommonCheck::Continue)
}
