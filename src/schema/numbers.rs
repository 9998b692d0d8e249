use num_bigint::BigInt;
use num_traits::{FromPrimitive, Signed};

use crate::decode::node::AstNode;
use crate::defs::{resolve_node, Definitions};
use crate::error::{Error, ErrorCode, Position, Result};
use crate::schema::registry::TypeDef;
use crate::schema::{check_common, CommonCheck, MemberDef};
use crate::value::Value;

pub(crate) const NUMBER_TYPE_NAMES: &[&str] = &[
    "number", "int", "uint", "float", "int8", "int16", "int32", "int64", "uint8", "uint16",
    "uint32", "uint64", "float32", "float64", "bigint",
];

/// Registered but rejected on use; kept so the names stay reserved.
const UNSUPPORTED: &[&str] = &["int64", "uint64", "float32", "float64"];

enum Integral {
    Small(i64),
    Big(BigInt),
}

/// Validator behind the whole number family.
pub(crate) struct NumberDef {
    name: &'static str,
}

impl NumberDef {
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

        if UNSUPPORTED.contains(&self.name) {
            return Err(Error::new(
                ErrorCode::UnsupportedNumberType,
                format!("'{}' is not a supported type for '{}'", self.name, member.path),
            )
            .or_position(position));
        }

        if !value.is_number() {
            return Err(Error::new(
                ErrorCode::NotANumber,
                format!(
                    "expected a number for '{}', found {}",
                    member.path,
                    value.type_name()
                ),
            )
            .or_position(position));
        }

        let coerced = match self.name {
            "number" | "float" => {
                if let Value::Float(f) = value {
                    if !f.is_finite() {
                        return Err(Error::new(
                            ErrorCode::InvalidValue,
                            format!("value of '{}' must be finite", member.path),
                        )
                        .or_position(position));
                    }
                }
                value
            }
            "int" => match self.integral(&value, member, position)? {
                Integral::Small(i) => Value::Int(i),
                Integral::Big(b) => Value::BigInt(b),
            },
            "uint" => match self.integral(&value, member, position)? {
                Integral::Small(i) if i >= 0 => Value::Int(i),
                Integral::Big(b) if !b.is_negative() => Value::BigInt(b),
                _ => {
                    return Err(Error::new(
                        ErrorCode::OutOfRange,
                        format!("value of '{}' must not be negative", member.path),
                    )
                    .or_position(position));
                }
            },
            "bigint" => match value {
                Value::Int(i) => Value::BigInt(BigInt::from(i)),
                Value::BigInt(b) => Value::BigInt(b),
                _ => {
                    return Err(Error::new(
                        ErrorCode::NotAnInteger,
                        format!("expected an integer for '{}'", member.path),
                    )
                    .or_position(position));
                }
            },
            width => {
                let (low, high) = width_bounds(width);
                let fits = match self.integral(&value, member, position)? {
                    Integral::Small(i) if i >= low && i <= high => Some(i),
                    _ => None,
                };
                match fits {
                    Some(i) => Value::Int(i),
                    None => {
                        return Err(Error::new(
                            ErrorCode::OutOfRange,
                            format!(
                                "value of '{}' is outside the {width} range [{low}, {high}]",
                                member.path
                            ),
                        )
                        .or_position(position));
                    }
                }
            }
        };

        // Declared bounds apply after the type range.
        if let Some(min) = member.min {
            if coerced.as_f64().map(|f| f < min).unwrap_or(false) {
                return Err(Error::new(
                    ErrorCode::InvalidMinValue,
                    format!("value of '{}' is below the minimum of {min}", member.path),
                )
                .or_position(position));
            }
        }
        if let Some(max) = member.max {
            if coerced.as_f64().map(|f| f > max).unwrap_or(false) {
                return Err(Error::new(
                    ErrorCode::InvalidMaxValue,
                    format!("value of '{}' exceeds the maximum of {max}", member.path),
                )
                .or_position(position));
            }
        }

        Ok(coerced)
    }

    fn integral(
        &self,
        value: &Value,
        member: &MemberDef,
        position: Option<Position>,
    ) -> Result<Integral> {
        match value {
            Value::Int(i) => Ok(Integral::Small(*i)),
            Value::BigInt(b) => Ok(Integral::Big(b.clone())),
            Value::Float(f) if f.is_finite() && f.fract() == 0.0 => {
                if *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                    Ok(Integral::Small(*f as i64))
                } else {
                    Ok(Integral::Big(
                        BigInt::from_f64(*f).unwrap_or_default(),
                    ))
                }
            }
            _ => Err(Error::new(
                ErrorCode::NotAnInteger,
                format!("expected an integer for '{}'", member.path),
            )
            .or_position(position)),
        }
    }
}

fn width_bounds(name: &str) -> (i64, i64) {
    match name {
        "int8" => (i8::MIN as i64, i8::MAX as i64),
        "int16" => (i16::MIN as i64, i16::MAX as i64),
        "int32" => (i32::MIN as i64, i32::MAX as i64),
        "uint8" => (0, u8::MAX as i64),
        "uint16" => (0, u16::MAX as i64),
        "uint32" => (0, u32::MAX as i64),
        other => unreachable!("no width bounds for '{other}'"),
    }
}

impl TypeDef for NumberDef {
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
