use crate::value::{FieldKind, Value};
use chrono::{DateTime, Utc};
use thiserror::Error as ThisError;

///
/// ConvertError
///
/// Failure converting between a wire `Value` and a Rust field type.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ConvertError {
    #[error("expected {expected}, got {found}")]
    TypeMismatch {
        expected: FieldKind,
        found: &'static str,
    },

    #[error("value {value} out of range for {kind}")]
    OutOfRange { kind: FieldKind, value: String },

    #[error("unexpected NULL for non-nullable {kind}")]
    UnexpectedNull { kind: FieldKind },

    #[error("invalid timestamp '{input}': {reason}")]
    InvalidTimestamp { input: String, reason: String },

    #[error("text value is not valid utf-8")]
    InvalidUtf8,

    #[error("no field with ordinal {0}")]
    UnknownField(usize),
}

impl ConvertError {
    #[must_use]
    pub const fn mismatch(expected: FieldKind, found: &Value) -> Self {
        Self::TypeMismatch {
            expected,
            found: found.label(),
        }
    }

    pub fn out_of_range(kind: FieldKind, value: impl ToString) -> Self {
        Self::OutOfRange {
            kind,
            value: value.to_string(),
        }
    }
}

///
/// FieldValue
///
/// Conversion contract for every Rust type that can back a mapped column.
/// `KIND` drives DDL generation; `NULLABLE` drops the NOT NULL constraint.
///

pub trait FieldValue: Sized {
    const KIND: FieldKind;
    const NULLABLE: bool = false;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> Result<Self, ConvertError>;
}

macro_rules! impl_field_value_signed {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                const KIND: FieldKind = FieldKind::$kind;

                fn to_value(&self) -> Value {
                    Value::Int(i64::from(*self))
                }

                fn from_value(value: Value) -> Result<Self, ConvertError> {
                    match value {
                        Value::Int(v) => {
                            Self::try_from(v).map_err(|_| ConvertError::out_of_range(Self::KIND, v))
                        }
                        Value::Uint(v) => {
                            Self::try_from(v).map_err(|_| ConvertError::out_of_range(Self::KIND, v))
                        }
                        Value::Bool(v) => Ok(Self::from(v)),
                        Value::Null => Err(ConvertError::UnexpectedNull { kind: Self::KIND }),
                        other => Err(ConvertError::mismatch(Self::KIND, &other)),
                    }
                }
            }
        )*
    };
}

macro_rules! impl_field_value_unsigned {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                const KIND: FieldKind = FieldKind::$kind;

                fn to_value(&self) -> Value {
                    Value::Uint(u64::from(*self))
                }

                fn from_value(value: Value) -> Result<Self, ConvertError> {
                    match value {
                        Value::Int(v) => {
                            Self::try_from(v).map_err(|_| ConvertError::out_of_range(Self::KIND, v))
                        }
                        Value::Uint(v) => {
                            Self::try_from(v).map_err(|_| ConvertError::out_of_range(Self::KIND, v))
                        }
                        Value::Bool(v) => Ok(Self::from(v)),
                        Value::Null => Err(ConvertError::UnexpectedNull { kind: Self::KIND }),
                        other => Err(ConvertError::mismatch(Self::KIND, &other)),
                    }
                }
            }
        )*
    };
}

impl_field_value_signed!(i8 => Int8, i16 => Int16, i32 => Int32, i64 => Int64);
impl_field_value_unsigned!(u8 => Uint8, u16 => Uint16, u32 => Uint32, u64 => Uint64);

impl FieldValue for bool {
    const KIND: FieldKind = FieldKind::Bool;

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Bool(v) => Ok(v),
            Value::Int(v) => Ok(v != 0),
            Value::Uint(v) => Ok(v != 0),
            Value::Null => Err(ConvertError::UnexpectedNull { kind: Self::KIND }),
            other => Err(ConvertError::mismatch(Self::KIND, &other)),
        }
    }
}

impl FieldValue for f64 {
    const KIND: FieldKind = FieldKind::Float64;

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    #[allow(clippy::cast_precision_loss)]
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Float(v) => Ok(v),
            Value::Int(v) => Ok(v as Self),
            Value::Uint(v) => Ok(v as Self),
            Value::Null => Err(ConvertError::UnexpectedNull { kind: Self::KIND }),
            other => Err(ConvertError::mismatch(Self::KIND, &other)),
        }
    }
}

impl FieldValue for f32 {
    const KIND: FieldKind = FieldKind::Float32;

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        f64::from_value(value)
            .map(|v| v as Self)
            .map_err(|err| match err {
                ConvertError::TypeMismatch { found, .. } => ConvertError::TypeMismatch {
                    expected: Self::KIND,
                    found,
                },
                ConvertError::UnexpectedNull { .. } => {
                    ConvertError::UnexpectedNull { kind: Self::KIND }
                }
                other => other,
            })
    }
}

impl FieldValue for String {
    const KIND: FieldKind = FieldKind::Text;

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Text(v) => Ok(v),
            Value::Blob(v) => Self::from_utf8(v).map_err(|_| ConvertError::InvalidUtf8),
            Value::Null => Err(ConvertError::UnexpectedNull { kind: Self::KIND }),
            other => Err(ConvertError::mismatch(Self::KIND, &other)),
        }
    }
}

impl FieldValue for Vec<u8> {
    const KIND: FieldKind = FieldKind::Blob;

    fn to_value(&self) -> Value {
        Value::Blob(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Blob(v) => Ok(v),
            Value::Text(v) => Ok(v.into_bytes()),
            Value::Null => Err(ConvertError::UnexpectedNull { kind: Self::KIND }),
            other => Err(ConvertError::mismatch(Self::KIND, &other)),
        }
    }
}

impl FieldValue for DateTime<Utc> {
    const KIND: FieldKind = FieldKind::Timestamp;

    fn to_value(&self) -> Value {
        Value::Timestamp(*self)
    }

    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Timestamp(v) => Ok(v),
            Value::Null => Err(ConvertError::UnexpectedNull { kind: Self::KIND }),
            other => Err(ConvertError::mismatch(Self::KIND, &other)),
        }
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    const KIND: FieldKind = T::KIND;
    const NULLABLE: bool = true;

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, FieldValue::to_value)
    }

    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
