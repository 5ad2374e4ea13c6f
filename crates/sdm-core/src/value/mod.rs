mod convert;

#[cfg(test)]
mod tests;

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::Serialize;

// re-exports
pub use convert::{ConvertError, FieldValue};

///
/// Value
///
/// Wire-level value handed to and received from the connection.
/// `Null` is SQL NULL; every other variant is a concrete scalar.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Convert any mapped field value into its wire form.
    pub fn from_field<T: FieldValue>(value: &T) -> Self {
        value.to_value()
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short label of the variant, used in conversion errors.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Bool(_) => "BOOL",
            Self::Int(_) => "INT",
            Self::Uint(_) => "UINT",
            Self::Float(_) => "FLOAT",
            Self::Text(_) => "TEXT",
            Self::Blob(_) => "BLOB",
            Self::Timestamp(_) => "TIMESTAMP",
        }
    }

    /// Signed view of integer-like values (Int, in-range Uint, Bool).
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Uint(v) => i64::try_from(*v).ok(),
            Self::Bool(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

///
/// FieldKind
///
/// Abstract column kind of a mapped field. Dialects turn this into DDL
/// types and (optionally) typed placeholders.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum FieldKind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    Text,
    Blob,
    Timestamp,
}

impl FieldKind {
    #[must_use]
    pub const fn is_integer(self) -> bool {
        self.is_signed() || self.is_unsigned()
    }

    #[must_use]
    pub const fn is_signed(self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }

    #[must_use]
    pub const fn is_unsigned(self) -> bool {
        matches!(
            self,
            Self::Uint8 | Self::Uint16 | Self::Uint32 | Self::Uint64
        )
    }

    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    /// Text and byte columns; these need bounded variants when indexed.
    #[must_use]
    pub const fn is_string_like(self) -> bool {
        matches!(self, Self::Text | Self::Blob)
    }
}
