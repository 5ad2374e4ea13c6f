use crate::{
    bulk::BulkError, config::ConfigError, connection::DriverError, dialect::DialectError,
    ext::ExtensionError, registry::RegistryError, value::ConvertError,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// Error
///
/// Every fallible operation in the crate returns this type.
/// Driver errors are passed through untouched inside `Error::Driver`.
///

#[derive(Clone, Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Bulk(#[from] BulkError),

    #[error("sdm: column {column} not in struct {type_name}")]
    ColumnNotInStruct {
        type_name: &'static str,
        column: String,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("sdm: cannot convert {type_name}.{field}: {source}")]
    Convert {
        type_name: &'static str,
        field: String,
        #[source]
        source: ConvertError,
    },

    #[error(transparent)]
    Dialect(#[from] DialectError),

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error(transparent)]
    Extension(#[from] ExtensionError),

    #[error("sdm: type {type_name} has no mapped columns")]
    NoColumns { type_name: &'static str },

    #[error("sdm: no rows in result set")]
    NoRows,

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl Error {
    /// Attach record/field context to a value conversion failure.
    pub fn convert(type_name: &'static str, field: impl Into<String>, source: ConvertError) -> Self {
        Self::Convert {
            type_name,
            field: field.into(),
            source,
        }
    }

    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Bulk(_) => ErrorClass::Batch,
            Self::ColumnNotInStruct { .. } => ErrorClass::Mapping,
            Self::Config(_) => ErrorClass::Config,
            Self::Convert { .. } => ErrorClass::Conversion,
            Self::Dialect(_) => ErrorClass::Dialect,
            Self::Driver(_) => ErrorClass::Driver,
            Self::Extension(_) => ErrorClass::Conversion,
            Self::NoColumns { .. } => ErrorClass::Mapping,
            Self::NoRows => ErrorClass::NotFound,
            Self::Registry(err) => err.class(),
        }
    }

    /// Programmer errors: unregistered types and broken field tags.
    ///
    /// Hosts usually abort on these instead of retrying.
    #[must_use]
    pub const fn is_precondition(&self) -> bool {
        matches!(self.class(), ErrorClass::Precondition)
    }

    #[must_use]
    pub const fn is_no_rows(&self) -> bool {
        matches!(self, Self::NoRows)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}: {}", self.class(), self)
    }
}

///
/// ErrorClass
///
/// Coarse classification used for handling policy, independent of the
/// concrete variant that produced it.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[remain::sorted]
pub enum ErrorClass {
    Batch,
    Config,
    Conversion,
    Dialect,
    Driver,
    Mapping,
    NotFound,
    Precondition,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Batch => "batch",
            Self::Config => "config",
            Self::Conversion => "conversion",
            Self::Dialect => "dialect",
            Self::Driver => "driver",
            Self::Mapping => "mapping",
            Self::NotFound => "not_found",
            Self::Precondition => "precondition",
        };

        write!(f, "{label}")
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_errors_are_preconditions() {
        let err: Error = RegistryError::TypeNotRegistered { type_name: "Group" }.into();

        assert!(err.is_precondition());
        assert_eq!(err.class(), ErrorClass::Precondition);
        assert_eq!(
            err.display_with_class(),
            "precondition: sdm: type Group is not registered"
        );
    }

    #[test]
    fn mapping_error_names_column_and_type() {
        let err = Error::ColumnNotInStruct {
            type_name: "Group",
            column: "nickname".to_string(),
        };

        assert_eq!(err.class(), ErrorClass::Mapping);
        assert!(!err.is_precondition());
        assert_eq!(err.to_string(), "sdm: column nickname not in struct Group");
    }

    #[test]
    fn driver_errors_pass_through_message() {
        let err: Error = DriverError::message("database is locked").into();

        assert_eq!(err.class(), ErrorClass::Driver);
        assert_eq!(err.to_string(), "database is locked");
    }
}
