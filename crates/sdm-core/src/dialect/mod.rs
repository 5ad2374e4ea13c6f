//! SQL dialects.
//!
//! A dialect turns column and index metadata into engine-specific SQL text
//! and, where the wire protocol lacks a native type, adapts values on the
//! way in and out. Every method except `name` and `quote` has a default,
//! so a minimal dialect implements two functions.

mod adapter;
mod catalog;
mod generic;
mod mysql;
mod sqlite;

use crate::{
    model::{ColumnDef, IndexDef},
    value::FieldKind,
};
use thiserror::Error as ThisError;

// re-exports
pub use adapter::{TimestampLenient, TimestampSeconds, TimestampText, ValueAdapter};
pub use catalog::{DialectCatalog, DialectFactory, DialectParams};
pub use generic::{GenericDialect, QuoteStyle};
pub use mysql::MysqlDialect;
pub use sqlite::{SqliteDialect, TimeMode};

///
/// DialectError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum DialectError {
    #[error("sdm: dialect {dialect}: invalid parameter {name}='{value}'")]
    InvalidParam {
        dialect: String,
        name: String,
        value: String,
    },

    #[error(
        "sdm: table {table}: auto-increment column {column} must be the only column of the primary key"
    )]
    PrimaryKeyConflict { table: String, column: String },

    #[error("sdm: unknown dialect '{0}'")]
    UnknownDialect(String),

    #[error("sdm: dialect {dialect} does not support {operation}")]
    Unsupported {
        dialect: String,
        operation: &'static str,
    },
}

///
/// Usage
///
/// Where a rendered column expression is going to appear.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Usage {
    Select,
    Where,
    Insert,
    Update,
}

impl Usage {
    /// Auto-increment columns never take a value on insert.
    #[must_use]
    pub const fn skips_auto_increment(self) -> bool {
        matches!(self, Self::Insert)
    }
}

///
/// Dialect
///

pub trait Dialect: Send + Sync {
    /// Catalog name, used in diagnostics.
    fn name(&self) -> &str;

    /// Quote an identifier (table, column, or index name).
    fn quote(&self, ident: &str) -> String;

    fn column_expr(&self, _table: &str, column: &str, _usage: Usage) -> String {
        self.quote(column)
    }

    fn placeholder(&self, _kind: FieldKind) -> String {
        "?".to_string()
    }

    /// Map a result-set column name back to a mapped column name.
    fn parse_column_name<'a>(&self, name: &'a str) -> &'a str {
        name.rsplit_once('.').map_or(name, |(_, column)| column)
    }

    /// Adapter applied to values read from the database.
    /// `None` means the generic conversion applies.
    fn scan_adapter(&self, _column: &ColumnDef) -> Option<&dyn ValueAdapter> {
        None
    }

    /// Adapter applied to values written to the database.
    fn produce_adapter(&self, _column: &ColumnDef) -> Option<&dyn ValueAdapter> {
        None
    }

    fn create_table(
        &self,
        _table: &str,
        _columns: &[ColumnDef],
        _indexes: &[IndexDef],
        _if_not_exists: bool,
    ) -> Result<String, DialectError> {
        Err(DialectError::Unsupported {
            dialect: self.name().to_string(),
            operation: "create_table",
        })
    }

    /// Follow-up statements for indexes the engine cannot declare inline.
    fn create_indexes(
        &self,
        _table: &str,
        _indexes: &[IndexDef],
        _if_not_exists: bool,
    ) -> Result<Vec<String>, DialectError> {
        Ok(Vec::new())
    }
}

///
/// AutoIncrementKey
///
/// Primary key a DDL renderer must attach to the auto-increment column.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct AutoIncrementKey<'a> {
    pub column: &'a ColumnDef,
    pub name: String,
}

/// Resolve the primary key backing the table's auto-increment column.
///
/// The name comes from an explicit primary index over exactly that column,
/// else `<table>_pk` is synthesized. A primary index over any other column
/// set, or more than one auto-increment column, is a conflict.
pub(crate) fn auto_increment_key<'a>(
    table: &str,
    columns: &'a [ColumnDef],
    indexes: &[IndexDef],
) -> Result<Option<AutoIncrementKey<'a>>, DialectError> {
    let mut ai = columns.iter().filter(|c| c.auto_increment);
    let Some(column) = ai.next() else {
        return Ok(None);
    };

    let conflict = || DialectError::PrimaryKeyConflict {
        table: table.to_string(),
        column: column.name.clone(),
    };
    if ai.next().is_some() {
        return Err(conflict());
    }

    let name = match indexes.iter().find(|i| i.is_primary()) {
        Some(primary) if primary.columns == [column.name.as_str()] => primary.name.clone(),
        Some(_) => return Err(conflict()),
        None => format!("{table}{}", crate::SYNTHESIZED_PK_SUFFIX),
    };

    Ok(Some(AutoIncrementKey { column, name }))
}

/// Whether `column` takes part in any index.
pub(crate) fn is_indexed(column: &str, indexes: &[IndexDef]) -> bool {
    indexes.iter().any(|i| i.has_column(column))
}

pub(crate) fn quote_list(dialect: &dyn Dialect, columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| dialect.quote(c))
        .collect::<Vec<_>>()
        .join(",")
}

///
/// TESTS
///
