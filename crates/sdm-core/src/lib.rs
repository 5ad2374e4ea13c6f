//! Core runtime for sdm: record metadata, the schema registry, SQL dialects,
//! statement generation, and row materialization.
//!
//! The crate never talks to a database itself. Everything that crosses the
//! wire goes through the [`connection`] traits, which drivers implement.
#![warn(unreachable_pub)]

extern crate self as sdm;

// public exports are one module level down
pub mod args;
pub mod bulk;
pub mod config;
pub mod connection;
pub mod dialect;
pub mod error;
pub mod ext;
pub mod manager;
pub mod model;
pub mod registry;
pub mod rows;
pub mod statement;
pub mod stmt;
pub mod traits;
pub mod tx;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

pub use error::Error;

///
/// CONSTANTS
///

/// Attribute / tag namespace recognised on record fields.
pub const TAG_NAMESPACE: &str = "sdm";

/// Suffix appended to the table name when a primary key is synthesized
/// for a lone auto-increment column.
pub const SYNTHESIZED_PK_SUFFIX: &str = "_pk";

///
/// Prelude
///
/// Domain vocabulary plus the traits needed to call record operations.
///

pub mod prelude {
    pub use crate::{
        bulk::{Bulk, BulkDelete, BulkInsert},
        connection::{Connection, ExecResult, Executor, RowSource, Transaction},
        dialect::{Dialect, DialectCatalog, Usage},
        manager::{Executable, Manager},
        model::{ColumnDef, IndexDef, IndexKind, TableInfo},
        traits::Record,
        value::{FieldKind, FieldValue, Value},
    };
}
