//! ## Crate layout
//! - `core`: runtime; record metadata, registry, dialects, statements,
//!   cursors, bulk batches, manager and transactions.
//! - `Record`: derive macro generating the field table for a struct.
//!
//! Drivers plug in by implementing the traits in [`connection`].
//! The `prelude` brings the manager, the record traits, and the derive
//! into scope.

pub use sdm_core as core;

// derive output refers to ::sdm::{model, traits, value}
pub use sdm_core::{
    Error, SYNTHESIZED_PK_SUFFIX, TAG_NAMESPACE, args, bulk, config, connection, dialect, error,
    ext, manager, model, registry, rows, statement, stmt, traits, tx, value,
};
pub use sdm_derive::Record;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::core::prelude::*;
    pub use crate::{
        config::ManagerConfig,
        ext::{Extension as _, FormReader},
        rows::Rows,
        stmt::Stmt,
        tx::Tx,
    };
    pub use sdm_derive::Record;
}
