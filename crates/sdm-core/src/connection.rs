//! Database-connection capability consumed by the mapper.
//!
//! Drivers implement these traits; sdm never opens, pools, or retries
//! connections itself. Errors from the driver travel back to the caller
//! unchanged inside [`DriverError`].

use crate::value::Value;
use std::{error::Error as StdError, fmt, sync::Arc};

///
/// DriverError
///
/// Opaque, cloneable wrapper around whatever the driver reported.
///

#[derive(Clone)]
pub struct DriverError(Arc<dyn StdError + Send + Sync + 'static>);

impl DriverError {
    pub fn new<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self(Arc::new(err))
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self(Arc::new(Message(message.into())))
    }

    /// Borrow the driver's own error, e.g. for downcasting.
    #[must_use]
    pub fn inner(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.0.as_ref()
    }
}

impl fmt::Debug for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DriverError").field(&self.0).finish()
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl StdError for DriverError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

#[derive(Debug)]
struct Message(String);

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl StdError for Message {}

///
/// ExecResult
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ExecResult {
    pub rows_affected: u64,
    /// Identifier generated by the last insert, when the driver reports one.
    pub last_insert_id: Option<i64>,
}

impl ExecResult {
    #[must_use]
    pub const fn new(rows_affected: u64, last_insert_id: Option<i64>) -> Self {
        Self {
            rows_affected,
            last_insert_id,
        }
    }
}

///
/// RowSource
///
/// Driver-side cursor. Column names are fixed for the lifetime of the
/// cursor; each row yields one value per column in the same order.
///

pub trait RowSource {
    fn columns(&self) -> &[String];

    fn next_row(&mut self) -> Result<Option<Vec<Value>>, DriverError>;

    /// Release driver resources. Called at most once by `Rows`.
    fn close(&mut self) -> Result<(), DriverError> {
        Ok(())
    }
}

///
/// Executor
///
/// Statement execution shared by connections and transactions.
///

pub trait Executor {
    fn execute(&self, sql: &str, args: &[Value]) -> Result<ExecResult, DriverError>;

    fn query(&self, sql: &str, args: &[Value]) -> Result<Box<dyn RowSource + '_>, DriverError>;

    fn prepare(&self, sql: &str) -> Result<Box<dyn PreparedStatement + '_>, DriverError>;
}

///
/// PreparedStatement
///

pub trait PreparedStatement {
    fn execute(&mut self, args: &[Value]) -> Result<ExecResult, DriverError>;

    fn query(&mut self, args: &[Value]) -> Result<Box<dyn RowSource + '_>, DriverError>;
}

///
/// Connection
///

pub trait Connection: Executor {
    fn begin(&self) -> Result<Box<dyn Transaction + '_>, DriverError>;
}

///
/// Transaction
///
/// Finished by value: a committed or rolled back transaction cannot be
/// used again.
///

pub trait Transaction: Executor {
    fn commit(self: Box<Self>) -> Result<(), DriverError>;

    fn rollback(self: Box<Self>) -> Result<(), DriverError>;
}
