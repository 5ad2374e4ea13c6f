use crate::{
    Error,
    bulk::Bulk,
    connection::{ExecResult, Executor, Transaction},
    manager::{Executable, Schema, execute_all},
};
use tracing::debug;

///
/// Tx
///
/// Transaction-scoped handle exposing the same record operations as
/// `Manager`. Dropping a `Tx` without `commit` leaves the outcome to the
/// driver, which normally rolls back.
///

pub struct Tx<'m> {
    tx: Box<dyn Transaction + 'm>,
    schema: &'m Schema,
}

impl<'m> Tx<'m> {
    pub(crate) fn new(tx: Box<dyn Transaction + 'm>, schema: &'m Schema) -> Self {
        debug!("transaction started");

        Self { tx, schema }
    }

    pub fn commit(self) -> Result<(), Error> {
        self.tx.commit()?;
        debug!("transaction committed");

        Ok(())
    }

    pub fn rollback(self) -> Result<(), Error> {
        self.tx.rollback()?;
        debug!("transaction rolled back");

        Ok(())
    }
}

impl Executable for Tx<'_> {
    fn executor(&self) -> &dyn Executor {
        self.tx.as_ref()
    }

    fn schema(&self) -> &Schema {
        self.schema
    }

    /// Runs directly inside this transaction; no nested transaction is
    /// opened.
    fn run_bulk(&self, bulk: &dyn Bulk) -> Result<Option<ExecResult>, Error> {
        if bulk.is_empty() {
            return Ok(None);
        }
        let statements = bulk.make()?;

        execute_all(self, &statements).map(Some)
    }
}

///
/// TESTS
///
