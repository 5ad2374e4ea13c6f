use crate::{
    Error,
    connection::{ExecResult, PreparedStatement},
    dialect::Dialect,
    model::TableInfo,
    rows::Rows,
    traits::Record,
    value::Value,
};
use std::{marker::PhantomData, sync::Arc};
use tracing::debug;

///
/// Stmt
///
/// Prepared statement bound to a record type, so query results decode
/// through the same metadata as `Manager::query`.
///

pub struct Stmt<'c, T: Record> {
    inner: Box<dyn PreparedStatement + 'c>,
    sql: String,
    table: Arc<TableInfo>,
    dialect: Arc<dyn Dialect>,
    _marker: PhantomData<fn() -> T>,
}

impl<'c, T: Record> Stmt<'c, T> {
    pub(crate) fn new(
        inner: Box<dyn PreparedStatement + 'c>,
        sql: String,
        table: Arc<TableInfo>,
        dialect: Arc<dyn Dialect>,
    ) -> Self {
        Self {
            inner,
            sql,
            table,
            dialect,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn execute(&mut self, args: &[Value]) -> Result<ExecResult, Error> {
        debug!(sql = %self.sql, args = args.len(), "execute prepared");

        Ok(self.inner.execute(args)?)
    }

    /// Run the statement; driver failures are latched in the returned cursor.
    pub fn query(&mut self, args: &[Value]) -> Rows<'_, T> {
        debug!(sql = %self.sql, args = args.len(), "query prepared");

        match self.inner.query(args) {
            Ok(source) => Rows::new(source, Arc::clone(&self.table), Arc::clone(&self.dialect)),
            Err(err) => Rows::failed(
                err.into(),
                Arc::clone(&self.table),
                Arc::clone(&self.dialect),
            ),
        }
    }

    pub fn query_row(&mut self, args: &[Value]) -> Result<T, Error>
    where
        T: Default,
    {
        self.query(args).first()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        connection::{DriverError, ExecResult},
        dialect::GenericDialect,
        manager::{Executable, Manager},
        test_support::{Call, Group, ScriptedConnection, ScriptedRows},
        value::Value,
    };
    use std::sync::Arc;

    fn manager(conn: ScriptedConnection) -> Manager<ScriptedConnection> {
        let manager = Manager::new(conn, Arc::new(GenericDialect::default()));
        manager.reg::<Group>().unwrap();
        manager
    }

    #[test]
    fn execute_forwards_args_and_driver_result() {
        let manager = manager(ScriptedConnection::new().with_exec(ExecResult::new(3, Some(7))));
        let mut stmt = manager
            .prepare::<Group>("UPDATE group SET name=? WHERE id>?")
            .unwrap();

        let result = stmt.execute(&[Value::from("x"), Value::Int(1)]).unwrap();

        assert_eq!(result, ExecResult::new(3, Some(7)));
        assert_eq!(
            manager.connection().calls(),
            [
                Call::Prepare("UPDATE group SET name=? WHERE id>?".to_string()),
                Call::Execute(
                    "UPDATE group SET name=? WHERE id>?".to_string(),
                    vec![Value::from("x"), Value::Int(1)]
                ),
            ]
        );
    }

    #[test]
    fn execute_surfaces_driver_errors() {
        let manager =
            manager(ScriptedConnection::new().with_exec_error(DriverError::message("locked")));
        let mut stmt = manager.prepare::<Group>("DELETE FROM group").unwrap();

        let err = stmt.execute(&[]).unwrap_err();

        assert!(matches!(err, Error::Driver(_)));
    }

    #[test]
    fn query_decodes_rows() {
        let manager = manager(ScriptedConnection::new().with_rows(ScriptedRows::new(
            &["id", "name"],
            vec![vec![Value::Int(2), Value::from("b")]],
        )));
        let mut stmt = manager
            .prepare::<Group>("SELECT * FROM group WHERE id=?")
            .unwrap();

        let groups = stmt.query(&[Value::Int(2)]).collect_vec().unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "b");
    }

    #[test]
    fn failed_query_latches_in_the_cursor() {
        let manager =
            manager(ScriptedConnection::new().with_query_error(DriverError::message("no such table")));
        let mut stmt = manager.prepare::<Group>("SELECT * FROM group").unwrap();

        let mut rows = stmt.query(&[]);

        assert!(!rows.next());
        assert_eq!(
            rows.err().map(ToString::to_string).as_deref(),
            Some("no such table")
        );
    }
}
