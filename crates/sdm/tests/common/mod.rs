//! In-memory SQLite driver for the integration tests.

#![allow(dead_code)]

use rusqlite::{
    params_from_iter,
    types::{Value as SqlValue, ValueRef},
};
use sdm::{
    connection::{
        Connection, DriverError, ExecResult, Executor, PreparedStatement, RowSource, Transaction,
    },
    value::Value,
};

///
/// SqliteConnection
///

pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    pub fn open_in_memory() -> Self {
        Self {
            conn: rusqlite::Connection::open_in_memory().unwrap(),
        }
    }

    pub fn raw(&self) -> &rusqlite::Connection {
        &self.conn
    }
}

impl Executor for SqliteConnection {
    fn execute(&self, sql: &str, args: &[Value]) -> Result<ExecResult, DriverError> {
        execute(&self.conn, sql, args)
    }

    fn query(&self, sql: &str, args: &[Value]) -> Result<Box<dyn RowSource + '_>, DriverError> {
        let mut stmt = self.conn.prepare(sql).map_err(DriverError::new)?;

        Ok(Box::new(fetch(&mut stmt, args)?))
    }

    fn prepare(&self, sql: &str) -> Result<Box<dyn PreparedStatement + '_>, DriverError> {
        prepare(&self.conn, sql)
    }
}

impl Connection for SqliteConnection {
    fn begin(&self) -> Result<Box<dyn Transaction + '_>, DriverError> {
        let tx = self.conn.unchecked_transaction().map_err(DriverError::new)?;

        Ok(Box::new(SqliteTx { tx }))
    }
}

struct SqliteTx<'c> {
    tx: rusqlite::Transaction<'c>,
}

impl Executor for SqliteTx<'_> {
    fn execute(&self, sql: &str, args: &[Value]) -> Result<ExecResult, DriverError> {
        execute(&self.tx, sql, args)
    }

    fn query(&self, sql: &str, args: &[Value]) -> Result<Box<dyn RowSource + '_>, DriverError> {
        let mut stmt = self.tx.prepare(sql).map_err(DriverError::new)?;

        Ok(Box::new(fetch(&mut stmt, args)?))
    }

    fn prepare(&self, sql: &str) -> Result<Box<dyn PreparedStatement + '_>, DriverError> {
        prepare(&self.tx, sql)
    }
}

impl Transaction for SqliteTx<'_> {
    fn commit(self: Box<Self>) -> Result<(), DriverError> {
        self.tx.commit().map_err(DriverError::new)
    }

    fn rollback(self: Box<Self>) -> Result<(), DriverError> {
        self.tx.rollback().map_err(DriverError::new)
    }
}

struct SqliteStatement<'c> {
    conn: &'c rusqlite::Connection,
    stmt: rusqlite::Statement<'c>,
}

impl PreparedStatement for SqliteStatement<'_> {
    fn execute(&mut self, args: &[Value]) -> Result<ExecResult, DriverError> {
        let changed = self
            .stmt
            .execute(params_from_iter(args.iter().map(to_sql)))
            .map_err(DriverError::new)?;

        Ok(ExecResult::new(
            changed as u64,
            Some(self.conn.last_insert_rowid()),
        ))
    }

    fn query(&mut self, args: &[Value]) -> Result<Box<dyn RowSource + '_>, DriverError> {
        Ok(Box::new(fetch(&mut self.stmt, args)?))
    }
}

///
/// BufferedRows
/// result set read eagerly so the cursor does not borrow the statement
///

struct BufferedRows {
    columns: Vec<String>,
    rows: std::vec::IntoIter<Vec<Value>>,
}

impl RowSource for BufferedRows {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Vec<Value>>, DriverError> {
        Ok(self.rows.next())
    }
}

fn execute(conn: &rusqlite::Connection, sql: &str, args: &[Value]) -> Result<ExecResult, DriverError> {
    let changed = conn
        .execute(sql, params_from_iter(args.iter().map(to_sql)))
        .map_err(DriverError::new)?;

    Ok(ExecResult::new(changed as u64, Some(conn.last_insert_rowid())))
}

fn prepare<'c>(
    conn: &'c rusqlite::Connection,
    sql: &str,
) -> Result<Box<dyn PreparedStatement + 'c>, DriverError> {
    let stmt = conn.prepare(sql).map_err(DriverError::new)?;

    Ok(Box::new(SqliteStatement { conn, stmt }))
}

fn fetch(stmt: &mut rusqlite::Statement<'_>, args: &[Value]) -> Result<BufferedRows, DriverError> {
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = columns.len();

    let mut rows = stmt
        .query(params_from_iter(args.iter().map(to_sql)))
        .map_err(DriverError::new)?;
    let mut out = Vec::new();
    while let Some(row) = rows.next().map_err(DriverError::new)? {
        let mut values = Vec::with_capacity(width);
        for i in 0..width {
            values.push(from_sql(row.get_ref(i).map_err(DriverError::new)?));
        }
        out.push(values);
    }

    Ok(BufferedRows {
        columns,
        rows: out.into_iter(),
    })
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(v) => SqlValue::Integer(i64::from(*v)),
        Value::Int(v) => SqlValue::Integer(*v),
        Value::Uint(v) => i64::try_from(*v).map_or(SqlValue::Real(*v as f64), SqlValue::Integer),
        Value::Float(v) => SqlValue::Real(*v),
        Value::Text(v) => SqlValue::Text(v.clone()),
        Value::Blob(v) => SqlValue::Blob(v.clone()),
        Value::Timestamp(v) => SqlValue::Text(v.to_rfc3339()),
    }
}

fn from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Int(v),
        ValueRef::Real(v) => Value::Float(v),
        ValueRef::Text(v) => Value::Text(String::from_utf8_lossy(v).into_owned()),
        ValueRef::Blob(v) => Value::Blob(v.to_vec()),
    }
}
