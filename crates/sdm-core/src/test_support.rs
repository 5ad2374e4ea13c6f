//! Fixture records and a scripted driver shared by the unit tests.

use crate::{
    connection::{
        Connection, DriverError, ExecResult, Executor, PreparedStatement, RowSource, Transaction,
    },
    value::Value,
};
use chrono::{DateTime, Utc};
use sdm_derive::Record;
use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::Rc,
};

///
/// Group
///

#[derive(Clone, Debug, Default, PartialEq, Record)]
pub(crate) struct Group {
    #[sdm("id,ai")]
    pub id: i64,

    #[sdm("name,uniq_group_name")]
    pub name: String,
}

impl Group {
    pub(crate) fn named(name: &str) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
        }
    }
}

///
/// Member
/// carries an untagged field and a tagged non-public one, both unmapped
///

#[derive(Clone, Debug, Default, PartialEq, Record)]
#[sdm(table = "members")]
pub(crate) struct Member {
    #[sdm("id,ai")]
    pub id: i64,

    #[sdm("group_id,idx_grp")]
    pub group_id: i64,

    #[sdm("name")]
    pub name: String,

    #[sdm("active")]
    pub active: bool,

    pub note: String,

    #[sdm("secret")]
    pub(crate) secret: String,
}

///
/// Broken
///

#[derive(Debug, Default, Record)]
pub(crate) struct Broken {
    #[sdm("id,autoinc")]
    pub id: i64,
}

///
/// Event
///

#[derive(Clone, Debug, Default, PartialEq, Record)]
pub(crate) struct Event {
    #[sdm("id,ai")]
    pub id: i64,

    #[sdm("at")]
    pub at: DateTime<Utc>,

    #[sdm("note")]
    pub note: Option<String>,
}

///
/// OnlyId
///

#[derive(Clone, Debug, Default, PartialEq, Record)]
pub(crate) struct OnlyId {
    #[sdm("id,ai")]
    pub id: i64,
}

///
/// ScriptedRows
/// in-memory cursor with an optional injected failure
///

pub(crate) struct ScriptedRows {
    columns: Vec<String>,
    rows: VecDeque<Vec<Value>>,
    fail: Option<(usize, DriverError)>,
    close_error: Option<DriverError>,
    served: usize,
    closed: Rc<Cell<usize>>,
}

impl ScriptedRows {
    pub(crate) fn new(columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns: columns.iter().map(ToString::to_string).collect(),
            rows: rows.into(),
            fail: None,
            close_error: None,
            served: 0,
            closed: Rc::default(),
        }
    }

    /// Fail with `err` once `served` rows have been returned.
    pub(crate) fn fail_after(mut self, served: usize, err: DriverError) -> Self {
        self.fail = Some((served, err));
        self
    }

    pub(crate) fn with_close_error(mut self, err: DriverError) -> Self {
        self.close_error = Some(err);
        self
    }

    /// Counts `close` calls reaching the driver.
    pub(crate) fn closed_flag(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.closed)
    }
}

impl RowSource for ScriptedRows {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Vec<Value>>, DriverError> {
        if let Some((after, err)) = &self.fail
            && self.served >= *after
        {
            return Err(err.clone());
        }
        self.served += 1;

        Ok(self.rows.pop_front())
    }

    fn close(&mut self) -> Result<(), DriverError> {
        self.closed.set(self.closed.get() + 1);

        match &self.close_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

///
/// Call
///

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Call {
    Begin,
    Commit,
    Rollback,
    Execute(String, Vec<Value>),
    Query(String, Vec<Value>),
    Prepare(String),
}

#[derive(Default)]
struct Script {
    calls: Vec<Call>,
    exec: Option<ExecResult>,
    exec_error: Option<DriverError>,
    query_error: Option<DriverError>,
    commit_error: Option<DriverError>,
    rows: VecDeque<ScriptedRows>,
}

///
/// ScriptedConnection
/// records every driver call; transactions and prepared statements share
/// the same script
///

#[derive(Clone, Default)]
pub(crate) struct ScriptedConnection {
    script: Rc<RefCell<Script>>,
}

impl ScriptedConnection {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_exec(self, result: ExecResult) -> Self {
        self.script.borrow_mut().exec = Some(result);
        self
    }

    pub(crate) fn with_exec_error(self, err: DriverError) -> Self {
        self.script.borrow_mut().exec_error = Some(err);
        self
    }

    pub(crate) fn with_query_error(self, err: DriverError) -> Self {
        self.script.borrow_mut().query_error = Some(err);
        self
    }

    pub(crate) fn with_commit_error(self, err: DriverError) -> Self {
        self.script.borrow_mut().commit_error = Some(err);
        self
    }

    /// Queue a result set; queries pop them in order.
    pub(crate) fn with_rows(self, rows: ScriptedRows) -> Self {
        self.script.borrow_mut().rows.push_back(rows);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.script.borrow().calls.clone()
    }

    fn record(&self, call: Call) {
        self.script.borrow_mut().calls.push(call);
    }

    fn run(&self, sql: &str, args: &[Value]) -> Result<ExecResult, DriverError> {
        self.record(Call::Execute(sql.to_string(), args.to_vec()));
        let script = self.script.borrow();
        match &script.exec_error {
            Some(err) => Err(err.clone()),
            None => Ok(script.exec.unwrap_or(ExecResult::new(1, None))),
        }
    }

    fn fetch(&self, sql: &str, args: &[Value]) -> Result<ScriptedRows, DriverError> {
        self.record(Call::Query(sql.to_string(), args.to_vec()));
        let mut script = self.script.borrow_mut();
        if let Some(err) = &script.query_error {
            return Err(err.clone());
        }

        Ok(script
            .rows
            .pop_front()
            .unwrap_or_else(|| ScriptedRows::new(&[], Vec::new())))
    }

    fn finish(&self, call: Call) -> Result<(), DriverError> {
        let is_commit = call == Call::Commit;
        self.record(call);
        match &self.script.borrow().commit_error {
            Some(err) if is_commit => Err(err.clone()),
            _ => Ok(()),
        }
    }
}

impl Executor for ScriptedConnection {
    fn execute(&self, sql: &str, args: &[Value]) -> Result<ExecResult, DriverError> {
        self.run(sql, args)
    }

    fn query(&self, sql: &str, args: &[Value]) -> Result<Box<dyn RowSource + '_>, DriverError> {
        Ok(Box::new(self.fetch(sql, args)?))
    }

    fn prepare(&self, sql: &str) -> Result<Box<dyn PreparedStatement + '_>, DriverError> {
        self.record(Call::Prepare(sql.to_string()));

        Ok(Box::new(ScriptedStatement {
            conn: self.clone(),
            sql: sql.to_string(),
        }))
    }
}

impl Connection for ScriptedConnection {
    fn begin(&self) -> Result<Box<dyn Transaction + '_>, DriverError> {
        self.record(Call::Begin);

        Ok(Box::new(ScriptedTx { conn: self.clone() }))
    }
}

struct ScriptedTx {
    conn: ScriptedConnection,
}

impl Executor for ScriptedTx {
    fn execute(&self, sql: &str, args: &[Value]) -> Result<ExecResult, DriverError> {
        self.conn.execute(sql, args)
    }

    fn query(&self, sql: &str, args: &[Value]) -> Result<Box<dyn RowSource + '_>, DriverError> {
        self.conn.query(sql, args)
    }

    fn prepare(&self, sql: &str) -> Result<Box<dyn PreparedStatement + '_>, DriverError> {
        self.conn.prepare(sql)
    }
}

impl Transaction for ScriptedTx {
    fn commit(self: Box<Self>) -> Result<(), DriverError> {
        self.conn.finish(Call::Commit)
    }

    fn rollback(self: Box<Self>) -> Result<(), DriverError> {
        self.conn.finish(Call::Rollback)
    }
}

struct ScriptedStatement {
    conn: ScriptedConnection,
    sql: String,
}

impl PreparedStatement for ScriptedStatement {
    fn execute(&mut self, args: &[Value]) -> Result<ExecResult, DriverError> {
        self.conn.run(&self.sql, args)
    }

    fn query(&mut self, args: &[Value]) -> Result<Box<dyn RowSource + '_>, DriverError> {
        Ok(Box::new(self.conn.fetch(&self.sql, args)?))
    }
}
