use crate::{
    Error,
    bulk::{Bulk, BulkDelete, BulkInsert},
    config::ManagerConfig,
    connection::{Connection, ExecResult, Executor, RowSource},
    dialect::{Dialect, DialectCatalog, Usage},
    ext::Extension,
    model::TableInfo,
    registry::Registry,
    rows::Rows,
    statement::{BoundSql, StatementBuilder},
    stmt::Stmt,
    traits::Record,
    tx::Tx,
    value::{FieldKind, Value},
};
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, warn};

///
/// Schema
///
/// Registry plus the active dialect; shared by a manager and every
/// transaction it opens.
///

pub struct Schema {
    registry: Registry,
    dialect: Arc<dyn Dialect>,
}

impl Schema {
    pub fn new(registry: Registry, dialect: Arc<dyn Dialect>) -> Self {
        Self { registry, dialect }
    }

    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    #[must_use]
    pub fn dialect_arc(&self) -> Arc<dyn Dialect> {
        Arc::clone(&self.dialect)
    }

    pub fn table<T: Record>(&self) -> Result<Arc<TableInfo>, Error> {
        Ok(self.registry.get::<T>()?)
    }
}

///
/// Executable
///
/// Record operations shared by `Manager` and `Tx`. Write against this
/// trait to support both modes with one code path.
///

pub trait Executable {
    /// Handle statements are issued on.
    fn executor(&self) -> &dyn Executor;

    fn schema(&self) -> &Schema;

    /// Execute a bulk batch. An empty batch is a no-op returning `None`.
    fn run_bulk(&self, bulk: &dyn Bulk) -> Result<Option<ExecResult>, Error>;

    fn exec(&self, sql: &str, args: &[Value]) -> Result<ExecResult, Error> {
        debug!(sql, args = args.len(), "execute");

        Ok(self.executor().execute(sql, args)?)
    }

    /// Run a query; failures before the driver returns a cursor are
    /// latched in the returned `Rows`.
    fn query<T: Record>(&self, sql: &str, args: &[Value]) -> Result<Rows<'_, T>, Error> {
        let table = self.schema().table::<T>()?;
        debug!(sql, args = args.len(), "query");

        Ok(match self.executor().query(sql, args) {
            Ok(source) => Rows::new(source, table, self.schema().dialect_arc()),
            Err(err) => Rows::failed(err.into(), table, self.schema().dialect_arc()),
        })
    }

    /// Wrap a cursor obtained elsewhere so it decodes into `T`.
    fn proxify<'s, T: Record>(&self, source: Box<dyn RowSource + 's>) -> Result<Rows<'s, T>, Error> {
        let table = self.schema().table::<T>()?;

        Ok(Rows::new(source, table, self.schema().dialect_arc()))
    }

    /// First row of the result set, or `Error::NoRows`.
    fn query_row<T: Record + Default>(&self, sql: &str, args: &[Value]) -> Result<T, Error> {
        self.query::<T>(sql, args)?.first()
    }

    fn prepare<T: Record>(&self, sql: &str) -> Result<Stmt<'_, T>, Error> {
        let table = self.schema().table::<T>()?;
        let inner = self.executor().prepare(sql)?;

        Ok(Stmt::new(
            inner,
            sql.to_string(),
            table,
            self.schema().dialect_arc(),
        ))
    }

    /// Prepare a rendered template; see `StatementBuilder::build`.
    fn prepare_sql<T: Record>(&self, template: &str, usage: Usage) -> Result<Stmt<'_, T>, Error> {
        let sql = self.build_sql::<T>(template, usage)?;

        self.prepare::<T>(&sql)
    }

    /// Rebind a prepared statement onto this handle, e.g. into a
    /// transaction.
    fn restmt<T: Record>(&self, stmt: &Stmt<'_, T>) -> Result<Stmt<'_, T>, Error> {
        self.prepare::<T>(stmt.sql())
    }

    /// Render `template` for `T` without executing it.
    fn build_sql<T: Record>(&self, template: &str, usage: Usage) -> Result<String, Error> {
        let table = self.schema().table::<T>()?;

        Ok(StatementBuilder::new(&table, self.schema().dialect()).build(template, usage))
    }

    /// Render `template` for `usage` and execute it with the matching
    /// field values bound in `columns_for(usage)` order.
    fn build<T: Record>(
        &self,
        record: &T,
        template: &str,
        usage: Usage,
    ) -> Result<ExecResult, Error> {
        let table = self.schema().table::<T>()?;
        let builder = StatementBuilder::new(&table, self.schema().dialect());
        let sql = builder.build(template, usage);
        let values = builder.values_for(record, usage)?;

        self.exec(&sql, &values)
    }

    /// Mapped field values in `columns_for(usage)` order.
    fn values<T: Record>(&self, record: &T, usage: Usage) -> Result<Vec<Value>, Error> {
        let table = self.schema().table::<T>()?;

        StatementBuilder::new(&table, self.schema().dialect()).values_for(record, usage)
    }

    /// `(?,?,...)` for an IN list of `len` values of `kind`.
    fn sql_in(&self, kind: FieldKind, len: usize) -> String {
        crate::args::sql_in(self.schema().dialect(), kind, len)
    }

    /// Insert `record` and write the generated key back into it.
    fn insert<T: Record>(&self, record: &mut T) -> Result<ExecResult, Error> {
        let table = self.schema().table::<T>()?;
        let bound = StatementBuilder::new(&table, self.schema().dialect()).make_insert(&*record)?;
        let result = self.exec(&bound.sql, &bound.values)?;

        if let (Some(column), Some(id)) = (table.backfill_column(), result.last_insert_id)
            && let Err(err) = record.set_value(column.field_id, Value::Int(id))
        {
            warn!(
                type_name = T::TYPE_NAME,
                column = %column.name,
                id,
                error = %err,
                "cannot back-fill generated key"
            );
        }

        Ok(result)
    }

    /// Insert without back-filling the generated key.
    fn insert_detached<T: Record>(&self, record: &T) -> Result<ExecResult, Error> {
        let table = self.schema().table::<T>()?;
        let bound = StatementBuilder::new(&table, self.schema().dialect()).make_insert(record)?;

        self.exec(&bound.sql, &bound.values)
    }

    fn update<T: Record>(
        &self,
        record: &T,
        where_clause: &str,
        where_args: &[Value],
    ) -> Result<ExecResult, Error> {
        let table = self.schema().table::<T>()?;
        let bound = StatementBuilder::new(&table, self.schema().dialect()).make_update(
            record,
            where_clause,
            where_args,
        )?;

        self.exec(&bound.sql, &bound.values)
    }

    /// Delete rows equal to `record` on every mapped column.
    fn delete<T: Record>(&self, record: &T) -> Result<ExecResult, Error> {
        let table = self.schema().table::<T>()?;
        let bound = StatementBuilder::new(&table, self.schema().dialect()).make_delete(record)?;

        self.exec(&bound.sql, &bound.values)
    }

    fn bulk_insert<T: Record>(&self) -> Result<BulkInsert<T>, Error> {
        Ok(BulkInsert::new(
            self.schema().table::<T>()?,
            self.schema().dialect_arc(),
        ))
    }

    fn bulk_delete<T: Record>(&self) -> Result<BulkDelete<T>, Error> {
        Ok(BulkDelete::new(
            self.schema().table::<T>()?,
            self.schema().dialect_arc(),
        ))
    }

    /// Field ordinal → column name for `T`.
    fn columns_by_field<T: Record>(&self) -> Result<HashMap<usize, String>, Error> {
        Ok(self.schema().table::<T>()?.field_columns())
    }

    /// Initialise `ext` with `T`'s column mapping.
    fn ext<T: Record, E: Extension>(&self, ext: &mut E) -> Result<(), Error> {
        let columns = self.columns_by_field::<T>()?;
        ext.init(T::TYPE_NAME, columns);

        Ok(())
    }
}

// execute_all
// run bound statements in order, folding their results
pub(crate) fn execute_all(
    exec: &(impl Executable + ?Sized),
    statements: &[BoundSql],
) -> Result<ExecResult, Error> {
    let mut total = ExecResult::default();
    for bound in statements {
        let result = exec.exec(&bound.sql, &bound.values)?;
        total.rows_affected += result.rows_affected;
        total.last_insert_id = result.last_insert_id.or(total.last_insert_id);
    }

    Ok(total)
}

///
/// Manager
///
/// Entry point: owns the connection, the registry, and the dialect.
///

pub struct Manager<C: Connection> {
    conn: C,
    schema: Schema,
}

impl<C: Connection> Manager<C> {
    pub fn new(conn: C, dialect: Arc<dyn Dialect>) -> Self {
        Self {
            conn,
            schema: Schema::new(Registry::new(), dialect),
        }
    }

    /// Build the dialect named in `config` from `catalog`.
    pub fn from_config(
        conn: C,
        config: &ManagerConfig,
        catalog: &DialectCatalog,
    ) -> Result<Self, Error> {
        let dialect = catalog.build(&config.dialect, &config.params)?;
        let mut manager = Self::new(conn, dialect);
        manager.schema.registry.set_auto_register(config.auto_register);

        Ok(manager)
    }

    /// Register unknown record types on first use with `Record::TABLE_NAME`.
    #[must_use]
    pub fn with_auto_register(mut self) -> Self {
        self.schema.registry.set_auto_register(true);
        self
    }

    #[must_use]
    pub const fn connection(&self) -> &C {
        &self.conn
    }

    #[must_use]
    pub fn dialect(&self) -> &dyn Dialect {
        self.schema.dialect()
    }

    pub fn register<T: Record>(&self, table: &str) -> Result<Arc<TableInfo>, Error> {
        Ok(self.schema.registry.register::<T>(table)?)
    }

    /// Register `T` under its default table name.
    pub fn reg<T: Record>(&self) -> Result<Arc<TableInfo>, Error> {
        self.register::<T>(T::TABLE_NAME)
    }

    pub fn table_info<T: Record>(&self) -> Result<Arc<TableInfo>, Error> {
        self.schema.table::<T>()
    }

    pub fn create_tables(&self) -> Result<(), Error> {
        self.create_all(false)
    }

    pub fn create_tables_if_not_exist(&self) -> Result<(), Error> {
        self.create_all(true)
    }

    // tables first, then follow-up index statements; stops at the first error
    fn create_all(&self, if_not_exists: bool) -> Result<(), Error> {
        let dialect = self.schema.dialect();
        let tables = self.schema.registry.tables();

        for table in &tables {
            let sql = dialect.create_table(
                table.table_name(),
                table.columns(),
                table.indexes(),
                if_not_exists,
            )?;
            self.exec(&sql, &[])?;
        }

        for table in &tables {
            for sql in dialect.create_indexes(table.table_name(), table.indexes(), if_not_exists)? {
                self.exec(&sql, &[])?;
            }
        }

        Ok(())
    }

    pub fn begin(&self) -> Result<Tx<'_>, Error> {
        let tx = self.conn.begin()?;

        Ok(Tx::new(tx, &self.schema))
    }
}

impl<C: Connection> Executable for Manager<C> {
    fn executor(&self) -> &dyn Executor {
        &self.conn
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Runs inside an implicit transaction: all statements apply or none.
    fn run_bulk(&self, bulk: &dyn Bulk) -> Result<Option<ExecResult>, Error> {
        if bulk.is_empty() {
            return Ok(None);
        }
        let statements = bulk.make()?;

        let tx = self.begin()?;
        match execute_all(&tx, &statements) {
            Ok(result) => {
                tx.commit()?;
                Ok(Some(result))
            }
            Err(err) => {
                if let Err(rollback) = tx.rollback() {
                    warn!(error = %rollback, "rollback after failed bulk operation failed");
                }
                Err(err)
            }
        }
    }
}

///
/// TESTS
///
