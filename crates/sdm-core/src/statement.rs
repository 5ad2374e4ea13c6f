//! Statement generation from registry metadata.
//!
//! Templates understand four tokens, each substituted at most once:
//!
//! | token        | expands to            |
//! |--------------|-----------------------|
//! | `%table%`    | quoted table name     |
//! | `%cols%`     | `a,b,c`               |
//! | `%vals%`     | `?,?,?`               |
//! | `%combined%` | `a=?,b=?,c=?`         |
//!
//! Pairing `%cols%` with `%vals%` is the caller's job; nothing is validated.

use crate::{
    Error,
    dialect::{Dialect, Usage},
    model::{ColumnDef, TableInfo},
    traits::Record,
    value::{ConvertError, Value},
};

///
/// BoundSql
///
/// SQL text plus the positional values to bind, in placeholder order.
///

#[derive(Clone, Debug, PartialEq)]
pub struct BoundSql {
    pub sql: String,
    pub values: Vec<Value>,
}

impl BoundSql {
    #[must_use]
    pub const fn new(sql: String, values: Vec<Value>) -> Self {
        Self { sql, values }
    }
}

///
/// StatementBuilder
///
/// Borrowed view over one table's metadata and the active dialect.
///

#[derive(Clone, Copy)]
pub struct StatementBuilder<'a> {
    table: &'a TableInfo,
    dialect: &'a dyn Dialect,
}

impl<'a> StatementBuilder<'a> {
    #[must_use]
    pub const fn new(table: &'a TableInfo, dialect: &'a dyn Dialect) -> Self {
        Self { table, dialect }
    }

    #[must_use]
    pub const fn table(&self) -> &'a TableInfo {
        self.table
    }

    #[must_use]
    pub fn quoted_table(&self) -> String {
        self.dialect.quote(self.table.table_name())
    }

    fn columns(&self, skip_auto_increment: bool) -> impl Iterator<Item = &'a ColumnDef> + use<'a> {
        self.table
            .columns()
            .iter()
            .filter(move |c| !(skip_auto_increment && c.auto_increment))
    }

    fn exprs(&self, usage: Usage, skip_auto_increment: bool) -> Vec<String> {
        self.columns(skip_auto_increment)
            .map(|c| {
                self.dialect
                    .column_expr(self.table.table_name(), &c.name, usage)
            })
            .collect()
    }

    fn holders(&self, skip_auto_increment: bool) -> Vec<String> {
        self.columns(skip_auto_increment)
            .map(|c| self.dialect.placeholder(c.kind))
            .collect()
    }

    fn values<T: Record>(&self, record: &T, skip_auto_increment: bool) -> Result<Vec<Value>, Error> {
        self.columns(skip_auto_increment)
            .map(|c| self.produce(record, c))
            .collect()
    }

    fn produce<T: Record>(&self, record: &T, column: &ColumnDef) -> Result<Value, Error> {
        let value = record
            .get_value(column.field_id)
            .ok_or(ConvertError::UnknownField(column.field_id))
            .map_err(|err| Error::convert(T::TYPE_NAME, &column.name, err))?;

        match self.dialect.produce_adapter(column) {
            Some(adapter) => adapter
                .produce(value)
                .map_err(|err| Error::convert(T::TYPE_NAME, &column.name, err)),
            None => Ok(value),
        }
    }

    fn combined(&self, usage: Usage, skip_auto_increment: bool, sep: &str) -> String {
        self.exprs(usage, skip_auto_increment)
            .into_iter()
            .zip(self.holders(skip_auto_increment))
            .map(|(col, holder)| format!("{col}={holder}"))
            .collect::<Vec<_>>()
            .join(sep)
    }

    /// Rendered column expressions; auto-increment columns are left out
    /// for `Usage::Insert`.
    #[must_use]
    pub fn columns_for(&self, usage: Usage) -> Vec<String> {
        self.exprs(usage, usage.skips_auto_increment())
    }

    /// Placeholder tokens matching `columns_for(usage)` one-to-one.
    #[must_use]
    pub fn placeholders_for(&self, usage: Usage) -> Vec<String> {
        self.holders(usage.skips_auto_increment())
    }

    /// Field values in `columns_for(usage)` order, after produce adapters.
    pub fn values_for<T: Record>(&self, record: &T, usage: Usage) -> Result<Vec<Value>, Error> {
        self.values(record, usage.skips_auto_increment())
    }

    /// Substitute the template tokens. Absent tokens are left alone.
    #[must_use]
    pub fn build(&self, template: &str, usage: Usage) -> String {
        let skip = usage.skips_auto_increment();

        template
            .replacen("%table%", &self.quoted_table(), 1)
            .replacen("%cols%", &self.exprs(usage, skip).join(","), 1)
            .replacen("%vals%", &self.holders(skip).join(","), 1)
            .replacen("%combined%", &self.combined(usage, skip, ","), 1)
    }

    /// `(?,?,?)` for one insert row.
    #[must_use]
    pub fn insert_group(&self) -> String {
        format!("({})", self.holders(true).join(","))
    }

    /// `a=? AND b=?` over every mapped column, for delete-by-row-image.
    #[must_use]
    pub fn match_group(&self) -> String {
        self.combined(Usage::Where, false, " AND ")
    }

    pub(crate) fn insert_values<T: Record>(&self, record: &T) -> Result<Vec<Value>, Error> {
        self.values(record, true)
    }

    pub(crate) fn match_values<T: Record>(&self, record: &T) -> Result<Vec<Value>, Error> {
        self.values(record, false)
    }

    /// `INSERT INTO t (a,b) VALUES (?,?)`, or `DEFAULT VALUES` when every
    /// column is auto-increment.
    pub fn make_insert<T: Record>(&self, record: &T) -> Result<BoundSql, Error> {
        let table = self.quoted_table();
        let cols = self.columns_for(Usage::Insert);

        let sql = if cols.is_empty() {
            format!("INSERT INTO {table} DEFAULT VALUES")
        } else {
            format!(
                "INSERT INTO {table} ({}) VALUES {}",
                cols.join(","),
                self.insert_group()
            )
        };

        Ok(BoundSql::new(sql, self.insert_values(record)?))
    }

    /// `UPDATE t SET a=?,b=? WHERE <where_clause>`.
    ///
    /// Auto-increment columns are neither set nor bound; `where_args`
    /// follow the SET values.
    pub fn make_update<T: Record>(
        &self,
        record: &T,
        where_clause: &str,
        where_args: &[Value],
    ) -> Result<BoundSql, Error> {
        let set = self.combined(Usage::Update, true, ",");
        if set.is_empty() {
            return Err(Error::NoColumns {
                type_name: T::TYPE_NAME,
            });
        }

        let sql = format!(
            "UPDATE {} SET {set} WHERE {where_clause}",
            self.quoted_table()
        );
        let mut values = self.values(record, true)?;
        values.extend_from_slice(where_args);

        Ok(BoundSql::new(sql, values))
    }

    /// `DELETE FROM t WHERE a=? AND b=?`, matching the full row image.
    pub fn make_delete<T: Record>(&self, record: &T) -> Result<BoundSql, Error> {
        let group = self.match_group();
        if group.is_empty() {
            return Err(Error::NoColumns {
                type_name: T::TYPE_NAME,
            });
        }

        let sql = format!("DELETE FROM {} WHERE {group}", self.quoted_table());

        Ok(BoundSql::new(sql, self.match_values(record)?))
    }
}

///
/// TESTS
///
