use crate::{
    Error,
    connection::RowSource,
    dialect::Dialect,
    model::TableInfo,
    traits::Record,
    value::Value,
};
use std::{collections::HashMap, hash::Hash, marker::PhantomData, sync::Arc};
use tracing::debug;

///
/// Rows
///
/// Typed cursor over a driver result set. Result columns are matched to
/// mapped fields by name when the cursor is created; any error is latched,
/// after which `next` reports no more rows and `err` returns it.
///

pub struct Rows<'c, T: Record> {
    source: Option<Box<dyn RowSource + 'c>>,
    table: Arc<TableInfo>,
    dialect: Arc<dyn Dialect>,
    columns: Vec<String>,
    bindings: Result<Vec<usize>, Error>,
    current: Option<Vec<Value>>,
    error: Option<Error>,
    _marker: PhantomData<fn() -> T>,
}

impl<'c, T: Record> Rows<'c, T> {
    pub fn new(
        source: Box<dyn RowSource + 'c>,
        table: Arc<TableInfo>,
        dialect: Arc<dyn Dialect>,
    ) -> Self {
        let columns = source.columns().to_vec();
        let bindings = bind_columns::<T>(&table, dialect.as_ref(), &columns);

        Self {
            source: Some(source),
            table,
            dialect,
            columns,
            bindings,
            current: None,
            error: None,
            _marker: PhantomData,
        }
    }

    /// Cursor for a query that never reached the driver.
    pub fn failed(error: Error, table: Arc<TableInfo>, dialect: Arc<dyn Dialect>) -> Self {
        Self {
            source: None,
            table,
            dialect,
            columns: Vec::new(),
            bindings: Ok(Vec::new()),
            current: None,
            error: Some(error),
            _marker: PhantomData,
        }
    }

    /// Result-set column names as reported by the driver.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Advance to the next row. Returns `false` at the end of the result
    /// set and after any error.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        self.current = None;
        if self.error.is_some() {
            return false;
        }
        let Some(source) = self.source.as_mut() else {
            return false;
        };

        match source.next_row() {
            Ok(Some(row)) => {
                self.current = Some(row);
                true
            }
            Ok(None) => false,
            Err(err) => {
                self.error = Some(err.into());
                false
            }
        }
    }

    /// Bind the current row into `target`.
    ///
    /// Columns without a mapped field fail the scan with
    /// `ColumnNotInStruct`; fields with no result column are left alone.
    pub fn scan(&mut self, target: &mut T) -> Result<(), Error> {
        let result = self.scan_current(target);
        if let Err(err) = &result
            && self.error.is_none()
        {
            self.error = Some(err.clone());
        }

        result
    }

    fn scan_current(&mut self, target: &mut T) -> Result<(), Error> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        let bindings = self.bindings.clone()?;
        let row = self.current.take().ok_or(Error::NoRows)?;

        for (value, pos) in row.into_iter().zip(bindings) {
            let column = &self.table.columns()[pos];
            let value = match self.dialect.scan_adapter(column) {
                Some(adapter) => adapter
                    .scan(value, column.nullable)
                    .map_err(|err| Error::convert(T::TYPE_NAME, &column.name, err))?,
                None => value,
            };

            target
                .set_value(column.field_id, value)
                .map_err(|err| Error::convert(T::TYPE_NAME, &column.name, err))?;
        }

        Ok(())
    }

    /// Latched error, if any.
    #[must_use]
    pub const fn err(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Release the driver cursor. Safe to call repeatedly; a cursor that
    /// never reached the driver has nothing to close.
    pub fn close(&mut self) -> Result<(), Error> {
        self.current = None;
        match self.source.take() {
            Some(mut source) => source.close().map_err(Error::from),
            None => Ok(()),
        }
    }

    #[must_use]
    pub fn table(&self) -> &TableInfo {
        &self.table
    }
}

impl<T: Record + Default> Rows<'_, T> {
    /// Scan the current row into a fresh record.
    pub fn decode(&mut self) -> Result<T, Error> {
        let mut record = T::default();
        self.scan(&mut record)?;

        Ok(record)
    }

    /// Drain every remaining row into `dest`. `E` picks the element
    /// ownership, e.g. `T`, `Box<T>` or `Arc<T>`.
    pub fn append_to<E: From<T>>(&mut self, dest: &mut Vec<E>) -> Result<(), Error> {
        while self.next() {
            dest.push(E::from(self.decode()?));
        }

        self.finish()
    }

    /// Drain every remaining row into `dest` under `key(&record)`.
    /// Later rows overwrite earlier ones with the same key.
    pub fn set_to<K, E, F>(&mut self, dest: &mut HashMap<K, E>, mut key: F) -> Result<(), Error>
    where
        K: Eq + Hash,
        E: From<T>,
        F: FnMut(&T) -> K,
    {
        while self.next() {
            let record = self.decode()?;
            dest.insert(key(&record), E::from(record));
        }

        self.finish()
    }

    /// Every remaining row, in result order.
    pub fn collect_vec(&mut self) -> Result<Vec<T>, Error> {
        let mut out = Vec::new();
        self.append_to(&mut out)?;

        Ok(out)
    }

    /// The first row, or `NoRows`. The cursor is closed afterwards.
    pub fn first(&mut self) -> Result<T, Error> {
        let result = if self.next() {
            self.decode()
        } else {
            Err(self.error.clone().unwrap_or(Error::NoRows))
        };
        let closed = self.close();

        result.and_then(|record| closed.map(|()| record))
    }

    fn finish(&mut self) -> Result<(), Error> {
        match self.error.clone() {
            Some(err) => Err(err),
            None => self.close(),
        }
    }
}

impl<T: Record> Drop for Rows<'_, T> {
    fn drop(&mut self) {
        if let Some(mut source) = self.source.take()
            && let Err(err) = source.close()
        {
            debug!(type_name = T::TYPE_NAME, error = %err, "closing dropped cursor failed");
        }
    }
}

// bind_columns
// resolve each result column to a position in the table's column list
fn bind_columns<T: Record>(
    table: &TableInfo,
    dialect: &dyn Dialect,
    columns: &[String],
) -> Result<Vec<usize>, Error> {
    let positions: HashMap<&str, usize> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(pos, c)| (c.name.as_str(), pos))
        .collect();

    columns
        .iter()
        .map(|name| {
            positions
                .get(dialect.parse_column_name(name))
                .copied()
                .ok_or_else(|| Error::ColumnNotInStruct {
                    type_name: T::TYPE_NAME,
                    column: name.clone(),
                })
        })
        .collect()
}

///
/// TESTS
///
