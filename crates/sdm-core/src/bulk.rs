use crate::{
    Error,
    dialect::Dialect,
    model::TableInfo,
    statement::{BoundSql, StatementBuilder},
    traits::Record,
};
use std::{any::Any, sync::Arc};
use thiserror::Error as ThisError;

///
/// BulkError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum BulkError {
    #[error("sdm: bulk: type error: expecting {expected}, item {position} is another type")]
    TypeMismatch {
        expected: &'static str,
        position: usize,
    },
}

///
/// Bulk
///
/// A batch of same-typed records rendered into as few statements as the
/// operation allows. An empty batch is never executed.
///

pub trait Bulk {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn make(&self) -> Result<Vec<BoundSql>, Error>;
}

///
/// BulkBatch
///
/// Shared record storage and type checking for both batch kinds.
///

struct BulkBatch<T: Record> {
    table: Arc<TableInfo>,
    dialect: Arc<dyn Dialect>,
    records: Vec<T>,
}

impl<T: Record> BulkBatch<T> {
    fn new(table: Arc<TableInfo>, dialect: Arc<dyn Dialect>) -> Self {
        Self {
            table,
            dialect,
            records: Vec::new(),
        }
    }

    fn builder(&self) -> StatementBuilder<'_> {
        StatementBuilder::new(&self.table, self.dialect.as_ref())
    }

    // every item is checked before any is stored
    fn try_add(&mut self, items: Vec<Box<dyn Any>>) -> Result<(), BulkError> {
        if let Some(position) = items.iter().position(|item| !item.is::<T>()) {
            return Err(BulkError::TypeMismatch {
                expected: T::TYPE_NAME,
                position,
            });
        }

        self.records.extend(
            items
                .into_iter()
                .filter_map(|item| item.downcast::<T>().ok())
                .map(|item| *item),
        );

        Ok(())
    }
}

///
/// BulkInsert
///
/// Renders one `INSERT INTO t (cols) VALUES (..),(..)` for the batch.
///

pub struct BulkInsert<T: Record> {
    batch: BulkBatch<T>,
}

impl<T: Record> BulkInsert<T> {
    pub(crate) fn new(table: Arc<TableInfo>, dialect: Arc<dyn Dialect>) -> Self {
        Self {
            batch: BulkBatch::new(table, dialect),
        }
    }

    pub fn add(&mut self, records: impl IntoIterator<Item = T>) {
        self.batch.records.extend(records);
    }

    /// Add type-erased records; nothing is added unless every item is a `T`.
    pub fn try_add(&mut self, items: Vec<Box<dyn Any>>) -> Result<(), BulkError> {
        self.batch.try_add(items)
    }

    #[must_use]
    pub fn records(&self) -> &[T] {
        &self.batch.records
    }
}

impl<T: Record> Bulk for BulkInsert<T> {
    fn len(&self) -> usize {
        self.batch.records.len()
    }

    fn make(&self) -> Result<Vec<BoundSql>, Error> {
        let records = &self.batch.records;
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let builder = self.batch.builder();

        // an all auto-increment table has no multi-row form
        if builder.table().insert_columns().next().is_none() {
            return records.iter().map(|r| builder.make_insert(r)).collect();
        }

        let cols = builder.columns_for(crate::dialect::Usage::Insert).join(",");
        let group = builder.insert_group();
        let mut values = Vec::new();
        for record in records {
            values.extend(builder.insert_values(record)?);
        }

        let sql = format!(
            "INSERT INTO {} ({cols}) VALUES {}",
            builder.quoted_table(),
            vec![group; records.len()].join(",")
        );

        Ok(vec![BoundSql::new(sql, values)])
    }
}

///
/// BulkDelete
///
/// Renders one `DELETE FROM t WHERE (..) OR (..)`; each group matches a
/// full row image.
///

pub struct BulkDelete<T: Record> {
    batch: BulkBatch<T>,
}

impl<T: Record> BulkDelete<T> {
    pub(crate) fn new(table: Arc<TableInfo>, dialect: Arc<dyn Dialect>) -> Self {
        Self {
            batch: BulkBatch::new(table, dialect),
        }
    }

    pub fn add(&mut self, records: impl IntoIterator<Item = T>) {
        self.batch.records.extend(records);
    }

    /// Add type-erased records; nothing is added unless every item is a `T`.
    pub fn try_add(&mut self, items: Vec<Box<dyn Any>>) -> Result<(), BulkError> {
        self.batch.try_add(items)
    }

    #[must_use]
    pub fn records(&self) -> &[T] {
        &self.batch.records
    }
}

impl<T: Record> Bulk for BulkDelete<T> {
    fn len(&self) -> usize {
        self.batch.records.len()
    }

    fn make(&self) -> Result<Vec<BoundSql>, Error> {
        if self.batch.records.is_empty() {
            return Ok(Vec::new());
        }
        let builder = self.batch.builder();
        let group = builder.match_group();
        if group.is_empty() {
            return Err(Error::NoColumns {
                type_name: T::TYPE_NAME,
            });
        }

        let mut values = Vec::new();
        for record in &self.batch.records {
            values.extend(builder.match_values(record)?);
        }

        let sql = format!(
            "DELETE FROM {} WHERE {}",
            builder.quoted_table(),
            vec![format!("({group})"); self.batch.records.len()].join(" OR ")
        );

        Ok(vec![BoundSql::new(sql, values)])
    }
}

///
/// TESTS
///
