pub mod tag;

use crate::{error::ErrorClass, model::TableInfo, traits::Record};
use parking_lot::RwLock;
use std::{any::TypeId, collections::HashMap, sync::Arc};
use thiserror::Error as ThisError;
use tracing::debug;

// re-exports
pub use tag::{FieldTag, TagError};

///
/// RegistryError
///

#[derive(Clone, Debug, ThisError)]
pub enum RegistryError {
    #[error("sdm: malformed tag '{tag}' on {type_name}.{field}: {source}")]
    MalformedTag {
        type_name: &'static str,
        field: &'static str,
        tag: String,
        #[source]
        source: TagError,
    },

    #[error("sdm: type {type_name} is not registered")]
    TypeNotRegistered { type_name: &'static str },
}

impl RegistryError {
    /// Both variants describe programmer errors.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::MalformedTag { .. } | Self::TypeNotRegistered { .. } => ErrorClass::Precondition,
        }
    }
}

///
/// Registry
///
/// Type identity → `TableInfo` cache. Entries are immutable once stored;
/// concurrent registrations of the same type resolve to the first writer.
///

#[derive(Debug, Default)]
pub struct Registry {
    tables: RwLock<HashMap<TypeId, Arc<TableInfo>>>,
    auto_register: bool,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that registers unknown types on first `get` using
    /// `Record::TABLE_NAME`.
    #[must_use]
    pub fn with_auto_register() -> Self {
        Self {
            auto_register: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn auto_register(&self) -> bool {
        self.auto_register
    }

    pub(crate) const fn set_auto_register(&mut self, enabled: bool) {
        self.auto_register = enabled;
    }

    /// Register `T` under `table`. A type that is already known keeps its
    /// existing entry and `table` is ignored.
    pub fn register<T: Record>(&self, table: &str) -> Result<Arc<TableInfo>, RegistryError> {
        let id = TypeId::of::<T>();
        if let Some(info) = self.tables.read().get(&id) {
            return Ok(Arc::clone(info));
        }

        // parse outside the lock; losers of a race discard their copy
        let built = Arc::new(TableInfo::from_fields(T::TYPE_NAME, table, T::FIELDS)?);

        let mut tables = self.tables.write();
        let info = tables.entry(id).or_insert_with(|| {
            debug!(
                type_name = T::TYPE_NAME,
                table = built.table_name(),
                columns = built.columns().len(),
                indexes = built.indexes().len(),
                "registered record type"
            );
            Arc::clone(&built)
        });

        Ok(Arc::clone(info))
    }

    /// Look up `T`, registering it on the fly when auto-registration is on.
    pub fn get<T: Record>(&self) -> Result<Arc<TableInfo>, RegistryError> {
        if let Some(info) = self.tables.read().get(&TypeId::of::<T>()) {
            return Ok(Arc::clone(info));
        }

        if self.auto_register {
            self.register::<T>(T::TABLE_NAME)
        } else {
            Err(RegistryError::TypeNotRegistered {
                type_name: T::TYPE_NAME,
            })
        }
    }

    #[must_use]
    pub fn is_registered<T: Record>(&self) -> bool {
        self.tables.read().contains_key(&TypeId::of::<T>())
    }

    /// Snapshot of every registered entry, ordered by table name.
    #[must_use]
    pub fn tables(&self) -> Vec<Arc<TableInfo>> {
        let mut tables: Vec<_> = self.tables.read().values().cloned().collect();
        tables.sort_by(|a, b| a.table_name().cmp(b.table_name()));

        tables
    }
}

///
/// TESTS
///
