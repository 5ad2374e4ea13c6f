use crate::dialect::{
    Dialect, DialectError, GenericDialect, MysqlDialect, QuoteStyle, SqliteDialect,
};
use std::{collections::BTreeMap, sync::Arc};
use tracing::debug;

/// String parameters handed to a dialect factory.
pub type DialectParams = BTreeMap<String, String>;

/// Builds a configured dialect instance.
pub type DialectFactory =
    Arc<dyn Fn(&DialectParams) -> Result<Arc<dyn Dialect>, DialectError> + Send + Sync>;

///
/// DialectCatalog
///
/// Explicit name → factory registry, constructed by the host and passed
/// to `Manager::from_config`. There is no process-wide catalog.
///

#[derive(Clone, Default)]
pub struct DialectCatalog {
    factories: BTreeMap<String, DialectFactory>,
}

impl DialectCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with `generic`, `ansi`, `sqlite3` and `mysql` registered.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();

        catalog.register("generic", |params| {
            Ok(Arc::new(GenericDialect::from_params(
                "generic",
                QuoteStyle::Bare,
                params,
            )?))
        });
        catalog.register("ansi", |params| {
            Ok(Arc::new(GenericDialect::from_params(
                "ansi",
                QuoteStyle::DoubleQuote,
                params,
            )?))
        });
        catalog.register(SqliteDialect::NAME, |params| {
            Ok(Arc::new(SqliteDialect::from_params(params)?))
        });
        catalog.register(MysqlDialect::NAME, |params| {
            Ok(Arc::new(MysqlDialect::from_params(params)?))
        });

        catalog
    }

    /// Register a factory under `name`. An existing registration wins and
    /// the new factory is dropped; returns whether it was stored.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> bool
    where
        F: Fn(&DialectParams) -> Result<Arc<dyn Dialect>, DialectError> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.factories.contains_key(&name) {
            debug!(dialect = %name, "dialect already registered, ignoring");
            return false;
        }

        self.factories.insert(name, Arc::new(factory));
        true
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn build(&self, name: &str, params: &DialectParams) -> Result<Arc<dyn Dialect>, DialectError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| DialectError::UnknownDialect(name.to_string()))?;

        factory(params)
    }
}

impl std::fmt::Debug for DialectCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

///
/// TESTS
///
