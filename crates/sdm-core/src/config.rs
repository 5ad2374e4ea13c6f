use crate::dialect::DialectParams;
use serde::{Deserialize, Serialize};
use std::ops::Not;
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ConfigError {
    #[error("sdm: invalid config: {0}")]
    Parse(String),
}

///
/// ManagerConfig
///
/// Host-supplied settings for `Manager::from_config`:
///
/// ```toml
/// dialect = "mysql"
/// auto_register = true
///
/// [params]
/// charset = "utf8mb4"
/// ```
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ManagerConfig {
    #[serde(default = "ManagerConfig::default_dialect")]
    pub dialect: String,

    #[serde(default, skip_serializing_if = "DialectParams::is_empty")]
    pub params: DialectParams,

    #[serde(default, skip_serializing_if = "Not::not")]
    pub auto_register: bool,
}

impl ManagerConfig {
    pub const DEFAULT_DIALECT: &'static str = "generic";

    fn default_dialect() -> String {
        Self::DEFAULT_DIALECT.to_string()
    }

    pub fn new(dialect: impl Into<String>) -> Self {
        Self {
            dialect: dialect.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub const fn auto_register(mut self, enabled: bool) -> Self {
        self.auto_register = enabled;
        self
    }

    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        toml::from_str(input).map_err(|err| ConfigError::Parse(err.to_string()))
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            dialect: Self::default_dialect(),
            params: DialectParams::new(),
            auto_register: false,
        }
    }
}

///
/// TESTS
///
