use crate::{
    compile::dialect::{Dialect, UnknownDialect},
    error::InternalError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// DbConfig
///
/// Per-handle settings. Deserializable so it can sit inside an
/// application's own config file.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DbConfig {
    pub dialect: Dialect,

    /// Keep prepared statements for calls that name one.
    #[serde(default = "default_cache_statements")]
    pub cache_statements: bool,

    /// Log compiled SQL text at debug level.
    #[serde(default)]
    pub debug: bool,
}

const fn default_cache_statements() -> bool {
    true
}

impl DbConfig {
    #[must_use]
    pub const fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            cache_statements: true,
            debug: false,
        }
    }

    /// Build a config from a dialect name such as `"postgres"` or `"mariadb"`.
    pub fn for_dialect(name: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(name.parse()?))
    }

    #[must_use]
    pub const fn cache_statements(mut self, enabled: bool) -> Self {
        self.cache_statements = enabled;
        self
    }

    #[must_use]
    pub const fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }
}

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error(transparent)]
    UnknownDialect(#[from] UnknownDialect),
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::invalid_config(err.to_string())
    }
}
