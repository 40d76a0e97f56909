use crate::domain::WalletContext;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LOG_FILTERS: &str = "info";

/// Top-level tracker configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Deployment the tracked wallets belong to.
    #[serde(default)]
    pub context: WalletContext,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// One storage backend. Several backends are combined into a union tracker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    Memory,
    Rocks {
        path: String,
        /// Wipe the database when its schema version does not match. Development only.
        #[serde(default)]
        allow_schema_wipe: bool,
    },
}

impl BackendConfig {
    pub fn rocks(path: impl Into<String>) -> Self {
        Self::Rocks { path: path.into(), allow_schema_wipe: false }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Rocks { .. } => "rocks",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_backends")]
    pub backends: Vec<BackendConfig>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { backends: default_backends() }
    }
}

fn default_backends() -> Vec<BackendConfig> {
    vec![BackendConfig::Memory]
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory for rolled log files. Console only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    /// Filter expression, e.g. `"info"` or `"debug,rocksdb=warn"`.
    #[serde(default = "default_filters")]
    pub filters: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { dir: None, filters: default_filters() }
    }
}

fn default_filters() -> String {
    DEFAULT_LOG_FILTERS.to_string()
}
