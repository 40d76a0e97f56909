//! Configuration loader using Figment for layered config management.
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. TOML config file
//! 3. Environment variables (SESSIONS_* prefix)

use crate::foundation::TrackerError;
use crate::infrastructure::config::env::CONFIG_FILE_NAME;
use crate::infrastructure::config::types::TrackerConfig;
use crate::{serde_err, storage_err};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use log::{debug, info};
use std::path::Path;

/// Environment variable prefix for config overrides.
///
/// Example: `SESSIONS_CONTEXT__FACTORY` -> `context.factory`
const ENV_PREFIX: &str = "SESSIONS_";

/// Load configuration from the default file in `data_dir` (`sessions-config.toml`).
pub fn load_config(data_dir: &Path) -> Result<TrackerConfig, TrackerError> {
    load_config_from_file(&data_dir.join(CONFIG_FILE_NAME))
}

/// Load configuration from a specific file path. A missing file falls back to defaults and env.
pub fn load_config_from_file(path: &Path) -> Result<TrackerConfig, TrackerError> {
    info!("loading configuration path={}", path.display());
    let figment = figment_base(path).merge(Env::prefixed(ENV_PREFIX).split("__"));
    let config: TrackerConfig =
        figment.extract().map_err(|err| TrackerError::ConfigError(format!("config extraction failed: {err}")))?;
    debug!(
        "configuration loaded factory={} main_module={} backends={}",
        config.context.factory,
        config.context.main_module,
        config.storage.backends.len()
    );
    Ok(config)
}

/// Persist `config` as TOML, creating parent directories.
pub fn write_config_file(path: &Path, config: &TrackerConfig) -> Result<(), TrackerError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| storage_err!("create config dir", err))?;
    }
    let contents = toml::to_string_pretty(config).map_err(|err| serde_err!("toml", err))?;
    std::fs::write(path, contents).map_err(|err| storage_err!("write config file", err))
}

fn figment_base(path: &Path) -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(TrackerConfig::default()));
    if path.exists() {
        figment = figment.merge(Toml::file(path));
    } else {
        debug!("configuration file missing; using defaults and env only path={}", path.display());
    }
    figment
}
