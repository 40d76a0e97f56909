mod env;
mod loader;
mod types;
pub mod validation;

pub use env::{resolve_config_path, resolve_data_dir, CONFIG_FILE_NAME, CONFIG_PATH_ENV, DATA_DIR_ENV};
pub use loader::{load_config, load_config_from_file, write_config_file};
pub use types::*;

use crate::foundation::TrackerError;
use std::path::Path;

/// Resolve the data dir and config path from the environment, load and validate.
pub fn load_tracker_config() -> Result<TrackerConfig, TrackerError> {
    let data_dir = resolve_data_dir()?;
    load_tracker_config_from_path(&resolve_config_path(&data_dir))
}

pub fn load_tracker_config_from_path(path: &Path) -> Result<TrackerConfig, TrackerError> {
    let config = load_config_from_file(path)?;
    config.validate().map_err(|errors| TrackerError::ConfigError(format!("validation failed: {:?}", errors)))?;
    Ok(config)
}
