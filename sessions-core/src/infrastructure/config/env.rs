use crate::foundation::TrackerError;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "sessions-config.toml";
pub const CONFIG_PATH_ENV: &str = "SESSIONS_CONFIG_PATH";
pub const DATA_DIR_ENV: &str = "SESSIONS_DATA_DIR";

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

pub fn resolve_config_path(data_dir: &Path) -> PathBuf {
    match non_empty_env(CONFIG_PATH_ENV) {
        Some(path) => PathBuf::from(path),
        None => data_dir.join(CONFIG_FILE_NAME),
    }
}

pub fn resolve_data_dir() -> Result<PathBuf, TrackerError> {
    if let Some(dir) = non_empty_env(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    let cwd = std::env::current_dir()
        .map_err(|err| TrackerError::StorageError { operation: "env::current_dir".to_string(), details: err.to_string() })?;
    Ok(cwd.join(".sessions"))
}
