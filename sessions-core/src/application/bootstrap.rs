use crate::foundation::{Result, TrackerError};
use crate::infrastructure::config::{load_tracker_config, BackendConfig, TrackerConfig};
use crate::infrastructure::logging::init_logger_from_config;
use crate::infrastructure::storage::{ConfigTracker, MemoryTracker, RocksTracker, UnionTracker};
use log::info;
use std::sync::Arc;

pub fn open_backend(backend: &BackendConfig, config: &TrackerConfig) -> Result<Arc<dyn ConfigTracker>> {
    match backend {
        BackendConfig::Memory => Ok(Arc::new(MemoryTracker::new(config.context))),
        BackendConfig::Rocks { path, allow_schema_wipe } => {
            Ok(Arc::new(RocksTracker::open_with_options(path.trim(), config.context, *allow_schema_wipe)?))
        }
    }
}

/// Opens every configured backend. More than one backend yields a union tracker.
pub fn open_tracker(config: &TrackerConfig) -> Result<Arc<dyn ConfigTracker>> {
    config.validate().map_err(|errors| TrackerError::ConfigError(format!("validation failed: {:?}", errors)))?;
    let mut members = config.storage.backends.iter().map(|backend| open_backend(backend, config)).collect::<Result<Vec<_>>>()?;
    let names: Vec<&str> = config.storage.backends.iter().map(BackendConfig::name).collect();
    info!("tracker opened backends={:?} factory={} main_module={}", names, config.context.factory, config.context.main_module);
    if members.len() == 1 {
        if let Some(single) = members.pop() {
            return Ok(single);
        }
    }
    Ok(Arc::new(UnionTracker::new(members)?))
}

/// Load config from the environment, start logging and open the tracker.
pub fn start_from_env() -> Result<(TrackerConfig, Arc<dyn ConfigTracker>)> {
    let config = load_tracker_config()?;
    init_logger_from_config(&config.logging)?;
    let tracker = open_tracker(&config)?;
    Ok((config, tracker))
}
