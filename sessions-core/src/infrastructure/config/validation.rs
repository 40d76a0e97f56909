use crate::infrastructure::config::types::{BackendConfig, TrackerConfig};
use alloy::primitives::Address;
use std::collections::HashSet;

impl TrackerConfig {
    /// Reports every problem found, not just the first.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.context.factory == Address::ZERO {
            errors.push("context.factory must not be the zero address".to_string());
        }
        if self.context.main_module == Address::ZERO {
            errors.push("context.main_module must not be the zero address".to_string());
        }
        if self.context.session_utils == Address::ZERO {
            errors.push("context.session_utils must not be the zero address".to_string());
        }

        if self.storage.backends.is_empty() {
            errors.push("storage.backends must not be empty".to_string());
        }

        let mut rocks_paths = HashSet::new();
        for (index, backend) in self.storage.backends.iter().enumerate() {
            let BackendConfig::Rocks { path, .. } = backend else {
                continue;
            };
            let trimmed = path.trim();
            if trimmed.is_empty() {
                errors.push(format!("storage.backends[{index}].path must not be empty"));
                continue;
            }
            if !rocks_paths.insert(trimmed) {
                errors.push(format!("storage.backends[{index}].path duplicates another rocks backend: {trimmed}"));
            }
        }

        if self.logging.filters.trim().is_empty() {
            errors.push("logging.filters must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
