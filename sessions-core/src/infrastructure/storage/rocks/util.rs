//! Utility helpers for RocksDB-backed storage.

use crate::foundation::{TrackerError, STORAGE_LOCK_TIMEOUT_SECS};
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};

pub async fn acquire_with_timeout<'a, T>(lock: &'a Mutex<T>, operation: &'static str) -> Result<MutexGuard<'a, T>, TrackerError> {
    acquire_with_timeout_for(lock, operation, Duration::from_secs(STORAGE_LOCK_TIMEOUT_SECS)).await
}

/// Waits for `lock` without holding a runtime worker; gives up after `timeout`.
pub async fn acquire_with_timeout_for<'a, T>(
    lock: &'a Mutex<T>,
    operation: &'static str,
    timeout: Duration,
) -> Result<MutexGuard<'a, T>, TrackerError> {
    tokio::time::timeout(timeout, lock.lock())
        .await
        .map_err(|_| TrackerError::StorageLockTimeout { operation: operation.to_string(), timeout_secs: timeout.as_secs() })
}
