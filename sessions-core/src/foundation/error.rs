use secp256k1::Error as SecpError;
use std::io;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    MalformedSignature,
    InvalidSignaturePart,
    InvalidTransitionPayload,
    NotFound,
    BackendUnavailable,
    StorageError,
    StorageLockTimeout,
    RocksDBOpenError,
    SchemaMismatch,
    SerializationError,
    EncodingError,
    CryptoError,
    ConfigError,
}

#[derive(Debug, Error)]
pub enum TrackerError {
    // === Codec / recovery ===
    #[error("malformed signature: {details}")]
    MalformedSignature { details: String },

    #[error("invalid signature part {index}: {details}")]
    InvalidSignaturePart { index: usize, details: String },

    // === Transition validation ===
    #[error("invalid transition payload: {details}")]
    InvalidTransitionPayload { details: String },

    #[error("not found: {0}")]
    NotFound(String),

    // === Backends ===
    #[error("backend unavailable: {backend} - {details}")]
    BackendUnavailable { backend: String, details: String },

    #[error("storage error during {operation}: {details}")]
    StorageError { operation: String, details: String },

    #[error("storage lock timeout: {operation} (waited {timeout_secs}s)")]
    StorageLockTimeout { operation: String, timeout_secs: u64 },

    #[error("RocksDB open error: {details}")]
    RocksDBOpenError {
        details: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("schema mismatch: stored={stored} current={current}")]
    SchemaMismatch { stored: u32, current: u32 },

    #[error("{format} serialization error: {details}")]
    SerializationError { format: String, details: String },

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("crypto error during {operation}: {details}")]
    CryptoError { operation: String, details: String },

    #[error("configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, TrackerError>;

impl TrackerError {
    pub fn code(&self) -> ErrorCode {
        match self {
            TrackerError::MalformedSignature { .. } => ErrorCode::MalformedSignature,
            TrackerError::InvalidSignaturePart { .. } => ErrorCode::InvalidSignaturePart,
            TrackerError::InvalidTransitionPayload { .. } => ErrorCode::InvalidTransitionPayload,
            TrackerError::NotFound(_) => ErrorCode::NotFound,
            TrackerError::BackendUnavailable { .. } => ErrorCode::BackendUnavailable,
            TrackerError::StorageError { .. } => ErrorCode::StorageError,
            TrackerError::StorageLockTimeout { .. } => ErrorCode::StorageLockTimeout,
            TrackerError::RocksDBOpenError { .. } => ErrorCode::RocksDBOpenError,
            TrackerError::SchemaMismatch { .. } => ErrorCode::SchemaMismatch,
            TrackerError::SerializationError { .. } => ErrorCode::SerializationError,
            TrackerError::EncodingError(_) => ErrorCode::EncodingError,
            TrackerError::CryptoError { .. } => ErrorCode::CryptoError,
            TrackerError::ConfigError(_) => ErrorCode::ConfigError,
        }
    }

    pub fn malformed(details: impl Into<String>) -> Self {
        TrackerError::MalformedSignature { details: details.into() }
    }

    pub fn invalid_part(index: usize, details: impl Into<String>) -> Self {
        TrackerError::InvalidSignaturePart { index, details: details.into() }
    }

    pub fn invalid_payload(details: impl Into<String>) -> Self {
        TrackerError::InvalidTransitionPayload { details: details.into() }
    }

    pub fn backend_unavailable(backend: impl Into<String>, details: impl Into<String>) -> Self {
        TrackerError::BackendUnavailable { backend: backend.into(), details: details.into() }
    }
}

impl From<hex::FromHexError> for TrackerError {
    fn from(err: hex::FromHexError) -> Self {
        TrackerError::EncodingError(format!("hex decode error: {}", err))
    }
}

impl From<figment::Error> for TrackerError {
    fn from(err: figment::Error) -> Self {
        TrackerError::ConfigError(err.to_string())
    }
}

impl From<rocksdb::Error> for TrackerError {
    fn from(err: rocksdb::Error) -> Self {
        TrackerError::StorageError { operation: "rocksdb".to_string(), details: err.to_string() }
    }
}

impl From<bincode::Error> for TrackerError {
    fn from(err: bincode::Error) -> Self {
        TrackerError::SerializationError { format: "bincode".to_string(), details: err.to_string() }
    }
}

impl From<alloy::sol_types::Error> for TrackerError {
    fn from(err: alloy::sol_types::Error) -> Self {
        TrackerError::SerializationError { format: "abi".to_string(), details: err.to_string() }
    }
}

#[macro_export]
macro_rules! storage_err {
    ($op:expr, $err:expr) => {
        $crate::foundation::TrackerError::StorageError { operation: $op.into(), details: $err.to_string() }
    };
}

#[macro_export]
macro_rules! serde_err {
    ($fmt:expr, $err:expr) => {
        $crate::foundation::TrackerError::SerializationError { format: $fmt.into(), details: $err.to_string() }
    };
}

impl From<io::Error> for TrackerError {
    fn from(err: io::Error) -> Self {
        TrackerError::StorageError { operation: "io".to_string(), details: err.to_string() }
    }
}

impl From<SecpError> for TrackerError {
    fn from(err: SecpError) -> Self {
        TrackerError::CryptoError { operation: "secp256k1".to_string(), details: err.to_string() }
    }
}

// NOTE: Avoid adding generic "stringly" error conversions here.
// Use structured `TrackerError` variants at the call site to preserve context.
