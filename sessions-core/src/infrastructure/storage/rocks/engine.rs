//! RocksDB-backed configuration tracker.
//!
//! # Lock Semantics
//!
//! Every write call is staged into a single `WriteBatch` and committed under `write_lock`,
//! so a call either lands completely or not at all. The lock also serialises edge sequence
//! allocation and the insert-if-absent checks of the signer and edge-id indexes.
//!
//! The lock is acquired with a bounded timeout (`STORAGE_LOCK_TIMEOUT_SECS`).
//! Reads take no lock: route walks and edge scans run on a RocksDB snapshot.
//!
//! # Column Families
//!
//! See `schema.rs` for column family names and key prefixes. Edge keys are
//! `edge:` + wallet + chain_id + from_image_hash + seq, so a prefix scan over
//! (wallet, chain) yields each source's edges in insertion order.

use crate::domain::{TransitionEdge, WalletContext};
use crate::foundation::{ChainId, ContextId, EdgeId, ImageHash, TrackerError};
use crate::infrastructure::storage::rocks::migration::open_db_with_cfs;
use crate::infrastructure::storage::rocks::schema::*;
use crate::storage_err;
use alloy::primitives::Address;
use bincode::Options;
use log::{debug, info, warn};
use rocksdb::{checkpoint::Checkpoint, ColumnFamily, Direction, IteratorMode, DB};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

mod batch;
mod tracker;

const SCHEMA_VERSION: u32 = 1;
const DB_DIR_NAME: &str = "config-tracker";

/// Edge value as persisted; `seq` orders edges across the whole store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct StoredEdge {
    pub seq: u64,
    pub edge: TransitionEdge,
}

pub struct RocksTracker {
    db: Arc<DB>,
    write_lock: Mutex<()>,
    context: WalletContext,
}

impl RocksTracker {
    pub fn open(path: impl AsRef<Path>, context: WalletContext) -> Result<Self, TrackerError> {
        Self::open_with_options(path, context, false)
    }

    pub fn open_with_options(path: impl AsRef<Path>, context: WalletContext, allow_schema_wipe: bool) -> Result<Self, TrackerError> {
        let path = path.as_ref();
        debug!("opening RocksTracker path={}", path.display());
        let db = open_db_with_cfs(path)?;
        let tracker = Self { db: Arc::new(db), write_lock: Mutex::new(()), context };
        if let Err(err) = tracker.maybe_run_migrations() {
            if allow_schema_wipe {
                if let TrackerError::SchemaMismatch { stored, current } = err {
                    warn!("schema mismatch (stored={}, current={}); wiping db path={}", stored, current, path.display());
                    drop(tracker);
                    if path.exists() {
                        fs::remove_dir_all(path).map_err(|err| storage_err!("fs::remove_dir_all schema_wipe", err))?;
                    }
                    return Self::open_with_options(path, context, false);
                }
            }
            return Err(err);
        }
        info!("RocksTracker opened path={}", path.display());
        Ok(tracker)
    }

    /// Opens (creating when needed) the tracker database inside `data_dir`.
    pub fn open_in_dir(data_dir: impl AsRef<Path>, context: WalletContext) -> Result<Self, TrackerError> {
        let dir = data_dir.as_ref();
        if dir.as_os_str().is_empty() {
            return Err(TrackerError::ConfigError("rocksdb data dir is empty".to_string()));
        }
        fs::create_dir_all(dir).map_err(|err| storage_err!("fs::create_dir_all open_in_dir", err))?;
        Self::open(dir.join(DB_DIR_NAME), context)
    }

    pub fn context(&self) -> &WalletContext {
        &self.context
    }

    pub fn create_checkpoint(&self, path: impl AsRef<Path>) -> Result<(), TrackerError> {
        let path = path.as_ref();
        info!("creating RocksTracker checkpoint path={}", path.display());
        if path.exists() {
            let mut entries = fs::read_dir(path).map_err(|err| storage_err!("fs::read_dir checkpoint", err))?;
            if entries.next().is_some() {
                return Err(TrackerError::StorageError {
                    operation: "rocksdb checkpoint".to_string(),
                    details: format!("checkpoint directory is not empty: {}", path.display()),
                });
            }
            fs::remove_dir_all(path).map_err(|err| storage_err!("fs::remove_dir_all checkpoint", err))?;
        }
        let checkpoint = Checkpoint::new(&self.db).map_err(|err| storage_err!("rocksdb::Checkpoint::new", err))?;
        checkpoint.create_checkpoint(path).map_err(|err| storage_err!("rocksdb::create_checkpoint", err))?;
        info!("checkpoint created path={}", path.display());
        Ok(())
    }

    pub fn compact(&self) -> Result<(), TrackerError> {
        debug!("rocksdb compact_range start");
        for name in [CF_CONFIG, CF_COUNTERFACTUAL, CF_SIGNER, CF_EDGE, CF_EDGE_ID] {
            let cf = self.cf_handle(name)?;
            self.db.compact_range_cf(cf, None::<&[u8]>, None::<&[u8]>);
        }
        debug!("rocksdb compact_range complete");
        Ok(())
    }

    fn cf_handle(&self, name: &str) -> Result<&ColumnFamily, TrackerError> {
        self.db.cf_handle(name).ok_or_else(|| TrackerError::StorageError {
            operation: "rocksdb cf_handle".to_string(),
            details: format!("missing column family: {}", name),
        })
    }

    fn maybe_run_migrations(&self) -> Result<(), TrackerError> {
        match self.schema_version()? {
            None => {
                info!("initializing fresh db schema schema_version={}", SCHEMA_VERSION);
                self.set_schema_version(SCHEMA_VERSION)?;
            }
            Some(v) if v == SCHEMA_VERSION => {}
            Some(v) => return Err(TrackerError::SchemaMismatch { stored: v, current: SCHEMA_VERSION }),
        }
        Ok(())
    }

    fn schema_version(&self) -> Result<Option<u32>, TrackerError> {
        let cf = self.cf_handle(CF_METADATA)?;
        match self.db.get_cf(cf, KEY_SCHEMA_VERSION) {
            Ok(Some(bytes)) => {
                let array: [u8; 4] = bytes.as_slice().try_into().map_err(|_| TrackerError::StorageError {
                    operation: "schema_version decode".to_string(),
                    details: "corrupt schema version".to_string(),
                })?;
                Ok(Some(u32::from_be_bytes(array)))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(storage_err!("rocksdb get_cf schema_version", e)),
        }
    }

    fn set_schema_version(&self, version: u32) -> Result<(), TrackerError> {
        let cf = self.cf_handle(CF_METADATA)?;
        self.db.put_cf(cf, KEY_SCHEMA_VERSION, version.to_be_bytes()).map_err(TrackerError::from)
    }

    fn next_edge_seq(&self) -> Result<u64, TrackerError> {
        let cf = self.cf_handle(CF_METADATA)?;
        match self.db.get_cf(cf, KEY_EDGE_SEQ).map_err(|err| storage_err!("rocksdb get_cf edge_seq", err))? {
            None => Ok(0),
            Some(bytes) => {
                let array: [u8; 8] =
                    bytes.as_slice().try_into().map_err(|_| storage_err!("edge_seq decode", "corrupt edge sequence"))?;
                Ok(u64::from_be_bytes(array))
            }
        }
    }

    fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, TrackerError> {
        bincode::DefaultOptions::new().with_fixint_encoding().serialize(value).map_err(|err| err.into())
    }

    fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, TrackerError> {
        bincode::DefaultOptions::new().with_fixint_encoding().deserialize(bytes).map_err(|err| err.into())
    }

    fn get_decoded<T: serde::de::DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>, TrackerError> {
        let cf = self.cf_handle(cf_name)?;
        match self.db.get_cf(cf, key).map_err(|err| storage_err!("rocksdb get_cf", err))? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Every edge of (wallet, chain) from one snapshot, ordered by insertion.
    fn snapshot_edges(&self, wallet: &Address, chain_id: ChainId) -> Result<Vec<TransitionEdge>, TrackerError> {
        let prefix = Self::key_edge_prefix(wallet, chain_id);
        let cf = self.cf_handle(CF_EDGE)?;
        let snapshot = self.db.snapshot();
        let mut stored = Vec::new();
        for item in snapshot.iterator_cf(cf, IteratorMode::From(&prefix, Direction::Forward)) {
            let (key, value) = item.map_err(|err| storage_err!("rocksdb iterator edge", err))?;
            if !key.starts_with(&prefix) {
                break;
            }
            stored.push(Self::decode::<StoredEdge>(&value)?);
        }
        stored.sort_by_key(|s| s.seq);
        Ok(stored.into_iter().map(|s| s.edge).collect())
    }

    fn key_config(image_hash: &ImageHash) -> Vec<u8> {
        KeyBuilder::with_capacity(PREFIX_CONFIG.len() + 32).prefix(PREFIX_CONFIG).hash32(image_hash.as_hash()).build()
    }

    fn key_counterfactual(context_id: &ContextId, wallet: &Address) -> Vec<u8> {
        KeyBuilder::with_capacity(PREFIX_COUNTERFACTUAL.len() + 32 + 20)
            .prefix(PREFIX_COUNTERFACTUAL)
            .hash32(context_id.as_hash())
            .address(wallet)
            .build()
    }

    fn key_signer_prefix(signer: &Address) -> Vec<u8> {
        KeyBuilder::with_capacity(PREFIX_SIGNER.len() + 20).prefix(PREFIX_SIGNER).address(signer).build()
    }

    fn key_signer(signer: &Address, wallet: &Address) -> Vec<u8> {
        KeyBuilder::with_capacity(PREFIX_SIGNER.len() + 40).prefix(PREFIX_SIGNER).address(signer).address(wallet).build()
    }

    fn key_edge_prefix(wallet: &Address, chain_id: ChainId) -> Vec<u8> {
        KeyBuilder::with_capacity(PREFIX_EDGE.len() + 20 + 8).prefix(PREFIX_EDGE).address(wallet).u64_be(chain_id).build()
    }

    fn key_edge(edge: &TransitionEdge, seq: u64) -> Vec<u8> {
        KeyBuilder::with_capacity(PREFIX_EDGE.len() + 20 + 8 + 32 + 8)
            .prefix(PREFIX_EDGE)
            .address(&edge.wallet)
            .u64_be(edge.chain_id)
            .hash32(edge.from_image_hash.as_hash())
            .u64_be(seq)
            .build()
    }

    fn key_edge_id(edge_id: &EdgeId) -> Vec<u8> {
        KeyBuilder::with_capacity(PREFIX_EDGE_ID.len() + 32).prefix(PREFIX_EDGE_ID).hash32(edge_id.as_hash()).build()
    }
}
