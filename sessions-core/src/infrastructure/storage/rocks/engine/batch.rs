use super::{RocksTracker, StoredEdge};
use crate::domain::{SignerIndexEntry, TransitionEdge, WalletConfig};
use crate::foundation::TrackerError;
use crate::infrastructure::storage::rocks::schema::*;
use crate::storage_err;
use log::trace;
use rocksdb::WriteBatch;
use std::collections::HashSet;

/// Writes staged for one atomic commit. Must only be used while holding `write_lock`.
pub(super) struct TrackerBatch<'a> {
    tracker: &'a RocksTracker,
    batch: WriteBatch,
    staged: HashSet<(&'static str, Vec<u8>)>,
    next_seq: Option<u64>,
}

impl<'a> TrackerBatch<'a> {
    pub(super) fn new(tracker: &'a RocksTracker) -> Self {
        Self { tracker, batch: WriteBatch::default(), staged: HashSet::new(), next_seq: None }
    }

    fn exists(&self, cf_name: &'static str, key: &[u8]) -> Result<bool, TrackerError> {
        if self.staged.contains(&(cf_name, key.to_vec())) {
            return Ok(true);
        }
        let cf = self.tracker.cf_handle(cf_name)?;
        Ok(self.tracker.db.get_pinned_cf(cf, key).map_err(|err| storage_err!("rocksdb get_pinned_cf", err))?.is_some())
    }

    fn put(&mut self, cf_name: &'static str, key: Vec<u8>, value: &[u8]) -> Result<(), TrackerError> {
        let cf = self.tracker.cf_handle(cf_name)?;
        self.batch.put_cf(cf, &key, value);
        self.staged.insert((cf_name, key));
        Ok(())
    }

    /// Returns `false` when `key` is already stored or staged.
    fn put_if_absent(&mut self, cf_name: &'static str, key: Vec<u8>, value: &[u8]) -> Result<bool, TrackerError> {
        if self.exists(cf_name, &key)? {
            return Ok(false);
        }
        self.put(cf_name, key, value)?;
        Ok(true)
    }

    pub(super) fn put_config(&mut self, config: &WalletConfig) -> Result<(), TrackerError> {
        let key = RocksTracker::key_config(&config.image_hash());
        let value = RocksTracker::encode(config)?;
        self.put_if_absent(CF_CONFIG, key, &value)?;
        Ok(())
    }

    pub(super) fn put_signer(&mut self, entry: &SignerIndexEntry) -> Result<bool, TrackerError> {
        let key = RocksTracker::key_signer(&entry.signer, &entry.entry.wallet);
        let value = RocksTracker::encode(&entry.entry.proof)?;
        self.put_if_absent(CF_SIGNER, key, &value)
    }

    /// Returns `false` for an edge already in the store.
    pub(super) fn put_edge(&mut self, edge: TransitionEdge) -> Result<bool, TrackerError> {
        let edge_id = edge.id();
        let id_key = RocksTracker::key_edge_id(&edge_id);
        if self.exists(CF_EDGE_ID, &id_key)? {
            trace!("edge already stored edge_id={:#x}", edge_id);
            return Ok(false);
        }
        let seq = match self.next_seq {
            Some(seq) => seq,
            None => self.tracker.next_edge_seq()?,
        };
        self.next_seq = Some(seq + 1);

        self.put(CF_EDGE_ID, id_key, &seq.to_be_bytes())?;
        let key = RocksTracker::key_edge(&edge, seq);
        let value = RocksTracker::encode(&StoredEdge { seq, edge })?;
        self.put(CF_EDGE, key, &value)?;
        Ok(true)
    }

    pub(super) fn commit(mut self) -> Result<(), TrackerError> {
        if let Some(next_seq) = self.next_seq {
            let cf = self.tracker.cf_handle(CF_METADATA)?;
            self.batch.put_cf(cf, KEY_EDGE_SEQ, next_seq.to_be_bytes());
        }
        if self.batch.is_empty() {
            return Ok(());
        }
        self.tracker.db.write(self.batch).map_err(|err| storage_err!("rocksdb write batch", err))
    }
}
