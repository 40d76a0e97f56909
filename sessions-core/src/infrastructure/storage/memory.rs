use crate::domain::{
    route_updates, PresignedConfigQuery, PresignedConfigUpdate, PresignedConfiguration, SignerIndexEntry, SignerProof, SignerWallet,
    TransitionEdge, TransitionGraph, WalletConfig, WalletContext, Witness,
};
use crate::foundation::{ChainId, ContextId, ImageHash, TrackerError};
use crate::infrastructure::storage::ConfigTracker;
use alloy::primitives::Address;
use async_trait::async_trait;
use log::{debug, trace};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct MemoryInner {
    config: HashMap<ImageHash, WalletConfig>,
    counterfactual: HashMap<(ContextId, Address), ImageHash>,
    signer: HashMap<Address, BTreeMap<Address, SignerProof>>,
    graph: HashMap<(Address, ChainId), TransitionGraph>,
}

impl MemoryInner {
    fn index_signers(&mut self, entries: Vec<SignerIndexEntry>) {
        for SignerIndexEntry { signer, entry } in entries {
            self.signer.entry(signer).or_default().entry(entry.wallet).or_insert(entry.proof);
        }
    }
}

/// In-process tracker. A route walk holds the read guard for its whole duration.
#[derive(Clone)]
pub struct MemoryTracker {
    inner: Arc<RwLock<MemoryInner>>,
    context: WalletContext,
}

impl MemoryTracker {
    pub fn new(context: WalletContext) -> Self {
        Self { inner: Arc::new(RwLock::new(MemoryInner::default())), context }
    }

    pub fn context(&self) -> &WalletContext {
        &self.context
    }

    fn read_inner(&self) -> Result<RwLockReadGuard<'_, MemoryInner>, TrackerError> {
        self.inner
            .read()
            .map_err(|_| TrackerError::StorageError { operation: "memory tracker read lock".to_string(), details: "poisoned".to_string() })
    }

    fn write_inner(&self) -> Result<RwLockWriteGuard<'_, MemoryInner>, TrackerError> {
        self.inner
            .write()
            .map_err(|_| TrackerError::StorageError { operation: "memory tracker write lock".to_string(), details: "poisoned".to_string() })
    }
}

#[async_trait]
impl ConfigTracker for MemoryTracker {
    async fn save_wallet_config(&self, config: &WalletConfig) -> Result<(), TrackerError> {
        let image_hash = config.image_hash();
        trace!("save_wallet_config image_hash={:#x}", image_hash);
        self.write_inner()?.config.entry(image_hash).or_insert_with(|| config.clone());
        Ok(())
    }

    async fn config_of_image_hash(&self, image_hash: &ImageHash) -> Result<Option<WalletConfig>, TrackerError> {
        Ok(self.read_inner()?.config.get(image_hash).cloned())
    }

    async fn save_counterfactual_wallet(&self, image_hash: &ImageHash, context: &WalletContext) -> Result<(), TrackerError> {
        let wallet = context.counterfactual_address(image_hash);
        debug!("save_counterfactual_wallet wallet={} image_hash={:#x}", wallet, image_hash);
        self.write_inner()?.counterfactual.insert((context.id(), wallet), *image_hash);
        Ok(())
    }

    async fn image_hash_of_counterfactual_wallet(
        &self,
        context: &WalletContext,
        wallet: &Address,
    ) -> Result<Option<ImageHash>, TrackerError> {
        Ok(self.read_inner()?.counterfactual.get(&(context.id(), *wallet)).copied())
    }

    async fn save_witness(&self, witness: &Witness) -> Result<(), TrackerError> {
        let entries = witness.signer_entries()?;
        debug!("save_witness wallet={} digest={} signers={}", witness.wallet, witness.digest, entries.len());
        self.write_inner()?.index_signers(entries);
        Ok(())
    }

    async fn wallets_of_signer(&self, signer: &Address) -> Result<Vec<SignerWallet>, TrackerError> {
        let inner = self.read_inner()?;
        let Some(wallets) = inner.signer.get(signer) else {
            return Ok(Vec::new());
        };
        Ok(wallets.iter().map(|(wallet, proof)| SignerWallet { wallet: *wallet, proof: proof.clone() }).collect())
    }

    async fn save_presigned_configuration(&self, presigned: &PresignedConfiguration) -> Result<(), TrackerError> {
        let prepared = presigned.prepare(&self.context.session_utils)?;
        let mut inner = self.write_inner()?;
        let mut inserted = 0usize;
        for edge in prepared.edges {
            let key = (edge.wallet, edge.chain_id);
            if inner.graph.entry(key).or_default().insert(edge) {
                inserted += 1;
            }
        }
        for config in prepared.configs {
            inner.config.entry(config.image_hash()).or_insert(config);
        }
        inner.index_signers(prepared.signers);
        debug!(
            "save_presigned_configuration wallet={} to={:#x} gap_nonce={} inserted_edges={}",
            presigned.body.wallet, presigned.body.new_image_hash, presigned.body.gap_nonce, inserted
        );
        Ok(())
    }

    async fn load_presigned_configuration(&self, query: &PresignedConfigQuery) -> Result<Vec<PresignedConfigUpdate>, TrackerError> {
        let inner = self.read_inner()?;
        let Some(graph) = inner.graph.get(&(query.wallet, query.chain_id)) else {
            return Ok(Vec::new());
        };
        let updates = route_updates(graph, query);
        trace!("load_presigned_configuration wallet={} chain_id={} hops={}", query.wallet, query.chain_id, updates.len());
        Ok(updates)
    }

    async fn transition_edges(&self, wallet: &Address, chain_id: ChainId) -> Result<Vec<TransitionEdge>, TrackerError> {
        let inner = self.read_inner()?;
        let Some(graph) = inner.graph.get(&(*wallet, chain_id)) else {
            return Ok(Vec::new());
        };
        Ok(graph.edges().to_vec())
    }

    async fn health_check(&self) -> Result<(), TrackerError> {
        self.read_inner().map(|_| ())
    }
}
