use super::batch::TrackerBatch;
use super::RocksTracker;
use crate::domain::{
    route_updates, PresignedConfigQuery, PresignedConfigUpdate, PresignedConfiguration, SignerProof, SignerWallet, TransitionEdge,
    TransitionGraph, WalletConfig, WalletContext, Witness,
};
use crate::foundation::{ChainId, ImageHash, TrackerError};
use crate::infrastructure::storage::rocks::schema::*;
use crate::infrastructure::storage::rocks::util::acquire_with_timeout;
use crate::infrastructure::storage::ConfigTracker;
use crate::storage_err;
use alloy::primitives::Address;
use async_trait::async_trait;
use log::{debug, trace};
use rocksdb::{Direction, IteratorMode};

#[async_trait]
impl ConfigTracker for RocksTracker {
    async fn save_wallet_config(&self, config: &WalletConfig) -> Result<(), TrackerError> {
        trace!("save_wallet_config image_hash={:#x}", config.image_hash());
        let _guard = acquire_with_timeout(&self.write_lock, "save_wallet_config").await?;
        let mut batch = TrackerBatch::new(self);
        batch.put_config(config)?;
        batch.commit()
    }

    async fn config_of_image_hash(&self, image_hash: &ImageHash) -> Result<Option<WalletConfig>, TrackerError> {
        trace!("config_of_image_hash image_hash={:#x}", image_hash);
        self.get_decoded(CF_CONFIG, &Self::key_config(image_hash))
    }

    async fn save_counterfactual_wallet(&self, image_hash: &ImageHash, context: &WalletContext) -> Result<(), TrackerError> {
        let wallet = context.counterfactual_address(image_hash);
        debug!("save_counterfactual_wallet wallet={} image_hash={:#x}", wallet, image_hash);
        let key = Self::key_counterfactual(&context.id(), &wallet);
        let cf = self.cf_handle(CF_COUNTERFACTUAL)?;
        self.db.put_cf(cf, key, image_hash.as_hash()).map_err(|err| storage_err!("rocksdb put_cf counterfactual", err))
    }

    async fn image_hash_of_counterfactual_wallet(
        &self,
        context: &WalletContext,
        wallet: &Address,
    ) -> Result<Option<ImageHash>, TrackerError> {
        let key = Self::key_counterfactual(&context.id(), wallet);
        let cf = self.cf_handle(CF_COUNTERFACTUAL)?;
        match self.db.get_cf(cf, key).map_err(|err| storage_err!("rocksdb get_cf counterfactual", err))? {
            None => Ok(None),
            Some(bytes) => {
                let array: [u8; 32] =
                    bytes.as_slice().try_into().map_err(|_| storage_err!("decode counterfactual image_hash", "corrupt value"))?;
                Ok(Some(ImageHash::from(array)))
            }
        }
    }

    async fn save_witness(&self, witness: &Witness) -> Result<(), TrackerError> {
        let entries = witness.signer_entries()?;
        let _guard = acquire_with_timeout(&self.write_lock, "save_witness").await?;
        let mut batch = TrackerBatch::new(self);
        let mut indexed = 0usize;
        for entry in &entries {
            if batch.put_signer(entry)? {
                indexed += 1;
            }
        }
        batch.commit()?;
        debug!("save_witness wallet={} digest={} signers={} indexed={}", witness.wallet, witness.digest, entries.len(), indexed);
        Ok(())
    }

    async fn wallets_of_signer(&self, signer: &Address) -> Result<Vec<SignerWallet>, TrackerError> {
        let prefix = Self::key_signer_prefix(signer);
        let cf = self.cf_handle(CF_SIGNER)?;
        let mut wallets = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::From(&prefix, Direction::Forward)) {
            let (key, value) = item.map_err(|err| storage_err!("rocksdb iterator signer", err))?;
            if !key.starts_with(&prefix) {
                break;
            }
            let wallet_bytes = &key[prefix.len()..];
            if wallet_bytes.len() != 20 {
                return Err(storage_err!("decode signer key", "corrupt wallet address"));
            }
            let proof: SignerProof = Self::decode(&value)?;
            wallets.push(SignerWallet { wallet: Address::from_slice(wallet_bytes), proof });
        }
        Ok(wallets)
    }

    async fn save_presigned_configuration(&self, presigned: &PresignedConfiguration) -> Result<(), TrackerError> {
        let prepared = presigned.prepare(&self.context.session_utils)?;
        let _guard = acquire_with_timeout(&self.write_lock, "save_presigned_configuration").await?;
        let mut batch = TrackerBatch::new(self);
        let mut inserted = 0usize;
        for edge in prepared.edges {
            if batch.put_edge(edge)? {
                inserted += 1;
            }
        }
        for config in &prepared.configs {
            batch.put_config(config)?;
        }
        for entry in &prepared.signers {
            batch.put_signer(entry)?;
        }
        batch.commit()?;
        debug!(
            "save_presigned_configuration wallet={} to={:#x} gap_nonce={} inserted_edges={}",
            presigned.body.wallet, presigned.body.new_image_hash, presigned.body.gap_nonce, inserted
        );
        Ok(())
    }

    async fn load_presigned_configuration(&self, query: &PresignedConfigQuery) -> Result<Vec<PresignedConfigUpdate>, TrackerError> {
        let graph: TransitionGraph = self.snapshot_edges(&query.wallet, query.chain_id)?.into_iter().collect();
        let updates = route_updates(&graph, query);
        trace!(
            "load_presigned_configuration wallet={} chain_id={} edges={} hops={}",
            query.wallet,
            query.chain_id,
            graph.len(),
            updates.len()
        );
        Ok(updates)
    }

    async fn transition_edges(&self, wallet: &Address, chain_id: ChainId) -> Result<Vec<TransitionEdge>, TrackerError> {
        self.snapshot_edges(wallet, chain_id)
    }

    async fn health_check(&self) -> Result<(), TrackerError> {
        self.schema_version()?;
        Ok(())
    }
}
