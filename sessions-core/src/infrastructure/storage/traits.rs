use crate::domain::{
    PresignedConfigQuery, PresignedConfigUpdate, PresignedConfiguration, SignerWallet, TransitionEdge, WalletConfig, WalletContext, Witness,
};
use crate::foundation::{ChainId, ImageHash, Result};
use alloy::primitives::Address;
use async_trait::async_trait;

/// Store of wallet configurations and their presigned transition history.
///
/// Every write is atomic: it either commits completely or leaves the store untouched.
/// Misses are `Ok(None)` or an empty list, never an error.
#[async_trait]
pub trait ConfigTracker: Send + Sync {
    /// Idempotent upsert keyed by image hash.
    async fn save_wallet_config(&self, config: &WalletConfig) -> Result<()>;
    async fn config_of_image_hash(&self, image_hash: &ImageHash) -> Result<Option<WalletConfig>>;

    /// Records the counterfactual address of `image_hash` under `context`.
    async fn save_counterfactual_wallet(&self, image_hash: &ImageHash, context: &WalletContext) -> Result<()>;
    async fn image_hash_of_counterfactual_wallet(&self, context: &WalletContext, wallet: &Address) -> Result<Option<ImageHash>>;

    /// Indexes every signer behind the witness signatures.
    async fn save_witness(&self, witness: &Witness) -> Result<()>;
    /// Wallets `signer` has signed for, one proof per wallet.
    async fn wallets_of_signer(&self, signer: &Address) -> Result<Vec<SignerWallet>>;

    /// Validates and records one transition edge per chain signature.
    async fn save_presigned_configuration(&self, presigned: &PresignedConfiguration) -> Result<()>;
    /// Best route from `query.from_image_hash`, evaluated on a consistent snapshot.
    async fn load_presigned_configuration(&self, query: &PresignedConfigQuery) -> Result<Vec<PresignedConfigUpdate>>;

    /// Every edge of `(wallet, chain_id)` in insertion order.
    async fn transition_edges(&self, wallet: &Address, chain_id: ChainId) -> Result<Vec<TransitionEdge>>;

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    /// Waits for writes still running in the background. Trackers that finish every write
    /// before returning have nothing to wait for.
    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}
