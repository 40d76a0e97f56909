//! Wallet configurations and their content addresses.
//!
//! A configuration is a threshold plus weighted signers. Its image hash is the value the
//! on-chain wallet stores, so the layout here is fixed:
//!
//! ```text
//! acc = uint256(threshold)
//! for signer in sort_by(address, weight):
//!     acc = keccak256(abi.encode(bytes32 acc, uint8 weight, address signer))
//! ```

use crate::foundation::{ContextId, ImageHash, Result, TrackerError, CONTEXT_ID_DOMAIN, WALLET_CREATION_CODE};
use alloy::primitives::{keccak256, Address, B256, U256};
use alloy::sol_types::SolValue;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConfigSigner {
    pub weight: u8,
    pub address: Address,
}

impl ConfigSigner {
    pub fn new(weight: u8, address: Address) -> Self {
        Self { weight, address }
    }

    fn sort_key(&self) -> (Address, u8) {
        (self.address, self.weight)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletConfig {
    pub threshold: u16,
    pub signers: Vec<ConfigSigner>,
}

impl WalletConfig {
    pub fn new(threshold: u16, signers: Vec<ConfigSigner>) -> Result<Self> {
        if signers.is_empty() {
            return Err(TrackerError::ConfigError("wallet config requires at least one signer".to_string()));
        }
        Ok(Self { threshold, signers })
    }

    /// Signers in canonical hashing order. Duplicates are kept.
    pub fn sorted_signers(&self) -> Vec<ConfigSigner> {
        let mut signers = self.signers.clone();
        signers.sort_by_key(ConfigSigner::sort_key);
        signers
    }

    pub fn image_hash(&self) -> ImageHash {
        let mut acc = B256::from(U256::from(self.threshold).to_be_bytes::<32>());
        for signer in self.sorted_signers() {
            acc = keccak256((acc, U256::from(signer.weight), signer.address).abi_encode());
        }
        ImageHash::from(acc)
    }

    pub fn total_weight(&self) -> u32 {
        self.signers.iter().map(|s| u32::from(s.weight)).sum()
    }

    pub fn contains_signer(&self, address: &Address) -> bool {
        self.signers.iter().any(|s| &s.address == address)
    }

    /// Address a nested part contributes when this configuration signs as a signer.
    pub fn as_signer_address(&self) -> Address {
        Address::from_word(self.image_hash().to_b256())
    }
}

/// Deployment parameters shared by every wallet of one deployment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WalletContext {
    pub factory: Address,
    pub main_module: Address,
    pub session_utils: Address,
}

impl WalletContext {
    /// Stable identity of the address derivation inputs.
    ///
    /// `session_utils` does not participate: it has no effect on counterfactual addresses.
    pub fn id(&self) -> ContextId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(CONTEXT_ID_DOMAIN);
        hasher.update(self.factory.as_slice());
        hasher.update(self.main_module.as_slice());
        ContextId::new(*hasher.finalize().as_bytes())
    }

    pub fn counterfactual_address(&self, image_hash: &ImageHash) -> Address {
        counterfactual_address(image_hash, self)
    }
}

/// CREATE2 address of the wallet whose initial configuration is `image_hash`.
pub fn counterfactual_address(image_hash: &ImageHash, context: &WalletContext) -> Address {
    let mut init_code = Vec::with_capacity(WALLET_CREATION_CODE.len() + 32);
    init_code.extend_from_slice(&WALLET_CREATION_CODE);
    init_code.extend_from_slice(context.main_module.into_word().as_slice());
    context.factory.create2(image_hash.to_b256(), keccak256(&init_code))
}
