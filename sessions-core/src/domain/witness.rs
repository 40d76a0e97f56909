//! Signer index entries and the proofs backing them.

use crate::domain::signature::{recover_signers, subdigest, DecodedSignature};
use crate::foundation::{ChainId, Result};
use alloy::primitives::{Address, B256};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSignature {
    pub chain_id: ChainId,
    pub signature: Vec<u8>,
}

impl ChainSignature {
    pub fn new(chain_id: ChainId, signature: Vec<u8>) -> Self {
        Self { chain_id, signature }
    }
}

/// Evidence that `wallet` signed `digest`, recorded only to populate the signer index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Witness {
    pub wallet: Address,
    pub digest: B256,
    pub signatures: Vec<ChainSignature>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerProof {
    pub chain_id: ChainId,
    pub digest: B256,
    pub signature: Vec<u8>,
}

impl SignerProof {
    /// Re-derives every EOA signer the proof attests to for `wallet`.
    pub fn recover_signers(&self, wallet: &Address) -> Result<Vec<Address>> {
        let decoded = DecodedSignature::decode(&self.signature)?;
        recover_signers(&subdigest(self.chain_id, wallet, &self.digest), &decoded)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerWallet {
    pub wallet: Address,
    pub proof: SignerProof,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignerIndexEntry {
    pub signer: Address,
    pub entry: SignerWallet,
}

/// Index entries for every EOA behind `signature`, one per distinct signer.
pub fn signer_entries(wallet: &Address, digest: &B256, signature: &ChainSignature) -> Result<Vec<SignerIndexEntry>> {
    let proof = SignerProof { chain_id: signature.chain_id, digest: *digest, signature: signature.signature.clone() };
    let mut signers = proof.recover_signers(wallet)?;
    signers.sort();
    signers.dedup();
    Ok(signers
        .into_iter()
        .map(|signer| SignerIndexEntry { signer, entry: SignerWallet { wallet: *wallet, proof: proof.clone() } })
        .collect())
}

impl Witness {
    pub fn signer_entries(&self) -> Result<Vec<SignerIndexEntry>> {
        let mut entries = Vec::new();
        for signature in &self.signatures {
            entries.extend(signer_entries(&self.wallet, &self.digest, signature)?);
        }
        Ok(entries)
    }
}
