//! Presigned configuration transitions and their strict payload validation.
//!
//! A transition bundle has exactly this shape, in order:
//!
//! ```text
//! [ wallet.updateImplementation(target) ]   only when an update target is present
//!   wallet.updateImageHash(new_image_hash)
//!   session_utils.requireSessionNonce(gap_nonce)   (delegate call)
//! ```
//!
//! every call with `revertOnError = true`, `value = 0` and `gasLimit = 0`, framed with the
//! sessions nonce. Anything else is rejected.

use crate::domain::config::WalletConfig;
use crate::domain::graph::TransitionEdge;
use crate::domain::signature::{recover_config, subdigest, DecodedSignature};
use crate::domain::transaction::{bundle_digest, decode_nonce, pack_bundle, sessions_nonce, unpack_bundle, MetaTransaction};
use crate::domain::witness::{signer_entries, ChainSignature, SignerIndexEntry};
use crate::foundation::{ChainId, GapNonce, ImageHash, Result, TrackerError};
use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionBody {
    pub wallet: Address,
    pub nonce: U256,
    pub gap_nonce: GapNonce,
    pub new_image_hash: ImageHash,
    pub update_target: Option<Address>,
    pub bundle: Vec<u8>,
}

impl TransitionBody {
    /// Builds the canonical update body, the only shape `validate` accepts.
    pub fn new_session_update(
        wallet: Address,
        new_image_hash: ImageHash,
        gap_nonce: GapNonce,
        update_target: Option<Address>,
        session_utils: Address,
    ) -> Self {
        let nonce = sessions_nonce();
        let transactions = expected_transactions(&wallet, &new_image_hash, gap_nonce, update_target.as_ref(), &session_utils);
        Self { wallet, nonce, gap_nonce, new_image_hash, update_target, bundle: pack_bundle(nonce, &transactions) }
    }

    pub fn digest(&self) -> B256 {
        bundle_digest(&self.bundle)
    }

    pub fn subdigest(&self, chain_id: ChainId) -> B256 {
        subdigest(chain_id, &self.wallet, &self.digest())
    }

    pub fn transactions(&self) -> Result<Vec<MetaTransaction>> {
        Ok(unpack_bundle(&self.bundle)?.1)
    }

    pub fn validate(&self, session_utils: &Address) -> Result<()> {
        check_sessions_nonce("body", self.nonce)?;
        let (bundle_nonce, transactions) = unpack_bundle(&self.bundle)?;
        check_sessions_nonce("bundle", bundle_nonce)?;

        let expected =
            expected_transactions(&self.wallet, &self.new_image_hash, self.gap_nonce, self.update_target.as_ref(), session_utils);
        if transactions.len() != expected.len() {
            return Err(TrackerError::invalid_payload(format!(
                "expected {} transactions, got {}",
                expected.len(),
                transactions.len()
            )));
        }
        for (index, (actual, wanted)) in transactions.iter().zip(expected.iter()).enumerate() {
            if let Some(field) = first_mismatch(actual, wanted) {
                return Err(TrackerError::invalid_payload(format!("transaction {index}: unexpected {field}")));
            }
        }
        Ok(())
    }
}

pub fn expected_transactions(
    wallet: &Address,
    new_image_hash: &ImageHash,
    gap_nonce: GapNonce,
    update_target: Option<&Address>,
    session_utils: &Address,
) -> Vec<MetaTransaction> {
    let mut transactions = Vec::with_capacity(3);
    if let Some(target) = update_target {
        transactions.push(MetaTransaction::update_implementation(*wallet, *target));
    }
    transactions.push(MetaTransaction::update_image_hash(*wallet, new_image_hash.to_b256()));
    transactions.push(MetaTransaction::require_session_nonce(*session_utils, U256::from(gap_nonce)));
    transactions
}

fn check_sessions_nonce(source: &str, nonce: U256) -> Result<()> {
    if nonce == sessions_nonce() {
        return Ok(());
    }
    let (space, sequence) = decode_nonce(nonce);
    Err(TrackerError::invalid_payload(format!(
        "{source} nonce is not the sessions nonce (space {:#x}, sequence {})",
        space, sequence
    )))
}

fn first_mismatch(actual: &MetaTransaction, expected: &MetaTransaction) -> Option<&'static str> {
    if actual.target != expected.target {
        Some("target")
    } else if actual.delegateCall != expected.delegateCall {
        Some("delegateCall")
    } else if actual.revertOnError != expected.revertOnError {
        Some("revertOnError")
    } else if actual.value != expected.value {
        Some("value")
    } else if actual.gasLimit != expected.gasLimit {
        Some("gasLimit")
    } else if actual.data != expected.data {
        Some("call data")
    } else {
        None
    }
}

/// A signed transition as submitted by a wallet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresignedConfiguration {
    /// Target configuration; its image hash must equal `body.new_image_hash`.
    pub config: WalletConfig,
    pub body: TransitionBody,
    pub signatures: Vec<ChainSignature>,
}

/// Everything a store must commit for one accepted transition.
#[derive(Clone, Debug, Default)]
pub struct PreparedTransition {
    pub edges: Vec<TransitionEdge>,
    pub configs: Vec<WalletConfig>,
    pub signers: Vec<SignerIndexEntry>,
}

impl PresignedConfiguration {
    /// Validates the payload and recovers every source configuration.
    ///
    /// Pure: nothing is written, so a failure anywhere leaves every store untouched.
    pub fn prepare(&self, session_utils: &Address) -> Result<PreparedTransition> {
        let body = &self.body;
        let target_hash = self.config.image_hash();
        if target_hash != body.new_image_hash {
            return Err(TrackerError::invalid_payload(format!(
                "config image hash {} does not match body image hash {}",
                target_hash, body.new_image_hash
            )));
        }
        if self.signatures.is_empty() {
            return Err(TrackerError::invalid_payload("no chain signatures"));
        }
        body.validate(session_utils)?;

        let digest = body.digest();
        let mut prepared = PreparedTransition { configs: vec![self.config.clone()], ..Default::default() };
        for signature in &self.signatures {
            let decoded = DecodedSignature::decode(&signature.signature)?;
            let recovered = recover_config(&subdigest(signature.chain_id, &body.wallet, &digest), &decoded)?;
            prepared.edges.push(TransitionEdge {
                wallet: body.wallet,
                chain_id: signature.chain_id,
                from_image_hash: recovered.config.image_hash(),
                to_image_hash: target_hash,
                gap_nonce: body.gap_nonce,
                update_target: body.update_target,
                bundle: body.bundle.clone(),
                signature: signature.signature.clone(),
            });
            prepared.signers.extend(signer_entries(&body.wallet, &digest, signature)?);
            if !prepared.configs.contains(&recovered.config) {
                prepared.configs.push(recovered.config);
            }
        }
        Ok(prepared)
    }
}
