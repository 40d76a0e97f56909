//! Recovery of the configuration implied by a signature.
//!
//! Recovery never checks weights against the threshold. Callers decide whether the
//! recovered weight is enough.

use crate::domain::config::{ConfigSigner, WalletConfig};
use crate::domain::signature::codec::{DecodedSignature, SignatureKind, SignaturePart};
use crate::domain::signature::digest::eth_sign_digest;
use crate::foundation::{Result, TrackerError, ECDSA_SIGNATURE_SIZE};
use alloy::primitives::{Address, B256};
use once_cell::sync::Lazy;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, Secp256k1, VerifyOnly};

static SECP: Lazy<Secp256k1<VerifyOnly>> = Lazy::new(Secp256k1::verification_only);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecoveredConfig {
    /// Signers in signature order, with the declared threshold.
    pub config: WalletConfig,
    /// Summed weight of the parts that actually signed.
    pub weight: u32,
}

impl RecoveredConfig {
    pub fn meets_threshold(&self) -> bool {
        self.weight >= u32::from(self.config.threshold)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecoveredPart {
    pub signer: Address,
    pub weight: u8,
    pub signed: bool,
}

pub fn recover_config(digest: &B256, signature: &DecodedSignature) -> Result<RecoveredConfig> {
    recover_parts(digest, signature.threshold, &signature.parts)
}

pub fn recover_config_part(digest: &B256, part: &SignaturePart) -> Result<RecoveredPart> {
    recover_part_at(digest, 0, part)
}

/// Every EOA that signed, nested signers included, in signature order.
pub fn recover_signers(digest: &B256, signature: &DecodedSignature) -> Result<Vec<Address>> {
    let mut signers = Vec::new();
    collect_signers(digest, &signature.parts, &mut signers)?;
    Ok(signers)
}

/// Address behind a raw `r || s || v` signature over `digest`.
pub fn recover_eoa(digest: &B256, signature: &[u8; ECDSA_SIGNATURE_SIZE], kind: SignatureKind) -> Result<Address> {
    let signed_digest = match kind {
        SignatureKind::Eip712 => *digest,
        SignatureKind::EthSign => eth_sign_digest(digest),
    };
    let v = signature[64];
    let rec_id = match v {
        27 | 28 => v - 27,
        0 | 1 => v,
        v => {
            return Err(TrackerError::CryptoError {
                operation: "recover_eoa".to_string(),
                details: format!("invalid recovery id: {} (expected 0, 1, 27, or 28)", v),
            })
        }
    };
    let rid = RecoveryId::from_i32(i32::from(rec_id))?;
    let rec_sig = RecoverableSignature::from_compact(&signature[..64], rid)?;
    let msg = Message::from_digest(signed_digest.0);
    let pubkey = SECP.recover_ecdsa(&msg, &rec_sig)?;
    Ok(Address::from_raw_public_key(&pubkey.serialize_uncompressed()[1..]))
}

/// `recover_eoa` for the part at `index`, reported as an invalid part on failure.
fn recover_eoa_part(digest: &B256, index: usize, signature: &[u8; ECDSA_SIGNATURE_SIZE], kind: SignatureKind) -> Result<Address> {
    recover_eoa(digest, signature, kind).map_err(|err| TrackerError::invalid_part(index, err.to_string()))
}

fn recover_parts(digest: &B256, threshold: u16, parts: &[SignaturePart]) -> Result<RecoveredConfig> {
    let mut signers = Vec::with_capacity(parts.len());
    let mut weight = 0u32;
    for (index, part) in parts.iter().enumerate() {
        let recovered = recover_part_at(digest, index, part)?;
        if recovered.signed {
            weight += u32::from(recovered.weight);
        }
        signers.push(ConfigSigner::new(recovered.weight, recovered.signer));
    }
    let config = WalletConfig::new(threshold, signers).map_err(|_| TrackerError::malformed("signature has no parts"))?;
    Ok(RecoveredConfig { config, weight })
}

fn recover_part_at(digest: &B256, index: usize, part: &SignaturePart) -> Result<RecoveredPart> {
    match part {
        SignaturePart::Address { weight, address } => Ok(RecoveredPart { signer: *address, weight: *weight, signed: false }),
        SignaturePart::Eoa { weight, signature, kind } => {
            let signer = recover_eoa_part(digest, index, signature, *kind)?;
            Ok(RecoveredPart { signer, weight: *weight, signed: true })
        }
        SignaturePart::Erc1271 { weight, address, .. } => Ok(RecoveredPart { signer: *address, weight: *weight, signed: true }),
        SignaturePart::Nested { weight, threshold, parts } => {
            let nested = recover_parts(digest, *threshold, parts).map_err(|err| match err {
                TrackerError::InvalidSignaturePart { index: inner, details } => {
                    TrackerError::invalid_part(index, format!("nested part {inner}: {details}"))
                }
                other => other,
            })?;
            Ok(RecoveredPart { signer: nested.config.as_signer_address(), weight: *weight, signed: nested.meets_threshold() })
        }
    }
}

fn collect_signers(digest: &B256, parts: &[SignaturePart], out: &mut Vec<Address>) -> Result<()> {
    for (index, part) in parts.iter().enumerate() {
        match part {
            SignaturePart::Eoa { signature, kind, .. } => {
                let signer = recover_eoa_part(digest, index, signature, *kind)?;
                out.push(signer);
            }
            SignaturePart::Nested { parts, .. } => collect_signers(digest, parts, out)?,
            SignaturePart::Address { .. } | SignaturePart::Erc1271 { .. } => {}
        }
    }
    Ok(())
}
