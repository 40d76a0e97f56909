//! ABI framing of `(uint256 nonce, Transaction[] txs)` bundles.

use crate::domain::transaction::abi::MetaTransaction;
use crate::foundation::{Result, TrackerError};
use alloy::primitives::{keccak256, B256, U256};
use alloy::sol_types::SolValue;

pub fn pack_bundle(nonce: U256, transactions: &[MetaTransaction]) -> Vec<u8> {
    (nonce, transactions.to_vec()).abi_encode_params()
}

/// Decodes a bundle, accepting only its canonical encoding.
pub fn unpack_bundle(bytes: &[u8]) -> Result<(U256, Vec<MetaTransaction>)> {
    let (nonce, transactions) = <(U256, Vec<MetaTransaction>)>::abi_decode_params(bytes)
        .map_err(|err| TrackerError::invalid_payload(format!("bundle does not decode: {err}")))?;
    if pack_bundle(nonce, &transactions) != bytes {
        return Err(TrackerError::invalid_payload("bundle is not canonically encoded"));
    }
    Ok((nonce, transactions))
}

pub fn bundle_digest(bytes: &[u8]) -> B256 {
    keccak256(bytes)
}
