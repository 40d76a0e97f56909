use crate::foundation::{ChainId, ETH_SIGN_PREFIX, SUBDIGEST_PREFIX};
use alloy::primitives::{keccak256, Address, B256, U256};

/// Digest a wallet signs for `digest` on `chain_id`.
///
/// `keccak256("\x19\x01" || uint256(chain_id) || wallet || digest)`
pub fn subdigest(chain_id: ChainId, wallet: &Address, digest: &B256) -> B256 {
    let mut buf = Vec::with_capacity(2 + 32 + 20 + 32);
    buf.extend_from_slice(SUBDIGEST_PREFIX);
    buf.extend_from_slice(&U256::from(chain_id).to_be_bytes::<32>());
    buf.extend_from_slice(wallet.as_slice());
    buf.extend_from_slice(digest.as_slice());
    keccak256(buf)
}

/// `eth_sign` wrapping of a 32-byte digest.
pub fn eth_sign_digest(digest: &B256) -> B256 {
    let mut buf = Vec::with_capacity(ETH_SIGN_PREFIX.len() + 32);
    buf.extend_from_slice(ETH_SIGN_PREFIX);
    buf.extend_from_slice(digest.as_slice());
    keccak256(buf)
}
