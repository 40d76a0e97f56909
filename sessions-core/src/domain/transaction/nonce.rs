use crate::foundation::{NONCE_SPACE_SHIFT, SESSIONS_NONCE_SPACE};
use alloy::primitives::U256;

/// `(space << 96) | nonce`
pub fn encode_nonce(space: U256, nonce: U256) -> U256 {
    (space << NONCE_SPACE_SHIFT) | (nonce & nonce_mask())
}

pub fn decode_nonce(raw: U256) -> (U256, U256) {
    (raw >> NONCE_SPACE_SHIFT, raw & nonce_mask())
}

/// The only nonce a configuration-update bundle may carry.
pub fn sessions_nonce() -> U256 {
    encode_nonce(U256::from_be_slice(&SESSIONS_NONCE_SPACE), U256::ZERO)
}

fn nonce_mask() -> U256 {
    (U256::from(1u8) << NONCE_SPACE_SHIFT) - U256::from(1u8)
}
