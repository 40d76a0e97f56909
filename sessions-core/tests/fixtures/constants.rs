#![allow(dead_code)]

use alloy::primitives::Address;
use sessions_core::domain::WalletContext;
use sessions_core::foundation::{ChainId, GapNonce};

pub const TEST_CHAIN_ID: ChainId = 1;
pub const TEST_OTHER_CHAIN_ID: ChainId = 137;
pub const TEST_GAP_NONCE: GapNonce = 1_700_000_000;

pub fn test_context() -> WalletContext {
    WalletContext {
        factory: Address::repeat_byte(0xfa),
        main_module: Address::repeat_byte(0xba),
        session_utils: Address::repeat_byte(0x5e),
    }
}

pub fn test_wallet() -> Address {
    Address::repeat_byte(0xaa)
}

pub fn test_implementation() -> Address {
    Address::repeat_byte(0x1e)
}
