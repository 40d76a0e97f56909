#![allow(non_camel_case_types)]

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;

alloy::sol! {
    #[derive(Debug, PartialEq, Eq)]
    struct MetaTransaction {
        bool delegateCall;
        bool revertOnError;
        uint256 gasLimit;
        address target;
        uint256 value;
        bytes data;
    }

    function updateImplementation(address implementation);
    function updateImageHash(bytes32 imageHash);
    function requireSessionNonce(uint256 nonce);
}

impl MetaTransaction {
    /// Plain call that reverts the bundle on failure and forwards all gas.
    pub fn call(target: Address, data: Vec<u8>) -> Self {
        Self { delegateCall: false, revertOnError: true, gasLimit: U256::ZERO, target, value: U256::ZERO, data: Bytes::from(data) }
    }

    /// Same as [`MetaTransaction::call`] but executed in the wallet's own context.
    pub fn delegate_call(target: Address, data: Vec<u8>) -> Self {
        Self { delegateCall: true, ..Self::call(target, data) }
    }

    pub fn update_implementation(wallet: Address, implementation: Address) -> Self {
        Self::call(wallet, updateImplementationCall { implementation }.abi_encode())
    }

    pub fn update_image_hash(wallet: Address, image_hash: alloy::primitives::B256) -> Self {
        Self::call(wallet, updateImageHashCall { imageHash: image_hash }.abi_encode())
    }

    pub fn require_session_nonce(session_utils: Address, nonce: U256) -> Self {
        Self::delegate_call(session_utils, requireSessionNonceCall { nonce }.abi_encode())
    }
}
