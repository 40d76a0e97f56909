use crate::foundation::Hash32;
use alloy::primitives::Address;

/// Helper to build storage keys consistently.
pub struct KeyBuilder {
    buf: Vec<u8>,
}

impl KeyBuilder {
    pub fn with_capacity(cap: usize) -> Self {
        Self { buf: Vec::with_capacity(cap) }
    }

    pub fn prefix(mut self, prefix: &[u8]) -> Self {
        self.buf.extend_from_slice(prefix);
        self
    }

    pub fn hash32(mut self, hash: &Hash32) -> Self {
        self.buf.extend_from_slice(hash);
        self
    }

    pub fn address(mut self, address: &Address) -> Self {
        self.buf.extend_from_slice(address.as_slice());
        self
    }

    pub fn u64_be(mut self, value: u64) -> Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

pub const CF_DEFAULT: &str = "default";
pub const CF_METADATA: &str = "metadata";
pub const CF_CONFIG: &str = "config";
pub const CF_COUNTERFACTUAL: &str = "counterfactual";
pub const CF_SIGNER: &str = "signer";
pub const CF_EDGE: &str = "edge";
pub const CF_EDGE_ID: &str = "edge_id";

pub const KEY_SCHEMA_VERSION: &[u8] = b"schema_version";
pub const KEY_EDGE_SEQ: &[u8] = b"edge_seq";

pub const PREFIX_CONFIG: &[u8] = b"cfg:";
pub const PREFIX_COUNTERFACTUAL: &[u8] = b"cf:";
pub const PREFIX_SIGNER: &[u8] = b"sig:";
pub const PREFIX_EDGE: &[u8] = b"edge:";
pub const PREFIX_EDGE_ID: &[u8] = b"eid:";
