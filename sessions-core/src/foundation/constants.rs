//! Protocol and storage constants for the configuration tracker.

/// Size of a keccak/blake3 digest in bytes.
pub const HASH_SIZE: usize = 32;

/// Size of an Ethereum address in bytes.
pub const ADDRESS_SIZE: usize = 20;

/// Size of an `r || s || v` ECDSA signature.
pub const ECDSA_SIGNATURE_SIZE: usize = 65;

/// Maximum nesting depth of signature parts.
///
/// A nested part at depth `MAX_SIGNATURE_DEPTH` is rejected by both decode and encode.
pub const MAX_SIGNATURE_DEPTH: usize = 8;

/// Largest body a nested part can carry (`u24` length prefix).
pub const MAX_NESTED_PART_LEN: usize = 0x00ff_ffff;

/// Largest ERC-1271 signature a dynamic part can carry (`u16` length prefix).
pub const MAX_DYNAMIC_SIGNATURE_LEN: usize = u16::MAX as usize;

/// Nonce space reserved for session configuration updates (160-bit).
pub const SESSIONS_NONCE_SPACE: [u8; ADDRESS_SIZE] = [
    0x96, 0xf7, 0xfe, 0xf0, 0x4d, 0x24, 0x78, 0xe2, 0xb0, 0x11, 0xc3, 0xac, 0xa7, 0x9d, 0xc5, 0xa8, 0x3b, 0x5d, 0x39, 0x01,
];

/// Bit offset of the nonce space inside an encoded nonce.
pub const NONCE_SPACE_SHIFT: usize = 96;

/// Init code of the minimal wallet proxy deployed by the factory.
pub const WALLET_CREATION_CODE: [u8; 40] = [
    0x60, 0x3a, 0x60, 0x0e, 0x3d, 0x39, 0x60, 0x1a, 0x80, 0x51, 0x30, 0x55, 0x3d, 0xf3, 0x36, 0x3d, 0x3d, 0x37, 0x3d, 0x3d,
    0x3d, 0x36, 0x3d, 0x30, 0x54, 0x5a, 0xf4, 0x3d, 0x82, 0x80, 0x3e, 0x90, 0x3d, 0x91, 0x60, 0x18, 0x57, 0xfd, 0x5b, 0xf3,
];

/// Prefix of the EIP-712 style subdigest.
pub const SUBDIGEST_PREFIX: &[u8; 2] = b"\x19\x01";

/// Prefix applied to 32-byte digests by `eth_sign`.
pub const ETH_SIGN_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Seconds to wait for a storage write lock before giving up.
pub const STORAGE_LOCK_TIMEOUT_SECS: u64 = 5;

/// Domain separation tag for transition edge identifiers.
pub const EDGE_ID_DOMAIN: &[u8] = b"sessions:edge:v1:";

/// Domain separation tag for wallet context identifiers.
pub const CONTEXT_ID_DOMAIN: &[u8] = b"sessions:context:v1:";
