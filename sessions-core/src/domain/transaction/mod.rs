//! Meta-transaction bundles and the calls that make up a configuration update.

pub mod abi;
pub mod bundle;
pub mod nonce;

pub use abi::{requireSessionNonceCall, updateImageHashCall, updateImplementationCall, MetaTransaction};
pub use bundle::{bundle_digest, pack_bundle, unpack_bundle};
pub use nonce::{decode_nonce, encode_nonce, sessions_nonce};
