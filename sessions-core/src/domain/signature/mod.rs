//! Weighted-threshold signatures: wire codec, digests and signer recovery.

pub mod codec;
pub mod digest;
pub mod recovery;

pub use codec::{decode_signature, encode_signature, DecodedSignature, SignatureKind, SignaturePart};
pub use digest::{eth_sign_digest, subdigest};
pub use recovery::{recover_config, recover_config_part, recover_eoa, recover_signers, RecoveredConfig, RecoveredPart};
