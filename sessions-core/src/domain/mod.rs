//! Domain layer: pure protocol logic. No I/O, no logging.

pub mod config;
pub mod graph;
pub mod routing;
pub mod signature;
pub mod transaction;
pub mod transition;
pub mod witness;

pub use config::{counterfactual_address, ConfigSigner, WalletConfig, WalletContext};
pub use graph::{TransitionEdge, TransitionGraph};
pub use routing::{route, route_updates, PresignedConfigQuery, PresignedConfigUpdate};
pub use transition::{PreparedTransition, PresignedConfiguration, TransitionBody};
pub use witness::{ChainSignature, SignerIndexEntry, SignerProof, SignerWallet, Witness};
