use crate::domain::transaction::sessions_nonce;
use crate::domain::transition::TransitionBody;
use crate::foundation::{ChainId, EdgeId, GapNonce, ImageHash, EDGE_ID_DOMAIN};
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One presigned `from -> to` configuration update of a wallet on one chain.
///
/// `from == to` is valid and describes an implementation-only update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEdge {
    pub wallet: Address,
    pub chain_id: ChainId,
    pub from_image_hash: ImageHash,
    pub to_image_hash: ImageHash,
    pub gap_nonce: GapNonce,
    pub update_target: Option<Address>,
    pub bundle: Vec<u8>,
    pub signature: Vec<u8>,
}

impl TransitionEdge {
    /// Identity over the full tuple. Two submissions of the same signed update collapse into one edge.
    pub fn id(&self) -> EdgeId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(EDGE_ID_DOMAIN);
        hasher.update(self.wallet.as_slice());
        hasher.update(&self.chain_id.to_be_bytes());
        hasher.update(self.from_image_hash.as_ref());
        hasher.update(self.to_image_hash.as_ref());
        hasher.update(&self.gap_nonce.to_be_bytes());
        match &self.update_target {
            Some(target) => {
                hasher.update(&[1]);
                hasher.update(target.as_slice());
            }
            None => {
                hasher.update(&[0]);
            }
        }
        hasher.update(&(self.bundle.len() as u64).to_be_bytes());
        hasher.update(&self.bundle);
        hasher.update(&(self.signature.len() as u64).to_be_bytes());
        hasher.update(&self.signature);
        EdgeId::new(*hasher.finalize().as_bytes())
    }

    pub fn body(&self) -> TransitionBody {
        TransitionBody {
            wallet: self.wallet,
            nonce: sessions_nonce(),
            gap_nonce: self.gap_nonce,
            new_image_hash: self.to_image_hash,
            update_target: self.update_target,
            bundle: self.bundle.clone(),
        }
    }
}

/// Edge arena of one (wallet, chain), indexed by source image hash.
///
/// Edges are kept in insertion order, globally and per source.
#[derive(Clone, Debug, Default)]
pub struct TransitionGraph {
    edges: Vec<TransitionEdge>,
    outgoing: HashMap<ImageHash, Vec<usize>>,
    ids: HashSet<EdgeId>,
}

impl TransitionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the edge was already present.
    pub fn insert(&mut self, edge: TransitionEdge) -> bool {
        if !self.ids.insert(edge.id()) {
            return false;
        }
        self.outgoing.entry(edge.from_image_hash).or_default().push(self.edges.len());
        self.edges.push(edge);
        true
    }

    pub fn contains(&self, edge: &TransitionEdge) -> bool {
        self.ids.contains(&edge.id())
    }

    pub fn outgoing<'a>(&'a self, from: &ImageHash) -> impl Iterator<Item = &'a TransitionEdge> + 'a {
        self.outgoing.get(from).into_iter().flatten().map(|&index| &self.edges[index])
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn edges(&self) -> &[TransitionEdge] {
        &self.edges
    }
}

impl FromIterator<TransitionEdge> for TransitionGraph {
    fn from_iter<I: IntoIterator<Item = TransitionEdge>>(iter: I) -> Self {
        let mut graph = TransitionGraph::new();
        for edge in iter {
            graph.insert(edge);
        }
        graph
    }
}

impl Extend<TransitionEdge> for TransitionGraph {
    fn extend<I: IntoIterator<Item = TransitionEdge>>(&mut self, iter: I) {
        for edge in iter {
            self.insert(edge);
        }
    }
}
