//! Greedy path selection over a transition graph.
//!
//! From the starting image hash the router repeatedly takes the outgoing edge with the
//! highest gap nonce. After the first hop only edges with a strictly greater gap nonce
//! qualify, so every walk terminates, cycles included. Equal gap nonces resolve to the
//! edge inserted first.

use crate::domain::graph::{TransitionEdge, TransitionGraph};
use crate::domain::transition::TransitionBody;
use crate::foundation::{ChainId, GapNonce, ImageHash};
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresignedConfigQuery {
    pub wallet: Address,
    pub chain_id: ChainId,
    pub from_image_hash: ImageHash,
    /// Implementations the first hop may upgrade to. Empty means the first hop must not upgrade.
    pub prepend_update: Vec<Address>,
}

/// One ready-to-submit step of a route.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresignedConfigUpdate {
    pub chain_id: ChainId,
    pub from_image_hash: ImageHash,
    pub signature: Vec<u8>,
    pub body: TransitionBody,
}

impl PresignedConfigUpdate {
    pub fn to_image_hash(&self) -> ImageHash {
        self.body.new_image_hash
    }

    pub fn gap_nonce(&self) -> GapNonce {
        self.body.gap_nonce
    }
}

impl From<&TransitionEdge> for PresignedConfigUpdate {
    fn from(edge: &TransitionEdge) -> Self {
        Self { chain_id: edge.chain_id, from_image_hash: edge.from_image_hash, signature: edge.signature.clone(), body: edge.body() }
    }
}

pub fn route<'a>(graph: &'a TransitionGraph, from: &ImageHash, prepend_update: &[Address]) -> Vec<&'a TransitionEdge> {
    let mut path = Vec::new();
    let mut current = *from;
    let mut last_gap_nonce: Option<GapNonce> = None;

    loop {
        let mut best: Option<&TransitionEdge> = None;
        for edge in graph.outgoing(&current) {
            let eligible = match last_gap_nonce {
                None if prepend_update.is_empty() => edge.update_target.is_none(),
                None => edge.update_target.as_ref().is_some_and(|target| prepend_update.contains(target)),
                Some(last) => edge.gap_nonce > last,
            };
            if eligible && best.map_or(true, |b| edge.gap_nonce > b.gap_nonce) {
                best = Some(edge);
            }
        }
        let Some(edge) = best else {
            return path;
        };
        path.push(edge);
        current = edge.to_image_hash;
        last_gap_nonce = Some(edge.gap_nonce);
    }
}

/// Routes a query over the graph of `(query.wallet, query.chain_id)`.
pub fn route_updates(graph: &TransitionGraph, query: &PresignedConfigQuery) -> Vec<PresignedConfigUpdate> {
    route(graph, &query.from_image_hash, &query.prepend_update)
        .into_iter()
        .take_while(|edge| edge.wallet == query.wallet && edge.chain_id == query.chain_id)
        .map(PresignedConfigUpdate::from)
        .collect()
}
