//! Fan-out tracker over several member trackers.
//!
//! Writes run on every member concurrently and return once the first member accepts. The
//! remaining members finish in the background; `flush` waits for them.
//! Reads query every member concurrently: point lookups take the first hit in member
//! order, list lookups and routes merge what the members return. A failing member only
//! surfaces an error when every member fails.

use crate::domain::{
    route_updates, PresignedConfigQuery, PresignedConfigUpdate, PresignedConfiguration, SignerWallet, TransitionEdge, TransitionGraph,
    WalletConfig, WalletContext, Witness,
};
use crate::foundation::{ChainId, ImageHash, Result, TrackerError};
use crate::infrastructure::storage::ConfigTracker;
use alloy::primitives::Address;
use async_trait::async_trait;
use futures_util::future::join_all;
use futures_util::stream::{FuturesUnordered, StreamExt};
use log::{debug, warn};
use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;

pub struct UnionTracker {
    members: Vec<Arc<dyn ConfigTracker>>,
    stragglers: Mutex<Vec<JoinHandle<()>>>,
}

fn member_name(index: usize) -> String {
    format!("member-{index}")
}

/// Error reported when no member could serve a read.
fn all_failed(operation: &str, first: Option<TrackerError>) -> TrackerError {
    match first {
        Some(err) => TrackerError::backend_unavailable("union", format!("{operation}: every member failed, first error: {err}")),
        None => TrackerError::backend_unavailable("union", format!("{operation}: no members")),
    }
}

impl UnionTracker {
    pub fn new(members: Vec<Arc<dyn ConfigTracker>>) -> Result<Self> {
        if members.is_empty() {
            return Err(TrackerError::ConfigError("union tracker requires at least one member".to_string()));
        }
        Ok(Self { members, stragglers: Mutex::new(Vec::new()) })
    }

    pub fn members(&self) -> &[Arc<dyn ConfigTracker>] {
        &self.members
    }

    /// Runs `write` on every member as an independent task and returns as soon as one
    /// member accepts. Members still running finish in the background and log their outcome.
    /// Fails with the first member error, in member order, only when every member failed.
    async fn write_all<F, Fut>(&self, operation: &'static str, write: F) -> Result<()>
    where
        F: Fn(Arc<dyn ConfigTracker>) -> Fut,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let mut pending: FuturesUnordered<_> = self
            .members
            .iter()
            .enumerate()
            .map(|(index, member)| {
                let write = write(Arc::clone(member));
                let task = tokio::spawn(async move {
                    let result = write.await;
                    match &result {
                        Ok(()) => debug!("union write accepted operation={} member={}", operation, member_name(index)),
                        Err(err) => warn!("union write failed operation={} member={} error={}", operation, member_name(index), err),
                    }
                    result
                });
                async move { (index, task.await) }
            })
            .collect();

        let mut failures = Vec::with_capacity(self.members.len());
        while let Some((index, joined)) = pending.next().await {
            match joined {
                Ok(Ok(())) => {
                    if !pending.is_empty() {
                        self.track_stragglers(tokio::spawn(async move { while pending.next().await.is_some() {} }));
                    }
                    return Ok(());
                }
                Ok(Err(err)) => failures.push((index, err)),
                Err(err) => {
                    warn!("union write task aborted operation={} member={} error={}", operation, member_name(index), err);
                    failures.push((index, TrackerError::backend_unavailable(member_name(index), err.to_string())));
                }
            }
        }
        failures.sort_by_key(|(index, _)| *index);
        match failures.into_iter().next() {
            Some((_, err)) => Err(err),
            None => Err(all_failed(operation, None)),
        }
    }

    fn track_stragglers(&self, handle: JoinHandle<()>) {
        let mut stragglers = self.stragglers.lock().unwrap_or_else(PoisonError::into_inner);
        stragglers.retain(|handle| !handle.is_finished());
        stragglers.push(handle);
    }

    /// Successful member results in member order.
    async fn read_all<'a, T, F, Fut>(&'a self, operation: &'static str, read: F) -> Result<Vec<T>>
    where
        F: Fn(&'a Arc<dyn ConfigTracker>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let results = join_all(self.members.iter().map(read)).await;
        let mut values = Vec::with_capacity(results.len());
        let mut first_err = None;
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(value) => values.push(value),
                Err(err) => {
                    warn!("union read failed operation={} member={} error={}", operation, member_name(index), err);
                    first_err.get_or_insert(err);
                }
            }
        }
        if values.is_empty() {
            return Err(all_failed(operation, first_err));
        }
        Ok(values)
    }

    async fn merged_graph(&self, wallet: &Address, chain_id: ChainId) -> Result<TransitionGraph> {
        let edge_sets = self.read_all("transition_edges", |member| member.transition_edges(wallet, chain_id)).await?;
        Ok(edge_sets.into_iter().flatten().collect())
    }
}

#[async_trait]
impl ConfigTracker for UnionTracker {
    async fn save_wallet_config(&self, config: &WalletConfig) -> Result<()> {
        self.write_all("save_wallet_config", |member| {
            let config = config.clone();
            async move { member.save_wallet_config(&config).await }
        })
        .await
    }

    async fn config_of_image_hash(&self, image_hash: &ImageHash) -> Result<Option<WalletConfig>> {
        let found = self.read_all("config_of_image_hash", |member| member.config_of_image_hash(image_hash)).await?;
        Ok(found.into_iter().flatten().next())
    }

    async fn save_counterfactual_wallet(&self, image_hash: &ImageHash, context: &WalletContext) -> Result<()> {
        let (image_hash, context) = (*image_hash, *context);
        self.write_all("save_counterfactual_wallet", |member| async move { member.save_counterfactual_wallet(&image_hash, &context).await })
            .await
    }

    async fn image_hash_of_counterfactual_wallet(&self, context: &WalletContext, wallet: &Address) -> Result<Option<ImageHash>> {
        let found = self
            .read_all("image_hash_of_counterfactual_wallet", |member| member.image_hash_of_counterfactual_wallet(context, wallet))
            .await?;
        Ok(found.into_iter().flatten().next())
    }

    async fn save_witness(&self, witness: &Witness) -> Result<()> {
        self.write_all("save_witness", |member| {
            let witness = witness.clone();
            async move { member.save_witness(&witness).await }
        })
        .await
    }

    async fn wallets_of_signer(&self, signer: &Address) -> Result<Vec<SignerWallet>> {
        let lists = self.read_all("wallets_of_signer", |member| member.wallets_of_signer(signer)).await?;
        let mut seen = HashSet::new();
        Ok(lists.into_iter().flatten().filter(|entry| seen.insert(entry.wallet)).collect())
    }

    async fn save_presigned_configuration(&self, presigned: &PresignedConfiguration) -> Result<()> {
        self.write_all("save_presigned_configuration", |member| {
            let presigned = presigned.clone();
            async move { member.save_presigned_configuration(&presigned).await }
        })
        .await
    }

    async fn load_presigned_configuration(&self, query: &PresignedConfigQuery) -> Result<Vec<PresignedConfigUpdate>> {
        let graph = self.merged_graph(&query.wallet, query.chain_id).await?;
        Ok(route_updates(&graph, query))
    }

    async fn transition_edges(&self, wallet: &Address, chain_id: ChainId) -> Result<Vec<TransitionEdge>> {
        Ok(self.merged_graph(wallet, chain_id).await?.edges().to_vec())
    }

    async fn health_check(&self) -> Result<()> {
        self.read_all("health_check", |member| member.health_check()).await?;
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        let stragglers = std::mem::take(&mut *self.stragglers.lock().unwrap_or_else(PoisonError::into_inner));
        for (index, result) in join_all(stragglers).await.into_iter().enumerate() {
            if let Err(err) = result {
                warn!("union background writes aborted batch={} error={}", index, err);
            }
        }
        for member in &self.members {
            member.flush().await?;
        }
        Ok(())
    }
}
