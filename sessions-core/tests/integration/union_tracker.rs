use crate::fixtures::{config_of, keys, sign_with, test_context, test_wallet, PresignedBuilder, TEST_CHAIN_ID};
use crate::integration::tracker_contract::query;
use alloy::primitives::{keccak256, Address};
use async_trait::async_trait;
use sessions_core::application::open_tracker;
use sessions_core::domain::signature::subdigest;
use sessions_core::domain::{
    ChainSignature, PresignedConfigQuery, PresignedConfigUpdate, PresignedConfiguration, SignerWallet, TransitionEdge, WalletConfig,
    WalletContext, Witness,
};
use sessions_core::foundation::{ChainId, ErrorCode, ImageHash, Result, TrackerError};
use sessions_core::infrastructure::config::{BackendConfig, TrackerConfig};
use sessions_core::infrastructure::storage::{ConfigTracker, MemoryTracker, RocksTracker, UnionTracker};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Member whose every call fails as an unreachable backend would, optionally after a delay.
struct OfflineTracker {
    name: &'static str,
    delay: Duration,
}

impl OfflineTracker {
    fn new() -> Self {
        Self { name: "offline", delay: Duration::ZERO }
    }

    fn slow(delay: Duration) -> Self {
        Self { name: "slow", delay }
    }

    async fn fail<T>(&self) -> Result<T> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Err(TrackerError::backend_unavailable(self.name, "connection refused"))
    }
}

#[async_trait]
impl ConfigTracker for OfflineTracker {
    async fn save_wallet_config(&self, _config: &WalletConfig) -> Result<()> {
        self.fail().await
    }
    async fn config_of_image_hash(&self, _image_hash: &ImageHash) -> Result<Option<WalletConfig>> {
        self.fail().await
    }
    async fn save_counterfactual_wallet(&self, _image_hash: &ImageHash, _context: &WalletContext) -> Result<()> {
        self.fail().await
    }
    async fn image_hash_of_counterfactual_wallet(&self, _context: &WalletContext, _wallet: &Address) -> Result<Option<ImageHash>> {
        self.fail().await
    }
    async fn save_witness(&self, _witness: &Witness) -> Result<()> {
        self.fail().await
    }
    async fn wallets_of_signer(&self, _signer: &Address) -> Result<Vec<SignerWallet>> {
        self.fail().await
    }
    async fn save_presigned_configuration(&self, _presigned: &PresignedConfiguration) -> Result<()> {
        self.fail().await
    }
    async fn load_presigned_configuration(&self, _query: &PresignedConfigQuery) -> Result<Vec<PresignedConfigUpdate>> {
        self.fail().await
    }
    async fn transition_edges(&self, _wallet: &Address, _chain_id: ChainId) -> Result<Vec<TransitionEdge>> {
        self.fail().await
    }
    async fn health_check(&self) -> Result<()> {
        self.fail().await
    }
}

fn memory() -> Arc<MemoryTracker> {
    Arc::new(MemoryTracker::new(test_context()))
}

fn union_of(members: Vec<Arc<dyn ConfigTracker>>) -> UnionTracker {
    UnionTracker::new(members).expect("union")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn split_history_is_routed_end_to_end() {
    let [a, e, c, h] = [keys(&[1]), keys(&[2]), keys(&[3]), keys(&[4])];
    let early = memory();
    let late = memory();
    early.save_presigned_configuration(&PresignedBuilder::new(&a, config_of(1, &e)).gap_nonce(10).build()).await.expect("a->e");
    late.save_presigned_configuration(&PresignedBuilder::new(&e, config_of(1, &c)).gap_nonce(20).build()).await.expect("e->c");
    late.save_presigned_configuration(&PresignedBuilder::new(&c, config_of(1, &h)).gap_nonce(30).build()).await.expect("c->h");

    let union = union_of(vec![early.clone(), late.clone()]);
    let from = config_of(1, &a).image_hash();
    assert_eq!(early.load_presigned_configuration(&query(from, TEST_CHAIN_ID, Vec::new())).await.expect("early").len(), 1);

    let updates = union.load_presigned_configuration(&query(from, TEST_CHAIN_ID, Vec::new())).await.expect("union load");
    let path: Vec<ImageHash> = updates.iter().map(PresignedConfigUpdate::to_image_hash).collect();
    assert_eq!(path, vec![config_of(1, &e).image_hash(), config_of(1, &c).image_hash(), config_of(1, &h).image_hash()]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn writes_reach_every_member() {
    let temp_dir = TempDir::new().expect("temp dir");
    let rocks = Arc::new(RocksTracker::open_in_dir(temp_dir.path(), test_context()).expect("open rocksdb"));
    let mem = memory();
    let union = union_of(vec![rocks.clone(), mem.clone()]);

    let presigned = PresignedBuilder::new(&keys(&[1]), config_of(1, &keys(&[2]))).build();
    union.save_presigned_configuration(&presigned).await.expect("save");
    union.save_presigned_configuration(&presigned).await.expect("save again");
    union.flush().await.expect("flush");

    for member in [rocks as Arc<dyn ConfigTracker>, mem] {
        assert_eq!(member.transition_edges(&test_wallet(), TEST_CHAIN_ID).await.expect("edges").len(), 1);
    }
    assert_eq!(union.transition_edges(&test_wallet(), TEST_CHAIN_ID).await.expect("merged").len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn one_healthy_member_is_enough() {
    let mem = memory();
    let union = union_of(vec![Arc::new(OfflineTracker::new()), mem.clone()]);

    let config = config_of(2, &keys(&[1, 2]));
    union.save_wallet_config(&config).await.expect("save through healthy member");
    assert_eq!(union.config_of_image_hash(&config.image_hash()).await.expect("read"), Some(config.clone()));
    assert_eq!(mem.config_of_image_hash(&config.image_hash()).await.expect("member"), Some(config));
    union.health_check().await.expect("healthy");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn slow_failing_member_does_not_delay_writes() {
    let mem = memory();
    let union = union_of(vec![Arc::new(OfflineTracker::slow(Duration::from_secs(3))), mem.clone()]);
    let config = config_of(1, &keys(&[3]));

    let started = Instant::now();
    union.save_wallet_config(&config).await.expect("save through fast member");
    let elapsed = started.elapsed();
    assert!(elapsed < Duration::from_millis(500), "write waited for the failing member: {elapsed:?}");
    assert_eq!(mem.config_of_image_hash(&config.image_hash()).await.expect("member"), Some(config));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn all_failing_write_reports_first_member_error() {
    let union = union_of(vec![Arc::new(OfflineTracker::slow(Duration::from_millis(100))), Arc::new(OfflineTracker::new())]);
    let err = union.save_wallet_config(&config_of(1, &keys(&[1]))).await.expect_err("write");
    match err {
        TrackerError::BackendUnavailable { backend, .. } => assert_eq!(backend, "slow"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn all_members_failing_surfaces_errors() {
    let union = union_of(vec![Arc::new(OfflineTracker::new()), Arc::new(OfflineTracker::new())]);
    let config = config_of(1, &keys(&[1]));

    let write = union.save_wallet_config(&config).await.expect_err("write");
    assert_eq!(write.code(), ErrorCode::BackendUnavailable);
    let read = union.config_of_image_hash(&config.image_hash()).await.expect_err("read");
    assert_eq!(read.code(), ErrorCode::BackendUnavailable);
    assert!(union.health_check().await.is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn invalid_payload_is_reported_when_every_member_rejects_it() {
    let union = union_of(vec![memory(), memory()]);
    let presigned = PresignedBuilder::new(&keys(&[1]), config_of(1, &keys(&[2]))).session_utils(Address::repeat_byte(0x77)).build();
    let err = union.save_presigned_configuration(&presigned).await.expect_err("rejected");
    assert_eq!(err.code(), ErrorCode::InvalidTransitionPayload);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn reads_take_first_defined_and_deduplicate_signers() {
    let first = memory();
    let second = memory();
    let context = test_context();
    let image_hash = config_of(1, &keys(&[5])).image_hash();
    second.save_counterfactual_wallet(&image_hash, &context).await.expect("counterfactual");

    let signer = keys(&[6]);
    let digest = keccak256(b"witness");
    let witness = Witness {
        wallet: test_wallet(),
        digest,
        signatures: vec![ChainSignature::new(TEST_CHAIN_ID, sign_with(1, &signer, &subdigest(TEST_CHAIN_ID, &test_wallet(), &digest)))],
    };
    first.save_witness(&witness).await.expect("witness first");
    second.save_witness(&witness).await.expect("witness second");

    let union = union_of(vec![first, second]);
    let wallet = context.counterfactual_address(&image_hash);
    assert_eq!(union.image_hash_of_counterfactual_wallet(&context, &wallet).await.expect("lookup"), Some(image_hash));
    assert_eq!(union.wallets_of_signer(&signer[0].address).await.expect("signers").len(), 1);
}

#[test]
fn empty_union_is_rejected() {
    assert!(UnionTracker::new(Vec::new()).is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn configured_union_persists_through_rocks_member() {
    let temp_dir = TempDir::new().expect("temp dir");
    let rocks_path = temp_dir.path().join("tracker").to_string_lossy().to_string();
    let mut config = TrackerConfig { context: test_context(), ..TrackerConfig::default() };
    config.storage.backends = vec![BackendConfig::Memory, BackendConfig::rocks(rocks_path.clone())];

    let presigned = PresignedBuilder::new(&keys(&[1]), config_of(1, &keys(&[2]))).build();
    {
        let tracker = open_tracker(&config).expect("open union");
        tracker.save_presigned_configuration(&presigned).await.expect("save");
        tracker.flush().await.expect("flush");
    }

    let reopened = RocksTracker::open(&rocks_path, test_context()).expect("reopen rocks member");
    let from = config_of(1, &keys(&[1])).image_hash();
    let updates = reopened.load_presigned_configuration(&query(from, TEST_CHAIN_ID, Vec::new())).await.expect("load");
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].body, presigned.body);
}
