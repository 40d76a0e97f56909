//! Behaviour every `ConfigTracker` backend must share, run against each backend.

use crate::fixtures::{
    config_of, keys, sign_with, test_context, test_implementation, test_wallet, PresignedBuilder, TEST_CHAIN_ID, TEST_OTHER_CHAIN_ID,
};
use alloy::primitives::{keccak256, Address};
use sessions_core::domain::signature::subdigest;
use sessions_core::domain::{ChainSignature, PresignedConfigQuery, WalletContext, Witness};
use sessions_core::foundation::{ChainId, ErrorCode, ImageHash};
use sessions_core::infrastructure::storage::{ConfigTracker, MemoryTracker, RocksTracker};
use tempfile::TempDir;

pub fn query(from: ImageHash, chain_id: ChainId, prepend_update: Vec<Address>) -> PresignedConfigQuery {
    PresignedConfigQuery { wallet: test_wallet(), chain_id, from_image_hash: from, prepend_update }
}

async fn routes_latest_history(tracker: &dyn ConfigTracker) {
    let [a, b, c, d] = [keys(&[1]), keys(&[2]), keys(&[3]), keys(&[4])];
    let (hash_a, hash_b, hash_c) = (config_of(1, &a).image_hash(), config_of(1, &b).image_hash(), config_of(1, &c).image_hash());

    let a_to_b = PresignedBuilder::new(&a, config_of(1, &b)).gap_nonce(10).build();
    let b_to_c = PresignedBuilder::new(&b, config_of(1, &c)).gap_nonce(20).build();
    let a_to_d = PresignedBuilder::new(&a, config_of(1, &d)).gap_nonce(5).build();
    for presigned in [&a_to_d, &a_to_b, &b_to_c] {
        tracker.save_presigned_configuration(presigned).await.expect("save transition");
    }

    let updates = tracker.load_presigned_configuration(&query(hash_a, TEST_CHAIN_ID, Vec::new())).await.expect("load");
    let hops: Vec<_> = updates.iter().map(|u| (u.from_image_hash, u.to_image_hash())).collect();
    assert_eq!(hops, vec![(hash_a, hash_b), (hash_b, hash_c)]);
    assert_eq!(updates[0].body, a_to_b.body);
    assert_eq!(updates[0].signature, a_to_b.signatures[0].signature);
    assert_eq!(updates[1].gap_nonce(), 20);

    for hash in [hash_a, hash_b, hash_c] {
        assert!(tracker.config_of_image_hash(&hash).await.expect("config").is_some(), "config {hash} missing");
    }
    let from_c = tracker.load_presigned_configuration(&query(hash_c, TEST_CHAIN_ID, Vec::new())).await.expect("load");
    assert!(from_c.is_empty());
}

async fn rejected_transition_writes_nothing(tracker: &dyn ConfigTracker) {
    let target = config_of(1, &keys(&[6]));
    let mut presigned = PresignedBuilder::new(&keys(&[5]), target.clone()).build();
    presigned.body.gap_nonce += 1;

    let err = tracker.save_presigned_configuration(&presigned).await.expect_err("tampered body");
    assert_eq!(err.code(), ErrorCode::InvalidTransitionPayload);
    assert!(tracker.transition_edges(&test_wallet(), TEST_CHAIN_ID).await.expect("edges").is_empty());
    assert!(tracker.config_of_image_hash(&target.image_hash()).await.expect("config").is_none());
    assert!(tracker.wallets_of_signer(&keys(&[5])[0].address).await.expect("signers").is_empty());

    let reordered = PresignedBuilder::new(&keys(&[5]), target.clone())
        .update_target(test_implementation())
        .rewrite_transactions(|txs| txs.swap(0, 1))
        .build();
    let err = tracker.save_presigned_configuration(&reordered).await.expect_err("reordered bundle");
    assert_eq!(err.code(), ErrorCode::InvalidTransitionPayload);
    assert!(tracker.transition_edges(&test_wallet(), TEST_CHAIN_ID).await.expect("edges").is_empty());
    assert!(tracker.config_of_image_hash(&target.image_hash()).await.expect("config").is_none());
    assert!(tracker.config_of_image_hash(&config_of(1, &keys(&[5])).image_hash()).await.expect("config").is_none());
    assert!(tracker.wallets_of_signer(&keys(&[5])[0].address).await.expect("signers").is_empty());
}

async fn duplicate_saves_are_idempotent(tracker: &dyn ConfigTracker) {
    let presigned = PresignedBuilder::new(&keys(&[1]), config_of(1, &keys(&[2]))).build();
    tracker.save_presigned_configuration(&presigned).await.expect("first save");
    tracker.save_presigned_configuration(&presigned).await.expect("second save");
    assert_eq!(tracker.transition_edges(&test_wallet(), TEST_CHAIN_ID).await.expect("edges").len(), 1);

    tracker.save_wallet_config(&presigned.config).await.expect("config save");
    tracker.save_wallet_config(&presigned.config).await.expect("config resave");
    assert_eq!(tracker.config_of_image_hash(&presigned.config.image_hash()).await.expect("config"), Some(presigned.config.clone()));
}

async fn chains_are_routed_independently(tracker: &dyn ConfigTracker) {
    let from = keys(&[1]);
    let presigned =
        PresignedBuilder::new(&from, config_of(1, &keys(&[2]))).chains(&[TEST_CHAIN_ID, TEST_OTHER_CHAIN_ID]).build();
    tracker.save_presigned_configuration(&presigned).await.expect("save");

    let from_hash = config_of(1, &from).image_hash();
    for chain_id in [TEST_CHAIN_ID, TEST_OTHER_CHAIN_ID] {
        let updates = tracker.load_presigned_configuration(&query(from_hash, chain_id, Vec::new())).await.expect("load");
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].chain_id, chain_id);
    }
    assert!(tracker.load_presigned_configuration(&query(from_hash, 5, Vec::new())).await.expect("load").is_empty());
}

async fn first_hop_honours_prepend_update(tracker: &dyn ConfigTracker) {
    let from = keys(&[1]);
    let from_hash = config_of(1, &from).image_hash();
    let upgrade = PresignedBuilder::new(&from, config_of(1, &keys(&[2]))).gap_nonce(10).update_target(test_implementation()).build();
    let plain = PresignedBuilder::new(&from, config_of(1, &keys(&[3]))).gap_nonce(5).build();
    tracker.save_presigned_configuration(&upgrade).await.expect("save upgrade");
    tracker.save_presigned_configuration(&plain).await.expect("save plain");

    let without = tracker.load_presigned_configuration(&query(from_hash, TEST_CHAIN_ID, Vec::new())).await.expect("load");
    assert_eq!(without[0].to_image_hash(), plain.config.image_hash());

    let with = tracker.load_presigned_configuration(&query(from_hash, TEST_CHAIN_ID, vec![test_implementation()])).await.expect("load");
    assert_eq!(with[0].to_image_hash(), upgrade.config.image_hash());
    assert_eq!(with[0].body.update_target, Some(test_implementation()));

    let unknown = tracker.load_presigned_configuration(&query(from_hash, TEST_CHAIN_ID, vec![Address::repeat_byte(0x99)])).await.expect("load");
    assert!(unknown.is_empty());
}

async fn counterfactual_wallets_resolve_per_context(tracker: &dyn ConfigTracker) {
    let context = test_context();
    let image_hash = config_of(1, &keys(&[8])).image_hash();
    tracker.save_counterfactual_wallet(&image_hash, &context).await.expect("save");

    let wallet = context.counterfactual_address(&image_hash);
    assert_eq!(tracker.image_hash_of_counterfactual_wallet(&context, &wallet).await.expect("lookup"), Some(image_hash));

    let other = WalletContext { factory: Address::repeat_byte(0x0f), ..context };
    assert_eq!(tracker.image_hash_of_counterfactual_wallet(&other, &wallet).await.expect("lookup"), None);
}

async fn witnesses_index_signers(tracker: &dyn ConfigTracker) {
    let signer = keys(&[7]);
    let wallet = test_wallet();
    let witness_for = |message: &[u8]| {
        let digest = keccak256(message);
        let signature = sign_with(1, &signer, &subdigest(TEST_CHAIN_ID, &wallet, &digest));
        Witness { wallet, digest, signatures: vec![ChainSignature::new(TEST_CHAIN_ID, signature)] }
    };
    let first = witness_for(b"first");
    tracker.save_witness(&first).await.expect("save witness");
    tracker.save_witness(&witness_for(b"second")).await.expect("save witness");

    let wallets = tracker.wallets_of_signer(&signer[0].address).await.expect("lookup");
    assert_eq!(wallets.len(), 1);
    assert_eq!(wallets[0].wallet, wallet);
    assert_eq!(wallets[0].proof.digest, first.digest);
    assert_eq!(wallets[0].proof.recover_signers(&wallet).expect("proof"), vec![signer[0].address]);

    assert!(tracker.wallets_of_signer(&Address::repeat_byte(0x01)).await.expect("lookup").is_empty());
}

async fn presigned_saves_index_their_signers(tracker: &dyn ConfigTracker) {
    let from = keys(&[1, 2]);
    tracker.save_presigned_configuration(&PresignedBuilder::new(&from, config_of(1, &keys(&[3]))).build()).await.expect("save");
    for key in &from {
        let wallets = tracker.wallets_of_signer(&key.address).await.expect("lookup");
        assert_eq!(wallets.iter().map(|w| w.wallet).collect::<Vec<_>>(), vec![test_wallet()]);
    }
}

macro_rules! tracker_contract {
    ($($name:ident),* $(,)?) => {
        mod memory {
            use super::*;
            $(
                #[tokio::test]
                async fn $name() {
                    let tracker = MemoryTracker::new(test_context());
                    super::$name(&tracker).await;
                }
            )*
        }

        mod rocks {
            use super::*;
            $(
                #[tokio::test]
                async fn $name() {
                    let dir = TempDir::new().expect("temp dir");
                    let tracker = RocksTracker::open_in_dir(dir.path(), test_context()).expect("open rocksdb");
                    super::$name(&tracker).await;
                }
            )*
        }
    };
}

tracker_contract!(
    routes_latest_history,
    rejected_transition_writes_nothing,
    duplicate_saves_are_idempotent,
    chains_are_routed_independently,
    first_hop_honours_prepend_update,
    counterfactual_wallets_resolve_per_context,
    witnesses_index_signers,
    presigned_saves_index_their_signers,
);
