use crate::fixtures::{config_of, keys, test_context, PresignedBuilder, TEST_CHAIN_ID, TEST_OTHER_CHAIN_ID};
use alloy::primitives::Address;
use sessions_core::domain::{ChainSignature, PresignedConfiguration};
use sessions_core::foundation::ErrorCode;

fn session_utils() -> Address {
    test_context().session_utils
}

#[test]
fn prepare_emits_one_edge_per_chain_signature() {
    let from = keys(&[1, 2]);
    let to = config_of(1, &keys(&[3]));
    let builder = PresignedBuilder::new(&from, to.clone()).chains(&[TEST_CHAIN_ID, TEST_OTHER_CHAIN_ID]);
    let from_hash = builder.from_config().image_hash();
    let presigned = builder.build();

    let prepared = presigned.prepare(&session_utils()).expect("valid transition");
    assert_eq!(prepared.edges.len(), 2);
    for edge in &prepared.edges {
        assert_eq!(edge.from_image_hash, from_hash);
        assert_eq!(edge.to_image_hash, to.image_hash());
        assert_eq!(edge.body(), presigned.body);
    }
    assert_eq!(prepared.edges[0].chain_id, TEST_CHAIN_ID);
    assert_eq!(prepared.edges[1].chain_id, TEST_OTHER_CHAIN_ID);
    assert_eq!(prepared.configs.len(), 2);
    assert!(prepared.configs.iter().any(|config| config.image_hash() == from_hash));
    // two signers on two chains
    assert_eq!(prepared.signers.len(), 4);
}

#[test]
fn config_must_match_body_image_hash() {
    let from = keys(&[1]);
    let mut presigned = PresignedBuilder::new(&from, config_of(1, &keys(&[3]))).build();
    presigned.config = config_of(1, &keys(&[4]));
    let err = presigned.prepare(&session_utils()).expect_err("mismatched config");
    assert_eq!(err.code(), ErrorCode::InvalidTransitionPayload);
}

#[test]
fn transition_without_signatures_is_rejected() {
    let mut presigned = PresignedBuilder::new(&keys(&[1]), config_of(1, &keys(&[3]))).build();
    presigned.signatures.clear();
    assert_eq!(presigned.prepare(&session_utils()).expect_err("no signatures").code(), ErrorCode::InvalidTransitionPayload);
}

#[test]
fn body_built_for_other_session_utils_is_rejected() {
    let presigned = PresignedBuilder::new(&keys(&[1]), config_of(1, &keys(&[3]))).session_utils(Address::repeat_byte(0x77)).build();
    assert_eq!(presigned.prepare(&session_utils()).expect_err("wrong utils").code(), ErrorCode::InvalidTransitionPayload);
}

#[test]
fn malformed_signature_rejects_the_whole_transition() {
    let mut presigned: PresignedConfiguration =
        PresignedBuilder::new(&keys(&[1]), config_of(1, &keys(&[3]))).chains(&[TEST_CHAIN_ID, TEST_OTHER_CHAIN_ID]).build();
    presigned.signatures.push(ChainSignature::new(10, vec![0x00, 0x01, 0xff]));
    assert_eq!(presigned.prepare(&session_utils()).expect_err("malformed").code(), ErrorCode::MalformedSignature);
}

#[test]
fn signature_replayed_on_another_chain_recovers_a_different_source() {
    let from = keys(&[1]);
    let builder = PresignedBuilder::new(&from, config_of(1, &keys(&[3])));
    let from_hash = builder.from_config().image_hash();
    let mut presigned = builder.build();
    presigned.signatures[0].chain_id = TEST_OTHER_CHAIN_ID;

    let prepared = presigned.prepare(&session_utils()).expect("recovery still succeeds");
    assert_ne!(prepared.edges[0].from_image_hash, from_hash);
}
