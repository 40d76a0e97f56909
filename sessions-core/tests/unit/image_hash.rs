use crate::fixtures::{config_of, keys, test_context};
use alloy::primitives::Address;
use proptest::prelude::*;
use sessions_core::domain::{counterfactual_address, ConfigSigner, WalletConfig};

fn signer_strategy() -> impl Strategy<Value = ConfigSigner> {
    (any::<u8>(), any::<[u8; 20]>()).prop_map(|(weight, address)| ConfigSigner::new(weight, Address::from(address)))
}

proptest! {
    #[test]
    fn image_hash_ignores_signer_order(
        threshold in any::<u16>(),
        signers in prop::collection::vec(signer_strategy(), 1..12)
            .prop_flat_map(|signers| (Just(signers.clone()), Just(signers).prop_shuffle())),
    ) {
        let (original, shuffled) = signers;
        let a = WalletConfig::new(threshold, original).expect("config");
        let b = WalletConfig::new(threshold, shuffled).expect("config");
        prop_assert_eq!(a.image_hash(), b.image_hash());
    }

    #[test]
    fn image_hash_binds_threshold(threshold in 0u16..u16::MAX, signers in prop::collection::vec(signer_strategy(), 1..6)) {
        let a = WalletConfig::new(threshold, signers.clone()).expect("config");
        let b = WalletConfig::new(threshold + 1, signers).expect("config");
        prop_assert_ne!(a.image_hash(), b.image_hash());
    }
}

#[test]
fn weight_is_part_of_the_hash() {
    let signer = Address::repeat_byte(0x42);
    let light = WalletConfig::new(1, vec![ConfigSigner::new(1, signer)]).expect("config");
    let heavy = WalletConfig::new(1, vec![ConfigSigner::new(2, signer)]).expect("config");
    assert_ne!(light.image_hash(), heavy.image_hash());
}

#[test]
fn duplicate_signers_are_hashed_independently() {
    let signer = ConfigSigner::new(1, Address::repeat_byte(0x42));
    let once = WalletConfig::new(1, vec![signer]).expect("config");
    let twice = WalletConfig::new(1, vec![signer, signer]).expect("config");
    assert_ne!(once.image_hash(), twice.image_hash());
    assert_eq!(twice.total_weight(), 2);
}

#[test]
fn empty_signer_list_is_rejected() {
    assert!(WalletConfig::new(1, Vec::new()).is_err());
}

#[test]
fn counterfactual_address_follows_image_hash() {
    let context = test_context();
    let a = config_of(1, &keys(&[1])).image_hash();
    let b = config_of(1, &keys(&[2])).image_hash();
    assert_eq!(counterfactual_address(&a, &context), context.counterfactual_address(&a));
    assert_ne!(counterfactual_address(&a, &context), counterfactual_address(&b, &context));
}
