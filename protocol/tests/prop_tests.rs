//! Property tests for the size model and the balance rule.

use curve25519_dalek::ristretto::CompressedRistretto;
use proptest::prelude::*;

use cloak_protocol::coin::{Coin, InputCoin, OutputCoin, PaymentInfo};
use cloak_protocol::crypto::{random_scalar, KeySet};
use cloak_protocol::transaction::{
    estimate_tx_size, estimate_tx_size_bytes, BuildError, EstimateTxSizeParams, TxBuilder,
    TxPrivacyParams,
};
use cloak_protocol::zkp::ReferenceProver;

fn est(inputs: usize, payments: usize, has_privacy: bool) -> u64 {
    estimate_tx_size_bytes(
        &ReferenceProver::new(),
        &EstimateTxSizeParams {
            num_input_coins: inputs,
            num_payments: payments,
            has_privacy,
            ..Default::default()
        },
    )
}

fn mint(ks: &KeySet, value: u64) -> InputCoin {
    let mut coin = Coin {
        public_key: Some(CompressedRistretto(ks.public_key_bytes())),
        snd: Some(random_scalar()),
        randomness: Some(random_scalar()),
        value,
        ..Coin::default()
    };
    coin.commit(ks.shard_id());
    InputCoin::new(coin)
}

proptest! {
    #[test]
    fn size_estimate_is_monotonic(
        inputs in 0usize..300,
        payments in 0usize..300,
        has_privacy in any::<bool>(),
    ) {
        let base = est(inputs, payments, has_privacy);
        prop_assert!(est(inputs + 1, payments, has_privacy) >= base);
        prop_assert!(est(inputs, payments + 1, has_privacy) >= base);
    }

    #[test]
    fn privacy_never_shrinks_estimate(inputs in 0usize..64, payments in 0usize..64) {
        prop_assert!(est(inputs, payments, true) >= est(inputs, payments, false));
    }

    #[test]
    fn kb_estimate_rounds_up(inputs in 0usize..64, payments in 0usize..64) {
        let params = EstimateTxSizeParams {
            num_input_coins: inputs,
            num_payments: payments,
            ..Default::default()
        };
        let prover = ReferenceProver::new();
        let kb = estimate_tx_size(&prover, &params);
        let bytes = estimate_tx_size_bytes(&prover, &params);
        prop_assert!(kb * 1024 >= bytes);
        prop_assert!((kb - 1) * 1024 < bytes);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn build_conserves_balance(
        values in prop::collection::vec(1u64..1_000_000, 1..5),
        pay_ratio in 0u64..=100,
        fee in 0u64..1_000,
    ) {
        let alice = KeySet::generate();
        let bob = KeySet::generate();
        let total: u64 = values.iter().sum();
        let pay = total * pay_ratio / 100;

        let params = TxPrivacyParams::new(alice.spending_key.clone())
            .spend(values.iter().map(|v| mint(&alice, *v)))
            .pay(PaymentInfo::new(bob.payment_address, pay))
            .fee(fee)
            .with_random_snds();
        let result = TxBuilder::new(ReferenceProver::new()).build(&params);

        if pay + fee > total {
            let is_insufficient = matches!(result, Err(BuildError::InsufficientFunds { .. }));
            prop_assert!(is_insufficient);
        } else {
            let tx = result.unwrap();
            let outs: u64 = tx
                .proof
                .as_ref()
                .unwrap()
                .output_coins()
                .iter()
                .map(OutputCoin::value)
                .sum();
            prop_assert_eq!(outs + tx.fee, total);
        }
    }
}
