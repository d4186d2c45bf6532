//! End-to-end integration tests for the Cloak transaction pipeline.
//!
//! These tests drive the public API only: generate keys, mint some coins,
//! build native and token transactions, ship them through JSON, and check
//! that what comes out the other end still verifies and still balances.
//!
//! Every test stands alone with freshly generated keys. No shared state,
//! no test ordering dependencies.

use std::sync::atomic::{AtomicUsize, Ordering};

use curve25519_dalek::ristretto::CompressedRistretto;

use cloak_protocol::coin::{Coin, InputCoin, OutputCoin, PaymentInfo};
use cloak_protocol::config::{BuilderConfig, COMMITMENT_RING_SIZE};
use cloak_protocol::crypto::hash::hash_h_multi;
use cloak_protocol::crypto::schnorr::SigningSecret;
use cloak_protocol::crypto::{decrypt_output_detail, random_scalar, KeySet};
use cloak_protocol::metadata::{
    Metadata, StakingMetadata, StopAutoStakingMetadata, SHARD_STAKING_META,
};
use cloak_protocol::transaction::{
    sign_tx, verify_signature, verify_token_tx, BuildError, CustomTokenParams, RingParams,
    SignedTx, StateError, TokenAction, TxBuilder, TxCustomTokenPrivacy, TxPrivacyParams,
    TxPrivacyTokenParams, TxType, ValidationError,
};
use cloak_protocol::zkp::{
    PaymentProof, PaymentWitness, PaymentWitnessParams, Prover, ProverError, ReferenceProver,
};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

/// A coin owned by `ks`, committed and ready to spend.
fn mint(ks: &KeySet, value: u64) -> InputCoin {
    let mut coin = Coin {
        public_key: Some(CompressedRistretto(ks.public_key_bytes())),
        snd: Some(random_scalar()),
        randomness: Some(random_scalar()),
        value,
        ..Coin::default()
    };
    assert!(coin.commit(ks.shard_id()));
    InputCoin::new(coin)
}

/// Ring with the real commitment in the last slot of each input's ring.
fn ring_for(inputs: &[InputCoin]) -> RingParams {
    let mut ring = RingParams::default();
    let last = COMMITMENT_RING_SIZE - 1;
    for (i, input) in inputs.iter().enumerate() {
        for j in 0..COMMITMENT_RING_SIZE {
            let member = if j == last {
                input.coin.commitment.expect("minted coins are committed")
            } else {
                CompressedRistretto([(j + 1) as u8; 32])
            };
            ring.commitments.push(member);
            ring.commitment_indices.push((i * COMMITMENT_RING_SIZE + j) as u64);
        }
        ring.my_commitment_indices.push(last as u64);
    }
    ring
}

/// Wraps the reference prover and counts how often it is asked to work.
#[derive(Default)]
struct CountingProver {
    inner: ReferenceProver,
    witnesses: AtomicUsize,
    proofs: AtomicUsize,
}

impl Prover for CountingProver {
    fn build_witness(&self, params: &PaymentWitnessParams) -> Result<PaymentWitness, ProverError> {
        self.witnesses.fetch_add(1, Ordering::SeqCst);
        self.inner.build_witness(params)
    }

    fn prove(&self, witness: &PaymentWitness, has_privacy: bool) -> Result<PaymentProof, ProverError> {
        self.proofs.fetch_add(1, Ordering::SeqCst);
        self.inner.prove(witness, has_privacy)
    }
}

fn builder() -> TxBuilder<ReferenceProver> {
    TxBuilder::new(ReferenceProver::new())
}

fn output_sum(tx: &SignedTx) -> u64 {
    tx.proof
        .as_ref()
        .map_or(0, |p| p.output_coins().iter().map(OutputCoin::value).sum())
}

// ---------------------------------------------------------------------------
// Native transactions
// ---------------------------------------------------------------------------

#[test]
fn test_pay_120_with_fee_10_from_100_and_50_returns_20_change() {
    let alice = KeySet::generate();
    let bob = KeySet::generate();

    let params = TxPrivacyParams::new(alice.spending_key.clone())
        .spend([mint(&alice, 100), mint(&alice, 50)])
        .pay(PaymentInfo::new(bob.payment_address, 120))
        .fee(10)
        .with_random_snds();
    assert_eq!(params.output_count(), 2);
    let tx = builder().build(&params).unwrap();

    let outputs = tx.proof.as_ref().unwrap().output_coins();
    assert_eq!(outputs.len(), 2);
    assert_eq!(outputs[0].value(), 120);
    assert_eq!(outputs[1].value(), 20);
    assert_eq!(
        outputs[1].coin.public_key,
        Some(CompressedRistretto(alice.public_key_bytes()))
    );
    assert_eq!(outputs[0].coin.snd, Some(params.snd_outputs[0]));
    assert_eq!(outputs[1].coin.snd, Some(params.snd_outputs[1]));
    // Balance conservation.
    assert_eq!(output_sum(&tx) + tx.fee, 150);
    verify_signature(&tx).unwrap();
}

#[test]
fn test_pay_10_with_fee_5_from_10_reports_minus_five() {
    let alice = KeySet::generate();
    let bob = KeySet::generate();
    let params = TxPrivacyParams::new(alice.spending_key.clone())
        .spend([mint(&alice, 10)])
        .pay(PaymentInfo::new(bob.payment_address, 10))
        .fee(5)
        .with_random_snds();

    match builder().build(&params).unwrap_err() {
        BuildError::InsufficientFunds {
            sum_inputs,
            sum_outputs,
            fee,
            over_balance,
        } => {
            assert_eq!((sum_inputs, sum_outputs, fee), (10, 10, 5));
            assert_eq!(over_balance, -5);
        }
        other => panic!("expected insufficient funds, got {other:?}"),
    }
}

#[test]
fn test_256_inputs_rejected_before_prover() {
    let alice = KeySet::generate();
    let prover = CountingProver::default();
    let builder = TxBuilder::new(&prover);

    let params = TxPrivacyParams::new(alice.spending_key.clone())
        .spend((0..256).map(|_| InputCoin::default()))
        .pay(PaymentInfo::new(alice.payment_address, 1));
    assert!(matches!(
        builder.build(&params).unwrap_err(),
        BuildError::Validation(ValidationError::TooManyInputs { count: 256, max: 255 })
    ));
    assert_eq!(prover.witnesses.load(Ordering::SeqCst), 0);
    assert_eq!(prover.proofs.load(Ordering::SeqCst), 0);
}

#[test]
fn test_oversized_privacy_tx_rejected_before_prover() {
    let alice = KeySet::generate();
    let prover = CountingProver::default();
    let builder = TxBuilder::new(&prover);

    let params = TxPrivacyParams::new(alice.spending_key.clone())
        .spend((0..255).map(|_| InputCoin::default()))
        .pay(PaymentInfo::new(alice.payment_address, 1))
        .privacy(true);
    assert!(matches!(
        builder.build(&params).unwrap_err(),
        BuildError::Validation(ValidationError::TxTooLarge { .. })
    ));
    assert_eq!(prover.witnesses.load(Ordering::SeqCst), 0);
}

#[test]
fn test_prover_called_once_per_build() {
    let alice = KeySet::generate();
    let prover = CountingProver::default();
    let builder = TxBuilder::new(&prover);
    let params = TxPrivacyParams::new(alice.spending_key.clone())
        .spend([mint(&alice, 5)])
        .pay(PaymentInfo::new(alice.payment_address, 5))
        .with_random_snds();
    builder.build(&params).unwrap();
    assert_eq!(prover.witnesses.load(Ordering::SeqCst), 1);
    assert_eq!(prover.proofs.load(Ordering::SeqCst), 1);
}

#[test]
fn test_privacy_redaction_and_recipient_decrypt() {
    let alice = KeySet::generate();
    let bob = KeySet::generate();
    let inputs = vec![mint(&alice, 30), mint(&alice, 25)];

    let params = TxPrivacyParams::new(alice.spending_key.clone())
        .ring(ring_for(&inputs))
        .spend(inputs)
        .pay(PaymentInfo::new(bob.payment_address, 40))
        .fee(5)
        .privacy(true)
        .with_random_snds();
    let tx = builder().build(&params).unwrap();
    verify_signature(&tx).unwrap();

    let proof = tx.proof.as_ref().unwrap();
    for input in proof.input_coins() {
        assert!(input.is_redacted());
        assert!(input.coin.serial_number.is_some());
    }
    for output in proof.output_coins() {
        assert!(output.is_sealed());
        assert!(output.coin.commitment.is_some());
        assert!(output.coin.snd.is_some());
    }

    // Bob opens the payment, Alice opens her change.
    let outs = proof.output_coins();
    let to_bob = decrypt_output_detail(outs[0].encrypted.as_ref().unwrap(), &bob.receiving_key).unwrap();
    let change = decrypt_output_detail(outs[1].encrypted.as_ref().unwrap(), &alice.receiving_key).unwrap();
    assert_eq!(to_bob.value, 40);
    assert_eq!(change.value, 10);
    // And not each other's.
    assert!(decrypt_output_detail(outs[0].encrypted.as_ref().unwrap(), &alice.receiving_key).is_err());
}

#[test]
fn test_caller_coins_are_not_mutated() {
    let alice = KeySet::generate();
    let inputs = vec![mint(&alice, 12)];
    let params = TxPrivacyParams::new(alice.spending_key.clone())
        .ring(ring_for(&inputs))
        .spend(inputs.clone())
        .pay(PaymentInfo::new(alice.payment_address, 12))
        .privacy(true)
        .with_random_snds();
    builder().build(&params).unwrap();
    assert_eq!(params.input_coins, inputs);
    assert!(!params.input_coins[0].is_redacted());
}

#[test]
fn test_resign_fails_without_overwrite() {
    let alice = KeySet::generate();
    let tx = builder()
        .build(
            &TxPrivacyParams::new(alice.spending_key.clone())
                .spend([mint(&alice, 3)])
                .pay(PaymentInfo::new(alice.payment_address, 3))
                .with_random_snds(),
        )
        .unwrap();

    let mut draft = tx.clone().into_inner();
    let mallory = KeySet::generate();
    let err = sign_tx(&mut draft, &SigningSecret::without_blinding(&mallory.spending_key)).unwrap_err();
    assert_eq!(err, StateError::AlreadySigned);
    assert_eq!(draft.sig, tx.sig);
    assert_eq!(draft.sig_pub_key, tx.sig_pub_key);
}

#[test]
fn test_metadata_only_tx_needs_no_inputs() {
    let alice = KeySet::generate();
    let bob = KeySet::generate();
    let staking = Metadata::Staking(StakingMetadata {
        funder_payment_address: alice.payment_address.to_base58(),
        reward_receiver_payment_address: alice.payment_address.to_base58(),
        staking_amount_shard: 1_750,
        auto_re_staking: false,
        committee_public_key: "committee-key".into(),
        meta_type: SHARD_STAKING_META,
    });
    // No inputs, no fee, no privacy: the payment is not materialized.
    let params = TxPrivacyParams::new(alice.spending_key.clone())
        .pay(PaymentInfo::new(bob.payment_address, 5))
        .metadata(staking.clone());
    let tx = builder().build(&params).unwrap();
    assert!(tx.proof.is_none());
    assert_eq!(tx.metadata, Some(staking));
    verify_signature(&tx).unwrap();
}

#[test]
fn test_mistagged_metadata_rejected_before_signing() {
    let alice = KeySet::generate();
    let prover = CountingProver::default();
    let builder = TxBuilder::new(&prover);
    let mistagged = Metadata::StopAutoStaking(StopAutoStakingMetadata {
        committee_public_key: "committee-key".into(),
        meta_type: SHARD_STAKING_META,
    });
    let params = TxPrivacyParams::new(alice.spending_key.clone())
        .spend([mint(&alice, 4)])
        .pay(PaymentInfo::new(alice.payment_address, 4))
        .metadata(mistagged)
        .with_random_snds();
    assert!(matches!(
        builder.build(&params).unwrap_err(),
        BuildError::Validation(ValidationError::MetadataTypeMismatch(SHARD_STAKING_META))
    ));
    assert_eq!(prover.witnesses.load(Ordering::SeqCst), 0);
}

#[test]
fn test_hash_is_idempotent_and_cached() {
    let alice = KeySet::generate();
    let tx = builder()
        .build(&TxPrivacyParams::new(alice.spending_key.clone()).lock_time(77))
        .unwrap();
    let first = tx.hash();
    let second = tx.hash();
    assert!(std::ptr::eq(first, second));
    assert_eq!(*first, tx.compute_hash());
    assert_eq!(tx.actual_size(), tx.tx().actual_size());
}

#[test]
fn test_json_round_trip_with_metadata() {
    let alice = KeySet::generate();
    let staking = Metadata::Staking(StakingMetadata {
        funder_payment_address: alice.payment_address.to_base58(),
        reward_receiver_payment_address: alice.payment_address.to_base58(),
        staking_amount_shard: 1_750,
        auto_re_staking: true,
        committee_public_key: "committee-key".into(),
        meta_type: SHARD_STAKING_META,
    });
    let params = TxPrivacyParams::new(alice.spending_key.clone())
        .spend([mint(&alice, 2_000)])
        .pay(PaymentInfo::new(alice.payment_address, 1_750))
        .fee(50)
        .metadata(staking.clone())
        .info(b"stake".to_vec())
        .with_random_snds();
    let tx = builder().build(&params).unwrap();

    let back = SignedTx::from_json(&tx.to_json()).unwrap();
    assert_eq!(back.hash(), tx.hash());
    assert_eq!(back.metadata, Some(staking));
    assert_eq!(back.info, b"stake");
    verify_signature(&back).unwrap();
}

#[test]
fn test_concurrent_builds_share_one_builder() {
    let builder = builder();
    let hashes: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                s.spawn(|| {
                    let ks = KeySet::generate();
                    let params = TxPrivacyParams::new(ks.spending_key.clone())
                        .spend([mint(&ks, 9)])
                        .pay(PaymentInfo::new(ks.payment_address, 9))
                        .with_random_snds();
                    *builder.build(&params).unwrap().hash()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(hashes.len(), 4);
    for (i, a) in hashes.iter().enumerate() {
        for b in &hashes[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

// ---------------------------------------------------------------------------
// Token transactions
// ---------------------------------------------------------------------------

fn token_request(alice: &KeySet, token: CustomTokenParams) -> TxPrivacyTokenParams {
    let native = TxPrivacyParams::new(alice.spending_key.clone())
        .spend([mint(alice, 50)])
        .fee(10);
    TxPrivacyTokenParams::new(native, token).with_random_snds()
}

#[test]
fn test_mintable_init_uses_hex_property_id() {
    let alice = KeySet::generate();
    let bob = KeySet::generate();
    let hex_id = "0102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f20";
    let params = token_request(
        &alice,
        CustomTokenParams {
            property_id: hex_id.into(),
            property_name: "Bond".into(),
            property_symbol: "BND".into(),
            amount: 1_000_000,
            token_tx_type: TokenAction::Init.into(),
            receivers: vec![PaymentInfo::new(bob.payment_address, 1_000_000)],
            mintable: true,
            ..CustomTokenParams::default()
        },
    );

    let token_tx = builder().build_token(&params).unwrap();
    let expected: Vec<u8> = (1..=32).collect();
    assert_eq!(token_tx.token_data().property_id.as_bytes().to_vec(), expected);
    assert_eq!(token_tx.tx().tx_type, TxType::TokenPrivacy);
    verify_token_tx(&token_tx).unwrap();
}

#[test]
fn test_non_mintable_init_derives_property_id() {
    let alice = KeySet::generate();
    let bob = KeySet::generate();
    let params = token_request(
        &alice,
        CustomTokenParams {
            property_name: "Bond".into(),
            property_symbol: "BND".into(),
            amount: 500,
            token_tx_type: TokenAction::Init.into(),
            receivers: vec![PaymentInfo::new(bob.payment_address, 500)],
            ..CustomTokenParams::default()
        },
    );

    let token_tx = builder().build_token(&params).unwrap();
    let data = token_tx.token_data();
    let token_hash = data.hash();
    let expected = hash_h_multi(&[token_hash.as_bytes().as_slice(), &[alice.shard_id()]]);
    assert_eq!(data.property_id, expected);
}

#[test]
fn test_transfer_fee_is_independent_of_outer_fee() {
    let alice = KeySet::generate();
    let bob = KeySet::generate();
    let transfer = |outer_fee: u64, token_fee: u64| {
        let native = TxPrivacyParams::new(alice.spending_key.clone())
            .spend([mint(&alice, 100)])
            .fee(outer_fee);
        let token = CustomTokenParams {
            property_id: "aa".repeat(32),
            token_tx_type: TokenAction::Transfer.into(),
            receivers: vec![PaymentInfo::new(bob.payment_address, 60)],
            token_input: vec![mint(&alice, 80)],
            fee: token_fee,
            ..CustomTokenParams::default()
        };
        builder()
            .build_token(&TxPrivacyTokenParams::new(native, token).with_random_snds())
            .unwrap()
    };

    let a = transfer(10, 3);
    let b = transfer(20, 3);
    let c = transfer(10, 7);
    assert_eq!(a.token_data().tx_normal.fee, 3);
    assert_eq!(b.token_data().tx_normal.fee, 3);
    assert_eq!(c.token_data().tx_normal.fee, 7);
    assert_eq!(a.tx().fee, 10);
    assert_eq!(c.tx().fee, 10);

    // Token balance: 80 in = 60 + change + token fee.
    for t in [&a, &c] {
        let inner = &t.token_data().tx_normal;
        assert_eq!(output_sum(inner) + inner.fee, 80);
    }
}

#[test]
fn test_cross_shard_action_is_unhandled() {
    let alice = KeySet::generate();
    let params = token_request(
        &alice,
        CustomTokenParams {
            token_tx_type: TokenAction::CrossShard.into(),
            ..CustomTokenParams::default()
        },
    );
    assert!(matches!(
        builder().build_token(&params).unwrap_err(),
        BuildError::Validation(ValidationError::UnhandledTokenAction(2))
    ));
}

#[test]
fn test_token_tx_survives_json() {
    let alice = KeySet::generate();
    let bob = KeySet::generate();
    let params = token_request(
        &alice,
        CustomTokenParams {
            property_name: "Gem".into(),
            property_symbol: "GEM".into(),
            amount: 12,
            token_tx_type: TokenAction::Init.into(),
            receivers: vec![PaymentInfo::new(bob.payment_address, 12)],
            ..CustomTokenParams::default()
        },
    );
    let token_tx = builder().build_token(&params).unwrap();
    let back = TxCustomTokenPrivacy::from_json(&token_tx.to_json()).unwrap();
    assert_eq!(back.hash(), token_tx.hash());
    verify_token_tx(&back).unwrap();
}

#[test]
fn test_tight_config_applies_to_token_estimate() {
    let alice = KeySet::generate();
    let bob = KeySet::generate();
    let tight = TxBuilder::new(ReferenceProver::new()).with_config(BuilderConfig {
        max_tx_size_kb: 1,
        ..BuilderConfig::default()
    });
    let params = token_request(
        &alice,
        CustomTokenParams {
            property_name: "Gem".into(),
            property_symbol: "GEM".into(),
            amount: 12,
            token_tx_type: TokenAction::Init.into(),
            receivers: vec![PaymentInfo::new(bob.payment_address, 12)],
            ..CustomTokenParams::default()
        },
    );
    assert!(matches!(
        tight.build_token(&params).unwrap_err(),
        BuildError::Validation(ValidationError::TxTooLarge { .. })
    ));
}
