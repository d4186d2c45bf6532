//! # Zero-Knowledge Proof Boundary
//!
//! The transaction builder never does proof math itself. It talks to a
//! [`Prover`] through three calls:
//!
//! ```text
//! build_witness(params)        -> PaymentWitness   validate + stage inputs
//! prove(witness, has_privacy)  -> PaymentProof     produce the artifact
//! estimate_proof_size(i, o, p) -> bytes            pure size model
//! ```
//!
//! Everything on the builder's side of that line only needs accessors on
//! [`PaymentProof`]: get/set the input coins, get/set the output coins,
//! serialize to bytes. That is what keeps the proof engine swappable.
//!
//! ## Architecture
//!
//! ```text
//! mod.rs          — Prover trait, witness params, PaymentProof, size model
//! commitment.rs   — Pedersen generators, commit_all, serial numbers
//! prover.rs       — ReferenceProver (transparent stand-in engine)
//! ```
//!
//! ## Size model
//!
//! [`estimate_proof_size`] mirrors the component layout of a one-out-of-many
//! + serial-number + aggregated-range-proof payment proof. Every term is
//! non-decreasing in both coin counts, so the size estimator built on top
//! of it is monotonic too.

pub mod commitment;
pub mod prover;

use curve25519_dalek::ristretto::CompressedRistretto;
use curve25519_dalek::scalar::Scalar;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coin::{InputCoin, OutputCoin};
use crate::config::{COMMITMENT_RING_SIZE, POINT_SIZE, SCALAR_SIZE};
use crate::crypto::hash::Hash32;
use crate::crypto::keys::SpendingKey;

pub use commitment::{commit_all, generators, serial_number, PedersenGenerators};
pub use prover::ReferenceProver;

/// Errors reported across the prover boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProverError {
    #[error("witness is missing {0}")]
    MissingField(&'static str),

    #[error("ring for input {input} is malformed: {reason}")]
    MalformedRing { input: usize, reason: String },

    #[error("input {0} is not owned by the spending key")]
    NotOwner(usize),

    #[error("balance mismatch: inputs {inputs} != outputs {outputs} + fee {fee}")]
    Unbalanced { inputs: u64, outputs: u64, fee: u64 },

    #[error("amount overflow while summing coins")]
    Overflow,

    #[error("malformed proof bytes: {0}")]
    MalformedProof(String),
}

// ---------------------------------------------------------------------------
// Witness
// ---------------------------------------------------------------------------

/// Everything a prover needs to build a payment witness.
///
/// `Debug` is safe to print: the spending key renders as `<redacted>`.
/// The builder relies on this when it attaches params to a prover error.
#[derive(Clone, Debug)]
pub struct PaymentWitnessParams {
    pub has_privacy: bool,
    pub private_key: SpendingKey,
    pub input_coins: Vec<InputCoin>,
    pub output_coins: Vec<OutputCoin>,
    /// Raw last byte of the sender's public key.
    pub pk_last_byte_sender: u8,
    /// Ring members, `input count × ring size` of them, grouped per input.
    pub commitments: Vec<CompressedRistretto>,
    pub commitment_indices: Vec<u64>,
    /// Position of the real commitment inside each input's ring.
    pub my_commitment_indices: Vec<u64>,
    pub fee: u64,
    /// Asset the coins are denominated in.
    pub asset_id: Hash32,
}

/// A validated, staged witness.
///
/// Output coins have their randomness and commitments filled in, input
/// coins their serial numbers. `rand_secret_key` is the blinding scalar the
/// signer folds into the one-time key in privacy mode (zero otherwise).
#[derive(Clone, Debug)]
pub struct PaymentWitness {
    pub(crate) has_privacy: bool,
    pub(crate) input_coins: Vec<InputCoin>,
    pub(crate) output_coins: Vec<OutputCoin>,
    pub(crate) commitment_indices: Vec<u64>,
    pub(crate) fee: u64,
    pub(crate) asset_id: Hash32,
    rand_secret_key: Scalar,
}

impl PaymentWitness {
    pub(crate) fn new(
        has_privacy: bool,
        input_coins: Vec<InputCoin>,
        output_coins: Vec<OutputCoin>,
        commitment_indices: Vec<u64>,
        fee: u64,
        asset_id: Hash32,
        rand_secret_key: Scalar,
    ) -> Self {
        Self {
            has_privacy,
            input_coins,
            output_coins,
            commitment_indices,
            fee,
            asset_id,
            rand_secret_key,
        }
    }

    /// Blinding scalar for the one-time signing key.
    pub fn rand_secret_key(&self) -> Scalar {
        self.rand_secret_key
    }
}

// ---------------------------------------------------------------------------
// Proof
// ---------------------------------------------------------------------------

/// The proof artifact attached to a transaction.
///
/// Opaque to the builder apart from the coin accessors and
/// [`to_bytes`](Self::to_bytes).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentProof {
    input_coins: Vec<InputCoin>,
    output_coins: Vec<OutputCoin>,
    commitment_indices: Vec<u64>,
    transcript: Hash32,
}

impl PaymentProof {
    pub(crate) fn new(
        input_coins: Vec<InputCoin>,
        output_coins: Vec<OutputCoin>,
        commitment_indices: Vec<u64>,
        transcript: Hash32,
    ) -> Self {
        Self {
            input_coins,
            output_coins,
            commitment_indices,
            transcript,
        }
    }

    pub fn input_coins(&self) -> &[InputCoin] {
        &self.input_coins
    }

    pub fn set_input_coins(&mut self, coins: Vec<InputCoin>) {
        self.input_coins = coins;
    }

    pub fn output_coins(&self) -> &[OutputCoin] {
        &self.output_coins
    }

    pub fn set_output_coins(&mut self, coins: Vec<OutputCoin>) {
        self.output_coins = coins;
    }

    pub fn commitment_indices(&self) -> &[u64] {
        &self.commitment_indices
    }

    pub fn transcript(&self) -> &Hash32 {
        &self.transcript
    }

    /// Canonical byte form (bincode).
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("proof serialization must not fail")
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProverError> {
        bincode::deserialize(bytes).map_err(|e| ProverError::MalformedProof(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Prover trait
// ---------------------------------------------------------------------------

/// The proof engine as seen by the transaction builder.
pub trait Prover {
    /// Validates `params` and stages a witness. Never mutates the caller's
    /// coins; the staged copies live in the returned witness.
    fn build_witness(&self, params: &PaymentWitnessParams) -> Result<PaymentWitness, ProverError>;

    fn prove(&self, witness: &PaymentWitness, has_privacy: bool)
        -> Result<PaymentProof, ProverError>;

    /// Estimated serialized proof size in bytes. Must be pure.
    fn estimate_proof_size(&self, input_count: usize, output_count: usize, has_privacy: bool) -> u64 {
        estimate_proof_size(input_count, output_count, has_privacy)
    }
}

impl<P: Prover + ?Sized> Prover for &P {
    fn build_witness(&self, params: &PaymentWitnessParams) -> Result<PaymentWitness, ProverError> {
        (**self).build_witness(params)
    }

    fn prove(
        &self,
        witness: &PaymentWitness,
        has_privacy: bool,
    ) -> Result<PaymentProof, ProverError> {
        (**self).prove(witness, has_privacy)
    }

    fn estimate_proof_size(&self, input_count: usize, output_count: usize, has_privacy: bool) -> u64 {
        (**self).estimate_proof_size(input_count, output_count, has_privacy)
    }
}

// ---------------------------------------------------------------------------
// Size model
// ---------------------------------------------------------------------------

/// Per-component widths, in bytes.
const ONE_OF_MANY_PROOF_SIZE: u64 = 716;
const SN_PRIVACY_PROOF_SIZE: u64 = 320;
const SN_NO_PRIVACY_PROOF_SIZE: u64 = 192;
const INPUT_COIN_PRIVACY_SIZE: u64 = 40;
const OUTPUT_COIN_PRIVACY_SIZE: u64 = 223;
const INPUT_COIN_NO_PRIVACY_SIZE: u64 = 180;
const OUTPUT_COIN_NO_PRIVACY_SIZE: u64 = 158;
/// Bits per range-proof value.
const RANGE_BITS: u64 = 64;
/// One length byte per variable-size proof component.
const LENGTH_PREFIXES: u64 = 14;

/// Size of an aggregated range proof over `output_count` values.
fn estimate_range_proof_size(output_count: usize) -> u64 {
    if output_count == 0 {
        return 0;
    }
    let padded = (output_count as u64).next_power_of_two();
    let rounds = u64::from((RANGE_BITS * padded).trailing_zeros());
    (output_count as u64 + 2 * rounds + 5) * POINT_SIZE as u64 + 5 * SCALAR_SIZE as u64 + 2
}

/// Estimated proof size for the given coin counts.
pub fn estimate_proof_size(input_count: usize, output_count: usize, has_privacy: bool) -> u64 {
    if input_count == 0 && output_count == 0 {
        return 0;
    }
    let n_in = input_count as u64;
    let n_out = output_count as u64;
    let point = POINT_SIZE as u64;

    if !has_privacy {
        return n_out * OUTPUT_COIN_NO_PRIVACY_SIZE
            + n_in * INPUT_COIN_NO_PRIVACY_SIZE
            + n_in * SN_NO_PRIVACY_PROOF_SIZE
            + LENGTH_PREFIXES;
    }

    let coins = n_out * OUTPUT_COIN_PRIVACY_SIZE + n_in * INPUT_COIN_PRIVACY_SIZE;
    let proofs = n_in * ONE_OF_MANY_PROOF_SIZE
        + n_in * SN_PRIVACY_PROOF_SIZE
        + estimate_range_proof_size(output_count);
    // Output value/SND/shard commitments, input value/SND commitments, plus
    // the shared input SK and shard commitments.
    let commitments = 3 * n_out * point + 2 * n_in * point + 2 * point;
    let indices = n_in * COMMITMENT_RING_SIZE as u64 * 8;

    coins + proofs + commitments + indices + LENGTH_PREFIXES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_proof_is_free() {
        assert_eq!(estimate_proof_size(0, 0, true), 0);
        assert_eq!(estimate_proof_size(0, 0, false), 0);
    }

    #[test]
    fn test_privacy_costs_more() {
        for (i, o) in [(1, 1), (2, 3), (10, 2)] {
            assert!(estimate_proof_size(i, o, true) > estimate_proof_size(i, o, false));
        }
    }

    #[test]
    fn test_range_proof_grows_with_outputs() {
        let mut prev = 0;
        for n in 1..40 {
            let size = estimate_range_proof_size(n);
            assert!(size >= prev, "range proof shrank at {n}");
            prev = size;
        }
    }

    #[test]
    fn test_monotonic_small_grid() {
        for privacy in [false, true] {
            for i in 0..12 {
                for o in 0..12 {
                    let base = estimate_proof_size(i, o, privacy);
                    assert!(estimate_proof_size(i + 1, o, privacy) >= base);
                    assert!(estimate_proof_size(i, o + 1, privacy) >= base);
                }
            }
        }
    }

    #[test]
    fn test_proof_bytes_round_trip() {
        let proof = PaymentProof::new(vec![InputCoin::default()], vec![], vec![1, 2, 3], Hash32::ZERO);
        let back = PaymentProof::from_bytes(&proof.to_bytes()).unwrap();
        assert_eq!(back, proof);
        assert!(PaymentProof::from_bytes(&[0xff; 3]).is_err());
    }
}
