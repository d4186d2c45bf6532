//! # Reference Prover
//!
//! A transparent implementation of the [`Prover`] boundary. It performs
//! every check a real payment proof attests to, in the clear:
//!
//! 1. **Shape**: each output carries a recipient key and an SND; each input
//!    carries its openings.
//! 2. **Ownership**: every input belongs to the spending key.
//! 3. **Membership** (privacy mode): each input's commitment sits at its
//!    declared position inside its ring.
//! 4. **Balance**: `Σ inputs == Σ outputs + fee`, no overflow.
//!
//! Then it stages the witness (fresh output randomness, output commitments,
//! input serial numbers, a blinding scalar when privacy is on) and binds
//! the public parts with a transcript hash.
//!
//! **It provides no zero-knowledge.** It exists so the assembly pipeline
//! can be exercised end to end. A production deployment plugs a real
//! proof engine into the same trait.

use curve25519_dalek::scalar::Scalar;
use tracing::debug;

use super::commitment::serial_number;
use super::{PaymentProof, PaymentWitness, PaymentWitnessParams, Prover, ProverError};
use crate::coin::{InputCoin, OutputCoin};
use crate::config::{shard_id_from_last_byte, COMMITMENT_RING_SIZE};
use crate::crypto::hash::{hash_h, Hash32};
use crate::crypto::random_scalar;

const TRANSCRIPT_DOMAIN: &[u8] = b"cloak-reference-proof";

/// Transparent stand-in proof engine.
#[derive(Clone, Debug)]
pub struct ReferenceProver {
    ring_size: usize,
}

impl Default for ReferenceProver {
    fn default() -> Self {
        Self {
            ring_size: COMMITMENT_RING_SIZE,
        }
    }
}

impl ReferenceProver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ring_size(ring_size: usize) -> Self {
        Self { ring_size }
    }

    pub fn ring_size(&self) -> usize {
        self.ring_size
    }

    fn check_ring(&self, params: &PaymentWitnessParams) -> Result<(), ProverError> {
        if params.commitments.len() != params.commitment_indices.len() {
            return Err(ProverError::MalformedRing {
                input: 0,
                reason: format!(
                    "{} commitments for {} indices",
                    params.commitments.len(),
                    params.commitment_indices.len()
                ),
            });
        }
        for (i, input) in params.input_coins.iter().enumerate() {
            let mine = params
                .my_commitment_indices
                .get(i)
                .copied()
                .ok_or(ProverError::MissingField("own ring index"))? as usize;
            if mine >= self.ring_size {
                return Err(ProverError::MalformedRing {
                    input: i,
                    reason: format!("own index {mine} outside ring of {}", self.ring_size),
                });
            }
            let member = params.commitments.get(i * self.ring_size + mine);
            if member.is_none() || member != input.coin.commitment.as_ref() {
                return Err(ProverError::MalformedRing {
                    input: i,
                    reason: "input commitment is not at its declared position".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn checked_sum(mut values: impl Iterator<Item = u64>) -> Result<u64, ProverError> {
    values.try_fold(0u64, |acc, v| acc.checked_add(v).ok_or(ProverError::Overflow))
}

fn transcript(witness: &PaymentWitness, has_privacy: bool) -> Hash32 {
    let mut buf = Vec::with_capacity(64 + 32 * (witness.input_coins.len() + witness.output_coins.len()));
    buf.extend_from_slice(TRANSCRIPT_DOMAIN);
    buf.push(u8::from(has_privacy));
    buf.extend_from_slice(&witness.fee.to_le_bytes());
    buf.extend_from_slice(witness.asset_id.as_bytes());
    for input in &witness.input_coins {
        if let Some(sn) = &input.coin.serial_number {
            buf.extend_from_slice(sn.as_bytes());
        }
    }
    for output in &witness.output_coins {
        if let Some(cm) = &output.coin.commitment {
            buf.extend_from_slice(cm.as_bytes());
        }
    }
    for index in &witness.commitment_indices {
        buf.extend_from_slice(&index.to_le_bytes());
    }
    hash_h(&buf)
}

impl Prover for ReferenceProver {
    fn build_witness(&self, params: &PaymentWitnessParams) -> Result<PaymentWitness, ProverError> {
        let sk = *params.private_key.scalar();
        let owner = params.private_key.public_point().compress();

        for (i, input) in params.input_coins.iter().enumerate() {
            if input.coin.public_key != Some(owner) {
                return Err(ProverError::NotOwner(i));
            }
        }
        if params.has_privacy {
            self.check_ring(params)?;
        }

        let sum_in = checked_sum(params.input_coins.iter().map(InputCoin::value))?;
        let sum_out = checked_sum(params.output_coins.iter().map(OutputCoin::value))?;
        let spent = sum_out.checked_add(params.fee).ok_or(ProverError::Overflow)?;
        if sum_in != spent {
            return Err(ProverError::Unbalanced {
                inputs: sum_in,
                outputs: sum_out,
                fee: params.fee,
            });
        }

        let mut input_coins = params.input_coins.clone();
        for input in &mut input_coins {
            let snd = input
                .coin
                .snd
                .ok_or(ProverError::MissingField("input serial-number derivator"))?;
            let sn = serial_number(&sk, &snd).ok_or(ProverError::MissingField("serial number"))?;
            input.coin.serial_number = Some(sn.compress());
        }

        let mut output_coins = params.output_coins.clone();
        for output in &mut output_coins {
            let shard = output
                .coin
                .pk_last_byte()
                .map(shard_id_from_last_byte)
                .ok_or(ProverError::MissingField("output public key"))?;
            if output.coin.snd.is_none() {
                return Err(ProverError::MissingField("output serial-number derivator"));
            }
            output.coin.randomness = Some(random_scalar());
            if !output.coin.commit(shard) {
                return Err(ProverError::MissingField("decodable output public key"));
            }
        }

        let rand_secret_key = if params.has_privacy {
            random_scalar()
        } else {
            Scalar::ZERO
        };

        debug!(
            inputs = input_coins.len(),
            outputs = output_coins.len(),
            fee = params.fee,
            has_privacy = params.has_privacy,
            "witness staged"
        );

        Ok(PaymentWitness::new(
            params.has_privacy,
            input_coins,
            output_coins,
            params.commitment_indices.clone(),
            params.fee,
            params.asset_id,
            rand_secret_key,
        ))
    }

    fn prove(
        &self,
        witness: &PaymentWitness,
        has_privacy: bool,
    ) -> Result<PaymentProof, ProverError> {
        let indices = if has_privacy {
            witness.commitment_indices.clone()
        } else {
            Vec::new()
        };
        Ok(PaymentProof::new(
            witness.input_coins.clone(),
            witness.output_coins.clone(),
            indices,
            transcript(witness, has_privacy && witness.has_privacy),
        ))
    }
}
