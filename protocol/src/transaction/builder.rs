//! Native transaction assembly.
//!
//! [`TxBuilder`] turns a [`TxPrivacyParams`] request into a signed,
//! finalized [`SignedTx`]. It owns no chain state and does no I/O; the only
//! collaborator is the [`Prover`] it was constructed with. The pipeline:
//!
//! ```text
//!  1. bounds       input/payment counts, info length, size estimate
//!  2. asset        default to the native asset id
//!  3. keys         derive the keyset, stamp the sender's shard
//!  4. degenerate   nothing to prove? sign an empty-proof tx and stop
//!  5. ring         ring shape (privacy mode only)
//!  6. balance      Σin − Σout − fee; negative fails, positive makes change
//!  7. outputs      one coin per payment (+ change), SND per output
//!  8. prove        build_witness + prove
//!  9. redact       seal outputs, strip inputs (privacy mode only)
//! 10. sign         one-time Schnorr signature, finalize
//! ```
//!
//! Any failure aborts the build. Nothing half-built ever escapes.

use chrono::Utc;
use curve25519_dalek::ristretto::CompressedRistretto;
use curve25519_dalek::scalar::Scalar;
use tracing::{debug, info, info_span, warn, Span};

use super::error::{BuildError, ValidationError};
use super::signing::sign_tx;
use super::size::{estimate_tx_size, EstimateTxSizeParams};
use super::token::CustomTokenParams;
use super::tx::{SignedTx, Tx};
use super::types::TxType;
use crate::coin::{InputCoin, OutputCoin, PaymentInfo};
use crate::config::{BuilderConfig, MAX_SIZE_INFO_COIN, MAX_TX_INFO_SIZE, NATIVE_ASSET_ID, TX_VERSION};
use crate::crypto::hash::Hash32;
use crate::crypto::keys::{decode_point, KeySet, SpendingKey};
use crate::crypto::random_scalar;
use crate::crypto::schnorr::SigningSecret;
use crate::metadata::Metadata;
use crate::zkp::{PaymentWitnessParams, Prover};

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Decoy ring for privacy-mode inputs.
///
/// `commitments` and `commitment_indices` hold `inputs × ring_size`
/// entries grouped per input; `my_commitment_indices` holds, per input, the
/// position of the real commitment inside its ring.
#[derive(Debug, Clone, Default)]
pub struct RingParams {
    pub commitments: Vec<CompressedRistretto>,
    pub commitment_indices: Vec<u64>,
    pub my_commitment_indices: Vec<u64>,
}

/// Everything needed to build one native transaction.
#[derive(Debug, Clone)]
pub struct TxPrivacyParams {
    pub sender_sk: SpendingKey,
    pub payment_infos: Vec<PaymentInfo>,
    pub input_coins: Vec<InputCoin>,
    pub fee: u64,
    pub has_privacy: bool,
    /// `None` means the native asset.
    pub asset_id: Option<Hash32>,
    pub metadata: Option<Metadata>,
    pub info: Vec<u8>,
    /// Unix seconds. `None` means "now".
    pub lock_time: Option<i64>,
    pub ring: RingParams,
    /// One serial-number derivator per output coin, change included, in
    /// output order. See [`TxPrivacyParams::output_count`].
    pub snd_outputs: Vec<Scalar>,
}

impl TxPrivacyParams {
    pub fn new(sender_sk: SpendingKey) -> Self {
        Self {
            sender_sk,
            payment_infos: Vec::new(),
            input_coins: Vec::new(),
            fee: 0,
            has_privacy: false,
            asset_id: None,
            metadata: None,
            info: Vec::new(),
            lock_time: None,
            ring: RingParams::default(),
            snd_outputs: Vec::new(),
        }
    }

    pub fn pay(mut self, payment: PaymentInfo) -> Self {
        self.payment_infos.push(payment);
        self
    }

    pub fn spend(mut self, coins: impl IntoIterator<Item = InputCoin>) -> Self {
        self.input_coins.extend(coins);
        self
    }

    pub fn fee(mut self, fee: u64) -> Self {
        self.fee = fee;
        self
    }

    pub fn privacy(mut self, has_privacy: bool) -> Self {
        self.has_privacy = has_privacy;
        self
    }

    pub fn asset(mut self, asset_id: Hash32) -> Self {
        self.asset_id = Some(asset_id);
        self
    }

    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn info(mut self, info: impl Into<Vec<u8>>) -> Self {
        self.info = info.into();
        self
    }

    pub fn lock_time(mut self, lock_time: i64) -> Self {
        self.lock_time = Some(lock_time);
        self
    }

    pub fn ring(mut self, ring: RingParams) -> Self {
        self.ring = ring;
        self
    }

    pub fn snd_outputs(mut self, snds: Vec<Scalar>) -> Self {
        self.snd_outputs = snds;
        self
    }

    /// Number of output coins a build of these params produces: one per
    /// payment plus a change coin when the inputs exceed payments and fee.
    /// Zero when the build takes the empty-proof path.
    pub fn output_count(&self) -> usize {
        output_count(&self.input_coins, &self.payment_infos, self.fee, self.has_privacy)
    }

    /// Fills `snd_outputs` with one fresh derivator per output coin. Call
    /// after inputs, payments, fee and privacy are final.
    pub fn with_random_snds(mut self) -> Self {
        self.snd_outputs = random_snds(self.output_count());
        self
    }
}

/// Nothing to spend, no fee, no privacy: sign without a proof.
pub(crate) fn is_empty_proof(inputs: &[InputCoin], fee: u64, has_privacy: bool) -> bool {
    inputs.is_empty() && fee == 0 && !has_privacy
}

pub(crate) fn output_count(
    inputs: &[InputCoin],
    payments: &[PaymentInfo],
    fee: u64,
    has_privacy: bool,
) -> usize {
    if is_empty_proof(inputs, fee, has_privacy) {
        return 0;
    }
    let sum_in: u128 = inputs.iter().map(|c| u128::from(c.value())).sum();
    let sum_out: u128 = payments.iter().map(|p| u128::from(p.amount)).sum();
    payments.len() + usize::from(sum_in > sum_out + u128::from(fee))
}

pub(crate) fn random_snds(count: usize) -> Vec<Scalar> {
    (0..count).map(|_| random_scalar()).collect()
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Assembles transactions against a prover.
///
/// Holds no mutable state, so one builder can serve any number of builds,
/// from any number of threads if `P: Sync`.
#[derive(Debug, Clone)]
pub struct TxBuilder<P> {
    prover: P,
    config: BuilderConfig,
    span: Span,
}

impl<P: Prover> TxBuilder<P> {
    pub fn new(prover: P) -> Self {
        Self {
            prover,
            config: BuilderConfig::default(),
            span: info_span!("tx_builder"),
        }
    }

    pub fn with_config(mut self, config: BuilderConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the span every build runs inside.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn prover(&self) -> &P {
        &self.prover
    }

    pub(crate) fn span(&self) -> &Span {
        &self.span
    }

    /// Builds, signs and finalizes a native transaction.
    pub fn build(&self, params: &TxPrivacyParams) -> Result<SignedTx, BuildError> {
        let _entered = self.span.enter();
        let tx = self.assemble(params, None, TxType::Normal)?;
        let signed = tx.finalize()?;
        info!(
            hash = %signed.hash(),
            fee = signed.fee,
            size = signed.actual_size(),
            "transaction built"
        );
        Ok(signed)
    }

    /// The signed-but-not-finalized pipeline, shared with the token builder.
    ///
    /// `token` only feeds the size estimate; `tx_type` is stamped before
    /// signing.
    pub(crate) fn assemble(
        &self,
        params: &TxPrivacyParams,
        token: Option<&CustomTokenParams>,
        tx_type: TxType,
    ) -> Result<Tx, BuildError> {
        let result = self.assemble_inner(params, token, tx_type);
        if let Err(e) = &result {
            warn!(error = %e, "transaction build rejected");
        }
        result
    }

    fn assemble_inner(
        &self,
        params: &TxPrivacyParams,
        token: Option<&CustomTokenParams>,
        tx_type: TxType,
    ) -> Result<Tx, BuildError> {
        // 1. Bounds.
        self.check_bounds(params, token)?;

        // 2. Asset.
        let asset_id = params.asset_id.unwrap_or(NATIVE_ASSET_ID);

        // 3. Keys.
        let keyset = KeySet::from_spending_key(params.sender_sk.clone());
        let mut tx = Tx {
            version: TX_VERSION,
            tx_type,
            lock_time: params.lock_time.unwrap_or_else(|| Utc::now().timestamp()),
            fee: params.fee,
            info: params.info.clone(),
            pub_key_last_byte_sender: keyset.shard_id(),
            metadata: params.metadata.clone(),
            ..Tx::default()
        };
        debug!(
            inputs = params.input_coins.len(),
            payments = params.payment_infos.len(),
            fee = params.fee,
            has_privacy = params.has_privacy,
            asset = %asset_id,
            shard = tx.pub_key_last_byte_sender,
            "assembling transaction"
        );

        // 4. Degenerate: payments are not materialized without a proof.
        if is_empty_proof(&params.input_coins, params.fee, params.has_privacy) {
            debug!("no inputs and no fee, signing empty-proof transaction");
            sign_tx(&mut tx, &SigningSecret::without_blinding(&params.sender_sk))?;
            return Ok(tx);
        }

        // 5. Ring shape.
        if params.has_privacy {
            let expected = params.input_coins.len() * self.config.ring_size;
            if params.ring.commitment_indices.len() != expected {
                return Err(ValidationError::RingCommitmentCount {
                    expected,
                    got: params.ring.commitment_indices.len(),
                }
                .into());
            }
            if params.ring.my_commitment_indices.len() != params.input_coins.len() {
                return Err(ValidationError::RingIndexCount {
                    expected: params.input_coins.len(),
                    got: params.ring.my_commitment_indices.len(),
                }
                .into());
            }
        }

        // 6. Balance.
        let sum_out = params
            .payment_infos
            .iter()
            .try_fold(0u64, |acc, p| acc.checked_add(p.amount))
            .ok_or(ValidationError::AmountOverflow("payments"))?;
        let sum_in = params
            .input_coins
            .iter()
            .try_fold(0u64, |acc, c| acc.checked_add(c.value()))
            .ok_or(ValidationError::AmountOverflow("inputs"))?;
        let over_balance = i128::from(sum_in) - i128::from(sum_out) - i128::from(params.fee);
        if over_balance < 0 {
            return Err(BuildError::InsufficientFunds {
                sum_inputs: sum_in,
                sum_outputs: sum_out,
                fee: params.fee,
                over_balance,
            });
        }
        debug!(sum_in, sum_out, over_balance = %over_balance, "balance checked");

        // 7. Outputs.
        let mut payments = params.payment_infos.clone();
        if over_balance > 0 {
            // over_balance <= sum_in, so it fits in a u64.
            let change = u64::try_from(over_balance).map_err(|_| ValidationError::AmountOverflow("change"))?;
            payments.push(PaymentInfo::new(keyset.payment_address, change));
        }
        let (output_coins, transmission_keys) = self.make_outputs(&payments, &params.snd_outputs)?;

        // 8. Prove.
        let witness_params = PaymentWitnessParams {
            has_privacy: params.has_privacy,
            private_key: params.sender_sk.clone(),
            input_coins: params.input_coins.clone(),
            output_coins,
            pk_last_byte_sender: keyset.pk_last_byte(),
            commitments: params.ring.commitments.clone(),
            commitment_indices: params.ring.commitment_indices.clone(),
            my_commitment_indices: params.ring.my_commitment_indices.clone(),
            fee: params.fee,
            asset_id,
        };
        let witness = self
            .prover
            .build_witness(&witness_params)
            .map_err(|source| BuildError::Prover {
                stage: "building witness",
                source,
                params: format!("{witness_params:?}"),
            })?;
        let mut proof = self
            .prover
            .prove(&witness, params.has_privacy)
            .map_err(|source| BuildError::Prover {
                stage: "proving",
                source,
                params: format!("{witness_params:?}"),
            })?;
        debug!(proof_bytes = proof.to_bytes().len(), "proof produced");

        // 9. Redact.
        let secret = if params.has_privacy {
            let mut outputs = proof.output_coins().to_vec();
            for (output, tk) in outputs.iter_mut().zip(&transmission_keys) {
                output.seal_to(tk)?;
            }
            let mut inputs = proof.input_coins().to_vec();
            inputs.iter_mut().for_each(InputCoin::redact);
            proof.set_output_coins(outputs);
            proof.set_input_coins(inputs);
            debug!("outputs sealed, inputs redacted");
            SigningSecret::with_blinding(&params.sender_sk, witness.rand_secret_key())
        } else {
            SigningSecret::without_blinding(&params.sender_sk)
        };

        // 10. Sign.
        tx.proof = Some(proof);
        sign_tx(&mut tx, &secret)?;
        Ok(tx)
    }

    fn check_bounds(
        &self,
        params: &TxPrivacyParams,
        token: Option<&CustomTokenParams>,
    ) -> Result<(), ValidationError> {
        if params.input_coins.len() > self.config.max_input_coins {
            return Err(ValidationError::TooManyInputs {
                count: params.input_coins.len(),
                max: self.config.max_input_coins,
            });
        }
        if params.payment_infos.len() > self.config.max_payments {
            return Err(ValidationError::TooManyPayments {
                count: params.payment_infos.len(),
                max: self.config.max_payments,
            });
        }
        if params.info.len() > MAX_TX_INFO_SIZE {
            return Err(ValidationError::InfoTooLarge {
                len: params.info.len(),
                max: MAX_TX_INFO_SIZE,
            });
        }
        if let Some(metadata) = &params.metadata {
            if !metadata.round_trips() {
                return Err(ValidationError::MetadataTypeMismatch(metadata.meta_type()));
            }
        }

        let size_kb = estimate_tx_size(
            &self.prover,
            &EstimateTxSizeParams {
                num_input_coins: params.input_coins.len(),
                num_payments: params.payment_infos.len(),
                has_privacy: params.has_privacy,
                metadata: params.metadata.as_ref(),
                token_params: token,
                limit_fee: self.config.limit_fee,
            },
        );
        if size_kb > self.config.max_tx_size_kb {
            return Err(ValidationError::TxTooLarge {
                size_kb,
                max_kb: self.config.max_tx_size_kb,
            });
        }
        Ok(())
    }

    /// One output coin per payment, keyed by the caller's derivators, plus
    /// each recipient's transmission key for sealing.
    fn make_outputs(
        &self,
        payments: &[PaymentInfo],
        snds: &[Scalar],
    ) -> Result<(Vec<OutputCoin>, Vec<[u8; 32]>), ValidationError> {
        if snds.len() != payments.len() {
            return Err(ValidationError::SndCountMismatch {
                expected: payments.len(),
                got: snds.len(),
            });
        }

        let mut coins = Vec::with_capacity(payments.len());
        let mut keys = Vec::with_capacity(payments.len());
        for (index, payment) in payments.iter().enumerate() {
            if payment.message.len() > MAX_SIZE_INFO_COIN {
                return Err(ValidationError::MessageTooLarge {
                    index,
                    len: payment.message.len(),
                    max: MAX_SIZE_INFO_COIN,
                });
            }
            let pk = payment.payment_address.public_key;
            if decode_point(&pk).is_none() {
                return Err(ValidationError::MalformedDestination { index });
            }
            coins.push(OutputCoin::new(
                payment.amount,
                CompressedRistretto(pk),
                snds[index],
                payment.message.clone(),
            ));
            keys.push(payment.payment_address.transmission_key);
        }
        Ok((coins, keys))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
