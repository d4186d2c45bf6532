//! Custom-token transactions.
//!
//! A token transaction is two transactions travelling together:
//!
//! ```text
//! TxCustomTokenPrivacy
//! ├── tx           outer native tx (type "tp"), pays the network fee
//! └── token_data
//!     ├── tx_normal    inner tx moving the token itself
//!     ├── property_id  32-byte token identity
//!     └── name, symbol, action, mintable, amount
//! ```
//!
//! The outer transaction is always built first. Then exactly one branch
//! runs, chosen by the action tag:
//!
//! - **init** mints `amount` to the first receiver in a single hand-made
//!   output. The property id is either caller supplied (mintable tokens) or
//!   derived from the token data hash and the shard.
//! - **transfer** reruns the native pipeline with the token as the asset and
//!   the token fee as the fee.
//!
//! Cross-shard receipts are produced by the chain, never by a wallet, so
//! that tag is rejected like any unknown one.

use std::str::FromStr;

use chrono::Utc;
use curve25519_dalek::ristretto::CompressedRistretto;
use curve25519_dalek::scalar::Scalar;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::builder::{output_count, random_snds, RingParams, TxBuilder, TxPrivacyParams};
use super::error::{BuildError, EncodingError, StateError, ValidationError};
use super::signing::sign_tx;
use super::tx::{SignedTx, Tx};
use super::types::{TokenAction, TxType};
use crate::coin::{InputCoin, OutputCoin, PaymentInfo};
use crate::config::{shard_id_from_last_byte, MAX_SIZE_INFO_COIN, TX_VERSION};
use crate::crypto::hash::{hash_h, hash_h_multi, hash_to_point, Hash32};
use crate::crypto::keys::{decode_point, KeySet};
use crate::crypto::random_scalar;
use crate::crypto::schnorr::SigningSecret;
use crate::metadata::parse_metadata;
use crate::zkp::{PaymentProof, Prover};

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// The token half of a token transaction request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomTokenParams {
    /// Hex property id. Required for transfers and mintable inits.
    #[serde(rename = "TokenID", default)]
    pub property_id: String,
    #[serde(rename = "TokenName", default)]
    pub property_name: String,
    #[serde(rename = "TokenSymbol", default)]
    pub property_symbol: String,
    #[serde(rename = "TokenAmount", default)]
    pub amount: u64,
    /// Raw action tag; see [`TokenAction`].
    #[serde(rename = "TokenTxType", default)]
    pub token_tx_type: i32,
    #[serde(rename = "TokenReceiver", default)]
    pub receivers: Vec<PaymentInfo>,
    #[serde(rename = "TokenInput", default)]
    pub token_input: Vec<InputCoin>,
    #[serde(rename = "TokenMintable", default)]
    pub mintable: bool,
    #[serde(rename = "TokenFee", default)]
    pub fee: u64,
}

/// A full token transaction request.
#[derive(Debug, Clone)]
pub struct TxPrivacyTokenParams {
    /// The fee-paying outer transaction.
    pub native: TxPrivacyParams,
    pub token: CustomTokenParams,
    /// Privacy flag for the inner transfer.
    pub has_privacy_token: bool,
    /// Ring for the token inputs of a private transfer.
    pub token_ring: RingParams,
    pub token_snd_outputs: Vec<Scalar>,
    /// Shard mixed into a derived property id. Defaults to the sender's.
    pub shard_id: Option<u8>,
}

impl TxPrivacyTokenParams {
    pub fn new(native: TxPrivacyParams, token: CustomTokenParams) -> Self {
        Self {
            native,
            token,
            has_privacy_token: false,
            token_ring: RingParams::default(),
            token_snd_outputs: Vec::new(),
            shard_id: None,
        }
    }

    /// Fills fresh derivators for the outer tx and for a token transfer.
    /// Call once inputs, payments and fees on both halves are final.
    pub fn with_random_snds(mut self) -> Self {
        self.native = self.native.with_random_snds();
        self.token_snd_outputs = random_snds(output_count(
            &self.token.token_input,
            &self.token.receivers,
            self.token.fee,
            self.has_privacy_token,
        ));
        self
    }
}

// ---------------------------------------------------------------------------
// Token data
// ---------------------------------------------------------------------------

/// The token sub-transaction and the token's descriptive fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxPrivacyTokenData {
    #[serde(rename = "TxNormal")]
    pub tx_normal: SignedTx,
    #[serde(rename = "PropertyID")]
    pub property_id: Hash32,
    #[serde(rename = "PropertyName")]
    pub property_name: String,
    #[serde(rename = "PropertySymbol")]
    pub property_symbol: String,
    #[serde(rename = "Type")]
    pub action: TokenAction,
    #[serde(rename = "Mintable")]
    pub mintable: bool,
    #[serde(rename = "Amount")]
    pub amount: u64,
}

impl TxPrivacyTokenData {
    /// Hash of the descriptive fields and the inner coin list.
    ///
    /// The property id is not part of it, which is what lets an init derive
    /// the id from this hash.
    pub fn hash(&self) -> Hash32 {
        let mut record = Vec::with_capacity(256);
        record.extend_from_slice(self.property_name.as_bytes());
        record.extend_from_slice(self.property_symbol.as_bytes());
        record.extend_from_slice(self.amount.to_string().as_bytes());
        if let Some(proof) = &self.tx_normal.proof {
            for output in proof.output_coins() {
                if let Some(pk) = &output.coin.public_key {
                    record.extend_from_slice(pk.as_bytes());
                }
                record.extend_from_slice(output.value().to_string().as_bytes());
            }
            for input in proof.input_coins() {
                if let Some(pk) = &input.coin.public_key {
                    record.extend_from_slice(pk.as_bytes());
                }
                if input.value() > 0 {
                    record.extend_from_slice(input.value().to_string().as_bytes());
                }
            }
        }
        Hash32::new(hash_to_point(&record).compress().to_bytes())
    }
}

// ---------------------------------------------------------------------------
// Token transaction
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
struct TokenTxWire {
    #[serde(flatten)]
    tx: Tx,
    #[serde(rename = "TxTokenPrivacyData")]
    token_data: TxPrivacyTokenData,
}

/// Outer fee-paying transaction plus the token sub-transaction.
///
/// Immutable once constructed; the composite hash is computed once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "TokenTxWire", try_from = "TokenTxWire")]
pub struct TxCustomTokenPrivacy {
    tx: SignedTx,
    token_data: TxPrivacyTokenData,
    hash: Hash32,
}

impl TxCustomTokenPrivacy {
    pub fn new(tx: SignedTx, token_data: TxPrivacyTokenData) -> Self {
        let hash = composite_hash(&tx, &token_data);
        Self {
            tx,
            token_data,
            hash,
        }
    }

    /// `H(hex(outer hash) ‖ hex(token data hash) ‖ metadata hash bytes)`.
    pub fn hash(&self) -> &Hash32 {
        &self.hash
    }

    pub fn tx(&self) -> &SignedTx {
        &self.tx
    }

    pub fn token_data(&self) -> &TxPrivacyTokenData {
        &self.token_data
    }

    pub fn from_json(json: &str) -> Result<Self, BuildError> {
        let mut value: Value = serde_json::from_str(json).map_err(EncodingError::from)?;
        let raw_metadata = value
            .as_object_mut()
            .and_then(|obj| obj.remove("Metadata"))
            .unwrap_or(Value::Null);
        let metadata = parse_metadata(raw_metadata)?;

        let mut wire: TokenTxWire = serde_json::from_value(value).map_err(EncodingError::from)?;
        wire.tx.metadata = metadata;
        Ok(Self::try_from(wire)?)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("token tx serialization must not fail")
    }
}

fn composite_hash(tx: &SignedTx, token_data: &TxPrivacyTokenData) -> Hash32 {
    let mut record = tx.hash().to_hex().into_bytes();
    record.extend_from_slice(token_data.hash().to_hex().as_bytes());
    if let Some(metadata) = &tx.metadata {
        record.extend_from_slice(metadata.hash().as_bytes());
    }
    hash_h(&record)
}

impl From<TxCustomTokenPrivacy> for TokenTxWire {
    fn from(token_tx: TxCustomTokenPrivacy) -> Self {
        Self {
            tx: token_tx.tx.into_inner(),
            token_data: token_tx.token_data,
        }
    }
}

impl TryFrom<TokenTxWire> for TxCustomTokenPrivacy {
    type Error = StateError;

    fn try_from(wire: TokenTxWire) -> Result<Self, Self::Error> {
        Ok(Self::new(wire.tx.finalize()?, wire.token_data))
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

fn parse_property_id(hex_id: &str) -> Result<Hash32, ValidationError> {
    Hash32::from_str(hex_id).map_err(|_| ValidationError::MalformedPropertyId(hex_id.to_string()))
}

impl<P: Prover> TxBuilder<P> {
    /// Builds a token transaction: outer fee-paying tx, then the init or
    /// transfer branch.
    pub fn build_token(
        &self,
        params: &TxPrivacyTokenParams,
    ) -> Result<TxCustomTokenPrivacy, BuildError> {
        let _entered = self.span().enter();
        let action = TokenAction::try_from(params.token.token_tx_type)
            .ok()
            .filter(|a| *a != TokenAction::CrossShard)
            .ok_or(ValidationError::UnhandledTokenAction(params.token.token_tx_type))?;

        // Both halves share one lock time.
        let lock_time = params.native.lock_time.unwrap_or_else(|| Utc::now().timestamp());
        let native = TxPrivacyParams {
            lock_time: Some(lock_time),
            ..params.native.clone()
        };
        let outer = self
            .assemble(&native, Some(&params.token), TxType::TokenPrivacy)?
            .finalize()?;
        debug!(hash = %outer.hash(), %action, "outer token fee tx built");

        let token_data = match action {
            TokenAction::Init => self.token_init(params)?,
            TokenAction::Transfer => self.token_transfer(params, lock_time)?,
            TokenAction::CrossShard => {
                return Err(ValidationError::UnhandledTokenAction(params.token.token_tx_type).into())
            }
        };

        let token_tx = TxCustomTokenPrivacy::new(outer, token_data);
        info!(
            hash = %token_tx.hash(),
            property_id = %token_tx.token_data.property_id,
            %action,
            "token transaction built"
        );
        Ok(token_tx)
    }

    fn token_init(&self, params: &TxPrivacyTokenParams) -> Result<TxPrivacyTokenData, BuildError> {
        let token = &params.token;
        let receiver = token
            .receivers
            .first()
            .ok_or(ValidationError::MissingTokenReceiver)?;
        if receiver.message.len() > MAX_SIZE_INFO_COIN {
            return Err(ValidationError::MessageTooLarge {
                index: 0,
                len: receiver.message.len(),
                max: MAX_SIZE_INFO_COIN,
            }
            .into());
        }
        let pk = receiver.payment_address.public_key;
        if decode_point(&pk).is_none() {
            return Err(ValidationError::MalformedDestination { index: 0 }.into());
        }
        // Validate a caller-supplied id before doing any signing work.
        let supplied_id = if token.mintable {
            Some(parse_property_id(&token.property_id)?)
        } else {
            None
        };

        let mut output = OutputCoin::new(
            token.amount,
            CompressedRistretto(pk),
            random_scalar(),
            receiver.message.clone(),
        );
        output.coin.randomness = Some(random_scalar());
        let receiver_shard = shard_id_from_last_byte(receiver.payment_address.pk_last_byte());
        if !output.coin.commit(receiver_shard) {
            return Err(ValidationError::MalformedDestination { index: 0 }.into());
        }

        let mut proof = PaymentProof::default();
        proof.set_output_coins(vec![output]);
        let mut tx_normal = Tx {
            version: TX_VERSION,
            tx_type: TxType::Normal,
            lock_time: 0,
            fee: 0,
            proof: Some(proof),
            pub_key_last_byte_sender: receiver_shard,
            ..Tx::default()
        };
        sign_tx(
            &mut tx_normal,
            &SigningSecret::without_blinding(&params.native.sender_sk),
        )?;

        let mut token_data = TxPrivacyTokenData {
            tx_normal: tx_normal.finalize()?,
            property_id: Hash32::ZERO,
            property_name: token.property_name.clone(),
            property_symbol: token.property_symbol.clone(),
            action: TokenAction::Init,
            mintable: token.mintable,
            amount: token.amount,
        };
        token_data.property_id = match supplied_id {
            Some(id) => id,
            None => {
                let shard = params.shard_id.unwrap_or_else(|| {
                    KeySet::from_spending_key(params.native.sender_sk.clone()).shard_id()
                });
                let token_hash = token_data.hash();
                hash_h_multi(&[token_hash.as_bytes().as_slice(), &[shard]])
            }
        };
        debug!(
            property_id = %token_data.property_id,
            amount = token.amount,
            mintable = token.mintable,
            "token minted"
        );
        Ok(token_data)
    }

    fn token_transfer(
        &self,
        params: &TxPrivacyTokenParams,
        lock_time: i64,
    ) -> Result<TxPrivacyTokenData, BuildError> {
        let token = &params.token;
        let property_id = parse_property_id(&token.property_id)?;

        let inner = TxPrivacyParams {
            sender_sk: params.native.sender_sk.clone(),
            payment_infos: token.receivers.clone(),
            input_coins: token.token_input.clone(),
            fee: token.fee,
            has_privacy: params.has_privacy_token,
            asset_id: Some(property_id),
            metadata: None,
            info: params.native.info.clone(),
            lock_time: Some(lock_time),
            ring: params.token_ring.clone(),
            snd_outputs: params.token_snd_outputs.clone(),
        };
        let tx_normal = self.assemble(&inner, None, TxType::Normal)?.finalize()?;
        debug!(%property_id, fee = token.fee, "token transfer built");

        Ok(TxPrivacyTokenData {
            tx_normal,
            property_id,
            property_name: token.property_name.clone(),
            property_symbol: token.property_symbol.clone(),
            action: TokenAction::Transfer,
            mintable: token.mintable,
            amount: 0,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coin::Coin;
    use crate::config::COMMITMENT_RING_SIZE;
    use crate::metadata::{Metadata, StopAutoStakingMetadata, STOP_AUTO_STAKING_META};
    use crate::transaction::verification::verify_token_tx;
    use crate::zkp::ReferenceProver;

    fn owned_input(ks: &KeySet, value: u64) -> InputCoin {
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

    fn builder() -> TxBuilder<ReferenceProver> {
        TxBuilder::new(ReferenceProver::new())
    }

    fn native(ks: &KeySet) -> TxPrivacyParams {
        TxPrivacyParams::new(ks.spending_key.clone())
            .spend([owned_input(ks, 100)])
            .fee(5)
            .lock_time(1_700_000_000)
    }

    fn init_params(ks: &KeySet, receiver: &KeySet) -> TxPrivacyTokenParams {
        TxPrivacyTokenParams::new(
            native(ks),
            CustomTokenParams {
                property_name: "Gold".into(),
                property_symbol: "GLD".into(),
                amount: 1_000,
                token_tx_type: TokenAction::Init.into(),
                receivers: vec![PaymentInfo::new(receiver.payment_address, 1_000)],
                ..CustomTokenParams::default()
            },
        )
        .with_random_snds()
    }

    // -----------------------------------------------------------------------
    // Init
    // -----------------------------------------------------------------------

    #[test]
    fn test_init_derives_property_id() {
        let alice = KeySet::generate();
        let bob = KeySet::generate();
        let mut params = init_params(&alice, &bob);
        params.shard_id = Some(3);

        let token_tx = builder().build_token(&params).unwrap();
        let data = token_tx.token_data();
        assert_eq!(data.action, TokenAction::Init);
        assert_eq!(data.amount, 1_000);
        let token_hash = data.hash();
        assert_eq!(
            data.property_id,
            hash_h_multi(&[token_hash.as_bytes().as_slice(), &[3u8]])
        );
        assert_eq!(token_tx.tx().tx_type, TxType::TokenPrivacy);
        verify_token_tx(&token_tx).unwrap();
    }

    #[test]
    fn test_init_single_output_to_receiver() {
        let alice = KeySet::generate();
        let bob = KeySet::generate();
        let token_tx = builder().build_token(&init_params(&alice, &bob)).unwrap();
        let inner = &token_tx.token_data().tx_normal;

        let outputs = inner.proof.as_ref().unwrap().output_coins();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].value(), 1_000);
        assert_eq!(
            outputs[0].coin.public_key,
            Some(CompressedRistretto(bob.public_key_bytes()))
        );
        assert!(outputs[0].coin.commitment.is_some());
        assert_eq!(inner.pub_key_last_byte_sender, bob.shard_id());
        assert_eq!(inner.lock_time, 0);
        assert_eq!(inner.fee, 0);
    }

    #[test]
    fn test_init_mintable_uses_supplied_id() {
        let alice = KeySet::generate();
        let bob = KeySet::generate();
        let mut params = init_params(&alice, &bob);
        params.token.mintable = true;
        params.token.property_id = "ab".repeat(32);

        let token_tx = builder().build_token(&params).unwrap();
        assert_eq!(token_tx.token_data().property_id.as_bytes(), &[0xab; 32]);
    }

    #[test]
    fn test_init_mintable_rejects_bad_hex() {
        let alice = KeySet::generate();
        let bob = KeySet::generate();
        let mut params = init_params(&alice, &bob);
        params.token.mintable = true;
        params.token.property_id = "not-hex".into();
        assert!(matches!(
            builder().build_token(&params).unwrap_err(),
            BuildError::Validation(ValidationError::MalformedPropertyId(_))
        ));
    }

    #[test]
    fn test_init_requires_receiver() {
        let alice = KeySet::generate();
        let bob = KeySet::generate();
        let mut params = init_params(&alice, &bob);
        params.token.receivers.clear();
        assert!(matches!(
            builder().build_token(&params).unwrap_err(),
            BuildError::Validation(ValidationError::MissingTokenReceiver)
        ));
    }

    // -----------------------------------------------------------------------
    // Transfer
    // -----------------------------------------------------------------------

    fn transfer_params(ks: &KeySet, to: &KeySet, token_fee: u64) -> TxPrivacyTokenParams {
        TxPrivacyTokenParams::new(
            native(ks),
            CustomTokenParams {
                property_id: "11".repeat(32),
                property_name: "Gold".into(),
                property_symbol: "GLD".into(),
                token_tx_type: TokenAction::Transfer.into(),
                receivers: vec![PaymentInfo::new(to.payment_address, 300)],
                token_input: vec![owned_input(ks, 500)],
                fee: token_fee,
                ..CustomTokenParams::default()
            },
        )
        .with_random_snds()
    }

    #[test]
    fn test_transfer_uses_token_fee() {
        let alice = KeySet::generate();
        let bob = KeySet::generate();
        let token_tx = builder().build_token(&transfer_params(&alice, &bob, 7)).unwrap();

        assert_eq!(token_tx.tx().fee, 5);
        let data = token_tx.token_data();
        assert_eq!(data.action, TokenAction::Transfer);
        assert_eq!(data.amount, 0);
        assert_eq!(data.tx_normal.fee, 7);
        assert_eq!(data.property_id.as_bytes(), &[0x11; 32]);

        // 500 in, 300 out, 7 fee: 193 change.
        let outs = data.tx_normal.proof.as_ref().unwrap().output_coins();
        assert_eq!(outs.iter().map(OutputCoin::value).collect::<Vec<_>>(), vec![300, 193]);
        verify_token_tx(&token_tx).unwrap();
    }

    #[test]
    fn test_private_transfer_with_ring() {
        let alice = KeySet::generate();
        let bob = KeySet::generate();
        let mut params = transfer_params(&alice, &bob, 0);
        params.token.token_input = vec![owned_input(&alice, 300)];
        params.has_privacy_token = true;
        let real = params.token.token_input[0].coin.commitment.unwrap();
        params.token_ring = RingParams {
            commitments: (0..COMMITMENT_RING_SIZE)
                .map(|j| if j == 2 { real } else { CompressedRistretto([j as u8 + 1; 32]) })
                .collect(),
            commitment_indices: (0..COMMITMENT_RING_SIZE as u64).collect(),
            my_commitment_indices: vec![2],
        };
        let params = params.with_random_snds();

        let token_tx = builder().build_token(&params).unwrap();
        let proof = token_tx.token_data().tx_normal.proof.clone().unwrap();
        assert!(proof.output_coins().iter().all(OutputCoin::is_sealed));
        assert!(proof.input_coins().iter().all(InputCoin::is_redacted));
    }

    #[test]
    fn test_transfer_shares_outer_lock_time() {
        let alice = KeySet::generate();
        let bob = KeySet::generate();
        let mut params = transfer_params(&alice, &bob, 0);
        params.native.lock_time = None;

        let token_tx = builder().build_token(&params).unwrap();
        assert!(token_tx.tx().lock_time > 0);
        assert_eq!(token_tx.token_data().tx_normal.lock_time, token_tx.tx().lock_time);
    }

    #[test]
    fn test_transfer_requires_token_snds() {
        let alice = KeySet::generate();
        let bob = KeySet::generate();
        let mut params = transfer_params(&alice, &bob, 7);
        params.token_snd_outputs.pop();
        assert!(matches!(
            builder().build_token(&params).unwrap_err(),
            BuildError::Validation(ValidationError::SndCountMismatch { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn test_transfer_underfunded_token() {
        let alice = KeySet::generate();
        let bob = KeySet::generate();
        let params = transfer_params(&alice, &bob, 201);
        assert!(matches!(
            builder().build_token(&params).unwrap_err(),
            BuildError::InsufficientFunds { over_balance: -1, .. }
        ));
    }

    // -----------------------------------------------------------------------
    // Action tags
    // -----------------------------------------------------------------------

    #[test]
    fn test_unhandled_actions() {
        let alice = KeySet::generate();
        let bob = KeySet::generate();
        for tag in [2, 9, -1] {
            let mut params = init_params(&alice, &bob);
            params.token.token_tx_type = tag;
            assert!(matches!(
                builder().build_token(&params).unwrap_err(),
                BuildError::Validation(ValidationError::UnhandledTokenAction(t)) if t == tag
            ));
        }
    }

    // -----------------------------------------------------------------------
    // Hashing and wire format
    // -----------------------------------------------------------------------

    #[test]
    fn test_composite_hash_covers_metadata() {
        let alice = KeySet::generate();
        let bob = KeySet::generate();
        let meta = Metadata::StopAutoStaking(StopAutoStakingMetadata {
            committee_public_key: "k".into(),
            meta_type: STOP_AUTO_STAKING_META,
        });
        let mut params = init_params(&alice, &bob);
        params.native = params.native.metadata(meta.clone());
        let token_tx = builder().build_token(&params).unwrap();

        let mut record = token_tx.tx().hash().to_hex().into_bytes();
        record.extend_from_slice(token_tx.token_data().hash().to_hex().as_bytes());
        record.extend_from_slice(meta.hash().as_bytes());
        assert_eq!(*token_tx.hash(), hash_h(&record));
    }

    #[test]
    fn test_token_data_hash_tracks_amount() {
        let alice = KeySet::generate();
        let bob = KeySet::generate();
        let token_tx = builder().build_token(&init_params(&alice, &bob)).unwrap();
        let mut data = token_tx.token_data().clone();
        let before = data.hash();
        data.amount += 1;
        assert_ne!(data.hash(), before);
        data.amount -= 1;
        data.property_id = Hash32::new([9; 32]);
        assert_eq!(data.hash(), before);
    }

    #[test]
    fn test_token_tx_json_round_trip() {
        let alice = KeySet::generate();
        let bob = KeySet::generate();
        let token_tx = builder().build_token(&transfer_params(&alice, &bob, 1)).unwrap();
        let json = token_tx.to_json();

        let v: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["Type"], "tp");
        assert_eq!(v["TxTokenPrivacyData"]["Type"], 1);
        assert_eq!(v["TxTokenPrivacyData"]["TxNormal"]["Type"], "n");

        let back = TxCustomTokenPrivacy::from_json(&json).unwrap();
        assert_eq!(back.hash(), token_tx.hash());
        assert_eq!(back, token_tx);
    }

    #[test]
    fn test_custom_token_params_wire_names() {
        let params: CustomTokenParams = serde_json::from_value(serde_json::json!({
            "TokenID": "ab",
            "TokenName": "Gold",
            "TokenSymbol": "GLD",
            "TokenAmount": 10,
            "TokenTxType": 1,
            "TokenMintable": true,
            "TokenFee": 2
        }))
        .unwrap();
        assert_eq!(params.property_id, "ab");
        assert_eq!(params.amount, 10);
        assert_eq!(params.token_tx_type, 1);
        assert!(params.mintable);
        assert!(params.receivers.is_empty());
    }
}
