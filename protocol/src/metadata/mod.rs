//! # Transaction Metadata
//!
//! A transaction may carry one typed attachment: a staking request, a
//! bridge burn, a DEX trade, and so on. The transaction core only cares
//! about three things per attachment:
//!
//! - its integer **type tag**,
//! - its **hash**, which is folded into the transaction hash,
//! - its **size**, which counts against the transaction size limit.
//!
//! ## Dispatch
//!
//! On the wire a metadata block is just a JSON object with a `Type` field.
//! [`parse_metadata`] reads the tag, looks it up in a fixed table of
//! `(tag, decoder)` pairs and re-decodes the whole object as that variant.
//! Unknown tags are an error. There is no catch-all variant, on purpose:
//! silently accepting a payload we can't hash correctly would produce a
//! transaction hash nobody else agrees with.
//!
//! The table is an immutable `static`, so concurrent decoders need no
//! synchronization.

pub mod types;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::crypto::hash::{hash_h, Hash32};

pub use types::{
    BurningRequest, IssuingEvmRequest, PdeContribution, PdeTradeRequest, PdeWithdrawalRequest,
    StakingMetadata, StopAutoStakingMetadata, WithdrawRewardRequest,
};

// ---------------------------------------------------------------------------
// Type tags
// ---------------------------------------------------------------------------

pub const ISSUING_ETH_REQUEST_META: i64 = 80;
pub const ISSUING_BSC_REQUEST_META: i64 = 250;
pub const BURNING_REQUEST_META: i64 = 27;
pub const BURNING_REQUEST_META_V2: i64 = 240;
pub const BURNING_PBSC_REQUEST_META: i64 = 252;
pub const BURNING_FOR_DEPOSIT_TO_SC_REQUEST_META: i64 = 96;
pub const BURNING_FOR_DEPOSIT_TO_SC_REQUEST_META_V2: i64 = 242;
pub const SHARD_STAKING_META: i64 = 63;
pub const BEACON_STAKING_META: i64 = 64;
pub const STOP_AUTO_STAKING_META: i64 = 127;
pub const WITHDRAW_REWARD_REQUEST_META: i64 = 44;
pub const PDE_CONTRIBUTION_META: i64 = 90;
pub const PDE_PRV_REQUIRED_CONTRIBUTION_REQUEST_META: i64 = 204;
pub const PDE_TRADE_REQUEST_META: i64 = 91;
pub const PDE_WITHDRAWAL_REQUEST_META: i64 = 93;

/// Errors from metadata decoding.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("no metadata variant registered for type {0}")]
    UnknownType(i64),

    #[error("metadata payload has no integer `Type` field")]
    MissingType,

    #[error("malformed metadata payload for type {tag}: {source}")]
    Malformed {
        tag: i64,
        #[source]
        source: serde_json::Error,
    },
}

/// Hash every payload starts from: `H(decimal(type))`.
pub fn base_hash(meta_type: i64) -> Hash32 {
    hash_h(meta_type.to_string().as_bytes())
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// The closed set of attachments this build understands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Metadata {
    IssuingEvm(IssuingEvmRequest),
    Burning(BurningRequest),
    Staking(StakingMetadata),
    StopAutoStaking(StopAutoStakingMetadata),
    WithdrawReward(WithdrawRewardRequest),
    PdeContribution(PdeContribution),
    PdeTrade(PdeTradeRequest),
    PdeWithdrawal(PdeWithdrawalRequest),
}

impl Metadata {
    pub fn meta_type(&self) -> i64 {
        match self {
            Metadata::IssuingEvm(m) => m.meta_type,
            Metadata::Burning(m) => m.meta_type,
            Metadata::Staking(m) => m.meta_type,
            Metadata::StopAutoStaking(m) => m.meta_type,
            Metadata::WithdrawReward(m) => m.meta_type,
            Metadata::PdeContribution(m) => m.meta_type,
            Metadata::PdeTrade(m) => m.meta_type,
            Metadata::PdeWithdrawal(m) => m.meta_type,
        }
    }

    /// Contribution to the transaction hash.
    pub fn hash(&self) -> Hash32 {
        match self {
            Metadata::IssuingEvm(m) => m.hash(),
            Metadata::Burning(m) => m.hash(),
            Metadata::Staking(m) => m.hash(),
            Metadata::StopAutoStaking(m) => m.hash(),
            Metadata::WithdrawReward(m) => m.hash(),
            Metadata::PdeContribution(m) => m.hash(),
            Metadata::PdeTrade(m) => m.hash(),
            Metadata::PdeWithdrawal(m) => m.hash(),
        }
    }

    /// Contribution to the transaction size: the JSON encoding length.
    pub fn calculate_size(&self) -> u64 {
        serde_json::to_vec(self).map_or(0, |bytes| bytes.len() as u64)
    }

    /// Whether the dispatcher decodes this value's own encoding back to
    /// the same variant. False when `meta_type` is unregistered or belongs
    /// to a different payload shape.
    pub fn round_trips(&self) -> bool {
        serde_json::to_value(self)
            .ok()
            .and_then(|value| parse_metadata(value).ok().flatten())
            .is_some_and(|back| &back == self)
    }

    /// Whether `meta_type` is a tag the dispatcher would accept.
    pub fn is_registered(meta_type: i64) -> bool {
        METADATA_DECODERS.iter().any(|(tag, _)| *tag == meta_type)
    }
}

impl Serialize for Metadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Metadata::IssuingEvm(m) => m.serialize(serializer),
            Metadata::Burning(m) => m.serialize(serializer),
            Metadata::Staking(m) => m.serialize(serializer),
            Metadata::StopAutoStaking(m) => m.serialize(serializer),
            Metadata::WithdrawReward(m) => m.serialize(serializer),
            Metadata::PdeContribution(m) => m.serialize(serializer),
            Metadata::PdeTrade(m) => m.serialize(serializer),
            Metadata::PdeWithdrawal(m) => m.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Metadata {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        parse_metadata(value)
            .map_err(D::Error::custom)?
            .ok_or_else(|| D::Error::custom("metadata is null"))
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

type DecodeFn = fn(Value) -> Result<Metadata, serde_json::Error>;

fn decode_issuing(v: Value) -> Result<Metadata, serde_json::Error> {
    serde_json::from_value(v).map(Metadata::IssuingEvm)
}

fn decode_burning(v: Value) -> Result<Metadata, serde_json::Error> {
    serde_json::from_value(v).map(Metadata::Burning)
}

fn decode_staking(v: Value) -> Result<Metadata, serde_json::Error> {
    serde_json::from_value(v).map(Metadata::Staking)
}

fn decode_stop_auto_staking(v: Value) -> Result<Metadata, serde_json::Error> {
    serde_json::from_value(v).map(Metadata::StopAutoStaking)
}

fn decode_withdraw_reward(v: Value) -> Result<Metadata, serde_json::Error> {
    serde_json::from_value(v).map(Metadata::WithdrawReward)
}

fn decode_pde_contribution(v: Value) -> Result<Metadata, serde_json::Error> {
    serde_json::from_value(v).map(Metadata::PdeContribution)
}

fn decode_pde_trade(v: Value) -> Result<Metadata, serde_json::Error> {
    serde_json::from_value(v).map(Metadata::PdeTrade)
}

fn decode_pde_withdrawal(v: Value) -> Result<Metadata, serde_json::Error> {
    serde_json::from_value(v).map(Metadata::PdeWithdrawal)
}

/// One entry per known tag. Several tags share a payload shape.
static METADATA_DECODERS: &[(i64, DecodeFn)] = &[
    (ISSUING_ETH_REQUEST_META, decode_issuing),
    (ISSUING_BSC_REQUEST_META, decode_issuing),
    (BURNING_REQUEST_META, decode_burning),
    (BURNING_REQUEST_META_V2, decode_burning),
    (BURNING_PBSC_REQUEST_META, decode_burning),
    (BURNING_FOR_DEPOSIT_TO_SC_REQUEST_META, decode_burning),
    (BURNING_FOR_DEPOSIT_TO_SC_REQUEST_META_V2, decode_burning),
    (SHARD_STAKING_META, decode_staking),
    (BEACON_STAKING_META, decode_staking),
    (STOP_AUTO_STAKING_META, decode_stop_auto_staking),
    (WITHDRAW_REWARD_REQUEST_META, decode_withdraw_reward),
    (PDE_CONTRIBUTION_META, decode_pde_contribution),
    (PDE_PRV_REQUIRED_CONTRIBUTION_REQUEST_META, decode_pde_contribution),
    (PDE_TRADE_REQUEST_META, decode_pde_trade),
    (PDE_WITHDRAWAL_REQUEST_META, decode_pde_withdrawal),
];

fn type_tag(value: &Value) -> Option<i64> {
    let tag = value.get("Type")?;
    tag.as_i64().or_else(|| {
        // Some encoders emit integral floats (`63.0`).
        tag.as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// Resolves an untyped payload to a concrete variant.
///
/// `null` means "no metadata" and is not an error.
pub fn parse_metadata(value: Value) -> Result<Option<Metadata>, MetadataError> {
    if value.is_null() {
        return Ok(None);
    }
    let tag = type_tag(&value).ok_or(MetadataError::MissingType)?;
    let decode = METADATA_DECODERS
        .iter()
        .find(|(t, _)| *t == tag)
        .map(|(_, f)| *f)
        .ok_or(MetadataError::UnknownType(tag))?;

    // Normalize a float tag so the variant's integer field decodes.
    let mut value = value;
    if let Some(obj) = value.as_object_mut() {
        obj.insert("Type".to_string(), Value::from(tag));
    }
    decode(value)
        .map(Some)
        .map_err(|source| MetadataError::Malformed { tag, source })
}
