//! # Build Requests
//!
//! The JSON document `cloak-wallet build` reads. Field names follow the
//! wire conventions of the protocol types they feed:
//!
//! ```json
//! {
//!   "SpendingKey": "<hex>",
//!   "PaymentInfos": [{"PaymentAddress": {"Pk": "..", "Tk": ".."}, "Amount": 70}],
//!   "InputCoins": [{"CoinDetails": {..}}],
//!   "Fee": 10,
//!   "HasPrivacy": true,
//!   "Ring": {"Commitments": ["<hex>"], "CommitmentIndices": [..], "MyCommitmentIndices": [..]},
//!   "Metadata": {"Type": 63, ..},
//!   "Token": {"TokenTxType": 1, "TokenID": "<hex>", ..}
//! }
//! ```
//!
//! A `Token` block turns the request into a token transaction; the rest
//! then describes the fee-paying outer transaction.

use anyhow::{bail, Context, Result};
use curve25519_dalek::ristretto::CompressedRistretto;
use serde::Deserialize;
use serde_json::Value;

use cloak_protocol::coin::{InputCoin, PaymentInfo};
use cloak_protocol::crypto::{Hash32, SpendingKey};
use cloak_protocol::metadata::parse_metadata;
use cloak_protocol::transaction::{
    CustomTokenParams, RingParams, TxPrivacyParams, TxPrivacyTokenParams,
};

#[derive(Debug, Default, Deserialize)]
pub struct RingRequest {
    #[serde(rename = "Commitments", default)]
    pub commitments: Vec<String>,
    #[serde(rename = "CommitmentIndices", default)]
    pub commitment_indices: Vec<u64>,
    #[serde(rename = "MyCommitmentIndices", default)]
    pub my_commitment_indices: Vec<u64>,
}

impl RingRequest {
    fn into_ring(self) -> Result<RingParams> {
        let commitments = self
            .commitments
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let bytes = hex::decode(h).with_context(|| format!("ring commitment {i} is not hex"))?;
                let arr: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| anyhow::anyhow!("ring commitment {i} is not 32 bytes"))?;
                Ok(CompressedRistretto(arr))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(RingParams {
            commitments,
            commitment_indices: self.commitment_indices,
            my_commitment_indices: self.my_commitment_indices,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct BuildRequest {
    #[serde(rename = "SpendingKey")]
    pub spending_key: String,
    #[serde(rename = "PaymentInfos", default)]
    pub payment_infos: Vec<PaymentInfo>,
    #[serde(rename = "InputCoins", default)]
    pub input_coins: Vec<InputCoin>,
    #[serde(rename = "Fee", default)]
    pub fee: u64,
    #[serde(rename = "HasPrivacy", default)]
    pub has_privacy: bool,
    #[serde(rename = "AssetID", default)]
    pub asset_id: Option<Hash32>,
    /// UTF-8 text stored in the transaction's `Info` bytes.
    #[serde(rename = "Info", default)]
    pub info: String,
    #[serde(rename = "LockTime", default)]
    pub lock_time: Option<i64>,
    #[serde(rename = "Metadata", default)]
    pub metadata: Option<Value>,
    #[serde(rename = "Ring", default)]
    pub ring: RingRequest,
    #[serde(rename = "Token", default)]
    pub token: Option<CustomTokenParams>,
    #[serde(rename = "HasPrivacyToken", default)]
    pub has_privacy_token: bool,
    #[serde(rename = "TokenRing", default)]
    pub token_ring: RingRequest,
}

/// A decoded request, ready for the builder.
#[derive(Debug)]
pub enum Request {
    Native(TxPrivacyParams),
    Token(Box<TxPrivacyTokenParams>),
}

impl BuildRequest {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("malformed build request")
    }

    pub fn into_request(self) -> Result<Request> {
        let sk = SpendingKey::from_hex(self.spending_key.trim()).context("invalid spending key")?;
        let metadata = match self.metadata {
            Some(value) => parse_metadata(value).context("invalid metadata")?,
            None => None,
        };
        if self.token.is_none() && self.has_privacy_token {
            bail!("HasPrivacyToken is set but the request has no Token block");
        }

        let native = TxPrivacyParams {
            sender_sk: sk,
            payment_infos: self.payment_infos,
            input_coins: self.input_coins,
            fee: self.fee,
            has_privacy: self.has_privacy,
            asset_id: self.asset_id,
            metadata,
            info: self.info.into_bytes(),
            lock_time: self.lock_time,
            ring: self.ring.into_ring().context("invalid ring")?,
            snd_outputs: Vec::new(),
        };

        // One fresh derivator per output coin, change included.
        Ok(match self.token {
            None => Request::Native(native.with_random_snds()),
            Some(token) => {
                let mut params = TxPrivacyTokenParams::new(native, token);
                params.has_privacy_token = self.has_privacy_token;
                params.token_ring = self.token_ring.into_ring().context("invalid token ring")?;
                Request::Token(Box::new(params.with_random_snds()))
            }
        })
    }
}
