//! Concrete metadata payloads.
//!
//! Only what the transaction core needs lives here: the wire shape, the
//! type tag and the hash contribution. Business rules (who may stake, what
//! a bridge proof must contain) belong to the chain, not the wallet.

use serde::{Deserialize, Serialize};

use super::base_hash;
use crate::crypto::hash::{hash_h, Hash32};
use crate::crypto::keys::PaymentAddress;

/// Bridge-in request (EVM chains).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuingEvmRequest {
    #[serde(rename = "BlockHash")]
    pub block_hash: Hash32,
    #[serde(rename = "TxIndex")]
    pub tx_index: u64,
    #[serde(rename = "ProofStrs")]
    pub proof_strs: Vec<String>,
    #[serde(rename = "IncTokenID")]
    pub inc_token_id: Hash32,
    #[serde(rename = "Type")]
    pub meta_type: i64,
}

impl IssuingEvmRequest {
    pub fn hash(&self) -> Hash32 {
        let mut record = self.block_hash.to_hex();
        record += &self.tx_index.to_string();
        for proof in &self.proof_strs {
            record += proof;
        }
        record += &base_hash(self.meta_type).to_hex();
        record += &self.inc_token_id.to_hex();
        hash_h(record.as_bytes())
    }
}

/// Burn tokens, optionally to be re-minted on another chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurningRequest {
    #[serde(rename = "BurnerAddress")]
    pub burner_address: PaymentAddress,
    #[serde(rename = "BurningAmount")]
    pub burning_amount: u64,
    #[serde(rename = "TokenID")]
    pub token_id: Hash32,
    #[serde(rename = "TokenName", default)]
    pub token_name: String,
    #[serde(rename = "RemoteAddress", default)]
    pub remote_address: String,
    #[serde(rename = "Type")]
    pub meta_type: i64,
}

impl BurningRequest {
    pub fn hash(&self) -> Hash32 {
        let mut record = base_hash(self.meta_type).to_hex();
        record += &self.burner_address.to_base58();
        record += &self.token_id.to_hex();
        record += &self.burning_amount.to_string();
        record += &self.token_name;
        record += &self.remote_address;
        hash_h(record.as_bytes())
    }
}

/// Shard or beacon committee staking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingMetadata {
    #[serde(rename = "FunderPaymentAddress")]
    pub funder_payment_address: String,
    #[serde(rename = "RewardReceiverPaymentAddress")]
    pub reward_receiver_payment_address: String,
    #[serde(rename = "StakingAmountShard")]
    pub staking_amount_shard: u64,
    #[serde(rename = "AutoReStaking")]
    pub auto_re_staking: bool,
    #[serde(rename = "CommitteePublicKey")]
    pub committee_public_key: String,
    #[serde(rename = "Type")]
    pub meta_type: i64,
}

impl StakingMetadata {
    pub fn hash(&self) -> Hash32 {
        let mut record = base_hash(self.meta_type).to_hex();
        record += &self.funder_payment_address;
        record += &self.reward_receiver_payment_address;
        record += &self.staking_amount_shard.to_string();
        record += if self.auto_re_staking { "true" } else { "false" };
        record += &self.committee_public_key;
        hash_h(record.as_bytes())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopAutoStakingMetadata {
    #[serde(rename = "CommitteePublicKey")]
    pub committee_public_key: String,
    #[serde(rename = "Type")]
    pub meta_type: i64,
}

impl StopAutoStakingMetadata {
    pub fn hash(&self) -> Hash32 {
        let mut record = base_hash(self.meta_type).to_hex();
        record += &self.committee_public_key;
        hash_h(record.as_bytes())
    }
}

/// Claim accumulated block rewards.
///
/// Version 1 hashes the raw address and token id; later versions fall
/// back to the plain type-tag hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawRewardRequest {
    #[serde(flatten)]
    pub payment_address: PaymentAddress,
    #[serde(rename = "TokenID")]
    pub token_id: Hash32,
    #[serde(rename = "Version", default)]
    pub version: i32,
    #[serde(rename = "Type")]
    pub meta_type: i64,
}

impl WithdrawRewardRequest {
    pub fn hash(&self) -> Hash32 {
        if self.version == 1 {
            let mut raw = Vec::with_capacity(96);
            raw.extend_from_slice(&self.payment_address.public_key);
            raw.extend_from_slice(&self.payment_address.transmission_key);
            raw.extend_from_slice(self.token_id.as_bytes());
            hash_h(&raw)
        } else {
            base_hash(self.meta_type)
        }
    }
}

/// Liquidity contribution to a trading pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdeContribution {
    #[serde(rename = "PDEContributionPairID")]
    pub pair_id: String,
    #[serde(rename = "ContributorAddressStr")]
    pub contributor_address: String,
    #[serde(rename = "ContributedAmount")]
    pub contributed_amount: u64,
    #[serde(rename = "TokenIDStr")]
    pub token_id: String,
    #[serde(rename = "Type")]
    pub meta_type: i64,
}

impl PdeContribution {
    pub fn hash(&self) -> Hash32 {
        let mut record = base_hash(self.meta_type).to_hex();
        record += &self.pair_id;
        record += &self.contributor_address;
        record += &self.contributed_amount.to_string();
        record += &self.token_id;
        hash_h(record.as_bytes())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdeTradeRequest {
    #[serde(rename = "TokenIDToBuyStr")]
    pub token_to_buy: String,
    #[serde(rename = "TokenIDToSellStr")]
    pub token_to_sell: String,
    #[serde(rename = "SellAmount")]
    pub sell_amount: u64,
    #[serde(rename = "MinAcceptableAmount")]
    pub min_acceptable_amount: u64,
    #[serde(rename = "TradingFee")]
    pub trading_fee: u64,
    #[serde(rename = "TraderAddressStr")]
    pub trader_address: String,
    #[serde(rename = "Type")]
    pub meta_type: i64,
}

impl PdeTradeRequest {
    pub fn hash(&self) -> Hash32 {
        let mut record = base_hash(self.meta_type).to_hex();
        record += &self.token_to_buy;
        record += &self.token_to_sell;
        record += &self.sell_amount.to_string();
        record += &self.min_acceptable_amount.to_string();
        record += &self.trading_fee.to_string();
        record += &self.trader_address;
        hash_h(record.as_bytes())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdeWithdrawalRequest {
    #[serde(rename = "WithdrawerAddressStr")]
    pub withdrawer_address: String,
    #[serde(rename = "WithdrawalToken1IDStr")]
    pub token1: String,
    #[serde(rename = "WithdrawalToken2IDStr")]
    pub token2: String,
    #[serde(rename = "WithdrawalShareAmt")]
    pub share_amount: u64,
    #[serde(rename = "Type")]
    pub meta_type: i64,
}

impl PdeWithdrawalRequest {
    pub fn hash(&self) -> Hash32 {
        let mut record = base_hash(self.meta_type).to_hex();
        record += &self.withdrawer_address;
        record += &self.token1;
        record += &self.token2;
        record += &self.share_amount.to_string();
        hash_h(record.as_bytes())
    }
}
