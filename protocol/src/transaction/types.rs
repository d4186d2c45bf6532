//! Core type definitions for Cloak transactions.
//!
//! Small, `Copy` vocabulary types. The wire forms are fixed: a transaction
//! type is a short string (`"n"`, `"s"`, `"rs"`, `"tp"`), a token action is
//! an integer.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TxType
// ---------------------------------------------------------------------------

/// What a transaction is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TxType {
    /// Ordinary transfer.
    #[default]
    #[serde(rename = "n")]
    Normal,
    /// Block reward payout.
    #[serde(rename = "s")]
    Reward,
    /// Stake returned to a validator.
    #[serde(rename = "rs")]
    ReturnStaking,
    /// Fee-paying wrapper around a token sub-transaction.
    #[serde(rename = "tp")]
    TokenPrivacy,
}

impl TxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "n",
            Self::Reward => "s",
            Self::ReturnStaking => "rs",
            Self::TokenPrivacy => "tp",
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TokenAction
// ---------------------------------------------------------------------------

/// Token lifecycle tag carried in the token sub-transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum TokenAction {
    /// Mint a new token.
    Init,
    /// Move an existing token.
    Transfer,
    /// Cross-shard receipt. Known on the wire, never built here.
    CrossShard,
}

impl From<TokenAction> for i32 {
    fn from(action: TokenAction) -> i32 {
        match action {
            TokenAction::Init => 0,
            TokenAction::Transfer => 1,
            TokenAction::CrossShard => 2,
        }
    }
}

impl TryFrom<i32> for TokenAction {
    type Error = String;

    fn try_from(tag: i32) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(Self::Init),
            1 => Ok(Self::Transfer),
            2 => Ok(Self::CrossShard),
            other => Err(format!("unknown token action {other}")),
        }
    }
}

impl fmt::Display for TokenAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::Transfer => write!(f, "transfer"),
            Self::CrossShard => write!(f, "cross-shard"),
        }
    }
}
