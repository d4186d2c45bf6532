//! Error taxonomy for transaction assembly.
//!
//! Every failure aborts the whole build. No partially built transaction is
//! ever returned, so callers only need to match on the category:
//!
//! | Category            | Meaning                                          |
//! |---------------------|--------------------------------------------------|
//! | `Validation`        | caller input is out of bounds or inconsistent    |
//! | `InsufficientFunds` | inputs don't cover payments plus fee             |
//! | `Prover`            | the proof engine refused the witness             |
//! | `Crypto`            | key decoding or sealing failed after proving     |
//! | `State`             | operation not allowed in the object's state      |
//! | `Encoding`          | stored payload could not be decoded              |

use thiserror::Error;

use crate::crypto::encryption::EncryptionError;
use crate::crypto::keys::KeyError;
use crate::metadata::MetadataError;
use crate::zkp::ProverError;

/// Caller input rejected before any cryptographic work.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("too many input coins: {count} > {max}")]
    TooManyInputs { count: usize, max: usize },

    #[error("too many payments: {count} > {max}")]
    TooManyPayments { count: usize, max: usize },

    #[error("estimated size {size_kb} KB exceeds limit {max_kb} KB")]
    TxTooLarge { size_kb: u64, max_kb: u64 },

    #[error("info is {len} bytes, limit is {max}")]
    InfoTooLarge { len: usize, max: usize },

    #[error("payment {index} has a malformed destination public key")]
    MalformedDestination { index: usize },

    #[error("payment {index} message is {len} bytes, limit is {max}")]
    MessageTooLarge { index: usize, len: usize, max: usize },

    #[error("expected {expected} ring commitment indices, got {got}")]
    RingCommitmentCount { expected: usize, got: usize },

    #[error("expected {expected} own ring indices, got {got}")]
    RingIndexCount { expected: usize, got: usize },

    #[error("expected {expected} serial-number derivators for outputs, got {got}")]
    SndCountMismatch { expected: usize, got: usize },

    #[error("metadata type {0} does not match its payload")]
    MetadataTypeMismatch(i64),

    #[error("unhandled token action {0}")]
    UnhandledTokenAction(i32),

    #[error("token init requires a receiver")]
    MissingTokenReceiver,

    #[error("property id is not 32 bytes of hex: {0}")]
    MalformedPropertyId(String),

    #[error("amount overflow while summing {0}")]
    AmountOverflow(&'static str),
}

/// Operation not permitted in the object's current state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("transaction is already signed")]
    AlreadySigned,

    #[error("transaction is not signed")]
    Unsigned,

    #[error("no metadata variant registered for type {0}")]
    UnknownMetadataType(i64),
}

/// Malformed stored payload.
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed metadata: {0}")]
    Metadata(String),
}

/// Everything that can go wrong while building a transaction.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error(
        "insufficient funds: inputs {sum_inputs} - outputs {sum_outputs} - fee {fee} = {over_balance}"
    )]
    InsufficientFunds {
        sum_inputs: u64,
        sum_outputs: u64,
        fee: u64,
        over_balance: i128,
    },

    /// `params` is the witness parameter dump with the spending key
    /// redacted.
    #[error("prover failed while {stage}: {source}")]
    Prover {
        stage: &'static str,
        #[source]
        source: ProverError,
        params: String,
    },

    #[error("crypto failure: {0}")]
    Crypto(String),

    #[error("invalid state: {0}")]
    State(#[from] StateError),

    #[error("encoding failure: {0}")]
    Encoding(#[from] EncodingError),
}

impl From<EncryptionError> for BuildError {
    fn from(e: EncryptionError) -> Self {
        BuildError::Crypto(e.to_string())
    }
}

impl From<KeyError> for BuildError {
    fn from(e: KeyError) -> Self {
        BuildError::Crypto(e.to_string())
    }
}

impl From<MetadataError> for BuildError {
    fn from(e: MetadataError) -> Self {
        match e {
            MetadataError::UnknownType(tag) => StateError::UnknownMetadataType(tag).into(),
            other => EncodingError::Metadata(other.to_string()).into(),
        }
    }
}

/// Signature verification failure on a finalized transaction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("transaction is not signed")]
    Unsigned,

    #[error("signature invalid: {0}")]
    Signature(#[from] crate::crypto::schnorr::SchnorrError),
}
