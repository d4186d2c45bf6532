//! # Transaction Module
//!
//! Assembly, signing, and finalization of Cloak transactions. Every value
//! transfer on the network, native or token, leaves this module as a
//! [`SignedTx`] or a [`TxCustomTokenPrivacy`].
//!
//! ## Architecture
//!
//! ```text
//! types.rs        — TxType and TokenAction wire vocabulary
//! tx.rs           — Tx record, canonical encoding, finalize → SignedTx
//! size.rs         — pre-build size estimate (KB)
//! signing.rs      — one-time Schnorr signing of a Tx
//! builder.rs      — TxBuilder: the native assembly pipeline
//! token.rs        — token params, token data, TxBuilder::build_token
//! verification.rs — signature checks on finalized transactions
//! error.rs        — BuildError and friends
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Describe**: fill a [`TxPrivacyParams`] (or [`TxPrivacyTokenParams`]).
//! 2. **Build**: [`TxBuilder::build`] validates, proves, redacts and signs.
//! 3. **Finalize**: the builder returns an immutable [`SignedTx`] with the
//!    hash and size computed exactly once.
//! 4. **Ship**: [`SignedTx::to_json`] produces the wire form;
//!    [`Tx::from_json`] reads it back, routing metadata through the
//!    dispatcher.
//!
//! ## Design Decisions
//!
//! - The identity hash covers version, lock time, fee, proof and metadata.
//!   It is stable across signing, so the signature can cover it.
//! - Amounts are `u64`. Balance arithmetic happens in `i128` so a deficit
//!   is reported with its sign instead of wrapping.
//! - The builder is generic over the [`Prover`](crate::zkp::Prover), which
//!   makes the whole pipeline testable with the transparent reference
//!   engine.

pub mod builder;
pub mod error;
pub mod signing;
pub mod size;
pub mod token;
pub mod tx;
pub mod types;
pub mod verification;

pub use builder::{RingParams, TxBuilder, TxPrivacyParams};
pub use error::{BuildError, EncodingError, StateError, ValidationError, VerifyError};
pub use signing::sign_tx;
pub use size::{estimate_tx_size, estimate_tx_size_bytes, EstimateTxSizeParams};
pub use token::{CustomTokenParams, TxCustomTokenPrivacy, TxPrivacyTokenData, TxPrivacyTokenParams};
pub use tx::{SignedTx, Tx};
pub use types::{TokenAction, TxType};
pub use verification::{verify_signature, verify_token_tx};
