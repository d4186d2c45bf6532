// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Cloak Protocol — Core Library
//!
//! This is the wallet-side heart of Cloak: the code that turns "pay Bob 70,
//! fee 10, from these coins" into a signed confidential transaction the
//! network will accept.
//!
//! Cloak is a UTXO chain with optional privacy. Coins are Pedersen
//! commitments on Ristretto255, spends reveal serial numbers instead of
//! coin identities, and amounts travel sealed to their recipient. The
//! transaction pipeline here handles all of that, plus custom tokens that
//! ride inside a fee-paying native transaction.
//!
//! ## Architecture
//!
//! - **config**: Protocol constants and the per-builder limits.
//! - **crypto**: Hashes, keys, Schnorr signatures, coin-detail sealing.
//! - **coin**: Input/output coins and payment descriptions.
//! - **zkp**: The prover boundary, Pedersen commitments, the size model.
//! - **metadata**: Typed transaction attachments and their dispatcher.
//! - **transaction**: Size estimation, assembly, signing, finalization.
//!
//! ## Quick start
//!
//! ```no_run
//! use cloak_protocol::coin::PaymentInfo;
//! use cloak_protocol::crypto::KeySet;
//! use cloak_protocol::transaction::{TxBuilder, TxPrivacyParams};
//! use cloak_protocol::zkp::ReferenceProver;
//!
//! # fn coins() -> Vec<cloak_protocol::coin::InputCoin> { vec![] }
//! let alice = KeySet::generate();
//! let bob = KeySet::generate();
//!
//! let params = TxPrivacyParams::new(alice.spending_key.clone())
//!     .spend(coins())
//!     .pay(PaymentInfo::new(bob.payment_address, 70))
//!     .fee(10)
//!     .with_random_snds();
//!
//! let tx = TxBuilder::new(ReferenceProver::new()).build(&params)?;
//! println!("{}", tx.hash());
//! # Ok::<(), cloak_protocol::transaction::BuildError>(())
//! ```
//!
//! ## Design Philosophy
//!
//! 1. A build either returns a complete signed transaction or an error.
//!    Never anything in between.
//! 2. No global state. Builders are plain values; logging goes through the
//!    span each builder carries.
//! 3. Secrets zeroize on drop and print as `<redacted>`.
//! 4. If it touches money, it has tests. Plural.

pub mod coin;
pub mod config;
pub mod crypto;
pub mod metadata;
pub mod transaction;
pub mod zkp;
