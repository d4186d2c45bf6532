//! # Protocol Configuration & Constants
//!
//! Every magic number in Cloak lives here. If you're hardcoding a constant
//! somewhere else, you're doing it wrong and you owe the team coffee.
//!
//! Most of these values are consensus-relevant: a transaction built with a
//! different ring size or signature width will simply be rejected by the
//! rest of the network. The one thing callers are expected to tune is
//! [`BuilderConfig`], which carries the per-builder limits.

use serde::{Deserialize, Serialize};

use crate::crypto::hash::Hash32;

// ---------------------------------------------------------------------------
// Transaction Format
// ---------------------------------------------------------------------------

/// Transaction format version stamped on every transaction we build.
pub const TX_VERSION: i8 = 1;

/// Hard cap on the estimated transaction size, in kilobytes.
pub const MAX_TX_SIZE_KB: u64 = 100;

/// Maximum number of input coins a single transaction may spend.
/// The proof encodes the count in one byte.
pub const MAX_INPUT_COINS: usize = 255;

/// Maximum number of explicit payments. One slot below the input cap
/// because the builder may append a change output.
pub const MAX_PAYMENTS: usize = 254;

/// Maximum length of the free-form `Info` field, in bytes.
pub const MAX_TX_INFO_SIZE: usize = 512;

/// Maximum length of the short message carried on an output coin.
pub const MAX_SIZE_INFO_COIN: usize = 255;

/// Number of commitments (one real, the rest decoys) per input in
/// privacy mode.
pub const COMMITMENT_RING_SIZE: usize = 8;

/// Number of shards the network is partitioned into. The shard of a
/// public key is its last byte modulo this value.
pub const MAX_SHARD_NUMBER: u8 = 8;

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Compressed Ristretto point / scalar width. Everything on the curve is
/// 32 bytes, which makes the size model pleasantly boring.
pub const POINT_SIZE: usize = 32;

/// Scalar width in bytes.
pub const SCALAR_SIZE: usize = 32;

/// Hash output length in bytes (SHA-256).
pub const HASH_SIZE: usize = 32;

/// One-time signature public key width.
pub const SIG_PUB_KEY_SIZE: usize = 32;

/// Schnorr signature width without the blinding component: `(e, z1)`.
pub const SIG_NO_PRIVACY_SIZE: usize = 64;

/// Schnorr signature width with the blinding component: `(e, z1, z2)`.
pub const SIG_PRIVACY_SIZE: usize = 96;

/// AES-256-GCM key length in bytes.
pub const AES_KEY_LENGTH: usize = 32;

/// AES-256-GCM nonce length in bytes. Twelve. Not 16. Not 8. Twelve.
pub const AES_NONCE_LENGTH: usize = 12;

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

/// Identifier of the native asset. Used whenever a build does not name
/// an asset explicitly. First byte `0x04`, the rest zero.
pub const NATIVE_ASSET_ID: Hash32 = Hash32::new([
    4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
]);

/// Ticker of the native asset, for display only.
pub const NATIVE_ASSET_NAME: &str = "CLK";

// ---------------------------------------------------------------------------
// Builder Configuration
// ---------------------------------------------------------------------------

/// Per-builder limits.
///
/// Defaults match the protocol constants above. Wallets may tighten them
/// (a lower `max_tx_size_kb` is a cheap way to keep fees predictable) but
/// loosening them only produces transactions the network will refuse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Upper bound on the estimated size, in KB.
    pub max_tx_size_kb: u64,
    /// Ring size expected for privacy-mode inputs.
    pub ring_size: usize,
    /// Fee floor fed to the size estimator. A nonzero floor makes a
    /// zero-coin estimate reserve room for a 1-in/1-out proof.
    pub limit_fee: u64,
    /// Maximum input coins per build.
    pub max_input_coins: usize,
    /// Maximum explicit payments per build.
    pub max_payments: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            max_tx_size_kb: MAX_TX_SIZE_KB,
            ring_size: COMMITMENT_RING_SIZE,
            limit_fee: 0,
            max_input_coins: MAX_INPUT_COINS,
            max_payments: MAX_PAYMENTS,
        }
    }
}

// ---------------------------------------------------------------------------
// Utility
// ---------------------------------------------------------------------------

/// Maps the last byte of a public key to its shard.
pub fn shard_id_from_last_byte(last_byte: u8) -> u8 {
    last_byte % MAX_SHARD_NUMBER
}
