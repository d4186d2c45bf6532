//! # Hashing Utilities
//!
//! Cryptographic hash functions used throughout Cloak. There are exactly
//! three ways to turn bytes into something else here, and we'd like to
//! keep it that way:
//!
//! - [`hash_h`] — SHA-256. Transaction identity hashes, property IDs,
//!   metadata hashes, key-derivation tweaks. The workhorse.
//! - [`hash_to_scalar`] — SHA-512 reduced modulo the Ristretto group order.
//!   Used for Fiat-Shamir challenges and the receiving-key derivation.
//! - [`hash_to_point`] — SHA-512 fed into the Ristretto Elligator map.
//!   Used for the Pedersen generators and the token-data hash.
//!
//! ## Why wide reductions?
//!
//! Reducing 512 bits modulo a ~252-bit order leaves a bias below 2^-250.
//! Reducing 256 bits would leave a measurable one. SHA-512 is right there,
//! so we use it.

use std::fmt;
use std::str::FromStr;

use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256, Sha512};
use thiserror::Error;

use crate::config::HASH_SIZE;

/// Errors produced when parsing a [`Hash32`] from text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HashParseError {
    #[error("hash is not valid hex")]
    InvalidHex,

    #[error("hash must be {HASH_SIZE} bytes, got {0}")]
    InvalidLength(usize),
}

// ---------------------------------------------------------------------------
// Hash32
// ---------------------------------------------------------------------------

/// A 32-byte digest.
///
/// Displayed and serialized (in human-readable formats) as lowercase hex
/// in natural byte order. Binary formats get the raw 32 bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash32([u8; HASH_SIZE]);

impl Hash32 {
    /// The all-zero hash.
    pub const ZERO: Hash32 = Hash32([0u8; HASH_SIZE]);

    /// Wraps raw digest bytes.
    pub const fn new(bytes: [u8; HASH_SIZE]) -> Self {
        Self(bytes)
    }

    /// Builds a hash from a slice that must be exactly 32 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, HashParseError> {
        let arr: [u8; HASH_SIZE] = bytes
            .try_into()
            .map_err(|_| HashParseError::InvalidLength(bytes.len()))?;
        Ok(Self(arr))
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    /// Lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; HASH_SIZE]
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash32({})", self.to_hex())
    }
}

impl FromStr for Hash32 {
    type Err = HashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|_| HashParseError::InvalidHex)?;
        Self::from_slice(&bytes)
    }
}

impl AsRef<[u8]> for Hash32 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Hash32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Hash32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(serde::de::Error::custom)
        } else {
            let bytes = <[u8; HASH_SIZE]>::deserialize(deserializer)?;
            Ok(Self(bytes))
        }
    }
}

// ---------------------------------------------------------------------------
// Hash functions
// ---------------------------------------------------------------------------

/// SHA-256 of the input.
///
/// # Example
///
/// ```
/// use cloak_protocol::crypto::hash::hash_h;
///
/// let h = hash_h(b"cloak");
/// assert_eq!(h.as_bytes().len(), 32);
/// ```
pub fn hash_h(data: &[u8]) -> Hash32 {
    let digest = Sha256::digest(data);
    let mut out = [0u8; HASH_SIZE];
    out.copy_from_slice(&digest);
    Hash32(out)
}

/// SHA-256 over several parts without allocating a concatenation buffer.
pub fn hash_h_multi(parts: &[&[u8]]) -> Hash32 {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; HASH_SIZE];
    out.copy_from_slice(&hasher.finalize());
    Hash32(out)
}

fn sha512_wide(parts: &[&[u8]]) -> [u8; 64] {
    let mut hasher = Sha512::new();
    for part in parts {
        hasher.update(part);
    }
    let mut wide = [0u8; 64];
    wide.copy_from_slice(&hasher.finalize());
    wide
}

/// Hashes the concatenation of `parts` to a scalar.
pub fn hash_to_scalar(parts: &[&[u8]]) -> Scalar {
    Scalar::from_bytes_mod_order_wide(&sha512_wide(parts))
}

/// Hashes arbitrary data to a Ristretto point with unknown discrete log.
pub fn hash_to_point(data: &[u8]) -> RistrettoPoint {
    RistrettoPoint::from_uniform_bytes(&sha512_wide(&[data]))
}
