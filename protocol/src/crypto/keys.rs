//! # Key Management
//!
//! Spending keys, receiving keys and payment addresses.
//!
//! Every Cloak participant holds one secret: the **spending key**, a
//! Ristretto scalar. Everything else is derived from it:
//!
//! ```text
//! sk                         spending key (secret)
//! pk = sk · G                public key   (on every coin you own)
//! rk = H_s("rk" || sk)       receiving key (secret, decrypts coin details)
//! tk = rk · G                transmission key (senders encrypt to this)
//! ```
//!
//! The pair `(pk, tk)` is the **payment address**. It is what you hand out
//! to get paid. Its string form is base58 of the 64 concatenated bytes.
//!
//! ## Security considerations
//!
//! - Secret scalars are zeroized on drop.
//! - Keys are generated from `OsRng` with a wide reduction, so there's no
//!   modulo bias to speak of.
//! - Key bytes are never logged. The `Debug` impls print a placeholder.

use std::fmt;
use std::str::FromStr;

use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::hash::hash_to_scalar;
use super::random_scalar;
use super::serde_hex;
use crate::config::{shard_id_from_last_byte, POINT_SIZE, SCALAR_SIZE};

/// Errors that can occur during key operations.
///
/// These are intentionally vague about *why* something failed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid secret key bytes: wrong length or not a canonical scalar")]
    InvalidSecretKey,

    #[error("invalid public key bytes: not a valid Ristretto point")]
    InvalidPublicKey,

    #[error("invalid transmission key bytes: not a valid Ristretto point")]
    InvalidTransmissionKey,

    #[error("invalid payment address encoding")]
    InvalidAddress,
}

/// Decodes 32 bytes into a curve point, or `None` if they aren't one.
pub fn decode_point(bytes: &[u8]) -> Option<RistrettoPoint> {
    CompressedRistretto::from_slice(bytes).ok()?.decompress()
}

// ---------------------------------------------------------------------------
// Spending key
// ---------------------------------------------------------------------------

/// The master secret. Lose it and the coins are gone; leak it and the
/// coins are someone else's.
///
/// Does not implement `Serialize`. Exporting a secret should be a
/// deliberate call to [`to_bytes`](Self::to_bytes), not a side effect of
/// dumping a struct to JSON.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SpendingKey(Scalar);

impl SpendingKey {
    /// Generate a fresh spending key from the OS RNG.
    pub fn generate() -> Self {
        Self(random_scalar())
    }

    /// Parses a canonical 32-byte little-endian scalar. Zero is rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let arr: [u8; SCALAR_SIZE] = bytes.try_into().map_err(|_| KeyError::InvalidSecretKey)?;
        let scalar = Option::<Scalar>::from(Scalar::from_canonical_bytes(arr))
            .ok_or(KeyError::InvalidSecretKey)?;
        if scalar == Scalar::ZERO {
            return Err(KeyError::InvalidSecretKey);
        }
        Ok(Self(scalar))
    }

    /// Parses a hex-encoded spending key.
    ///
    /// Handy for devnet config files. Please don't do this in production.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_str.trim()).map_err(|_| KeyError::InvalidSecretKey)?;
        Self::from_bytes(&bytes)
    }

    /// Raw secret bytes. **Handle with extreme care.**
    pub fn to_bytes(&self) -> [u8; SCALAR_SIZE] {
        self.0.to_bytes()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0.to_bytes())
    }

    pub(crate) fn scalar(&self) -> &Scalar {
        &self.0
    }

    /// `pk = sk · G`.
    pub fn public_point(&self) -> RistrettoPoint {
        self.0 * RISTRETTO_BASEPOINT_POINT
    }

    /// Derives the receiving key from this spending key.
    pub fn receiving_key(&self) -> ReceivingKey {
        ReceivingKey(hash_to_scalar(&[b"cloak-receiving-key", self.0.as_bytes()]))
    }
}

impl fmt::Debug for SpendingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SpendingKey(<redacted>)")
    }
}

/// Secret half of the transmission keypair. Decrypts incoming coin details.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ReceivingKey(Scalar);

impl ReceivingKey {
    pub(crate) fn scalar(&self) -> &Scalar {
        &self.0
    }

    /// `tk = rk · G`.
    pub fn transmission_point(&self) -> RistrettoPoint {
        self.0 * RISTRETTO_BASEPOINT_POINT
    }
}

impl fmt::Debug for ReceivingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ReceivingKey(<redacted>)")
    }
}

// ---------------------------------------------------------------------------
// Payment address
// ---------------------------------------------------------------------------

/// Public destination for payments: `(pk, tk)` as raw compressed bytes.
///
/// The bytes are carried as-is and only decoded when a builder needs the
/// points, so a malformed address surfaces as a build error rather than
/// at parse time.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentAddress {
    #[serde(rename = "Pk", with = "serde_hex::bytes32")]
    pub public_key: [u8; POINT_SIZE],
    #[serde(rename = "Tk", with = "serde_hex::bytes32")]
    pub transmission_key: [u8; POINT_SIZE],
}

impl PaymentAddress {
    pub fn new(public_key: [u8; POINT_SIZE], transmission_key: [u8; POINT_SIZE]) -> Self {
        Self {
            public_key,
            transmission_key,
        }
    }

    pub fn public_key_point(&self) -> Result<RistrettoPoint, KeyError> {
        decode_point(&self.public_key).ok_or(KeyError::InvalidPublicKey)
    }

    pub fn transmission_key_point(&self) -> Result<RistrettoPoint, KeyError> {
        decode_point(&self.transmission_key).ok_or(KeyError::InvalidTransmissionKey)
    }

    /// Last byte of the public key. Routes the address to its shard.
    pub fn pk_last_byte(&self) -> u8 {
        self.public_key[POINT_SIZE - 1]
    }

    pub fn shard_id(&self) -> u8 {
        shard_id_from_last_byte(self.pk_last_byte())
    }

    /// Base58 of `pk || tk`.
    pub fn to_base58(&self) -> String {
        let mut raw = [0u8; 2 * POINT_SIZE];
        raw[..POINT_SIZE].copy_from_slice(&self.public_key);
        raw[POINT_SIZE..].copy_from_slice(&self.transmission_key);
        bs58::encode(raw).into_string()
    }

    pub fn from_base58(s: &str) -> Result<Self, KeyError> {
        let raw = bs58::decode(s.trim())
            .into_vec()
            .map_err(|_| KeyError::InvalidAddress)?;
        if raw.len() != 2 * POINT_SIZE {
            return Err(KeyError::InvalidAddress);
        }
        let mut pk = [0u8; POINT_SIZE];
        let mut tk = [0u8; POINT_SIZE];
        pk.copy_from_slice(&raw[..POINT_SIZE]);
        tk.copy_from_slice(&raw[POINT_SIZE..]);
        Ok(Self::new(pk, tk))
    }
}

impl fmt::Display for PaymentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for PaymentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PaymentAddress({})", self.to_base58())
    }
}

impl FromStr for PaymentAddress {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

// ---------------------------------------------------------------------------
// Key set
// ---------------------------------------------------------------------------

/// Everything derivable from one spending key.
#[derive(Clone, Debug)]
pub struct KeySet {
    pub spending_key: SpendingKey,
    pub receiving_key: ReceivingKey,
    pub payment_address: PaymentAddress,
}

impl KeySet {
    /// A brand new identity.
    pub fn generate() -> Self {
        Self::from_spending_key(SpendingKey::generate())
    }

    /// Derives the full key set. Infallible once you have a valid key.
    pub fn from_spending_key(spending_key: SpendingKey) -> Self {
        let receiving_key = spending_key.receiving_key();
        let payment_address = PaymentAddress::new(
            spending_key.public_point().compress().to_bytes(),
            receiving_key.transmission_point().compress().to_bytes(),
        );
        Self {
            spending_key,
            receiving_key,
            payment_address,
        }
    }

    /// Derives the key set from raw secret bytes. Fails on malformed input.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        SpendingKey::from_bytes(bytes).map(Self::from_spending_key)
    }

    pub fn public_key_bytes(&self) -> [u8; POINT_SIZE] {
        self.payment_address.public_key
    }

    pub fn pk_last_byte(&self) -> u8 {
        self.payment_address.pk_last_byte()
    }

    pub fn shard_id(&self) -> u8 {
        self.payment_address.shard_id()
    }
}
