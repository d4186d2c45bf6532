//! # Coin Detail Encryption
//!
//! When a privacy-mode transaction creates an output coin, the coin's value
//! and commitment randomness are wiped from the public copy. The recipient
//! still needs them to ever spend the coin, so we seal them to the
//! recipient's **transmission key** first.
//!
//! ## Construction
//!
//! ```text
//! e      <- random scalar             (ephemeral secret, discarded)
//! E      = e · G                      (travels with the coin)
//! S      = e · tk = rk · E            (shared point)
//! key    = SHA-256("cloak-coin-detail" || S)
//! sealed = nonce || AES-256-GCM(key, nonce, randomness || value, aad = E)
//! ```
//!
//! The ephemeral point is authenticated as AAD, so swapping it for another
//! one fails decryption instead of producing garbage.
//!
//! ## Nonce management
//!
//! Every seal uses a fresh key (fresh ephemeral secret), so nonce reuse is
//! not a practical concern. We still draw random 96-bit nonces, because
//! it costs nothing and nobody has to reason about it.

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroize;

use super::hash::hash_h_multi;
use super::keys::{decode_point, ReceivingKey};
use super::random_scalar;
use super::serde_hex;
use crate::config::{AES_KEY_LENGTH, AES_NONCE_LENGTH, POINT_SIZE, SCALAR_SIZE};

const KDF_DOMAIN: &[u8] = b"cloak-coin-detail";

/// Plaintext width: 32-byte randomness followed by the 8-byte LE value.
const DETAIL_PLAINTEXT_LEN: usize = SCALAR_SIZE + 8;

/// Errors that can occur during encryption/decryption.
///
/// Intentionally vague. The difference between "wrong key" and "corrupted
/// ciphertext" is none of an attacker's business.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncryptionError {
    #[error("encryption failed")]
    EncryptFailed,

    #[error("decryption failed -- wrong key or corrupted ciphertext")]
    DecryptFailed,

    #[error("ciphertext too short: must be at least {AES_NONCE_LENGTH} bytes")]
    CiphertextTooShort,

    #[error("invalid transmission key")]
    InvalidTransmissionKey,

    #[error("invalid ephemeral key")]
    InvalidEphemeralKey,

    #[error("decrypted coin detail is malformed")]
    MalformedDetail,
}

// ---------------------------------------------------------------------------
// AEAD core
// ---------------------------------------------------------------------------

/// AES-256-GCM with a random nonce and AAD. Returns `nonce || ciphertext`.
pub fn encrypt(
    key: &[u8; AES_KEY_LENGTH],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, EncryptionError> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| EncryptionError::EncryptFailed)?;

    let mut nonce_bytes = [0u8; AES_NONCE_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, Payload { msg: plaintext, aad })
        .map_err(|_| EncryptionError::EncryptFailed)?;

    let mut out = Vec::with_capacity(AES_NONCE_LENGTH + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Inverse of [`encrypt`]. Expects `nonce || ciphertext`.
pub fn decrypt(
    key: &[u8; AES_KEY_LENGTH],
    data: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, EncryptionError> {
    if data.len() < AES_NONCE_LENGTH {
        return Err(EncryptionError::CiphertextTooShort);
    }

    let (nonce_bytes, ciphertext) = data.split_at(AES_NONCE_LENGTH);
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| EncryptionError::DecryptFailed)?;
    let nonce = Nonce::from_slice(nonce_bytes);

    cipher
        .decrypt(nonce, Payload { msg: ciphertext, aad })
        .map_err(|_| EncryptionError::DecryptFailed)
}

fn derive_key(shared: &RistrettoPoint) -> [u8; AES_KEY_LENGTH] {
    *hash_h_multi(&[KDF_DOMAIN, shared.compress().as_bytes()]).as_bytes()
}

// ---------------------------------------------------------------------------
// Coin details
// ---------------------------------------------------------------------------

/// Sealed `(randomness, value)` of an output coin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedCoinDetail {
    #[serde(rename = "EphemeralKey", with = "serde_hex::bytes32")]
    pub ephemeral: [u8; POINT_SIZE],
    #[serde(rename = "Ciphertext", with = "serde_hex::vec")]
    pub ciphertext: Vec<u8>,
}

/// What the recipient recovers from an [`EncryptedCoinDetail`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoinDetail {
    pub randomness: Scalar,
    pub value: u64,
}

/// Seals `randomness || value` to the holder of `transmission_key`.
pub fn encrypt_output_detail(
    randomness: &Scalar,
    value: u64,
    transmission_key: &[u8],
) -> Result<EncryptedCoinDetail, EncryptionError> {
    let tk = decode_point(transmission_key).ok_or(EncryptionError::InvalidTransmissionKey)?;

    let mut ephemeral_secret = random_scalar();
    let ephemeral = (ephemeral_secret * RISTRETTO_BASEPOINT_POINT).compress().to_bytes();
    let mut key = derive_key(&(ephemeral_secret * tk));
    ephemeral_secret.zeroize();

    let mut plaintext = [0u8; DETAIL_PLAINTEXT_LEN];
    plaintext[..SCALAR_SIZE].copy_from_slice(randomness.as_bytes());
    plaintext[SCALAR_SIZE..].copy_from_slice(&value.to_le_bytes());

    let sealed = encrypt(&key, &plaintext, &ephemeral);
    key.zeroize();
    plaintext.zeroize();

    Ok(EncryptedCoinDetail {
        ephemeral,
        ciphertext: sealed?,
    })
}

/// Opens a sealed coin detail with the recipient's receiving key.
pub fn decrypt_output_detail(
    detail: &EncryptedCoinDetail,
    receiving_key: &ReceivingKey,
) -> Result<CoinDetail, EncryptionError> {
    let ephemeral = decode_point(&detail.ephemeral).ok_or(EncryptionError::InvalidEphemeralKey)?;
    let mut key = derive_key(&(receiving_key.scalar() * ephemeral));
    let opened = decrypt(&key, &detail.ciphertext, &detail.ephemeral);
    key.zeroize();

    let mut plaintext = opened?;
    if plaintext.len() != DETAIL_PLAINTEXT_LEN {
        plaintext.zeroize();
        return Err(EncryptionError::MalformedDetail);
    }

    let mut r_bytes = [0u8; SCALAR_SIZE];
    r_bytes.copy_from_slice(&plaintext[..SCALAR_SIZE]);
    let mut v_bytes = [0u8; 8];
    v_bytes.copy_from_slice(&plaintext[SCALAR_SIZE..]);
    plaintext.zeroize();

    let randomness = Option::<Scalar>::from(Scalar::from_canonical_bytes(r_bytes))
        .ok_or(EncryptionError::MalformedDetail)?;
    r_bytes.zeroize();

    Ok(CoinDetail {
        randomness,
        value: u64::from_le_bytes(v_bytes),
    })
}
