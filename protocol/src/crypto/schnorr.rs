//! # Schnorr Signatures
//!
//! Every Cloak transaction is signed by a **one-time key** derived from the
//! spender's secret and, in privacy mode, the blinding scalar the prover
//! drew while building the proof:
//!
//! ```text
//! PK = sk · G + r · H
//! ```
//!
//! where `G` is the Ristretto basepoint and `H` is the Pedersen randomness
//! generator. With `r = 0` this collapses to the plain public key, and the
//! signature drops its third component.
//!
//! ## Signature format
//!
//! ```text
//! R  = k1 · G + k2 · H
//! e  = H_s("cloak-schnorr" || PK || R || msg)
//! z1 = k1 - e · sk
//! z2 = k2 - e · r          (only when r != 0)
//! ```
//!
//! Serialized as `e || z1` (64 bytes) or `e || z1 || z2` (96 bytes). The
//! verifier picks the equation from the length.

use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::hash::hash_to_scalar;
use super::keys::{decode_point, SpendingKey};
use super::random_scalar;
use crate::config::{SCALAR_SIZE, SIG_NO_PRIVACY_SIZE, SIG_PRIVACY_SIZE};
use crate::zkp::commitment::generators;

const CHALLENGE_DOMAIN: &[u8] = b"cloak-schnorr";

/// Errors during signature operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchnorrError {
    #[error("signature verification failed")]
    VerificationFailed,

    #[error("invalid signature bytes: expected {SIG_NO_PRIVACY_SIZE} or {SIG_PRIVACY_SIZE} bytes, got {0}")]
    InvalidLength(usize),

    #[error("invalid signature bytes: non-canonical scalar")]
    NonCanonicalScalar,

    #[error("invalid public key")]
    InvalidPublicKey,
}

// ---------------------------------------------------------------------------
// Signing secret
// ---------------------------------------------------------------------------

/// The one-time signing secret: a signing scalar and a blinding scalar.
///
/// Two fixed 32-byte fields, never a 64-byte buffer sliced at an offset.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SigningSecret {
    signing_scalar: Scalar,
    nonce_scalar: Scalar,
}

impl SigningSecret {
    pub fn new(signing_scalar: Scalar, nonce_scalar: Scalar) -> Self {
        Self {
            signing_scalar,
            nonce_scalar,
        }
    }

    /// `{sk, r}`: privacy-mode signing, blinded by proof randomness.
    pub fn with_blinding(spending_key: &SpendingKey, blinding: Scalar) -> Self {
        Self::new(*spending_key.scalar(), blinding)
    }

    /// `{sk, 0}`: the non-privacy secret.
    pub fn without_blinding(spending_key: &SpendingKey) -> Self {
        Self::new(*spending_key.scalar(), Scalar::ZERO)
    }

    pub fn has_blinding(&self) -> bool {
        self.nonce_scalar != Scalar::ZERO
    }

    fn public_point(&self) -> RistrettoPoint {
        self.signing_scalar * RISTRETTO_BASEPOINT_POINT + self.nonce_scalar * generators().g_rand
    }

    /// The one-time public key `sk · G + r · H`, compressed.
    pub fn public_key(&self) -> CompressedRistretto {
        self.public_point().compress()
    }

    /// Signs `message`. Fresh random nonces per call.
    pub fn sign(&self, message: &[u8]) -> SchnorrSignature {
        let h = generators().g_rand;
        let pk = self.public_key();

        let k1 = random_scalar();
        let k2 = if self.has_blinding() {
            random_scalar()
        } else {
            Scalar::ZERO
        };
        let r_point = k1 * RISTRETTO_BASEPOINT_POINT + k2 * h;

        let e = challenge(&pk, &r_point.compress(), message);
        let z1 = k1 - e * self.signing_scalar;
        let z2 = self.has_blinding().then(|| k2 - e * self.nonce_scalar);

        SchnorrSignature { e, z1, z2 }
    }
}

fn challenge(pk: &CompressedRistretto, r: &CompressedRistretto, message: &[u8]) -> Scalar {
    hash_to_scalar(&[CHALLENGE_DOMAIN, pk.as_bytes(), r.as_bytes(), message])
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// A Schnorr signature `(e, z1[, z2])`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchnorrSignature {
    e: Scalar,
    z1: Scalar,
    z2: Option<Scalar>,
}

impl SchnorrSignature {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(self.e.as_bytes());
        out.extend_from_slice(self.z1.as_bytes());
        if let Some(z2) = &self.z2 {
            out.extend_from_slice(z2.as_bytes());
        }
        out
    }

    /// Serialized width: 64 or 96 bytes.
    pub fn encoded_len(&self) -> usize {
        if self.z2.is_some() {
            SIG_PRIVACY_SIZE
        } else {
            SIG_NO_PRIVACY_SIZE
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SchnorrError> {
        if bytes.len() != SIG_NO_PRIVACY_SIZE && bytes.len() != SIG_PRIVACY_SIZE {
            return Err(SchnorrError::InvalidLength(bytes.len()));
        }
        let mut scalars = bytes.chunks_exact(SCALAR_SIZE).map(parse_scalar);
        let e = scalars.next().ok_or(SchnorrError::InvalidLength(bytes.len()))??;
        let z1 = scalars.next().ok_or(SchnorrError::InvalidLength(bytes.len()))??;
        let z2 = scalars.next().transpose()?;
        Ok(Self { e, z1, z2 })
    }

    /// Checks the signature against a compressed one-time public key.
    pub fn verify(&self, public_key: &[u8], message: &[u8]) -> Result<(), SchnorrError> {
        let pk_point = decode_point(public_key).ok_or(SchnorrError::InvalidPublicKey)?;
        let pk = pk_point.compress();

        let mut r_point = self.z1 * RISTRETTO_BASEPOINT_POINT + self.e * pk_point;
        if let Some(z2) = self.z2 {
            r_point += z2 * generators().g_rand;
        }

        if challenge(&pk, &r_point.compress(), message) == self.e {
            Ok(())
        } else {
            Err(SchnorrError::VerificationFailed)
        }
    }
}

fn parse_scalar(chunk: &[u8]) -> Result<Scalar, SchnorrError> {
    let arr: [u8; SCALAR_SIZE] = chunk
        .try_into()
        .map_err(|_| SchnorrError::InvalidLength(chunk.len()))?;
    Option::<Scalar>::from(Scalar::from_canonical_bytes(arr)).ok_or(SchnorrError::NonCanonicalScalar)
}

/// Verify raw signature bytes against raw public key bytes.
///
/// The "I got these off the wire" variant.
pub fn verify_raw(public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<(), SchnorrError> {
    SchnorrSignature::from_bytes(signature)?.verify(public_key, message)
}
