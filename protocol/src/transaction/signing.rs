//! Transaction signing with one-time Schnorr keys.
//!
//! Signing is a separate step from building so that the same draft can be
//! inspected (and its hash shown to a user) before any key material is
//! touched. The signed message is the identity hash from
//! [`Tx::compute_hash`], so anything that changes the hash invalidates the
//! signature and anything outside the canonical record does not.

use super::error::StateError;
use super::tx::Tx;
use crate::crypto::hash::Hash32;
use crate::crypto::schnorr::SigningSecret;

/// Signs `tx` in place and returns the hash that was signed.
///
/// Writes the one-time public key derived from `secret` into
/// `sig_pub_key` and the signature into `sig`. A transaction that already
/// carries a signature is refused and left exactly as it was.
pub fn sign_tx(tx: &mut Tx, secret: &SigningSecret) -> Result<Hash32, StateError> {
    if tx.is_signed() {
        return Err(StateError::AlreadySigned);
    }
    let hash = tx.compute_hash();
    let signature = secret.sign(hash.as_bytes());
    tx.sig_pub_key = secret.public_key().as_bytes().to_vec();
    tx.sig = signature.to_bytes();
    Ok(hash)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
