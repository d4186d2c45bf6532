//! Signature verification for finalized transactions.
//!
//! This is the wallet-side check: "does the signature on this thing verify
//! under the one-time key it carries, over the hash it claims?" Proof
//! verification is the chain's job and lives behind the prover boundary.

use super::error::VerifyError;
use super::token::TxCustomTokenPrivacy;
use super::tx::SignedTx;
use crate::crypto::schnorr::SchnorrSignature;

/// Verifies the Schnorr signature of a finalized transaction against its
/// cached identity hash.
pub fn verify_signature(tx: &SignedTx) -> Result<(), VerifyError> {
    if !tx.is_signed() {
        return Err(VerifyError::Unsigned);
    }
    let signature = SchnorrSignature::from_bytes(&tx.sig)?;
    signature.verify(&tx.sig_pub_key, tx.hash().as_bytes())?;
    Ok(())
}

/// Verifies both the outer fee transaction and the token sub-transaction.
pub fn verify_token_tx(token_tx: &TxCustomTokenPrivacy) -> Result<(), VerifyError> {
    verify_signature(token_tx.tx())?;
    verify_signature(&token_tx.token_data().tx_normal)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::SpendingKey;
    use crate::crypto::schnorr::{SchnorrError, SigningSecret};
    use crate::transaction::signing::sign_tx;
    use crate::transaction::tx::Tx;

    fn signed(fee: u64) -> Tx {
        let mut tx = Tx {
            fee,
            lock_time: 9,
            ..Tx::default()
        };
        sign_tx(&mut tx, &SigningSecret::without_blinding(&SpendingKey::generate())).unwrap();
        tx
    }

    #[test]
    fn test_valid_signature() {
        verify_signature(&signed(1).finalize().unwrap()).unwrap();
    }

    #[test]
    fn test_tampered_fee_fails() {
        let mut tx = signed(1);
        tx.fee = 2;
        assert_eq!(
            verify_signature(&tx.finalize().unwrap()).unwrap_err(),
            VerifyError::Signature(SchnorrError::VerificationFailed)
        );
    }

    #[test]
    fn test_foreign_key_fails() {
        let mut tx = signed(1);
        tx.sig_pub_key = SpendingKey::generate()
            .public_point()
            .compress()
            .as_bytes()
            .to_vec();
        assert!(verify_signature(&tx.finalize().unwrap()).is_err());
    }

    #[test]
    fn test_truncated_signature_fails() {
        let mut tx = signed(1);
        tx.sig.truncate(40);
        assert_eq!(
            verify_signature(&tx.finalize().unwrap()).unwrap_err(),
            VerifyError::Signature(SchnorrError::InvalidLength(40))
        );
    }
}
