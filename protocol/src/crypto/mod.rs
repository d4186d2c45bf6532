//! # Cryptographic Primitives for Cloak
//!
//! Every key, every commitment, every signature and every sealed coin
//! detail flows through here. We deliberately chose boring, well-audited
//! building blocks:
//!
//! - **Ristretto255** (`curve25519-dalek`) for all group arithmetic. A
//!   prime-order group with no cofactor headaches.
//! - **Schnorr** signatures over Ristretto, with an optional second
//!   generator so a signing key can be blinded by proof randomness.
//! - **AES-256-GCM** for sealing coin details to their recipient.
//! - **SHA-256** for identity hashes, **SHA-512** when we need to land
//!   uniformly in the scalar field or on the curve.
//!
//! ## A note on "rolling your own crypto"
//!
//! We don't. The Schnorr variant is textbook, the ECDH-then-AEAD sealing
//! is textbook, and the curve library does the scary parts in constant
//! time. If you're tempted to optimize these functions, please reconsider.

pub mod encryption;
pub mod hash;
pub mod keys;
pub mod schnorr;
pub mod serde_hex;

use curve25519_dalek::scalar::Scalar;
use rand::rngs::OsRng;
use rand::RngCore;

pub use encryption::{decrypt_output_detail, encrypt_output_detail, EncryptedCoinDetail};
pub use hash::{hash_h, hash_to_point, hash_to_scalar, Hash32};
pub use keys::{KeySet, PaymentAddress, SpendingKey};
pub use schnorr::{SchnorrSignature, SigningSecret};

/// A uniformly random scalar from the OS RNG.
///
/// 64 random bytes reduced mod the group order, so the bias is
/// negligible.
pub fn random_scalar() -> Scalar {
    let mut wide = [0u8; 64];
    OsRng.fill_bytes(&mut wide);
    Scalar::from_bytes_mod_order_wide(&wide)
}
