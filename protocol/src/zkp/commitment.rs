//! # Pedersen Commitments over Ristretto
//!
//! Every coin carries a single multi-generator Pedersen commitment that
//! binds its owner, value, serial-number derivator, shard and randomness:
//!
//! ```text
//! C = pk + v · G_value + snd · G_snd + shard · G_shard + r · G_rand
//! ```
//!
//! `pk = sk · G_sk` already is a commitment to the spending key, so it is
//! added as-is rather than re-multiplied.
//!
//! ## Generators
//!
//! `G_sk` is the Ristretto basepoint (so public keys and commitments agree
//! on what "`sk · G`" means). The other four are hashed to the curve from
//! fixed labels. Nobody knows a discrete-log relation between any two of
//! them, which is exactly the property binding rests on.
//!
//! ## Serial numbers
//!
//! The serial number of a coin is `(sk + snd)^-1 · G_sk`. Deterministic per
//! coin, unlinkable to the commitment without `sk`, and the nullifier that
//! stops a coin being spent twice.

use std::sync::OnceLock;

use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;

use crate::crypto::hash::hash_to_point;

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// The five Pedersen generators.
#[derive(Clone, Debug)]
pub struct PedersenGenerators {
    pub g_sk: RistrettoPoint,
    pub g_value: RistrettoPoint,
    pub g_snd: RistrettoPoint,
    pub g_shard: RistrettoPoint,
    pub g_rand: RistrettoPoint,
}

impl PedersenGenerators {
    fn derive() -> Self {
        Self {
            g_sk: RISTRETTO_BASEPOINT_POINT,
            g_value: hash_to_point(b"cloak/pedersen/value"),
            g_snd: hash_to_point(b"cloak/pedersen/snd"),
            g_shard: hash_to_point(b"cloak/pedersen/shard"),
            g_rand: hash_to_point(b"cloak/pedersen/rand"),
        }
    }
}

/// Process-wide generators, derived once on first use.
pub fn generators() -> &'static PedersenGenerators {
    static GENERATORS: OnceLock<PedersenGenerators> = OnceLock::new();
    GENERATORS.get_or_init(PedersenGenerators::derive)
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// Commits to every field of a coin.
pub fn commit_all(
    public_key: &RistrettoPoint,
    value: u64,
    snd: &Scalar,
    shard_id: u8,
    randomness: &Scalar,
) -> RistrettoPoint {
    let g = generators();
    public_key
        + Scalar::from(value) * g.g_value
        + snd * g.g_snd
        + Scalar::from(shard_id) * g.g_shard
        + randomness * g.g_rand
}

/// `(sk + snd)^-1 · G_sk`, or `None` in the (negligible) case `sk + snd = 0`.
pub fn serial_number(spending_scalar: &Scalar, snd: &Scalar) -> Option<RistrettoPoint> {
    let sum = spending_scalar + snd;
    if sum == Scalar::ZERO {
        return None;
    }
    Some(sum.invert() * generators().g_sk)
}
