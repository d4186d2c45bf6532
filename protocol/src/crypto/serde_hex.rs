//! Serde adapters for curve elements.
//!
//! Human-readable formats (JSON) get lowercase hex. Binary formats
//! (bincode) get the raw 32 bytes. Use with `#[serde(with = "...")]`.

use curve25519_dalek::ristretto::CompressedRistretto;
use curve25519_dalek::scalar::Scalar;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

fn write32<S: Serializer>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
    if serializer.is_human_readable() {
        serializer.serialize_str(&hex::encode(bytes))
    } else {
        bytes.serialize(serializer)
    }
}

fn read32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
    if deserializer.is_human_readable() {
        let s = String::deserialize(deserializer)?;
        let raw = hex::decode(&s).map_err(D::Error::custom)?;
        raw.as_slice()
            .try_into()
            .map_err(|_| D::Error::custom(format!("expected 32 bytes, got {}", raw.len())))
    } else {
        <[u8; 32]>::deserialize(deserializer)
    }
}

/// `[u8; 32]` as hex.
pub mod bytes32 {
    use super::*;

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        write32(bytes, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        read32(deserializer)
    }
}

/// `Vec<u8>` as hex.
pub mod vec {
    use super::*;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&hex::encode(bytes))
        } else {
            serializer.serialize_bytes(bytes)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            hex::decode(&s).map_err(D::Error::custom)
        } else {
            Vec::<u8>::deserialize(deserializer)
        }
    }
}

/// `Option<CompressedRistretto>` as hex or `null`.
///
/// No decompression check on the way in: a coin may legitimately carry
/// bytes that only the prover validates.
pub mod point_opt {
    use super::*;

    pub fn serialize<S: Serializer>(
        point: &Option<CompressedRistretto>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match point {
            Some(p) => serializer.serialize_some(&Wrapped(p.to_bytes())),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<CompressedRistretto>, D::Error> {
        let raw: Option<Wrapped> = Option::deserialize(deserializer)?;
        Ok(raw.map(|w| CompressedRistretto(w.0)))
    }
}

/// `Option<Scalar>` as hex or `null`. Non-canonical encodings are rejected.
pub mod scalar_opt {
    use super::*;

    pub fn serialize<S: Serializer>(
        scalar: &Option<Scalar>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match scalar {
            Some(s) => serializer.serialize_some(&Wrapped(s.to_bytes())),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Scalar>, D::Error> {
        let raw: Option<Wrapped> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(w) => Option::<Scalar>::from(Scalar::from_canonical_bytes(w.0))
                .map(Some)
                .ok_or_else(|| D::Error::custom("non-canonical scalar")),
        }
    }
}

/// Newtype so `Option<_>` can reuse the 32-byte codec.
struct Wrapped([u8; 32]);

impl Serialize for Wrapped {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        write32(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Wrapped {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        read32(deserializer).map(Wrapped)
    }
}
