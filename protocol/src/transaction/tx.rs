//! The transaction record, its canonical encoding, and finalization.
//!
//! A [`Tx`] is a plain, mutable draft. The builder fills it in, the signer
//! stamps it, and [`Tx::finalize`] freezes it into a [`SignedTx`] that caches
//! the identity hash and the actual size. There is no interior mutability and
//! no "hash changed after caching" hazard: once finalized, nothing can touch
//! the fields that feed the hash.
//!
//! # Canonical record
//!
//! ```text
//! decimal(version) ‖ decimal(lock_time) ‖ decimal(fee)
//!     ‖ base64(proof.to_bytes())      if a proof is attached
//!     ‖ hex(metadata.hash())          if metadata is attached
//! ```
//!
//! The identity hash is `SHA-256(record)`, and it is also the message the
//! Schnorr signature covers. `Info`, `Type`, `SigPubKey`, `Sig` and the
//! sender byte are deliberately outside the record.

use std::ops::Deref;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{BuildError, EncodingError, StateError};
use super::types::TxType;
use crate::config::TX_VERSION;
use crate::crypto::hash::{hash_h, Hash32};
use crate::metadata::{parse_metadata, Metadata};
use crate::zkp::PaymentProof;

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

/// `Vec<u8>` as standard base64.
mod b64 {
    use super::BASE64;
    use base64::Engine as _;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        BASE64.decode(s).map_err(D::Error::custom)
    }
}

/// `Option<PaymentProof>` as base64 of its canonical bytes, or `null`.
mod proof_b64 {
    use super::{PaymentProof, BASE64};
    use base64::Engine as _;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        proof: &Option<PaymentProof>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match proof {
            Some(p) => serializer.serialize_str(&BASE64.encode(p.to_bytes())),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<PaymentProof>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(s) if s.is_empty() => Ok(None),
            Some(s) => {
                let bytes = BASE64.decode(s).map_err(D::Error::custom)?;
                PaymentProof::from_bytes(&bytes)
                    .map(Some)
                    .map_err(D::Error::custom)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tx
// ---------------------------------------------------------------------------

/// A native transaction, signed or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tx {
    #[serde(rename = "Version")]
    pub version: i8,

    #[serde(rename = "Type")]
    pub tx_type: TxType,

    /// Unix seconds.
    #[serde(rename = "LockTime")]
    pub lock_time: i64,

    #[serde(rename = "Fee")]
    pub fee: u64,

    /// Free-form bytes, at most 512.
    #[serde(rename = "Info", with = "b64", default)]
    pub info: Vec<u8>,

    /// One-time public key the signature verifies under.
    #[serde(rename = "SigPubKey", with = "b64", default)]
    pub sig_pub_key: Vec<u8>,

    #[serde(rename = "Sig", with = "b64", default)]
    pub sig: Vec<u8>,

    #[serde(rename = "Proof", with = "proof_b64", default)]
    pub proof: Option<PaymentProof>,

    /// Sender's shard id (last byte of the public key mod shard count).
    #[serde(rename = "PubKeyLastByteSender")]
    pub pub_key_last_byte_sender: u8,

    #[serde(rename = "Metadata", default)]
    pub metadata: Option<Metadata>,
}

impl Default for Tx {
    fn default() -> Self {
        Self {
            version: TX_VERSION,
            tx_type: TxType::Normal,
            lock_time: 0,
            fee: 0,
            info: Vec::new(),
            sig_pub_key: Vec::new(),
            sig: Vec::new(),
            proof: None,
            pub_key_last_byte_sender: 0,
            metadata: None,
        }
    }
}

impl Tx {
    /// The string the identity hash is taken over.
    pub fn canonical_record(&self) -> String {
        let mut record = self.version.to_string();
        record += &self.lock_time.to_string();
        record += &self.fee.to_string();
        if let Some(proof) = &self.proof {
            record += &BASE64.encode(proof.to_bytes());
        }
        if let Some(metadata) = &self.metadata {
            record += &metadata.hash().to_hex();
        }
        record
    }

    /// Recomputes the identity hash. Prefer [`SignedTx::hash`] once the
    /// transaction is final.
    pub fn compute_hash(&self) -> Hash32 {
        hash_h(self.canonical_record().as_bytes())
    }

    pub fn is_signed(&self) -> bool {
        !self.sig.is_empty()
    }

    /// Actual encoded size in bytes: the sum of the field widths.
    pub fn actual_size(&self) -> u64 {
        let proof = self.proof.as_ref().map_or(0, |p| p.to_bytes().len() as u64);
        let metadata = self.metadata.as_ref().map_or(0, Metadata::calculate_size);
        1 + self.tx_type.as_str().len() as u64
            + 8
            + 8
            + self.info.len() as u64
            + self.sig_pub_key.len() as u64
            + self.sig.len() as u64
            + proof
            + 1
            + metadata
    }

    /// Freezes a signed transaction, caching its hash and size.
    pub fn finalize(self) -> Result<SignedTx, StateError> {
        if !self.is_signed() {
            return Err(StateError::Unsigned);
        }
        let hash = self.compute_hash();
        let size = self.actual_size();
        Ok(SignedTx {
            tx: self,
            hash,
            size,
        })
    }

    /// Decodes the wire JSON.
    ///
    /// Metadata goes through the dispatcher explicitly so an unregistered
    /// tag surfaces as a state error rather than a generic JSON error.
    pub fn from_json(json: &str) -> Result<Self, BuildError> {
        let mut value: Value = serde_json::from_str(json).map_err(EncodingError::from)?;
        let raw_metadata = value
            .as_object_mut()
            .and_then(|obj| obj.remove("Metadata"))
            .unwrap_or(Value::Null);
        let metadata = parse_metadata(raw_metadata)?;

        let mut tx: Tx = serde_json::from_value(value).map_err(EncodingError::from)?;
        tx.metadata = metadata;
        Ok(tx)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("tx serialization must not fail")
    }
}

// ---------------------------------------------------------------------------
// SignedTx
// ---------------------------------------------------------------------------

/// A finalized, immutable transaction.
///
/// Derefs to [`Tx`] for read access. The hash is computed exactly once, in
/// [`Tx::finalize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "Tx", try_from = "Tx")]
pub struct SignedTx {
    tx: Tx,
    hash: Hash32,
    size: u64,
}

impl SignedTx {
    pub fn hash(&self) -> &Hash32 {
        &self.hash
    }

    /// Actual size in bytes.
    pub fn actual_size(&self) -> u64 {
        self.size
    }

    /// Actual size in whole kilobytes, rounded up.
    pub fn actual_size_kb(&self) -> u64 {
        self.size.div_ceil(1024)
    }

    pub fn tx(&self) -> &Tx {
        &self.tx
    }

    pub fn into_inner(self) -> Tx {
        self.tx
    }

    pub fn from_json(json: &str) -> Result<Self, BuildError> {
        Ok(Tx::from_json(json)?.finalize()?)
    }

    pub fn to_json(&self) -> String {
        self.tx.to_json()
    }
}

impl Deref for SignedTx {
    type Target = Tx;

    fn deref(&self) -> &Tx {
        &self.tx
    }
}

impl From<SignedTx> for Tx {
    fn from(signed: SignedTx) -> Tx {
        signed.tx
    }
}

impl TryFrom<Tx> for SignedTx {
    type Error = StateError;

    fn try_from(tx: Tx) -> Result<Self, Self::Error> {
        tx.finalize()
    }
}
