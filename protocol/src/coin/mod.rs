//! # Coin Model
//!
//! Cloak is a UTXO system. A **coin** is a Pedersen commitment plus the
//! openings its owner needs to spend it. Wallets hold [`InputCoin`]s; a
//! transaction consumes some and creates fresh [`OutputCoin`]s.
//!
//! ```text
//! Coin
//! ├── public_key     owner (pk = sk · G)
//! ├── commitment     pk + v·G_v + snd·G_snd + shard·G_shard + r·G_rand
//! ├── snd            serial-number derivator, one per coin
//! ├── serial_number  (sk + snd)^-1 · G_sk, revealed when spent
//! ├── randomness     commitment blinding
//! ├── value          amount
//! └── info           short memo, at most 255 bytes
//! ```
//!
//! Every field except `value` and `info` is optional, because the copies
//! embedded in a privacy-mode proof are deliberately stripped. See
//! [`InputCoin::redact`] and [`OutputCoin::seal_to`].

use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use serde::{Deserialize, Serialize};

use crate::config::shard_id_from_last_byte;
use crate::crypto::encryption::{encrypt_output_detail, EncryptedCoinDetail, EncryptionError};
use crate::crypto::keys::{decode_point, PaymentAddress};
use crate::crypto::serde_hex;
use crate::zkp::commitment::commit_all;

// ---------------------------------------------------------------------------
// Coin
// ---------------------------------------------------------------------------

/// The raw coin record shared by inputs and outputs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    #[serde(rename = "PublicKey", with = "serde_hex::point_opt", default)]
    pub public_key: Option<CompressedRistretto>,
    #[serde(rename = "CoinCommitment", with = "serde_hex::point_opt", default)]
    pub commitment: Option<CompressedRistretto>,
    #[serde(rename = "SNDerivator", with = "serde_hex::scalar_opt", default)]
    pub snd: Option<Scalar>,
    #[serde(rename = "SerialNumber", with = "serde_hex::point_opt", default)]
    pub serial_number: Option<CompressedRistretto>,
    #[serde(rename = "Randomness", with = "serde_hex::scalar_opt", default)]
    pub randomness: Option<Scalar>,
    #[serde(rename = "Value", default)]
    pub value: u64,
    #[serde(rename = "Info", with = "serde_hex::vec", default)]
    pub info: Vec<u8>,
}

impl Coin {
    /// Last byte of the owner's public key, if there is one.
    pub fn pk_last_byte(&self) -> Option<u8> {
        self.public_key.map(|pk| pk.as_bytes()[31])
    }

    pub fn shard_id(&self) -> Option<u8> {
        self.pk_last_byte().map(shard_id_from_last_byte)
    }

    pub fn public_key_point(&self) -> Option<RistrettoPoint> {
        self.public_key.and_then(|pk| decode_point(pk.as_bytes()))
    }

    /// Recomputes and stores the commitment from the coin's own fields.
    ///
    /// Returns `false` (and leaves the commitment alone) if the public key,
    /// SND or randomness is missing or the key doesn't decode.
    pub fn commit(&mut self, shard_id: u8) -> bool {
        let (Some(pk), Some(snd), Some(r)) = (self.public_key_point(), self.snd, self.randomness)
        else {
            return false;
        };
        self.commitment = Some(commit_all(&pk, self.value, &snd, shard_id, &r).compress());
        true
    }
}

// ---------------------------------------------------------------------------
// Input coin
// ---------------------------------------------------------------------------

/// A coin the spender owns and wants to consume.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputCoin {
    #[serde(rename = "CoinDetails")]
    pub coin: Coin,
}

impl InputCoin {
    pub fn new(coin: Coin) -> Self {
        Self { coin }
    }

    pub fn value(&self) -> u64 {
        self.coin.value
    }

    /// Strips everything except the serial number.
    ///
    /// After this the input only proves "some coin with this nullifier was
    /// spent", which is precisely what a privacy-mode proof should reveal.
    pub fn redact(&mut self) {
        self.coin.commitment = None;
        self.coin.value = 0;
        self.coin.snd = None;
        self.coin.public_key = None;
        self.coin.randomness = None;
    }

    pub fn is_redacted(&self) -> bool {
        self.coin.commitment.is_none()
            && self.coin.value == 0
            && self.coin.snd.is_none()
            && self.coin.public_key.is_none()
            && self.coin.randomness.is_none()
    }
}

// ---------------------------------------------------------------------------
// Output coin
// ---------------------------------------------------------------------------

/// A coin being created, plus (after sealing) its encrypted opening.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputCoin {
    #[serde(rename = "CoinDetails")]
    pub coin: Coin,
    #[serde(rename = "CoinDetailsEncrypted", default)]
    pub encrypted: Option<EncryptedCoinDetail>,
}

impl OutputCoin {
    /// A fresh, not-yet-committed output.
    pub fn new(value: u64, public_key: CompressedRistretto, snd: Scalar, info: Vec<u8>) -> Self {
        Self {
            coin: Coin {
                public_key: Some(public_key),
                snd: Some(snd),
                value,
                info,
                ..Coin::default()
            },
            encrypted: None,
        }
    }

    pub fn value(&self) -> u64 {
        self.coin.value
    }

    /// Seals `(randomness, value)` to `transmission_key`, then wipes the
    /// serial number, value and randomness from the public copy.
    ///
    /// On error the coin is left untouched.
    pub fn seal_to(&mut self, transmission_key: &[u8]) -> Result<(), EncryptionError> {
        let randomness = self.coin.randomness.ok_or(EncryptionError::EncryptFailed)?;
        let sealed = encrypt_output_detail(&randomness, self.coin.value, transmission_key)?;
        self.encrypted = Some(sealed);
        self.coin.serial_number = None;
        self.coin.value = 0;
        self.coin.randomness = None;
        Ok(())
    }

    pub fn is_sealed(&self) -> bool {
        self.encrypted.is_some()
            && self.coin.serial_number.is_none()
            && self.coin.value == 0
            && self.coin.randomness.is_none()
    }
}

// ---------------------------------------------------------------------------
// Payment info
// ---------------------------------------------------------------------------

/// "Pay `amount` to `payment_address`", with an optional short memo.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInfo {
    #[serde(rename = "PaymentAddress")]
    pub payment_address: PaymentAddress,
    #[serde(rename = "Amount")]
    pub amount: u64,
    #[serde(rename = "Message", with = "serde_hex::vec", default)]
    pub message: Vec<u8>,
}

impl PaymentInfo {
    pub fn new(payment_address: PaymentAddress, amount: u64) -> Self {
        Self {
            payment_address,
            amount,
            message: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<Vec<u8>>) -> Self {
        self.message = message.into();
        self
    }
}
