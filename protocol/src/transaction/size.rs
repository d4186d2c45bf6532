//! Transaction size estimation.
//!
//! The builder calls [`estimate_tx_size`] before touching the prover, so an
//! oversized request is rejected while it is still cheap to reject. The
//! estimate is a sum of fixed field widths plus the prover's own proof-size
//! model, rounded up to whole kilobytes.

use crate::config::{
    MAX_TX_INFO_SIZE, SIG_NO_PRIVACY_SIZE, SIG_PRIVACY_SIZE, SIG_PUB_KEY_SIZE,
};
use crate::metadata::Metadata;
use crate::zkp::Prover;

use super::token::CustomTokenParams;

// Fixed widths of the outer transaction.
const SIZE_VERSION: u64 = 1;
const SIZE_TYPE: u64 = 5;
const SIZE_LOCK_TIME: u64 = 8;
const SIZE_FEE: u64 = 8;
const SIZE_PUB_KEY_LAST_BYTE: u64 = 1;

// Fixed widths of a token sub-transaction.
const SIZE_TOKEN_AMOUNT: u64 = 8;
const SIZE_TOKEN_TX_TYPE: u64 = 4;
const SIZE_TOKEN_INFO: u64 = 64;

/// Inputs to [`estimate_tx_size`].
#[derive(Clone, Copy, Debug, Default)]
pub struct EstimateTxSizeParams<'a> {
    pub num_input_coins: usize,
    pub num_payments: usize,
    pub has_privacy: bool,
    pub metadata: Option<&'a Metadata>,
    pub token_params: Option<&'a CustomTokenParams>,
    /// Fee floor. A nonzero floor makes an empty request reserve room for
    /// a 1-in/1-out proof.
    pub limit_fee: u64,
}

/// Estimated size in bytes.
pub fn estimate_tx_size_bytes<P: Prover + ?Sized>(prover: &P, params: &EstimateTxSizeParams<'_>) -> u64 {
    let sig = if params.has_privacy {
        SIG_PRIVACY_SIZE
    } else {
        SIG_NO_PRIVACY_SIZE
    } as u64;

    let proof = if params.num_input_coins != 0 || params.num_payments != 0 {
        prover.estimate_proof_size(params.num_input_coins, params.num_payments, params.has_privacy)
    } else if params.limit_fee > 0 {
        prover.estimate_proof_size(1, 1, params.has_privacy)
    } else {
        0
    };

    let metadata = params.metadata.map_or(0, Metadata::calculate_size);

    let mut size = SIZE_VERSION
        + SIZE_TYPE
        + SIZE_LOCK_TIME
        + SIZE_FEE
        + MAX_TX_INFO_SIZE as u64
        + SIG_PUB_KEY_SIZE as u64
        + sig
        + proof
        + SIZE_PUB_KEY_LAST_BYTE
        + metadata;

    if let Some(token) = params.token_params {
        size += token.property_id.len() as u64
            + token.property_symbol.len() as u64
            + token.property_name.len() as u64
            + SIZE_TOKEN_AMOUNT
            + SIZE_TOKEN_TX_TYPE
            + SIZE_VERSION
            + SIZE_TYPE
            + SIZE_LOCK_TIME
            + SIZE_FEE
            + SIZE_TOKEN_INFO
            + SIG_PUB_KEY_SIZE as u64
            + SIG_PRIVACY_SIZE as u64
            + prover.estimate_proof_size(token.token_input.len(), token.receivers.len(), true)
            + SIZE_PUB_KEY_LAST_BYTE;
    }

    size
}

/// Estimated size in whole kilobytes, rounded up.
pub fn estimate_tx_size<P: Prover + ?Sized>(prover: &P, params: &EstimateTxSizeParams<'_>) -> u64 {
    estimate_tx_size_bytes(prover, params).div_ceil(1024)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zkp::{estimate_proof_size, ReferenceProver};

    fn est(i: usize, o: usize, privacy: bool) -> u64 {
        estimate_tx_size_bytes(
            &ReferenceProver::new(),
            &EstimateTxSizeParams {
                num_input_coins: i,
                num_payments: o,
                has_privacy: privacy,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_empty_tx_is_fixed_fields_only() {
        // 1 + 5 + 8 + 8 + 512 + 32 + 64 + 0 + 1
        assert_eq!(est(0, 0, false), 631);
        assert_eq!(est(0, 0, true), 663);
    }

    #[test]
    fn test_fee_floor_reserves_one_in_one_out() {
        let prover = ReferenceProver::new();
        let with_floor = estimate_tx_size_bytes(
            &prover,
            &EstimateTxSizeParams {
                limit_fee: 1,
                ..Default::default()
            },
        );
        assert_eq!(with_floor, est(0, 0, false) + estimate_proof_size(1, 1, false));
    }

    #[test]
    fn test_rounds_up_to_kb() {
        let prover = ReferenceProver::new();
        let p = EstimateTxSizeParams::default();
        assert_eq!(estimate_tx_size(&prover, &p), 1);
    }

    #[test]
    fn test_token_params_add_size() {
        let prover = ReferenceProver::new();
        let token = CustomTokenParams {
            property_name: "Token".into(),
            property_symbol: "TKN".into(),
            amount: 1000,
            ..Default::default()
        };
        let base = EstimateTxSizeParams::default();
        let with_token = EstimateTxSizeParams {
            token_params: Some(&token),
            ..base
        };
        let delta = estimate_tx_size_bytes(&prover, &with_token) - estimate_tx_size_bytes(&prover, &base);
        // 5 + 3 + 8 + 4 + 1 + 5 + 8 + 8 + 64 + 32 + 96 + 0 + 1
        assert_eq!(delta, 235);
    }

    #[test]
    fn test_255_inputs_fit_without_privacy_but_not_with() {
        let prover = ReferenceProver::new();
        let p = |privacy| EstimateTxSizeParams {
            num_input_coins: 255,
            num_payments: 1,
            has_privacy: privacy,
            ..Default::default()
        };
        assert!(estimate_tx_size(&prover, &p(false)) <= 100);
        assert!(estimate_tx_size(&prover, &p(true)) > 100);
    }
}
