//! Fixed-point fee arithmetic shared by quote normalizers.
//!
//! Fee percentages arrive from providers as fractions of 10^18 (1% = 10^16),
//! the same fixed-point format the bridge contracts use on-chain. All math
//! here is integer-only with floor division; on-chain accounting requires
//! bit-exact reproducibility.

use crate::BridgeError;
use alloy_primitives::{uint, U256};

/// 100% in the providers' 10^18 fixed-point percentage scale.
pub const ONE_HUNDRED_PCT: U256 = uint!(1_000_000_000_000_000_000_U256);

/// 100% in basis points.
pub const MAX_BPS: u32 = 10_000;

/// Converts a 10^18-scaled percentage to basis points, flooring.
///
/// `pct_to_bps(10^16) == 100` (1% is 100 bps).
pub fn pct_to_bps(pct: U256) -> Result<u32, BridgeError> {
	ensure_pct_in_range(pct)?;
	let bps = pct * U256::from(MAX_BPS) / ONE_HUNDRED_PCT;
	// Bounded by MAX_BPS after the range check above.
	Ok(bps.to::<u32>())
}

/// Applies a 10^18-scaled percentage fee to an amount, flooring:
/// `floor(amount * (10^18 - pct) / 10^18)`.
pub fn apply_pct_fee(amount: U256, pct: U256) -> Result<U256, BridgeError> {
	ensure_pct_in_range(pct)?;
	let numerator = amount
		.checked_mul(ONE_HUNDRED_PCT - pct)
		.ok_or_else(|| BridgeError::Validation("fee math overflow".to_string()))?;
	Ok(numerator / ONE_HUNDRED_PCT)
}

/// Applies a basis-point deduction to an amount, flooring:
/// `floor(amount * (10000 - bps) / 10000)`.
pub fn apply_bps(amount: U256, bps: u32) -> Result<U256, BridgeError> {
	if bps > MAX_BPS {
		return Err(BridgeError::Validation(
			"Fee cannot exceed 100%".to_string(),
		));
	}
	let numerator = amount
		.checked_mul(U256::from(MAX_BPS - bps))
		.ok_or_else(|| BridgeError::Validation("fee math overflow".to_string()))?;
	Ok(numerator / U256::from(MAX_BPS))
}

/// Rescales an amount between token decimals, always rounding down.
///
/// Applied before cost math whenever sell- and buy-token decimals differ;
/// rounding down means we never promise more than can be delivered.
pub fn rescale_amount(amount: U256, from_decimals: u8, to_decimals: u8) -> U256 {
	if from_decimals == to_decimals {
		return amount;
	}
	if from_decimals > to_decimals {
		let divisor = U256::from(10u64).pow(U256::from(from_decimals - to_decimals));
		amount / divisor
	} else {
		let multiplier = U256::from(10u64).pow(U256::from(to_decimals - from_decimals));
		amount * multiplier
	}
}

fn ensure_pct_in_range(pct: U256) -> Result<(), BridgeError> {
	if pct > ONE_HUNDRED_PCT {
		return Err(BridgeError::Validation(
			"Fee cannot exceed 100%".to_string(),
		));
	}
	Ok(())
}
