//! Bridge quote normalization types.
//!
//! Every provider's raw fee/rate response is converted into one comparable
//! cost model: before-fee / after-fee / after-slippage amount pairs plus a
//! fee breakdown in basis points and in both currencies. The invariant
//! `after_slippage.buy_amount <= after_fee.buy_amount <= before_fee.buy_amount`
//! holds for all providers.

use crate::{apply_bps, apply_pct_fee, pct_to_bps, BridgeError};
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// A sell/buy amount pair at one stage of the cost pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeQuoteAmounts {
	pub sell_amount: U256,
	pub buy_amount: U256,
}

/// One named fee component, expressed as a basis-point rate and as amounts
/// in both the sell and buy currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeFeeCost {
	pub fee_bps: u32,
	pub amount_in_sell_currency: U256,
	pub amount_in_buy_currency: U256,
}

/// Cost breakdown of a bridge quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeQuoteCosts {
	pub bridging_fee: BridgeFeeCost,
}

/// Normalized amounts and costs of a bridge quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeQuoteAmountsAndCosts {
	pub before_fee: BridgeQuoteAmounts,
	pub after_fee: BridgeQuoteAmounts,
	pub after_slippage: BridgeQuoteAmounts,
	/// Client-chosen slippage tolerance, layered on top of the provider fee.
	pub slippage_bps: u32,
	pub costs: BridgeQuoteCosts,
}

impl BridgeQuoteAmountsAndCosts {
	/// Builds the cost model for a provider that reports its fee as a
	/// 10^18-scaled percentage deducted on the buy side (Across).
	///
	/// `buy_amount_before_fee` must already be rescaled to the buy token's
	/// decimals. Fee and slippage are applied in two separate steps so the
	/// two cost components stay separately auditable.
	pub fn from_relay_fee_pct(
		sell_amount: U256,
		buy_amount_before_fee: U256,
		fee_pct: U256,
		slippage_bps: u32,
	) -> Result<Self, BridgeError> {
		let fee_bps = pct_to_bps(fee_pct)?;
		let buy_amount_after_fee = apply_pct_fee(buy_amount_before_fee, fee_pct)?;
		let buy_amount_after_slippage = apply_bps(buy_amount_after_fee, slippage_bps)?;

		let sell_amount_after_fee = apply_pct_fee(sell_amount, fee_pct)?;

		Ok(Self {
			before_fee: BridgeQuoteAmounts {
				sell_amount,
				buy_amount: buy_amount_before_fee,
			},
			after_fee: BridgeQuoteAmounts {
				sell_amount,
				buy_amount: buy_amount_after_fee,
			},
			after_slippage: BridgeQuoteAmounts {
				sell_amount,
				buy_amount: buy_amount_after_slippage,
			},
			slippage_bps,
			costs: BridgeQuoteCosts {
				bridging_fee: BridgeFeeCost {
					fee_bps,
					amount_in_sell_currency: sell_amount - sell_amount_after_fee,
					amount_in_buy_currency: buy_amount_before_fee - buy_amount_after_fee,
				},
			},
		})
	}

	/// Checks the cross-provider ordering invariant on the buy leg.
	pub fn is_consistent(&self) -> bool {
		self.after_slippage.buy_amount <= self.after_fee.buy_amount
			&& self.after_fee.buy_amount <= self.before_fee.buy_amount
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::uint;

	#[test]
	fn relay_fee_pct_ordering_invariant() {
		// 2.5% fee, 50 bps slippage
		let amounts = BridgeQuoteAmountsAndCosts::from_relay_fee_pct(
			U256::from(1_000_000_000u64),
			U256::from(1_000_000_000u64),
			uint!(25_000_000_000_000_000_U256),
			50,
		)
		.unwrap();

		assert!(amounts.is_consistent());
		assert!(amounts.after_slippage.buy_amount < amounts.after_fee.buy_amount);
		assert!(amounts.after_fee.buy_amount < amounts.before_fee.buy_amount);
		assert_eq!(amounts.costs.bridging_fee.fee_bps, 250);
	}

	#[test]
	fn zero_fee_zero_slippage_is_identity() {
		let amounts = BridgeQuoteAmountsAndCosts::from_relay_fee_pct(
			U256::from(42u64),
			U256::from(42u64),
			U256::ZERO,
			0,
		)
		.unwrap();

		assert_eq!(amounts.before_fee, amounts.after_fee);
		assert_eq!(amounts.after_fee, amounts.after_slippage);
		assert_eq!(amounts.costs.bridging_fee.fee_bps, 0);
		assert_eq!(amounts.costs.bridging_fee.amount_in_buy_currency, U256::ZERO);
	}

	#[test]
	fn rejects_fee_over_100_pct() {
		let result = BridgeQuoteAmountsAndCosts::from_relay_fee_pct(
			U256::from(1u64),
			U256::from(1u64),
			crate::ONE_HUNDRED_PCT + U256::from(1),
			0,
		);
		assert!(result.is_err());
	}
}
