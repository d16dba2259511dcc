//! Bungee quote normalization.

use crate::parse_u256_dec;
use alloy_primitives::U256;
use bridge_types::{
	BridgeError, BridgeFeeCost, BridgeQuoteAmounts, BridgeQuoteAmountsAndCosts, BridgeQuoteCosts,
	QuoteBridgeRequest, MAX_BPS,
};

use super::api::ManualRoute;

/// Picks the route with the highest expected output.
pub fn best_route(routes: &[ManualRoute]) -> Result<&ManualRoute, BridgeError> {
	let mut best: Option<(&ManualRoute, U256)> = None;
	for route in routes {
		let amount = parse_u256_dec(&route.output.amount, "output.amount")?;
		if best.map(|(_, current)| amount > current).unwrap_or(true) {
			best = Some((route, amount));
		}
	}
	best.map(|(route, _)| route)
		.ok_or_else(|| BridgeError::quote("Bungee returned no manual routes".to_string()))
}

/// Normalizes a manual route into the shared cost model.
///
/// Bungee charges its fee in the input token, so the buy amount is the same
/// before and after the fee and the buy-currency fee component is zero. The
/// slippage tolerance is recovered from the route's own minAmountOut instead
/// of layering a client-side one on top.
pub fn to_amounts_and_costs(
	request: &QuoteBridgeRequest,
	route: &ManualRoute,
) -> Result<BridgeQuoteAmountsAndCosts, BridgeError> {
	let sell_amount = request.amount;
	let buy_amount = parse_u256_dec(&route.output.amount, "output.amount")?;
	let min_amount_out = parse_u256_dec(&route.output.min_amount_out, "output.minAmountOut")?;
	let fee_amount = parse_u256_dec(&route.route_details.route_fee.amount, "routeFee.amount")?;

	if fee_amount > sell_amount {
		return Err(BridgeError::Validation(
			"Fee cannot exceed 100%".to_string(),
		));
	}
	if min_amount_out > buy_amount {
		return Err(BridgeError::quote(
			"Bungee route guarantees more than it expects to deliver".to_string(),
		));
	}

	let fee_bps = if sell_amount.is_zero() {
		0
	} else {
		(fee_amount * U256::from(MAX_BPS) / sell_amount).to::<u32>()
	};
	let slippage_bps = if buy_amount.is_zero() {
		0
	} else {
		((buy_amount - min_amount_out) * U256::from(MAX_BPS) / buy_amount).to::<u32>()
	};

	Ok(BridgeQuoteAmountsAndCosts {
		before_fee: BridgeQuoteAmounts {
			sell_amount,
			buy_amount,
		},
		after_fee: BridgeQuoteAmounts {
			sell_amount,
			buy_amount,
		},
		after_slippage: BridgeQuoteAmounts {
			sell_amount,
			buy_amount: min_amount_out,
		},
		slippage_bps,
		costs: BridgeQuoteCosts {
			bridging_fee: BridgeFeeCost {
				fee_bps,
				amount_in_sell_currency: fee_amount,
				amount_in_buy_currency: U256::ZERO,
			},
		},
	})
}

#[cfg(test)]
mod tests {
	use super::super::api::{RouteDetails, RouteFee, RouteOutput, RouteToken};
	use super::*;
	use alloy_primitives::{address, Address};
	use bridge_types::OrderKind;

	fn request(amount: u64) -> QuoteBridgeRequest {
		QuoteBridgeRequest {
			kind: OrderKind::Sell,
			sell_token_chain_id: 1,
			sell_token_address: address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
			sell_token_decimals: 6,
			buy_token_chain_id: 100,
			buy_token_address: address!("DDAfbb505ad214D7b80b1f830fcCc89B60fb7A83"),
			buy_token_decimals: 6,
			amount: U256::from(amount),
			account: address!("1111111111111111111111111111111111111111"),
			owner: None,
			receiver: None,
			app_code: "test".to_string(),
		}
	}

	fn route(bridge: &str, amount: &str, min_out: &str, fee: &str) -> ManualRoute {
		let token = RouteToken {
			address: Address::repeat_byte(0x01),
			symbol: None,
			decimals: None,
		};
		ManualRoute {
			quote_id: format!("quote-{}", bridge),
			quote_expiry: None,
			output: RouteOutput {
				token: token.clone(),
				amount: amount.to_string(),
				min_amount_out: min_out.to_string(),
			},
			estimated_time: Some(120),
			route_details: RouteDetails {
				name: bridge.to_string(),
				route_fee: RouteFee {
					token,
					amount: fee.to_string(),
				},
			},
		}
	}

	#[test]
	fn best_route_maximizes_output() {
		let routes = [
			route("Across", "990000", "980000", "10000"),
			route("Circle CCTP", "995000", "990000", "5000"),
			route("Gnosis Native", "970000", "960000", "30000"),
		];

		let best = best_route(&routes).unwrap();
		assert_eq!(best.route_details.name, "Circle CCTP");
		assert!(best_route(&[]).is_err());
	}

	#[test]
	fn fee_is_charged_in_the_sell_currency() {
		// 1 USDC in, 0.5% fee (5000 of 1_000_000), min out 99% of output
		let amounts =
			to_amounts_and_costs(&request(1_000_000), &route("Across", "995000", "985050", "5000"))
				.unwrap();

		assert_eq!(amounts.before_fee.buy_amount, amounts.after_fee.buy_amount);
		assert_eq!(amounts.costs.bridging_fee.fee_bps, 50);
		assert_eq!(
			amounts.costs.bridging_fee.amount_in_sell_currency,
			U256::from(5000u64)
		);
		assert_eq!(
			amounts.costs.bridging_fee.amount_in_buy_currency,
			U256::ZERO
		);
		assert_eq!(amounts.after_slippage.buy_amount, U256::from(985_050u64));
		assert_eq!(amounts.slippage_bps, 100);
		assert!(amounts.is_consistent());
	}

	#[test]
	fn rejects_fee_above_sell_amount() {
		let result = to_amounts_and_costs(&request(100), &route("Across", "90", "90", "200"));
		assert!(matches!(result, Err(BridgeError::Validation(_))));
	}

	#[test]
	fn rejects_min_out_above_expected_output() {
		let result =
			to_amounts_and_costs(&request(1000), &route("Across", "900", "950", "10"));
		assert!(matches!(result, Err(BridgeError::ProviderQuote { .. })));
	}
}
