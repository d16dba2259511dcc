//! Across quote normalization.

use crate::parse_u256_dec;
use bridge_types::{rescale_amount, BridgeError, BridgeQuoteAmountsAndCosts, QuoteBridgeRequest};

use super::api::SuggestedFeesResponse;

/// Normalizes a suggested-fees response into the shared cost model.
///
/// Across deducts `totalRelayFee.pct` on the buy side of a 1:1 transfer, so
/// the before-fee buy amount is the sell amount rescaled to the buy token's
/// decimals.
pub fn to_amounts_and_costs(
	request: &QuoteBridgeRequest,
	slippage_bps: u32,
	fees: &SuggestedFeesResponse,
) -> Result<BridgeQuoteAmountsAndCosts, BridgeError> {
	let fee_pct = parse_u256_dec(&fees.total_relay_fee.pct, "totalRelayFee.pct")?;
	let buy_amount_before_fee = rescale_amount(
		request.amount,
		request.sell_token_decimals,
		request.buy_token_decimals,
	);

	BridgeQuoteAmountsAndCosts::from_relay_fee_pct(
		request.amount,
		buy_amount_before_fee,
		fee_pct,
		slippage_bps,
	)
}
