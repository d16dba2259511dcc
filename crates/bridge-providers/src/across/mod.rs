//! Across bridge provider.
//!
//! Quotes via the `/suggested-fees` API, deposits through the spoke pools
//! with a balance-aware weiroll program, and reconciles settled orders from
//! `V3FundsDeposited` events.

use crate::{
	downcast_quote, parse_address, parse_u256_dec, parse_u64_dec, sign_hook_with_shed,
	BridgeError, BridgeProvider, BridgeProviderInfo, BridgeQuoteResult, SignedHookParams,
};
use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use bridge_settlement::{find_trade_index, nth_for_trade, trade_events, ChainRpc};
use bridge_shed::{estimate_hook_gas_limit, CowShed, HookGasParams, ShedOptions};
use bridge_types::{
	chains, BridgeHook, BridgePostHook, BridgeQuoteAmountsAndCosts, BridgeStatus,
	BridgeStatusResult, BridgingDepositParams, EvmCall, QuoteBridgeRequest, TokenConfig,
};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

pub mod api;
pub mod deposit;
pub mod util;

pub use api::{AcrossApi, AcrossDepositStatus, DepositStatusResponse, SuggestedFeesRequest};
pub use deposit::{
	create_across_deposit_call, deposit_events, math_contract_address, spoke_pool_address,
	DepositQuoteParams,
};

/// dappId written into every Across hook.
pub const ACROSS_HOOK_DAPP_ID: &str = "cow-sdk://bridging/providers/across";

/// Chains with both a spoke pool and API support.
pub const ACROSS_SUPPORTED_NETWORKS: [u64; 5] = [
	chains::MAINNET,
	chains::POLYGON,
	chains::BASE,
	chains::ARBITRUM_ONE,
	chains::SEPOLIA,
];

/// Extra slippage on top of the relay fee. Across fills exactly the quoted
/// output, so no tolerance is layered on.
pub const SLIPPAGE_TOLERANCE_BPS: u32 = 0;

const ACROSS_EXPLORER_URL: &str = "https://app.across.to/transactions";

/// Construction options; all fields have working defaults.
#[derive(Default)]
pub struct AcrossOptions {
	pub api_base_url: Option<String>,
	pub shed_options: ShedOptions,
	/// Read-only RPC access, used for gas estimation and settlement-log
	/// reconciliation. Without it gas falls back to the worst case and
	/// `bridging_params` is unavailable.
	pub rpc: Option<Arc<ChainRpc>>,
	/// Per-chain bridgeable token lists; defaults to the built-in table.
	pub token_lists: Option<HashMap<u64, Vec<TokenConfig>>>,
}

/// Across quote, carrying the raw fee response for the deposit builder.
#[derive(Debug)]
pub struct AcrossQuoteResult {
	amounts_and_costs: BridgeQuoteAmountsAndCosts,
	quote_timestamp: u64,
	expected_fill_time_seconds: Option<u64>,
	suggested_fees: api::SuggestedFeesResponse,
}

impl BridgeQuoteResult for AcrossQuoteResult {
	fn amounts_and_costs(&self) -> &BridgeQuoteAmountsAndCosts {
		&self.amounts_and_costs
	}

	fn quote_timestamp(&self) -> u64 {
		self.quote_timestamp
	}

	fn expected_fill_time_seconds(&self) -> Option<u64> {
		self.expected_fill_time_seconds
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}

pub struct AcrossBridgeProvider {
	api: AcrossApi,
	shed: CowShed,
	rpc: Option<Arc<ChainRpc>>,
	token_lists: HashMap<u64, Vec<TokenConfig>>,
}

impl AcrossBridgeProvider {
	pub fn new(options: AcrossOptions) -> Self {
		Self {
			api: AcrossApi::new(options.api_base_url),
			shed: CowShed::new(options.shed_options),
			rpc: options.rpc,
			token_lists: options.token_lists.unwrap_or_else(default_token_lists),
		}
	}

	fn tokens_for_chain(&self, chain_id: u64) -> Vec<TokenConfig> {
		self.token_lists.get(&chain_id).cloned().unwrap_or_default()
	}
}

#[async_trait]
impl BridgeProvider for AcrossBridgeProvider {
	fn info(&self) -> BridgeProviderInfo {
		BridgeProviderInfo {
			name: "across".to_string(),
			logo_url: "https://across.to/logo-small.png".to_string(),
			website: Some("https://across.to".to_string()),
			dapp_id: ACROSS_HOOK_DAPP_ID.to_string(),
		}
	}

	fn networks(&self) -> Vec<u64> {
		ACROSS_SUPPORTED_NETWORKS.to_vec()
	}

	async fn buy_tokens(&self, target_chain_id: u64) -> Result<Vec<TokenConfig>, BridgeError> {
		if !ACROSS_SUPPORTED_NETWORKS.contains(&target_chain_id) {
			return Ok(Vec::new());
		}
		Ok(self.tokens_for_chain(target_chain_id))
	}

	async fn intermediate_tokens(
		&self,
		request: &QuoteBridgeRequest,
	) -> Result<Vec<TokenConfig>, BridgeError> {
		request.ensure_sell_order()?;

		let routes = self
			.api
			.available_routes(
				request.sell_token_chain_id,
				request.buy_token_chain_id,
				request.buy_token_address,
			)
			.await?;

		let known = self.tokens_for_chain(request.sell_token_chain_id);
		let mut tokens = Vec::new();
		for route in &routes {
			let origin_token = parse_address(&route.origin_token, "originToken")?;
			if tokens
				.iter()
				.any(|t: &TokenConfig| t.address == origin_token)
			{
				continue;
			}
			if let Some(token) = known.iter().find(|t| t.address == origin_token) {
				tokens.push(token.clone());
			}
		}
		Ok(tokens)
	}

	#[instrument(skip_all, fields(
		origin = request.sell_token_chain_id,
		destination = request.buy_token_chain_id,
	))]
	async fn quote(
		&self,
		request: &QuoteBridgeRequest,
	) -> Result<Box<dyn BridgeQuoteResult>, BridgeError> {
		request.ensure_sell_order()?;

		let fees = self
			.api
			.suggested_fees(&SuggestedFeesRequest {
				token: request.sell_token_address,
				origin_chain_id: request.sell_token_chain_id,
				destination_chain_id: request.buy_token_chain_id,
				amount: request.amount,
				recipient: Some(request.recipient()),
			})
			.await?;

		if fees.is_amount_too_low {
			return Err(BridgeError::quote(format!(
				"Amount {} is below the Across minimum deposit {}",
				request.amount, fees.limits.min_deposit
			)));
		}

		let amounts_and_costs = util::to_amounts_and_costs(request, SLIPPAGE_TOLERANCE_BPS, &fees)?;
		let quote_timestamp = parse_u64_dec(&fees.timestamp, "timestamp")?;
		let expected_fill_time_seconds =
			parse_u64_dec(&fees.expected_fill_time_sec, "expectedFillTimeSec").ok();

		debug!(
			fee_bps = amounts_and_costs.costs.bridging_fee.fee_bps,
			"across quote normalized"
		);

		Ok(Box::new(AcrossQuoteResult {
			amounts_and_costs,
			quote_timestamp,
			expected_fill_time_seconds,
			suggested_fees: fees,
		}))
	}

	fn unsigned_bridge_call(
		&self,
		request: &QuoteBridgeRequest,
		quote: &dyn BridgeQuoteResult,
	) -> Result<EvmCall, BridgeError> {
		let quote = downcast_quote::<AcrossQuoteResult>(quote, "across")?;
		let fees = &quote.suggested_fees;

		let shed_account = self.shed.shed_account(request.owner_address());
		let spoke_pool = parse_address(&fees.spoke_pool_address, "spokePoolAddress")?;
		let params = DepositQuoteParams {
			relay_fee_pct: parse_u256_dec(&fees.total_relay_fee.pct, "totalRelayFee.pct")?,
			exclusive_relayer: parse_address(&fees.exclusive_relayer, "exclusiveRelayer")?,
			quote_timestamp: parse_u64_dec(&fees.timestamp, "timestamp")? as u32,
			fill_deadline: parse_u64_dec(&fees.fill_deadline, "fillDeadline")? as u32,
			exclusivity_deadline: parse_u64_dec(&fees.exclusivity_deadline, "exclusivityDeadline")?
				as u32,
		};

		create_across_deposit_call(request, shed_account, spoke_pool, &params)
	}

	async fn hook_gas_limit(&self, request: &QuoteBridgeRequest) -> u64 {
		let shed_account = self.shed.shed_account(request.owner_address());
		let provider = self
			.rpc
			.as_ref()
			.and_then(|rpc| rpc.provider(request.sell_token_chain_id));

		estimate_hook_gas_limit(provider, shed_account, HookGasParams::default()).await
	}

	async fn signed_hook(&self, params: SignedHookParams<'_>) -> Result<BridgeHook, BridgeError> {
		sign_hook_with_shed(&self.shed, ACROSS_HOOK_DAPP_ID, params).await
	}

	fn decode_bridge_hook(
		&self,
		_post_hook: &BridgePostHook,
	) -> Result<QuoteBridgeRequest, BridgeError> {
		// The helper calldata carries no decimals, so the request cannot be
		// reconstructed faithfully.
		Err(BridgeError::Unsupported("decoding Across bridge hooks"))
	}

	#[instrument(skip(self), fields(order_uid = %order_uid))]
	async fn bridging_params(
		&self,
		chain_id: u64,
		order_uid: &str,
		settlement_tx: B256,
	) -> Result<Option<BridgingDepositParams>, BridgeError> {
		let rpc = self.rpc.as_ref().ok_or_else(|| {
			BridgeError::Validation("No RPC configured for settlement reconciliation".to_string())
		})?;
		let spoke_pool = spoke_pool_address(chain_id).ok_or_else(|| {
			BridgeError::Validation(format!("No Across spoke pool on chain {}", chain_id))
		})?;

		let logs = rpc.transaction_logs(chain_id, settlement_tx).await?;
		let deposits = deposit_events(&logs, spoke_pool);
		if deposits.is_empty() {
			return Ok(None);
		}

		let trades = trade_events(&logs);
		let Some(index) = find_trade_index(&trades, order_uid) else {
			return Ok(None);
		};
		let Some(deposit) = nth_for_trade(index, &deposits) else {
			return Ok(None);
		};

		Ok(Some(BridgingDepositParams {
			input_token_address: deposit.inputToken,
			output_token_address: deposit.outputToken,
			input_amount: deposit.inputAmount,
			output_amount: Some(deposit.outputAmount),
			owner: deposit.depositor,
			recipient: deposit.recipient,
			quote_timestamp: Some(deposit.quoteTimestamp as u64),
			fill_deadline: Some(deposit.fillDeadline as u64),
			source_chain_id: chain_id,
			destination_chain_id: deposit.destinationChainId.to::<u64>(),
			bridging_id: deposit.depositId.to_string(),
		}))
	}

	fn explorer_url(&self, bridging_id: &str) -> String {
		format!("{}/{}", ACROSS_EXPLORER_URL, bridging_id)
	}

	async fn status(
		&self,
		bridging_id: &str,
		origin_chain_id: u64,
	) -> Result<BridgeStatusResult, BridgeError> {
		let response = self.api.deposit_status(origin_chain_id, bridging_id).await?;
		Ok(map_deposit_status(&response))
	}

	async fn cancel_bridging_tx(&self, _bridging_id: &str) -> Result<EvmCall, BridgeError> {
		Err(BridgeError::Unsupported("cancelling Across deposits"))
	}

	async fn refund_bridging_tx(&self, _bridging_id: &str) -> Result<EvmCall, BridgeError> {
		// Expired deposits are refunded by the protocol without user action.
		Err(BridgeError::Unsupported("refunding Across deposits"))
	}
}

/// Maps the API's deposit lifecycle onto the shared status model.
pub fn map_deposit_status(response: &DepositStatusResponse) -> BridgeStatusResult {
	let status = match response.status {
		AcrossDepositStatus::Filled => BridgeStatus::Executed,
		AcrossDepositStatus::Pending | AcrossDepositStatus::SlowFillRequested => {
			BridgeStatus::InProgress
		}
		AcrossDepositStatus::Expired => BridgeStatus::Expired,
		AcrossDepositStatus::Refunded => BridgeStatus::Refund,
	};

	BridgeStatusResult {
		status,
		deposit_tx_hash: response.deposit_tx_hash,
		fill_tx_hash: response.fill_tx,
	}
}

fn default_token_lists() -> HashMap<u64, Vec<TokenConfig>> {
	use alloy_primitives::address;

	fn token(address: Address, symbol: &str, decimals: u8) -> TokenConfig {
		TokenConfig {
			address,
			symbol: symbol.to_string(),
			decimals,
		}
	}

	HashMap::from([
		(
			chains::MAINNET,
			vec![
				token(
					address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
					"WETH",
					18,
				),
				token(
					address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
					"USDC",
					6,
				),
				token(
					address!("6B175474E89094C44Da98b954EedeAC495271d0F"),
					"DAI",
					18,
				),
				token(
					address!("2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599"),
					"WBTC",
					8,
				),
			],
		),
		(
			chains::POLYGON,
			vec![
				token(
					address!("7ceB23fD6bC0adD59E62ac25578270cFf1b9f619"),
					"WETH",
					18,
				),
				token(
					address!("3c499c542cEF5E3811e1192ce70d8cC03d5c3359"),
					"USDC",
					6,
				),
			],
		),
		(
			chains::BASE,
			vec![
				token(
					address!("4200000000000000000000000000000000000006"),
					"WETH",
					18,
				),
				token(
					address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
					"USDC",
					6,
				),
			],
		),
		(
			chains::ARBITRUM_ONE,
			vec![
				token(
					address!("82aF49447D8a07e3bd95BD0d56f35241523fBab1"),
					"WETH",
					18,
				),
				token(
					address!("af88d065e77c8cC2239327C5EDb3A432268e5831"),
					"USDC",
					6,
				),
			],
		),
		(
			chains::SEPOLIA,
			vec![token(
				address!("fFf9976782d46CC05630D1f6eBAb18b2324d6B14"),
				"WETH",
				18,
			)],
		),
	])
}

#[cfg(test)]
mod tests {
	use super::*;

	fn provider() -> AcrossBridgeProvider {
		AcrossBridgeProvider::new(AcrossOptions::default())
	}

	#[tokio::test]
	async fn unsupported_chain_has_no_buy_tokens() {
		let tokens = provider().buy_tokens(chains::GNOSIS_CHAIN).await.unwrap();
		assert!(tokens.is_empty());
	}

	#[tokio::test]
	async fn supported_chain_lists_buy_tokens() {
		let tokens = provider().buy_tokens(chains::ARBITRUM_ONE).await.unwrap();
		assert!(tokens.iter().any(|t| t.symbol == "USDC"));
	}

	#[tokio::test]
	async fn cancel_and_refund_are_unsupported() {
		let provider = provider();
		assert!(matches!(
			provider.cancel_bridging_tx("42").await,
			Err(BridgeError::Unsupported(_))
		));
		assert!(matches!(
			provider.refund_bridging_tx("42").await,
			Err(BridgeError::Unsupported(_))
		));
	}

	#[test]
	fn status_mapping_covers_all_lifecycle_states() {
		let response = |status| DepositStatusResponse {
			status,
			deposit_tx_hash: Some(B256::repeat_byte(0x01)),
			fill_tx: None,
			deposit_refund_tx_hash: None,
		};

		assert_eq!(
			map_deposit_status(&response(AcrossDepositStatus::Filled)).status,
			BridgeStatus::Executed
		);
		assert_eq!(
			map_deposit_status(&response(AcrossDepositStatus::Pending)).status,
			BridgeStatus::InProgress
		);
		assert_eq!(
			map_deposit_status(&response(AcrossDepositStatus::SlowFillRequested)).status,
			BridgeStatus::InProgress
		);
		assert_eq!(
			map_deposit_status(&response(AcrossDepositStatus::Expired)).status,
			BridgeStatus::Expired
		);
		assert_eq!(
			map_deposit_status(&response(AcrossDepositStatus::Refunded)).status,
			BridgeStatus::Refund
		);
	}

	#[test]
	fn explorer_url_embeds_deposit_id() {
		assert_eq!(
			provider().explorer_url("1234"),
			"https://app.across.to/transactions/1234"
		);
	}
}
