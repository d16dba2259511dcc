//! Bungee bridge provider.
//!
//! Quotes manual (non-swapping) routes over the SocketGateway, verifies the
//! returned gateway calldata against the quote before wrapping it into a
//! hook, and resolves status from the Bungee order indexer with an Across
//! re-check for routes that bridged through Across.

use crate::{
	downcast_quote, parse_u256_dec, sign_hook_with_shed, unix_now, BridgeError, BridgeProvider,
	BridgeProviderInfo, BridgeQuoteResult, SignedHookParams,
};
use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use bridge_settlement::ChainRpc;
use bridge_shed::{estimate_hook_gas_limit, CowShed, HookGasParams, ShedOptions};
use bridge_types::{
	chains, BridgeHook, BridgePostHook, BridgeQuoteAmountsAndCosts, BridgeStatusResult,
	BridgingDepositParams, EvmCall, QuoteBridgeRequest, TokenConfig,
};
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, instrument};

pub mod api;
pub mod deposit;
pub mod status;
pub mod util;

pub use api::{BungeeApi, BungeeApiOptions, BungeeEvent, ManualRoute, TxStatus};
pub use deposit::{
	bridge_internal_name, create_bungee_deposit_call, gateway_functions, verify_gateway_calldata,
	BungeeDepositParams, GatewayFunction, NATIVE_ETH_ADDRESS,
};

use crate::across::AcrossApi;

/// dappId written into every Bungee hook.
pub const BUNGEE_HOOK_DAPP_ID: &str = "cow-sdk://bridging/providers/bungee";

/// Chains with SocketGateway and API support.
pub const BUNGEE_SUPPORTED_NETWORKS: [u64; 7] = [
	chains::MAINNET,
	chains::OPTIMISM,
	chains::GNOSIS_CHAIN,
	chains::POLYGON,
	chains::BASE,
	chains::ARBITRUM_ONE,
	chains::AVALANCHE,
];

/// Gas buffer for Mainnet -> Gnosis routes, whose gateway leg is the most
/// expensive one observed.
pub const EXTRA_GAS_MAINNET_TO_GNOSIS: u64 = 100_000;

const BUNGEE_EXPLORER_URL: &str = "https://socketscan.io/tx";

/// Construction options; all fields have working defaults.
#[derive(Default)]
pub struct BungeeOptions {
	pub api: BungeeApiOptions,
	pub shed_options: ShedOptions,
	/// Read-only RPC access for gas estimation; optional.
	pub rpc: Option<Arc<ChainRpc>>,
	/// Base URL override for the Across status re-check.
	pub across_api_base_url: Option<String>,
	/// Per-chain byte-surgery helper contracts used by the deposit plan.
	pub cowswap_lib_addresses: HashMap<u64, Address>,
}

/// Bungee quote, carrying the verified gateway transaction so the deposit
/// call can be built without re-querying the API.
#[derive(Debug)]
pub struct BungeeQuoteResult {
	amounts_and_costs: BridgeQuoteAmountsAndCosts,
	quote_timestamp: u64,
	expected_fill_time_seconds: Option<u64>,
	gateway_address: Address,
	gateway_calldata: Bytes,
	spender_address: Option<Address>,
	bridge_display_name: String,
}

impl BridgeQuoteResult for BungeeQuoteResult {
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

pub struct BungeeBridgeProvider {
	api: BungeeApi,
	shed: CowShed,
	rpc: Option<Arc<ChainRpc>>,
	/// Used to disambiguate Across-backed routes during status resolution.
	across: AcrossApi,
	cowswap_lib_addresses: HashMap<u64, Address>,
	token_lists: RwLock<HashMap<u64, Vec<TokenConfig>>>,
}

impl BungeeBridgeProvider {
	pub fn new(options: BungeeOptions) -> Self {
		Self {
			api: BungeeApi::new(options.api),
			shed: CowShed::new(options.shed_options),
			rpc: options.rpc,
			across: AcrossApi::new(options.across_api_base_url),
			cowswap_lib_addresses: options.cowswap_lib_addresses,
			token_lists: RwLock::new(HashMap::new()),
		}
	}

	fn cached_tokens(&self, chain_id: u64) -> Option<Vec<TokenConfig>> {
		self.token_lists
			.read()
			.ok()
			.and_then(|cache| cache.get(&chain_id).cloned())
	}

	fn cache_tokens(&self, chain_id: u64, tokens: Vec<TokenConfig>) {
		if let Ok(mut cache) = self.token_lists.write() {
			cache.insert(chain_id, tokens);
		}
	}
}

fn token_config(entry: &api::TokenListEntry) -> TokenConfig {
	TokenConfig {
		address: entry.address,
		symbol: entry.symbol.clone(),
		decimals: entry.decimals,
	}
}

#[async_trait]
impl BridgeProvider for BungeeBridgeProvider {
	fn info(&self) -> BridgeProviderInfo {
		BridgeProviderInfo {
			name: "bungee".to_string(),
			logo_url: "https://bungee.exchange/favicon.png".to_string(),
			website: Some("https://bungee.exchange".to_string()),
			dapp_id: BUNGEE_HOOK_DAPP_ID.to_string(),
		}
	}

	fn networks(&self) -> Vec<u64> {
		BUNGEE_SUPPORTED_NETWORKS.to_vec()
	}

	async fn buy_tokens(&self, target_chain_id: u64) -> Result<Vec<TokenConfig>, BridgeError> {
		if !BUNGEE_SUPPORTED_NETWORKS.contains(&target_chain_id) {
			return Ok(Vec::new());
		}
		if let Some(tokens) = self.cached_tokens(target_chain_id) {
			return Ok(tokens);
		}

		let entries = self.api.to_token_list(target_chain_id).await?;
		let tokens: Vec<_> = entries
			.iter()
			.filter(|entry| entry.chain_id == target_chain_id)
			.map(token_config)
			.collect();
		self.cache_tokens(target_chain_id, tokens.clone());
		Ok(tokens)
	}

	async fn intermediate_tokens(
		&self,
		request: &QuoteBridgeRequest,
	) -> Result<Vec<TokenConfig>, BridgeError> {
		request.ensure_sell_order()?;

		let entries = self
			.api
			.from_token_list(request.sell_token_chain_id, request.buy_token_chain_id)
			.await?;

		Ok(entries
			.iter()
			.filter(|entry| entry.chain_id == request.sell_token_chain_id)
			.map(token_config)
			.collect())
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

		// The deposit executes from the proxy, so the quote must be
		// attributed to it rather than the trading account.
		let shed_account = self.shed.shed_account(request.owner_address());

		let result = self
			.api
			.quote(&api::QuoteRequest {
				origin_chain_id: request.sell_token_chain_id,
				destination_chain_id: request.buy_token_chain_id,
				input_token: request.sell_token_address,
				output_token: request.buy_token_address,
				input_amount: request.amount,
				user_address: shed_account,
				receiver_address: request.recipient(),
			})
			.await?;

		let route = util::best_route(&result.manual_routes)?;
		let amounts_and_costs = util::to_amounts_and_costs(request, route)?;

		let built = self.api.build_tx(&route.quote_id).await?;
		let calldata = hex::decode(built.tx_data.data.trim_start_matches("0x"))
			.map_err(|e| BridgeError::quote(format!("txData.data is not hex: {}", e)))?;
		verify_gateway_calldata(&calldata, &route.route_details.name, request.amount)?;

		debug!(
			bridge = %route.route_details.name,
			fee_bps = amounts_and_costs.costs.bridging_fee.fee_bps,
			"bungee route verified"
		);

		Ok(Box::new(BungeeQuoteResult {
			amounts_and_costs,
			quote_timestamp: unix_now(),
			expected_fill_time_seconds: route.estimated_time,
			gateway_address: built.tx_data.to,
			gateway_calldata: Bytes::from(calldata),
			spender_address: built.approval_data.map(|approval| approval.spender_address),
			bridge_display_name: route.route_details.name.clone(),
		}))
	}

	fn unsigned_bridge_call(
		&self,
		request: &QuoteBridgeRequest,
		quote: &dyn BridgeQuoteResult,
	) -> Result<EvmCall, BridgeError> {
		let quote = downcast_quote::<BungeeQuoteResult>(quote, "bungee")?;
		let cowswap_lib = self
			.cowswap_lib_addresses
			.get(&request.sell_token_chain_id)
			.copied()
			.ok_or_else(|| {
				BridgeError::Validation(format!(
					"No BungeeCowswapLib contract configured for chain {}",
					request.sell_token_chain_id
				))
			})?;

		let shed_account = self.shed.shed_account(request.owner_address());
		create_bungee_deposit_call(
			request,
			shed_account,
			&BungeeDepositParams {
				gateway_address: quote.gateway_address,
				gateway_calldata: quote.gateway_calldata.clone(),
				spender_address: quote.spender_address,
				cowswap_lib,
				bridge_display_name: quote.bridge_display_name.clone(),
			},
		)
	}

	async fn hook_gas_limit(&self, request: &QuoteBridgeRequest) -> u64 {
		let extra_gas = if request.sell_token_chain_id == chains::MAINNET
			&& request.buy_token_chain_id == chains::GNOSIS_CHAIN
		{
			EXTRA_GAS_MAINNET_TO_GNOSIS
		} else {
			0
		};

		let shed_account = self.shed.shed_account(request.owner_address());
		let provider = self
			.rpc
			.as_ref()
			.and_then(|rpc| rpc.provider(request.sell_token_chain_id));

		estimate_hook_gas_limit(
			provider,
			shed_account,
			HookGasParams {
				extra_gas,
				..HookGasParams::default()
			},
		)
		.await
	}

	async fn signed_hook(&self, params: SignedHookParams<'_>) -> Result<BridgeHook, BridgeError> {
		sign_hook_with_shed(&self.shed, BUNGEE_HOOK_DAPP_ID, params).await
	}

	fn decode_bridge_hook(
		&self,
		_post_hook: &BridgePostHook,
	) -> Result<QuoteBridgeRequest, BridgeError> {
		// The gateway calldata is bridge-specific and carries no decimals.
		Err(BridgeError::Unsupported("decoding Bungee bridge hooks"))
	}

	#[instrument(skip(self), fields(order_uid = %order_uid))]
	async fn bridging_params(
		&self,
		_chain_id: u64,
		order_uid: &str,
		_settlement_tx: B256,
	) -> Result<Option<BridgingDepositParams>, BridgeError> {
		let events = self.api.order_events(order_uid).await?;
		let Some(event) = events.first() else {
			return Ok(None);
		};

		let output_amount = event
			.dest_amount
			.as_deref()
			.map(|amount| parse_u256_dec(amount, "destAmount"))
			.transpose()?;

		Ok(Some(BridgingDepositParams {
			input_token_address: event.src_token_address,
			output_token_address: event.dest_token_address,
			input_amount: parse_u256_dec(&event.src_amount, "srcAmount")?,
			output_amount,
			owner: event.sender,
			recipient: event.recipient,
			quote_timestamp: None,
			fill_deadline: None,
			source_chain_id: event.from_chain_id,
			destination_chain_id: event.to_chain_id,
			bridging_id: order_uid.to_string(),
		}))
	}

	fn explorer_url(&self, bridging_id: &str) -> String {
		format!("{}/{}", BUNGEE_EXPLORER_URL, bridging_id)
	}

	async fn status(
		&self,
		bridging_id: &str,
		_origin_chain_id: u64,
	) -> Result<BridgeStatusResult, BridgeError> {
		let events = self.api.order_events(bridging_id).await?;
		status::status_from_events(&events, &self.across).await
	}

	async fn cancel_bridging_tx(&self, _bridging_id: &str) -> Result<EvmCall, BridgeError> {
		Err(BridgeError::Unsupported("cancelling Bungee bridging"))
	}

	async fn refund_bridging_tx(&self, _bridging_id: &str) -> Result<EvmCall, BridgeError> {
		Err(BridgeError::Unsupported("refunding Bungee bridging"))
	}
}
