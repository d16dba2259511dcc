//! Thin HTTP client for the Bungee public API.
//!
//! Every endpoint wraps its payload in a `{ success, statusCode, result }`
//! envelope; `success == false` is surfaced as a provider-quote error with
//! the raw envelope attached.

use alloy_primitives::{Address, B256, U256};
use bridge_types::BridgeError;
use serde::Deserialize;
use tracing::debug;

const BUNGEE_API_URL: &str = "https://public-backend.bungee.exchange/api/v1";
const BUNGEE_EVENTS_API_URL: &str = "https://microservices.socket.tech/loki";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
	success: bool,
	#[serde(default)]
	#[allow(dead_code)]
	status_code: Option<u32>,
	result: Option<T>,
}

/// Token reference inside a quote route.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteToken {
	pub address: Address,
	#[serde(default)]
	pub symbol: Option<String>,
	#[serde(default)]
	pub decimals: Option<u8>,
}

/// Output leg of a manual route.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteOutput {
	pub token: RouteToken,
	/// Expected destination amount, in the output token's decimals.
	pub amount: String,
	pub min_amount_out: String,
}

/// Bridge fee of a route, denominated in the input token.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteFee {
	pub token: RouteToken,
	pub amount: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDetails {
	/// Display name of the underlying bridge ("Across", "Circle CCTP", ...).
	pub name: String,
	pub route_fee: RouteFee,
}

/// One manual (non-swapping) route of a quote.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualRoute {
	pub quote_id: String,
	#[serde(default)]
	pub quote_expiry: Option<u64>,
	pub output: RouteOutput,
	#[serde(default)]
	pub estimated_time: Option<u64>,
	pub route_details: RouteDetails,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResult {
	#[serde(default)]
	pub manual_routes: Vec<ManualRoute>,
}

/// `build-tx` result: the SocketGateway transaction to execute.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildTxResult {
	pub tx_data: TxData,
	/// Absent on native-asset routes, which need no approval.
	#[serde(default)]
	pub approval_data: Option<ApprovalData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalData {
	pub spender_address: Address,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxData {
	/// 0x-prefixed calldata for the SocketGateway.
	pub data: String,
	pub to: Address,
	pub chain_id: u64,
	/// Native value to send along, as a decimal or 0x-hex string.
	pub value: String,
}

/// One indexed bridging event of an order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BungeeEvent {
	#[serde(default)]
	pub src_transaction_hash: Option<B256>,
	pub bridge_name: String,
	pub from_chain_id: u64,
	pub to_chain_id: u64,
	pub order_id: String,
	pub recipient: Address,
	pub sender: Address,
	pub src_amount: String,
	pub src_token_address: Address,
	pub dest_token_address: Address,
	#[serde(default)]
	pub dest_transaction_hash: Option<B256>,
	#[serde(default)]
	pub dest_amount: Option<String>,
	pub src_tx_status: TxStatus,
	#[serde(default)]
	pub dest_tx_status: Option<TxStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxStatus {
	Pending,
	Completed,
}

/// Token-list entry of the `/tokens/*-token-list` endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenListEntry {
	pub address: Address,
	pub symbol: String,
	pub decimals: u8,
	pub chain_id: u64,
}

/// Parameters of a quote call.
#[derive(Debug, Clone)]
pub struct QuoteRequest {
	pub origin_chain_id: u64,
	pub destination_chain_id: u64,
	pub input_token: Address,
	pub output_token: Address,
	/// Amount in the input token's native decimals.
	pub input_amount: U256,
	/// The proxy account executing the deposit.
	pub user_address: Address,
	pub receiver_address: Address,
}

/// Construction options; all fields have working defaults.
#[derive(Debug, Clone, Default)]
pub struct BungeeApiOptions {
	pub base_url: Option<String>,
	pub events_base_url: Option<String>,
}

pub struct BungeeApi {
	base_url: String,
	events_base_url: String,
	client: reqwest::Client,
}

impl BungeeApi {
	pub fn new(options: BungeeApiOptions) -> Self {
		Self {
			base_url: options
				.base_url
				.unwrap_or_else(|| BUNGEE_API_URL.to_string()),
			events_base_url: options
				.events_base_url
				.unwrap_or_else(|| BUNGEE_EVENTS_API_URL.to_string()),
			client: reqwest::Client::new(),
		}
	}

	/// Manual-route quote: swapping and auto-execution disabled so the route
	/// can run as a plain bridge deposit from the proxy account.
	pub async fn quote(&self, request: &QuoteRequest) -> Result<QuoteResult, BridgeError> {
		let params = vec![
			(
				"originChainId".to_string(),
				request.origin_chain_id.to_string(),
			),
			(
				"destinationChainId".to_string(),
				request.destination_chain_id.to_string(),
			),
			("inputToken".to_string(), format!("{:?}", request.input_token)),
			(
				"outputToken".to_string(),
				format!("{:?}", request.output_token),
			),
			("inputAmount".to_string(), request.input_amount.to_string()),
			(
				"userAddress".to_string(),
				format!("{:?}", request.user_address),
			),
			(
				"receiverAddress".to_string(),
				format!("{:?}", request.receiver_address),
			),
			("enableManual".to_string(), "true".to_string()),
			("disableSwapping".to_string(), "true".to_string()),
			("disableAuto".to_string(), "true".to_string()),
		];

		self.fetch(&self.base_url, "/quote", &params).await
	}

	/// Builds the SocketGateway transaction for a previously quoted route.
	pub async fn build_tx(&self, quote_id: &str) -> Result<BuildTxResult, BridgeError> {
		let params = vec![("quoteId".to_string(), quote_id.to_string())];
		self.fetch(&self.base_url, "/build-tx", &params).await
	}

	/// Indexed bridging events for an order id.
	pub async fn order_events(&self, order_id: &str) -> Result<Vec<BungeeEvent>, BridgeError> {
		let params = vec![("orderId".to_string(), order_id.to_string())];
		self.fetch(&self.events_base_url, "/order", &params).await
	}

	/// Tokens receivable on a destination chain.
	pub async fn to_token_list(&self, chain_id: u64) -> Result<Vec<TokenListEntry>, BridgeError> {
		let params = vec![("toChainId".to_string(), chain_id.to_string())];
		self.fetch(&self.base_url, "/tokens/to-token-list", &params)
			.await
	}

	/// Tokens bridgeable from an origin chain towards a destination chain.
	pub async fn from_token_list(
		&self,
		origin_chain_id: u64,
		destination_chain_id: u64,
	) -> Result<Vec<TokenListEntry>, BridgeError> {
		let params = vec![
			("fromChainId".to_string(), origin_chain_id.to_string()),
			("toChainId".to_string(), destination_chain_id.to_string()),
		];
		self.fetch(&self.base_url, "/tokens/from-token-list", &params)
			.await
	}

	async fn fetch<T: serde::de::DeserializeOwned>(
		&self,
		base: &str,
		path: &str,
		params: &[(String, String)],
	) -> Result<T, BridgeError> {
		let url = format!("{}{}", base, path);
		debug!(url = %url, "bungee api request");

		let response = self
			.client
			.get(&url)
			.query(params)
			.send()
			.await
			.map_err(|e| BridgeError::quote(format!("Bungee API request failed: {}", e)))?;

		let status = response.status();
		let body = response
			.text()
			.await
			.map_err(|e| BridgeError::quote(format!("Bungee API response unreadable: {}", e)))?;

		if !status.is_success() {
			return Err(BridgeError::quote_with_payload(
				format!("Bungee API call {} returned {}", path, status),
				serde_json::Value::String(body),
			));
		}

		let json: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
			BridgeError::quote(format!("Bungee API call {} returned non-JSON: {}", path, e))
		})?;

		let envelope: Envelope<T> = serde_json::from_value(json.clone()).map_err(|e| {
			BridgeError::quote_with_payload(
				format!(
					"Invalid response for Bungee API call {}: {}. Did the API change?",
					path, e
				),
				json.clone(),
			)
		})?;

		if !envelope.success {
			return Err(BridgeError::quote_with_payload(
				format!("Bungee API call {} reported failure", path),
				json,
			));
		}

		envelope.result.ok_or_else(|| {
			BridgeError::quote_with_payload(
				format!("Bungee API call {} succeeded without a result", path),
				json,
			)
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn event_statuses_deserialize_from_screaming_snake() {
		let event: BungeeEvent = serde_json::from_value(serde_json::json!({
			"bridgeName": "Across",
			"fromChainId": 1,
			"toChainId": 42161,
			"orderId": "0xabc",
			"recipient": "0x2222222222222222222222222222222222222222",
			"sender": "0x1111111111111111111111111111111111111111",
			"srcAmount": "1000000",
			"srcTokenAddress": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
			"destTokenAddress": "0xaf88d065e77c8cC2239327C5EDb3A432268e5831",
			"srcTxStatus": "COMPLETED",
			"destTxStatus": "PENDING"
		}))
		.unwrap();

		assert_eq!(event.src_tx_status, TxStatus::Completed);
		assert_eq!(event.dest_tx_status, Some(TxStatus::Pending));
		assert!(event.src_transaction_hash.is_none());
	}
}
