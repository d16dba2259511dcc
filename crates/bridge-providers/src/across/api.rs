//! Thin HTTP client for the Across API.
//!
//! Responses are serde-typed; a response that fails to deserialize is
//! treated identically to an HTTP error and surfaced as a provider-quote
//! error with the offending payload attached.

use alloy_primitives::{Address, B256, U256};
use bridge_types::BridgeError;
use serde::Deserialize;
use tracing::debug;

const ACROSS_API_URL: &str = "https://app.across.to/api";

/// Fee component expressed as a 10^18-scaled percentage plus a total
/// amount in the input token's units.
#[derive(Debug, Clone, Deserialize)]
pub struct PctFee {
	/// 1% is 1e16, 100% is 1e18, the format the contracts understand.
	pub pct: String,
	pub total: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedFeesLimits {
	pub min_deposit: String,
	pub max_deposit: String,
	pub max_deposit_instant: String,
	pub max_deposit_short_delay: String,
	pub recommended_deposit_instant: String,
}

/// Response of `/suggested-fees`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedFeesResponse {
	/// Total relayer fee, inclusive of `lp_fee.pct`. Guaranteed to be at
	/// least 0.03%.
	pub total_relay_fee: PctFee,
	pub relayer_capital_fee: PctFee,
	pub relayer_gas_fee: PctFee,
	pub lp_fee: PctFee,
	/// Quote timestamp used to compute the LP fee; must be passed to the
	/// deposit call to pay the quoted fee.
	pub timestamp: String,
	pub is_amount_too_low: bool,
	pub quote_block: String,
	pub spoke_pool_address: String,
	/// Zero address disables relayer exclusivity.
	pub exclusive_relayer: String,
	pub exclusivity_deadline: String,
	pub expected_fill_time_sec: String,
	pub fill_deadline: String,
	pub limits: SuggestedFeesLimits,
}

/// One entry of `/available-routes`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
	pub origin_chain_id: String,
	pub origin_token: String,
	pub destination_chain_id: String,
	pub destination_token: String,
	pub origin_token_symbol: String,
	pub destination_token_symbol: String,
}

/// Deposit lifecycle as reported by `/deposit/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AcrossDepositStatus {
	Filled,
	Pending,
	Expired,
	Refunded,
	SlowFillRequested,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositStatusResponse {
	pub status: AcrossDepositStatus,
	#[serde(default)]
	pub deposit_tx_hash: Option<B256>,
	#[serde(default)]
	pub fill_tx: Option<B256>,
	#[serde(default)]
	pub deposit_refund_tx_hash: Option<B256>,
}

/// Parameters of a `/suggested-fees` call.
#[derive(Debug, Clone)]
pub struct SuggestedFeesRequest {
	pub token: Address,
	pub origin_chain_id: u64,
	pub destination_chain_id: u64,
	/// Amount in the token's native decimals.
	pub amount: U256,
	pub recipient: Option<Address>,
}

/// HTTP client for one Across API deployment.
pub struct AcrossApi {
	base_url: String,
	client: reqwest::Client,
}

impl AcrossApi {
	pub fn new(base_url: Option<String>) -> Self {
		Self {
			base_url: base_url.unwrap_or_else(|| ACROSS_API_URL.to_string()),
			client: reqwest::Client::new(),
		}
	}

	/// Suggested fee quote for a deposit.
	pub async fn suggested_fees(
		&self,
		request: &SuggestedFeesRequest,
	) -> Result<SuggestedFeesResponse, BridgeError> {
		let mut params = vec![
			("token".to_string(), format!("{:?}", request.token)),
			(
				"originChainId".to_string(),
				request.origin_chain_id.to_string(),
			),
			(
				"destinationChainId".to_string(),
				request.destination_chain_id.to_string(),
			),
			("amount".to_string(), request.amount.to_string()),
		];
		if let Some(recipient) = request.recipient {
			params.push(("recipient".to_string(), format!("{:?}", recipient)));
		}

		self.fetch("/suggested-fees", &params).await
	}

	/// Available transfer routes matching the given filter.
	pub async fn available_routes(
		&self,
		origin_chain_id: u64,
		destination_chain_id: u64,
		destination_token: Address,
	) -> Result<Vec<Route>, BridgeError> {
		let params = vec![
			("originChainId".to_string(), origin_chain_id.to_string()),
			(
				"destinationChainId".to_string(),
				destination_chain_id.to_string(),
			),
			(
				"destinationToken".to_string(),
				format!("{:?}", destination_token),
			),
		];

		self.fetch("/available-routes", &params).await
	}

	/// Status of a deposit by origin chain and deposit id.
	pub async fn deposit_status(
		&self,
		origin_chain_id: u64,
		deposit_id: &str,
	) -> Result<DepositStatusResponse, BridgeError> {
		let params = vec![
			("originChainId".to_string(), origin_chain_id.to_string()),
			("depositId".to_string(), deposit_id.to_string()),
		];

		self.fetch("/deposit/status", &params).await
	}

	/// Status of a deposit by origin chain and deposit transaction hash.
	pub async fn deposit_status_by_tx(
		&self,
		origin_chain_id: u64,
		deposit_tx_hash: B256,
	) -> Result<DepositStatusResponse, BridgeError> {
		let params = vec![
			("originChainId".to_string(), origin_chain_id.to_string()),
			("depositTxHash".to_string(), format!("{:?}", deposit_tx_hash)),
		];

		self.fetch("/deposit/status", &params).await
	}

	async fn fetch<T: serde::de::DeserializeOwned>(
		&self,
		path: &str,
		params: &[(String, String)],
	) -> Result<T, BridgeError> {
		let url = format!("{}{}", self.base_url, path);
		debug!(url = %url, "across api request");

		let response = self
			.client
			.get(&url)
			.query(params)
			.send()
			.await
			.map_err(|e| BridgeError::quote(format!("Across API request failed: {}", e)))?;

		let status = response.status();
		let body = response
			.text()
			.await
			.map_err(|e| BridgeError::quote(format!("Across API response unreadable: {}", e)))?;

		if !status.is_success() {
			return Err(BridgeError::quote_with_payload(
				format!("Across API call {} returned {}", path, status),
				serde_json::Value::String(body),
			));
		}

		let json: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
			BridgeError::quote(format!("Across API call {} returned non-JSON: {}", path, e))
		})?;

		serde_json::from_value(json.clone()).map_err(|e| {
			BridgeError::quote_with_payload(
				format!(
					"Invalid response for Across API call {}: {}. Did the API change?",
					path, e
				),
				json,
			)
		})
	}
}
