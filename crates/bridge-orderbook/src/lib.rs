//! Read-only order-book HTTP client.
//!
//! The bridging pipeline only reads from the order book: it looks up a
//! settled order, its trades, and the bridging post-hook embedded in the
//! order's app data. It never writes orders.

use bridge_types::BridgeError;
use std::collections::HashMap;
use thiserror::Error;

/// App-data parsing and bridge post-hook extraction.
pub mod app_data;
/// Order and trade response types.
pub mod types;

pub use app_data::find_bridge_post_hook;
pub use types::{Order, Trade};

/// Errors from order-book reads.
#[derive(Debug, Error)]
pub enum OrderbookError {
	#[error("No order book configured for chain {0}")]
	UnknownChain(u64),
	#[error("Order book request failed: {0}")]
	Http(String),
	#[error("Order book response invalid: {0}")]
	Decode(String),
}

impl From<OrderbookError> for BridgeError {
	fn from(err: OrderbookError) -> Self {
		match err {
			OrderbookError::UnknownChain(_) => BridgeError::Validation(err.to_string()),
			OrderbookError::Http(msg) => BridgeError::Rpc(msg),
			OrderbookError::Decode(msg) => BridgeError::OrderParsing(msg),
		}
	}
}

/// HTTP client for one order-book deployment per chain.
pub struct OrderbookClient {
	client: reqwest::Client,
	base_urls: HashMap<u64, String>,
}

impl OrderbookClient {
	pub fn new(base_urls: HashMap<u64, String>) -> Self {
		Self {
			client: reqwest::Client::new(),
			base_urls,
		}
	}

	/// Client preconfigured with the production order-book deployments.
	pub fn with_default_urls() -> Self {
		let base_urls = [
			(bridge_types::chains::MAINNET, "mainnet"),
			(bridge_types::chains::GNOSIS_CHAIN, "xdai"),
			(bridge_types::chains::POLYGON, "polygon"),
			(bridge_types::chains::BASE, "base"),
			(bridge_types::chains::ARBITRUM_ONE, "arbitrum_one"),
			(bridge_types::chains::AVALANCHE, "avalanche"),
			(bridge_types::chains::SEPOLIA, "sepolia"),
		]
		.into_iter()
		.map(|(chain_id, segment)| (chain_id, format!("https://api.cow.fi/{}", segment)))
		.collect();

		Self::new(base_urls)
	}

	/// Fetches an order by uid.
	pub async fn get_order(&self, chain_id: u64, order_uid: &str) -> Result<Order, OrderbookError> {
		let base = self.base_url(chain_id)?;
		let url = format!("{}/api/v1/orders/{}", base, order_uid);
		self.fetch_json(&url).await
	}

	/// Fetches the trades that settled an order. Empty until the order is
	/// executed.
	pub async fn get_trades(
		&self,
		chain_id: u64,
		order_uid: &str,
	) -> Result<Vec<Trade>, OrderbookError> {
		let base = self.base_url(chain_id)?;
		let url = format!("{}/api/v1/trades?orderUid={}", base, order_uid);
		self.fetch_json(&url).await
	}

	fn base_url(&self, chain_id: u64) -> Result<&str, OrderbookError> {
		self.base_urls
			.get(&chain_id)
			.map(String::as_str)
			.ok_or(OrderbookError::UnknownChain(chain_id))
	}

	async fn fetch_json<T: serde::de::DeserializeOwned>(
		&self,
		url: &str,
	) -> Result<T, OrderbookError> {
		let response = self
			.client
			.get(url)
			.send()
			.await
			.map_err(|e| OrderbookError::Http(e.to_string()))?;

		let status = response.status();
		let body = response
			.text()
			.await
			.map_err(|e| OrderbookError::Http(e.to_string()))?;

		if !status.is_success() {
			return Err(OrderbookError::Http(format!(
				"{} returned {}: {}",
				url, status, body
			)));
		}

		serde_json::from_str(&body).map_err(|e| OrderbookError::Decode(format!("{}: {}", url, e)))
	}
}
