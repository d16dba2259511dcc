//! Order and trade response types.
//!
//! Only the fields the bridging pipeline reads are modeled; amounts stay
//! as decimal strings because this subsystem never does math on them.

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

/// An order as returned by the order-book API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
	pub uid: String,
	pub owner: Address,
	pub sell_token: Address,
	pub buy_token: Address,
	#[serde(default)]
	pub receiver: Option<Address>,
	pub sell_amount: String,
	pub buy_amount: String,
	#[serde(default)]
	pub status: Option<String>,
	/// Full app-data JSON document; carries the hooks.
	#[serde(default)]
	pub full_app_data: Option<String>,
}

/// A trade that (partially) settled an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
	pub order_uid: String,
	/// Settlement transaction hash; absent while indexing lags.
	#[serde(default)]
	pub tx_hash: Option<B256>,
	#[serde(default)]
	pub log_index: Option<u64>,
	#[serde(default)]
	pub block_number: Option<u64>,
}
