//! Quote request types.

use crate::BridgeError;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Trade kind of the triggering order. Only sell orders are supported by
/// the bridging pipeline; buy-type cross-chain requests are rejected before
/// any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
	Sell,
	Buy,
}

/// Immutable input to a bridge quote.
///
/// Describes the cross-chain leg: which token leaves which chain, which
/// token should arrive on the destination chain, and on whose behalf the
/// bridge deposit will execute. The sell token here is the bridge input
/// token; when the trader's sell token is not directly bridgeable this is
/// the intermediate token the same-chain swap produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteBridgeRequest {
	pub kind: OrderKind,
	pub sell_token_chain_id: u64,
	pub sell_token_address: Address,
	pub sell_token_decimals: u8,
	pub buy_token_chain_id: u64,
	pub buy_token_address: Address,
	pub buy_token_decimals: u8,
	/// Amount of the sell token, in its native decimals.
	pub amount: U256,
	/// The trading account the order is placed from.
	pub account: Address,
	/// Owner of the proxy account the hook executes in. Defaults to
	/// `account` when absent.
	pub owner: Option<Address>,
	/// Final receiver of the bridged funds on the destination chain.
	/// Defaults to `account` when absent.
	pub receiver: Option<Address>,
	/// App-code tag forwarded to provider APIs.
	pub app_code: String,
}

impl QuoteBridgeRequest {
	/// Owner of the proxy account the hook will execute in.
	pub fn owner_address(&self) -> Address {
		self.owner.unwrap_or(self.account)
	}

	/// Receiver of the bridged funds on the destination chain.
	pub fn recipient(&self) -> Address {
		self.receiver.unwrap_or(self.account)
	}

	/// Fails fast when the request is not a sell order.
	pub fn ensure_sell_order(&self) -> Result<(), BridgeError> {
		if self.kind != OrderKind::Sell {
			return Err(BridgeError::Validation(
				"only sell orders are supported for bridging".to_string(),
			));
		}
		Ok(())
	}
}
