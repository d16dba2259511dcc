//! Settlement post-hook and raw EVM call types.

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// A raw EVM call descriptor: target, attached value, calldata.
///
/// Provider deposit calls are expressed as `EvmCall`s executed via
/// delegate-call from the proxy account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvmCall {
	pub to: Address,
	pub value: U256,
	pub data: Bytes,
}

/// A settlement post-hook as it appears in the order's app data.
///
/// `dapp_id` encodes the provider identity (`<prefix>/<provider-name>`) so
/// a later reader can recover which provider produced the hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgePostHook {
	pub target: Address,
	pub call_data: Bytes,
	pub gas_limit: u64,
	pub dapp_id: String,
}

/// A pre-authorized bridging hook, ready to be attached to an order.
///
/// `recipient` is the deterministic proxy account the triggering trade must
/// pay out to; the hook then moves that balance across chains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeHook {
	pub recipient: Address,
	pub post_hook: BridgePostHook,
}
