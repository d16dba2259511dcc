//! Bridging status and deposit-record types.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// Lifecycle of a bridging leg.
///
/// Monotonic per bridging id on the happy path; `Expired` and `Refund` are
/// terminal alternates to `Executed`. There is no failed terminal state:
/// the shipped bridges either auto-refund or allow third-party relay, so
/// "stuck forever" is not reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BridgeStatus {
	/// No bridging evidence observed yet (or indexing lag).
	Unknown,
	InProgress,
	Executed,
	Expired,
	Refund,
}

/// Resolved status plus the transaction hashes of both legs, where known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeStatusResult {
	pub status: BridgeStatus,
	pub deposit_tx_hash: Option<B256>,
	pub fill_tx_hash: Option<B256>,
}

impl BridgeStatusResult {
	pub fn unknown() -> Self {
		Self {
			status: BridgeStatus::Unknown,
			deposit_tx_hash: None,
			fill_tx_hash: None,
		}
	}
}

/// The reconciled on-chain record of a bridge deposit.
///
/// Created only after the settlement transaction is mined, recomputed on
/// demand from chain logs and provider APIs, and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgingDepositParams {
	pub input_token_address: Address,
	pub output_token_address: Address,
	pub input_amount: U256,
	/// Unknown until the destination leg is observed for some providers.
	pub output_amount: Option<U256>,
	pub owner: Address,
	pub recipient: Address,
	pub quote_timestamp: Option<u64>,
	pub fill_deadline: Option<u64>,
	pub source_chain_id: u64,
	pub destination_chain_id: u64,
	/// Provider-defined id used for status polling and explorer links.
	pub bridging_id: String,
}
