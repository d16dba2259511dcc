//! Settlement-log plumbing shared by bridge providers.
//!
//! After a trade settles, providers reconcile the bridging leg from the
//! settlement transaction's logs. This crate owns the read-only chain RPC
//! access (receipts, code) and the trade-event extraction / correlation
//! helpers the providers build on.

use alloy_primitives::B256;
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_types::TransactionReceipt;
use alloy_transport_http::Http;
use bridge_types::{BridgeError, NetworksConfig};
use std::collections::HashMap;
use thiserror::Error;

/// Trade-event extraction and positional correlation.
pub mod events;

pub use events::{find_trade_index, nth_for_trade, trade_events, GPV2_SETTLEMENT};

/// HTTP RPC provider type used throughout the workspace.
pub type HttpProvider = RootProvider<Http<reqwest::Client>>;

/// Errors from settlement-side chain reads.
#[derive(Debug, Error)]
pub enum SettlementError {
	#[error("No RPC configured for chain {0}")]
	UnknownChain(u64),
	#[error("RPC request failed: {0}")]
	Rpc(String),
	#[error("Transaction not found: {0}")]
	TxNotFound(B256),
}

impl From<SettlementError> for BridgeError {
	fn from(err: SettlementError) -> Self {
		match err {
			SettlementError::UnknownChain(_) => BridgeError::Validation(err.to_string()),
			SettlementError::Rpc(msg) => BridgeError::Rpc(msg),
			SettlementError::TxNotFound(_) => BridgeError::OrderParsing(err.to_string()),
		}
	}
}

/// Read-only RPC access to every configured network.
pub struct ChainRpc {
	providers: HashMap<u64, HttpProvider>,
}

impl ChainRpc {
	/// Creates one provider per configured network.
	pub fn from_networks(networks: &NetworksConfig) -> Result<Self, SettlementError> {
		let mut providers = HashMap::new();

		for (&chain_id, network) in networks {
			let url = network.rpc_url.parse().map_err(|e| {
				SettlementError::Rpc(format!("Invalid RPC URL for chain {}: {}", chain_id, e))
			})?;
			providers.insert(chain_id, RootProvider::new_http(url));
		}

		Ok(Self { providers })
	}

	/// The provider for a chain, when one is configured.
	pub fn provider(&self, chain_id: u64) -> Option<&HttpProvider> {
		self.providers.get(&chain_id)
	}

	/// Fetches a mined transaction's logs.
	pub async fn transaction_logs(
		&self,
		chain_id: u64,
		tx_hash: B256,
	) -> Result<Vec<alloy_rpc_types::Log>, SettlementError> {
		let receipt = self.transaction_receipt(chain_id, tx_hash).await?;
		Ok(receipt
			.inner
			.as_receipt()
			.map(|r| r.logs.clone())
			.unwrap_or_default())
	}

	/// Fetches a mined transaction's receipt.
	pub async fn transaction_receipt(
		&self,
		chain_id: u64,
		tx_hash: B256,
	) -> Result<TransactionReceipt, SettlementError> {
		let provider = self
			.provider(chain_id)
			.ok_or(SettlementError::UnknownChain(chain_id))?;

		provider
			.get_transaction_receipt(tx_hash)
			.await
			.map_err(|e| SettlementError::Rpc(e.to_string()))?
			.ok_or(SettlementError::TxNotFound(tx_hash))
	}
}
