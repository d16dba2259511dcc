//! Cross-chain bridging orchestrator.
//!
//! Ties the order book and the provider registry together: given a settled
//! order's uid, `BridgingSdk` recovers the bridging hook from the order's
//! app data, routes it back to the provider that produced it, and resolves
//! the bridging leg's on-chain record and current status.

use alloy_primitives::B256;
use bridge_orderbook::{find_bridge_post_hook, Order, OrderbookClient};
use bridge_providers::{ProviderRegistry, HOOK_DAPP_BRIDGE_PROVIDER_PREFIX};
use bridge_types::{BridgeError, BridgeStatusResult, BridgingDepositParams};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Everything known about an order's cross-chain leg.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossChainOrder {
	pub chain_id: u64,
	pub order: Order,
	/// Name of the provider that produced the bridging hook.
	pub provider_name: String,
	pub provider_dapp_id: String,
	/// Settlement transaction of the triggering trade.
	pub settlement_tx_hash: B256,
	/// Absent while the deposit is not yet observable on-chain.
	pub bridging_params: Option<BridgingDepositParams>,
	pub status_result: BridgeStatusResult,
	#[serde(default)]
	pub explorer_url: Option<String>,
}

pub struct BridgingSdk {
	orderbook: OrderbookClient,
	providers: ProviderRegistry,
}

impl BridgingSdk {
	pub fn new(orderbook: OrderbookClient, providers: ProviderRegistry) -> Self {
		Self {
			orderbook,
			providers,
		}
	}

	pub fn providers(&self) -> &ProviderRegistry {
		&self.providers
	}

	/// Resolves the cross-chain state of an order.
	///
	/// `Ok(None)` when the order has no bridging leg or is not yet settled;
	/// an order whose hook names an unregistered provider is an error, since
	/// the leg exists but cannot be interpreted.
	#[instrument(skip(self), fields(order_uid = %order_uid))]
	pub async fn get_cross_chain_order(
		&self,
		chain_id: u64,
		order_uid: &str,
	) -> Result<Option<CrossChainOrder>, BridgeError> {
		let order = self.orderbook.get_order(chain_id, order_uid).await?;

		let Some(app_data) = order.full_app_data.as_deref() else {
			return Ok(None);
		};
		let Some(hook) = find_bridge_post_hook(app_data, HOOK_DAPP_BRIDGE_PROVIDER_PREFIX)? else {
			return Ok(None);
		};

		let provider = self.providers.find_by_dapp_id(&hook.dapp_id).ok_or_else(|| {
			BridgeError::OrderParsing(format!(
				"Order {} carries a bridging hook from unregistered provider {}",
				order_uid, hook.dapp_id
			))
		})?;

		let trades = self.orderbook.get_trades(chain_id, order_uid).await?;
		let Some(settlement_tx_hash) = trades.iter().find_map(|trade| trade.tx_hash) else {
			debug!("order has a bridging hook but no settled trade yet");
			return Ok(None);
		};

		let bridging_params = provider
			.bridging_params(chain_id, order_uid, settlement_tx_hash)
			.await?;

		let (status_result, explorer_url) = match &bridging_params {
			Some(params) => (
				provider
					.status(&params.bridging_id, params.source_chain_id)
					.await?,
				Some(provider.explorer_url(&params.bridging_id)),
			),
			None => (BridgeStatusResult::unknown(), None),
		};

		let info = provider.info();
		Ok(Some(CrossChainOrder {
			chain_id,
			order,
			provider_name: info.name,
			provider_dapp_id: info.dapp_id,
			settlement_tx_hash,
			bridging_params,
			status_result,
			explorer_url,
		}))
	}
}
