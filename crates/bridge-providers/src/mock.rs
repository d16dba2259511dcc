//! Canned provider for tests.
//!
//! Answers every operation without network access, including the ones the
//! shipped providers reject, so pipeline code can be exercised end to end.

use crate::{
	sign_hook_with_shed, BridgeError, BridgeProvider, BridgeProviderInfo, BridgeQuoteResult,
	SignedHookParams,
};
use alloy_primitives::{address, Address, Bytes, B256, U256};
use async_trait::async_trait;
use bridge_shed::CowShed;
use bridge_types::{
	chains, BridgeHook, BridgePostHook, BridgeQuoteAmountsAndCosts, BridgeStatus,
	BridgeStatusResult, BridgingDepositParams, EvmCall, OrderKind, QuoteBridgeRequest,
	TokenConfig,
};
use std::any::Any;

pub const MOCK_HOOK_DAPP_ID: &str = "cow-sdk://bridging/providers/mock";

#[derive(Debug)]
pub struct MockQuoteResult {
	amounts_and_costs: BridgeQuoteAmountsAndCosts,
}

impl BridgeQuoteResult for MockQuoteResult {
	fn amounts_and_costs(&self) -> &BridgeQuoteAmountsAndCosts {
		&self.amounts_and_costs
	}

	fn quote_timestamp(&self) -> u64 {
		1_700_000_000
	}

	fn expected_fill_time_seconds(&self) -> Option<u64> {
		Some(60)
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}

#[derive(Default)]
pub struct MockBridgeProvider {
	shed: CowShed,
}

impl MockBridgeProvider {
	pub fn new() -> Self {
		Self::default()
	}

	fn canned_call() -> EvmCall {
		EvmCall {
			to: address!("0000000000000000000000000000000000001337"),
			value: U256::ZERO,
			data: Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]),
		}
	}
}

#[async_trait]
impl BridgeProvider for MockBridgeProvider {
	fn info(&self) -> BridgeProviderInfo {
		BridgeProviderInfo {
			name: "mock".to_string(),
			logo_url: String::new(),
			website: None,
			dapp_id: MOCK_HOOK_DAPP_ID.to_string(),
		}
	}

	fn networks(&self) -> Vec<u64> {
		vec![
			chains::MAINNET,
			chains::GNOSIS_CHAIN,
			chains::POLYGON,
			chains::ARBITRUM_ONE,
		]
	}

	async fn buy_tokens(&self, target_chain_id: u64) -> Result<Vec<TokenConfig>, BridgeError> {
		if !self.networks().contains(&target_chain_id) {
			return Ok(Vec::new());
		}
		Ok(vec![TokenConfig {
			address: Address::repeat_byte(0xbb),
			symbol: "MOCK".to_string(),
			decimals: 18,
		}])
	}

	async fn intermediate_tokens(
		&self,
		_request: &QuoteBridgeRequest,
	) -> Result<Vec<TokenConfig>, BridgeError> {
		Ok(vec![TokenConfig {
			address: Address::repeat_byte(0xaa),
			symbol: "IMOCK".to_string(),
			decimals: 18,
		}])
	}

	async fn quote(
		&self,
		request: &QuoteBridgeRequest,
	) -> Result<Box<dyn BridgeQuoteResult>, BridgeError> {
		request.ensure_sell_order()?;
		// 1% fee, no slippage
		let amounts_and_costs = BridgeQuoteAmountsAndCosts::from_relay_fee_pct(
			request.amount,
			request.amount,
			U256::from(10u64).pow(U256::from(16)),
			0,
		)?;
		Ok(Box::new(MockQuoteResult { amounts_and_costs }))
	}

	fn unsigned_bridge_call(
		&self,
		_request: &QuoteBridgeRequest,
		_quote: &dyn BridgeQuoteResult,
	) -> Result<EvmCall, BridgeError> {
		Ok(Self::canned_call())
	}

	async fn hook_gas_limit(&self, _request: &QuoteBridgeRequest) -> u64 {
		100_000
	}

	async fn signed_hook(&self, params: SignedHookParams<'_>) -> Result<BridgeHook, BridgeError> {
		sign_hook_with_shed(&self.shed, MOCK_HOOK_DAPP_ID, params).await
	}

	fn decode_bridge_hook(
		&self,
		_post_hook: &BridgePostHook,
	) -> Result<QuoteBridgeRequest, BridgeError> {
		Ok(QuoteBridgeRequest {
			kind: OrderKind::Sell,
			sell_token_chain_id: chains::MAINNET,
			sell_token_address: Address::repeat_byte(0x01),
			sell_token_decimals: 18,
			buy_token_chain_id: chains::GNOSIS_CHAIN,
			buy_token_address: Address::repeat_byte(0x02),
			buy_token_decimals: 18,
			amount: U256::from(10u64).pow(U256::from(18)),
			account: Address::repeat_byte(0x03),
			owner: None,
			receiver: None,
			app_code: "mock".to_string(),
		})
	}

	async fn bridging_params(
		&self,
		chain_id: u64,
		order_uid: &str,
		_settlement_tx: B256,
	) -> Result<Option<BridgingDepositParams>, BridgeError> {
		Ok(Some(BridgingDepositParams {
			input_token_address: Address::repeat_byte(0x01),
			output_token_address: Address::repeat_byte(0x02),
			input_amount: U256::from(10u64).pow(U256::from(18)),
			output_amount: Some(U256::from(10u64).pow(U256::from(18))),
			owner: Address::repeat_byte(0x03),
			recipient: Address::repeat_byte(0x04),
			quote_timestamp: Some(1_700_000_000),
			fill_deadline: Some(1_700_020_000),
			source_chain_id: chain_id,
			destination_chain_id: chains::GNOSIS_CHAIN,
			bridging_id: order_uid.to_string(),
		}))
	}

	fn explorer_url(&self, bridging_id: &str) -> String {
		format!("https://example.invalid/tx/{}", bridging_id)
	}

	async fn status(
		&self,
		_bridging_id: &str,
		_origin_chain_id: u64,
	) -> Result<BridgeStatusResult, BridgeError> {
		Ok(BridgeStatusResult {
			status: BridgeStatus::Executed,
			deposit_tx_hash: Some(B256::repeat_byte(0x05)),
			fill_tx_hash: Some(B256::repeat_byte(0x06)),
		})
	}

	async fn cancel_bridging_tx(&self, _bridging_id: &str) -> Result<EvmCall, BridgeError> {
		Ok(Self::canned_call())
	}

	async fn refund_bridging_tx(&self, _bridging_id: &str) -> Result<EvmCall, BridgeError> {
		Ok(Self::canned_call())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bridge_shed::LocalHookSigner;

	const TEST_KEY: &str = "0x0123456789012345678901234567890123456789012345678901234567890123";

	#[tokio::test]
	async fn quote_and_sign_round_trip() {
		let provider = MockBridgeProvider::new();
		let request = provider.decode_bridge_hook(&BridgePostHook {
			target: Address::ZERO,
			call_data: Bytes::new(),
			gas_limit: 0,
			dapp_id: MOCK_HOOK_DAPP_ID.to_string(),
		})
		.unwrap();

		let quote = provider.quote(&request).await.unwrap();
		assert!(quote.amounts_and_costs().is_consistent());

		let unsigned = provider.unsigned_bridge_call(&request, quote.as_ref()).unwrap();
		let signer = LocalHookSigner::from_hex(TEST_KEY).unwrap();
		let hook = provider
			.signed_hook(SignedHookParams {
				chain_id: chains::MAINNET,
				unsigned_call: unsigned,
				nonce: B256::repeat_byte(0x07),
				deadline: U256::from(1_700_003_600u64),
				hook_gas_limit: 100_000,
				signer: &signer,
			})
			.await
			.unwrap();

		assert_eq!(hook.post_hook.dapp_id, MOCK_HOOK_DAPP_ID);
		assert_eq!(hook.post_hook.gas_limit, 100_000);
	}
}
