//! Bridge provider abstraction.
//!
//! Each bridge service is wrapped in one `BridgeProvider` implementation
//! that owns its HTTP client, quote normalizer, deposit-call builder and
//! status logic. Providers are registered by dappId so a hook found later
//! in a settled order can be routed back to exactly the provider that
//! produced it.

use alloy_primitives::{B256, U256};
use async_trait::async_trait;
use bridge_shed::{Call, CowShed, HookSigner, SignCallsParams};
use bridge_types::{
	BridgeError, BridgeHook, BridgePostHook, BridgeQuoteAmountsAndCosts, BridgeStatusResult,
	BridgingDepositParams, EvmCall, QuoteBridgeRequest, TokenConfig,
};
use std::any::Any;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Across provider: suggested-fees quoting and spoke-pool deposits.
pub mod across;
/// Bungee provider: manual-route quoting over the SocketGateway.
pub mod bungee;
/// Canned provider for tests.
pub mod mock;
/// Provider registry keyed by dappId.
pub mod registry;
/// Weiroll command planning for the deposit hooks.
pub mod weiroll;

pub use registry::ProviderRegistry;

/// Prefix of every bridging hook's dappId; the suffix names the provider.
pub const HOOK_DAPP_BRIDGE_PROVIDER_PREFIX: &str = "cow-sdk://bridging/providers";

/// Standard order-quote validity window.
pub const DEFAULT_QUOTE_VALIDITY_SECONDS: u64 = 30 * 60;

/// Default hook deadline: twice the order-quote validity, because the hook
/// must stay valid through order matching and settlement delay.
pub fn default_hook_deadline(now_seconds: u64) -> U256 {
	U256::from(now_seconds + 2 * DEFAULT_QUOTE_VALIDITY_SECONDS)
}

/// Static identity of a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeProviderInfo {
	pub name: String,
	pub logo_url: String,
	pub website: Option<String>,
	/// `<HOOK_DAPP_BRIDGE_PROVIDER_PREFIX>/<name>`.
	pub dapp_id: String,
}

/// A provider's normalized quote.
///
/// The concrete type behind this trait keeps the provider's raw quote echo
/// so the result can be replayed into the deposit-call builder without
/// re-querying the provider; `as_any` lets the owning provider downcast it
/// back.
pub trait BridgeQuoteResult: fmt::Debug + Send + Sync {
	fn amounts_and_costs(&self) -> &BridgeQuoteAmountsAndCosts;
	/// Unix timestamp the quote was computed for.
	fn quote_timestamp(&self) -> u64;
	fn expected_fill_time_seconds(&self) -> Option<u64>;
	fn as_any(&self) -> &dyn Any;
}

/// Inputs to hook signing.
pub struct SignedHookParams<'a> {
	pub chain_id: u64,
	pub unsigned_call: EvmCall,
	/// Caller-supplied 32-byte hook nonce.
	pub nonce: B256,
	/// Unix deadline; see [`default_hook_deadline`].
	pub deadline: U256,
	pub hook_gas_limit: u64,
	pub signer: &'a dyn HookSigner,
}

/// Capability set every bridge provider implements.
#[async_trait]
pub trait BridgeProvider: Send + Sync {
	/// Static identity; `info().dapp_id` keys the registry.
	fn info(&self) -> BridgeProviderInfo;

	/// Chains this provider can bridge between. Static, side-effect free.
	fn networks(&self) -> Vec<u64>;

	/// Tokens purchasable on the destination chain. Returns an empty list
	/// (not an error) for unsupported chains.
	async fn buy_tokens(&self, target_chain_id: u64) -> Result<Vec<TokenConfig>, BridgeError>;

	/// Source-chain tokens usable as the bridge input asset, ordered by
	/// priority. Used when the sell token itself is not bridgeable and
	/// must first be swapped.
	async fn intermediate_tokens(
		&self,
		request: &QuoteBridgeRequest,
	) -> Result<Vec<TokenConfig>, BridgeError>;

	/// Fetches and normalizes a quote. Fails with a provider-quote error on
	/// HTTP failure or a response that does not pass shape validation; a
	/// bad quote must never be signed.
	async fn quote(
		&self,
		request: &QuoteBridgeRequest,
	) -> Result<Box<dyn BridgeQuoteResult>, BridgeError>;

	/// Encodes the provider-specific deposit call to execute via
	/// delegate-call from the proxy account. Pure function of
	/// `(request, quote)`; no network I/O.
	fn unsigned_bridge_call(
		&self,
		request: &QuoteBridgeRequest,
		quote: &dyn BridgeQuoteResult,
	) -> Result<EvmCall, BridgeError>;

	/// Conservative gas ceiling for the post-hook, computed before the real
	/// signature exists. Never fails; falls back to the undeployed-proxy
	/// worst case.
	async fn hook_gas_limit(&self, request: &QuoteBridgeRequest) -> u64;

	/// Wraps the unsigned call into a signed delegate-call batch.
	async fn signed_hook(&self, params: SignedHookParams<'_>) -> Result<BridgeHook, BridgeError>;

	/// Best-effort reconstruction of the deposit intent from a previously
	/// emitted hook. `Unsupported` where the calldata does not carry
	/// enough information to invert.
	fn decode_bridge_hook(
		&self,
		post_hook: &BridgePostHook,
	) -> Result<QuoteBridgeRequest, BridgeError>;

	/// Reconciles the bridging leg of a settled order. `Ok(None)` means no
	/// bridging leg was found yet (settlement without a deposit event, or
	/// indexing lag), which is a valid result, not an error.
	async fn bridging_params(
		&self,
		chain_id: u64,
		order_uid: &str,
		settlement_tx: B256,
	) -> Result<Option<BridgingDepositParams>, BridgeError>;

	/// Explorer link for a bridging id.
	fn explorer_url(&self, bridging_id: &str) -> String;

	/// Resolves the current bridging status.
	async fn status(
		&self,
		bridging_id: &str,
		origin_chain_id: u64,
	) -> Result<BridgeStatusResult, BridgeError>;

	/// `Unsupported` for both shipped providers: the underlying bridges
	/// have no user-initiated cancellation.
	async fn cancel_bridging_tx(&self, bridging_id: &str) -> Result<EvmCall, BridgeError>;

	/// `Unsupported` for both shipped providers: Across auto-relays
	/// refunds, CCTP has none.
	async fn refund_bridging_tx(&self, bridging_id: &str) -> Result<EvmCall, BridgeError>;
}

/// Signs a provider's unsigned call as a single-entry delegate-call batch.
///
/// `allowFailure = false`: any failure of the bridge leg reverts the whole
/// hook, since a half-executed deposit is worse than a reverted one.
pub async fn sign_hook_with_shed(
	shed: &CowShed,
	dapp_id: &str,
	params: SignedHookParams<'_>,
) -> Result<BridgeHook, BridgeError> {
	let call = Call {
		target: params.unsigned_call.to,
		value: params.unsigned_call.value,
		callData: params.unsigned_call.data,
		allowFailure: false,
		isDelegateCall: true,
	};

	let signed = shed
		.sign_calls(
			params.signer,
			SignCallsParams {
				chain_id: params.chain_id,
				calls: vec![call],
				nonce: params.nonce,
				deadline: params.deadline,
			},
		)
		.await?;

	Ok(BridgeHook {
		recipient: signed.shed_account,
		post_hook: BridgePostHook {
			target: signed.to,
			call_data: signed.data,
			gas_limit: params.hook_gas_limit,
			dapp_id: dapp_id.to_string(),
		},
	})
}

/// Downcasts a type-erased quote back to the provider's own result type.
pub(crate) fn downcast_quote<'a, T: 'static>(
	quote: &'a dyn BridgeQuoteResult,
	provider: &str,
) -> Result<&'a T, BridgeError> {
	quote.as_any().downcast_ref::<T>().ok_or_else(|| {
		BridgeError::Validation(format!("quote was not produced by the {} provider", provider))
	})
}

pub(crate) fn parse_address(value: &str, field: &str) -> Result<alloy_primitives::Address, BridgeError> {
	value
		.parse()
		.map_err(|e| BridgeError::quote(format!("{} is not an address: {}", field, e)))
}

pub(crate) fn parse_u256_dec(value: &str, field: &str) -> Result<U256, BridgeError> {
	U256::from_str_radix(value, 10)
		.map_err(|e| BridgeError::quote(format!("{} is not a decimal integer: {}", field, e)))
}

pub(crate) fn parse_u64_dec(value: &str, field: &str) -> Result<u64, BridgeError> {
	value
		.parse::<u64>()
		.map_err(|e| BridgeError::quote(format!("{} is not a decimal integer: {}", field, e)))
}

pub(crate) fn unix_now() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|d| d.as_secs())
		.unwrap_or(0)
}
