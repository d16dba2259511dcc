//! Hook gas-limit estimation.
//!
//! The gas limit is chosen before the real signature exists, so it must
//! never under-estimate: when the proxy account has no deployed code yet
//! (or we cannot check), proxy-creation gas is added on top of the
//! execution estimate.

use alloy_primitives::Address;
use alloy_provider::{Provider, RootProvider};
use alloy_transport_http::Http;
use tracing::warn;

/// Conservative execution ceiling for a bridge deposit hook.
pub const DEFAULT_GAS_FOR_HOOK_ESTIMATION: u64 = 600_000;

/// Gas consumed by the factory deploying the proxy on first use.
pub const DEFAULT_GAS_FOR_PROXY_CREATION: u64 = 500_000;

/// Gas components of a hook estimate.
#[derive(Debug, Clone, Copy)]
pub struct HookGasParams {
	pub base_gas: u64,
	/// Provider- and route-specific buffer on top of the base cost.
	pub extra_gas: u64,
	pub proxy_creation_gas: u64,
}

impl Default for HookGasParams {
	fn default() -> Self {
		Self {
			base_gas: DEFAULT_GAS_FOR_HOOK_ESTIMATION,
			extra_gas: 0,
			proxy_creation_gas: DEFAULT_GAS_FOR_PROXY_CREATION,
		}
	}
}

/// Estimates the gas limit for a hook executing in `shed_account`.
///
/// With an RPC provider available the proxy's deployment state decides
/// whether creation gas is included; without one (or when the code read
/// fails) the undeployed worst case is assumed. Never fails: estimation is
/// the one permitted soft-fallback in the pipeline.
pub async fn estimate_hook_gas_limit(
	provider: Option<&RootProvider<Http<reqwest::Client>>>,
	shed_account: Address,
	params: HookGasParams,
) -> u64 {
	let with_creation = params.base_gas + params.extra_gas + params.proxy_creation_gas;
	let without_creation = params.base_gas + params.extra_gas;

	let provider = match provider {
		Some(provider) => provider,
		None => return with_creation,
	};

	match provider.get_code_at(shed_account).await {
		Ok(code) if !code.is_empty() => without_creation,
		Ok(_) => with_creation,
		Err(e) => {
			warn!(
				shed_account = %shed_account,
				error = %e,
				"code read failed during hook gas estimation, assuming undeployed proxy"
			);
			with_creation
		}
	}
}
