//! Deterministic per-user proxy ("shed") account for pre-authorized hooks.
//!
//! A trader's hook executes inside a proxy account whose address is a pure
//! function of a known factory and the trader's address, so the hook can be
//! signed and attached to an order before the proxy even exists on-chain.
//! This crate derives that address, signs the EIP-712 payload authorizing a
//! delegate-call batch, encodes the factory `executeHooks` calldata, and
//! estimates the hook gas limit (accounting for proxy creation when the
//! account has no deployed code yet).

use bridge_types::BridgeError;
use thiserror::Error;

/// Typed-data signing capability and the local private-key signer.
pub mod account;
/// Hook gas-limit estimation.
pub mod gas;
/// EIP-712 batch signing and `executeHooks` calldata encoding.
pub mod hooks;
/// CREATE2 proxy address derivation.
pub mod proxy;

pub use account::{HookSigner, LocalHookSigner};
pub use gas::{
	estimate_hook_gas_limit, HookGasParams, DEFAULT_GAS_FOR_HOOK_ESTIMATION,
	DEFAULT_GAS_FOR_PROXY_CREATION,
};
pub use hooks::{Call, CowShed, SignCallsParams, SignedMulticall};
pub use proxy::{proxy_address, ShedOptions, COW_SHED_FACTORY, COW_SHED_IMPLEMENTATION};

/// Errors that can occur while preparing a pre-authorized hook.
#[derive(Debug, Error)]
pub enum ShedError {
	/// Signer rejection, propagated verbatim.
	#[error("Signing failed: {0}")]
	Signing(String),
	/// Malformed signer key or batch input.
	#[error("Invalid input: {0}")]
	InvalidInput(String),
}

impl From<ShedError> for BridgeError {
	fn from(err: ShedError) -> Self {
		match err {
			ShedError::Signing(msg) => BridgeError::Signing(msg),
			ShedError::InvalidInput(msg) => BridgeError::Validation(msg),
		}
	}
}
