//! Error taxonomy for the bridging pipeline.
//!
//! Four failure classes cross the crate boundaries: provider-quote failures
//! (HTTP or response-shape), settlement-side order parsing failures,
//! explicitly unsupported operations, and request validation failures.
//! Quote and signing failures are never retried or recovered locally; a
//! stale retried quote is unsafe to sign.

use thiserror::Error;

/// Errors surfaced by the bridging SDK.
#[derive(Debug, Error)]
pub enum BridgeError {
	/// HTTP failure or response-shape mismatch from a bridge provider API.
	/// Carries the offending payload when one was received.
	#[error("Provider quote failed: {message}")]
	ProviderQuote {
		message: String,
		payload: Option<serde_json::Value>,
	},
	/// Settlement-side reconciliation cannot identify the provider that
	/// produced a hook, or cannot locate a required transaction.
	#[error("Order parsing failed: {0}")]
	OrderParsing(String),
	/// Operation that is impossible for this provider, as opposed to a
	/// transient failure. Callers must not retry.
	#[error("Not implemented: {0}")]
	Unsupported(&'static str),
	/// Malformed request; fails fast before any network call.
	#[error("Validation failed: {0}")]
	Validation(String),
	/// Typed-data signer rejection, propagated verbatim.
	#[error("Signing failed: {0}")]
	Signing(String),
	/// Chain RPC read failure.
	#[error("RPC request failed: {0}")]
	Rpc(String),
}

impl BridgeError {
	/// Provider-quote error without a payload (e.g. transport failure).
	pub fn quote(message: impl Into<String>) -> Self {
		BridgeError::ProviderQuote {
			message: message.into(),
			payload: None,
		}
	}

	/// Provider-quote error carrying the offending response payload.
	pub fn quote_with_payload(message: impl Into<String>, payload: serde_json::Value) -> Self {
		BridgeError::ProviderQuote {
			message: message.into(),
			payload: Some(payload),
		}
	}
}
