//! Common types module for the bridging SDK.
//!
//! This module defines the core data types and structures shared by every
//! part of the bridging pipeline: quote requests, normalized quote amounts,
//! settlement hooks, deposit records, statuses and the error taxonomy. It
//! provides a centralized location for shared types to ensure consistency
//! across all bridge providers.

/// Error taxonomy for the bridging pipeline.
pub mod errors;
/// Settlement post-hook and raw EVM call types.
pub mod hook;
/// Network and token configuration types.
pub mod networks;
/// Bridge quote normalization types (amounts and costs).
pub mod quote;
/// Quote request types.
pub mod request;
/// Bridging status and deposit-record types.
pub mod status;
/// Fixed-point fee arithmetic shared by quote normalizers.
pub mod utils;

// Re-export all types for convenient access
pub use errors::BridgeError;
pub use hook::{BridgeHook, BridgePostHook, EvmCall};
pub use networks::{chains, NetworkConfig, NetworksConfig, TokenConfig};
pub use quote::{BridgeFeeCost, BridgeQuoteAmounts, BridgeQuoteAmountsAndCosts, BridgeQuoteCosts};
pub use request::{OrderKind, QuoteBridgeRequest};
pub use status::{BridgeStatus, BridgeStatusResult, BridgingDepositParams};
pub use utils::{apply_bps, apply_pct_fee, pct_to_bps, rescale_amount, MAX_BPS, ONE_HUNDRED_PCT};
