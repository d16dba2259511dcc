//! Network configuration types for multi-chain bridging.
//!
//! This module defines the configuration structures for network-specific
//! settings, including RPC URLs and supported tokens across different
//! blockchain networks.

use alloy_primitives::Address;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Chain ids of the networks the shipped providers route between.
pub mod chains {
	pub const MAINNET: u64 = 1;
	pub const OPTIMISM: u64 = 10;
	pub const GNOSIS_CHAIN: u64 = 100;
	pub const POLYGON: u64 = 137;
	pub const BASE: u64 = 8453;
	pub const ARBITRUM_ONE: u64 = 42161;
	pub const AVALANCHE: u64 = 43114;
	pub const SEPOLIA: u64 = 11155111;
}

/// Configuration for a token on a specific network.
///
/// # Fields
///
/// * `address` - The on-chain address of the token contract
/// * `symbol` - The token symbol (e.g., "USDC", "WETH")
/// * `decimals` - The number of decimal places for the token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct TokenConfig {
	pub address: Address,
	pub symbol: String,
	pub decimals: u8,
}

/// Configuration for a single blockchain network.
///
/// # Fields
///
/// * `rpc_url` - The HTTP(S) RPC endpoint for read-only chain access
/// * `tokens` - Known tokens on this network
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
	pub rpc_url: String,
	#[serde(default)]
	pub tokens: Vec<TokenConfig>,
}

/// Networks configuration mapping chain IDs to their configurations.
///
/// Type alias for a HashMap mapping chain IDs (as u64) to network
/// configurations. Supports custom deserialization from TOML where chain
/// IDs are provided as string keys.
pub type NetworksConfig = HashMap<u64, NetworkConfig>;

/// Helper function to deserialize network configurations from TOML.
///
/// Chain IDs arrive as string keys (TOML does not support numeric keys in
/// tables) and are converted to u64 keys for internal use.
///
/// # Errors
///
/// Returns a deserialization error if:
/// - A chain ID key cannot be parsed as a u64
/// - The underlying network configuration is invalid
pub fn deserialize_networks<'de, D>(deserializer: D) -> Result<NetworksConfig, D::Error>
where
	D: Deserializer<'de>,
{
	let string_map: HashMap<String, NetworkConfig> = HashMap::deserialize(deserializer)?;
	let mut result = HashMap::new();

	for (key, value) in string_map {
		let chain_id = key
			.parse::<u64>()
			.map_err(|e| serde::de::Error::custom(format!("Invalid chain_id '{}': {}", key, e)))?;
		result.insert(chain_id, value);
	}

	Ok(result)
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde::Deserialize;

	#[derive(Deserialize)]
	struct Wrapper {
		#[serde(deserialize_with = "deserialize_networks")]
		networks: NetworksConfig,
	}

	#[test]
	fn parses_networks_from_toml() {
		let raw = r#"
			[networks.1]
			rpc_url = "https://eth.example.com"

			[[networks.1.tokens]]
			address = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"
			symbol = "WETH"
			decimals = 18

			[networks.137]
			rpc_url = "https://polygon.example.com"
		"#;

		let parsed: Wrapper = toml::from_str(raw).unwrap();
		assert_eq!(parsed.networks.len(), 2);
		assert_eq!(parsed.networks[&1].tokens[0].symbol, "WETH");
		assert_eq!(parsed.networks[&137].tokens.len(), 0);
	}

	#[test]
	fn rejects_non_numeric_chain_id() {
		let raw = r#"
			[networks.mainnet]
			rpc_url = "https://eth.example.com"
		"#;

		assert!(toml::from_str::<Wrapper>(raw).is_err());
	}
}
