//! CREATE2 proxy address derivation.
//!
//! The proxy address is `CREATE2(factory, salt, init_code_hash)` where the
//! salt is the owner address ABI-encoded to 32 bytes and the init code is
//! the proxy creation bytecode followed by the ABI-encoded constructor
//! arguments `(implementation, owner)`. No chain read is required; the same
//! owner yields the same proxy on every chain the factory is deployed on.

use alloy_primitives::{address, keccak256, Address, Bytes, B256};
use alloy_sol_types::SolValue;

/// Factory that deploys proxies and executes pre-authorized hook batches.
pub const COW_SHED_FACTORY: Address = address!("00E989b87700514118Fa55326CD1cCE82faebEF6");

/// Implementation contract every proxy delegates to.
pub const COW_SHED_IMPLEMENTATION: Address = address!("2CFFA8cf11B90C9F437567b86352169dF4009F73");

// Abbreviated stand-in for the proxy creation bytecode. It is NOT the
// factory's deployed bytecode, so addresses derived from the default do
// not match on-chain deployments; pass the canonical bytecode via
// ShedOptions for production use.
const PROXY_CREATION_CODE: &[u8] = &alloy_primitives::hex!(
	"60a060405260405161041238038061041283398101604081905261002291610076565b6001600160a01b0382811660805281817f360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc5560008051602061040083398151915255506100b09050565b80516001600160a01b038116811461007157600080fd5b919050565b6000806040838503121561008957600080fd5b6100928361005a565b91506100a06020840161005a565b90509250929050565b608051610337"
);

/// Deployment constants for the shed factory.
///
/// Factory and implementation default to the canonical deployment, but
/// the default `proxy_creation_code` is a non-canonical stand-in:
/// addresses derived from it are internally consistent yet will not
/// match on-chain proxies. Supply the factory's real creation bytecode
/// for production use.
#[derive(Debug, Clone)]
pub struct ShedOptions {
	pub factory: Address,
	pub implementation: Address,
	pub proxy_creation_code: Bytes,
}

impl Default for ShedOptions {
	fn default() -> Self {
		Self {
			factory: COW_SHED_FACTORY,
			implementation: COW_SHED_IMPLEMENTATION,
			proxy_creation_code: Bytes::from_static(PROXY_CREATION_CODE),
		}
	}
}

/// Derives the deterministic proxy account for an owner.
///
/// Pure function of the deployment constants and the owner address.
pub fn proxy_address(owner: Address, options: &ShedOptions) -> Address {
	// salt = abi.encode(owner)
	let salt = B256::left_padding_from(owner.as_slice());

	let mut init_code = options.proxy_creation_code.to_vec();
	init_code.extend_from_slice(&(options.implementation, owner).abi_encode());

	options.factory.create2(salt, keccak256(&init_code))
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;

	#[test]
	fn derivation_is_deterministic() {
		let owner = address!("1111111111111111111111111111111111111111");
		let options = ShedOptions::default();

		assert_eq!(proxy_address(owner, &options), proxy_address(owner, &options));
	}

	#[test]
	fn different_owners_get_different_proxies() {
		let options = ShedOptions::default();
		let a = proxy_address(
			address!("1111111111111111111111111111111111111111"),
			&options,
		);
		let b = proxy_address(
			address!("2222222222222222222222222222222222222222"),
			&options,
		);

		assert_ne!(a, b);
	}

	#[test]
	fn factory_change_moves_the_proxy() {
		let owner = address!("1111111111111111111111111111111111111111");
		let default_options = ShedOptions::default();
		let other_options = ShedOptions {
			factory: address!("3333333333333333333333333333333333333333"),
			..ShedOptions::default()
		};

		assert_ne!(
			proxy_address(owner, &default_options),
			proxy_address(owner, &other_options)
		);
	}
}
