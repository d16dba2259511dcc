//! EIP-712 batch signing and `executeHooks` calldata encoding.
//!
//! A hook is a batch of calls executed by the proxy. The owner signs the
//! `ExecuteHooks(Call[],bytes32,uint256)` typed-data payload against the
//! proxy's domain, and the resulting signature is embedded in the factory
//! `executeHooks` calldata so anyone can trigger the batch once the
//! deadline and nonce allow it.

use crate::{proxy::proxy_address, HookSigner, ShedError, ShedOptions};
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::{eip712_domain, sol, Eip712Domain, SolCall, SolStruct};

sol! {
	/// One entry of a hook batch. `allowFailure = false` entries revert the
	/// whole batch when they fail.
	#[derive(Debug, PartialEq, Eq)]
	struct Call {
		address target;
		uint256 value;
		bytes callData;
		bool allowFailure;
		bool isDelegateCall;
	}

	/// The typed-data payload the owner signs.
	#[derive(Debug)]
	struct ExecuteHooks {
		Call[] calls;
		bytes32 nonce;
		uint256 deadline;
	}

	interface ICowShedFactory {
		function executeHooks(
			Call[] calls,
			bytes32 nonce,
			uint256 deadline,
			address user,
			bytes signature
		) external;
	}
}

/// Inputs to a hook-batch signature.
#[derive(Debug)]
pub struct SignCallsParams {
	pub chain_id: u64,
	pub calls: Vec<Call>,
	/// Caller-supplied 32-byte nonce; one signature per nonce.
	pub nonce: B256,
	/// Unix timestamp after which the batch can no longer execute.
	pub deadline: U256,
}

/// A signed, ready-to-execute hook batch.
#[derive(Debug, Clone)]
pub struct SignedMulticall {
	/// The proxy account the batch executes in.
	pub shed_account: Address,
	/// The factory contract to call.
	pub to: Address,
	/// `executeHooks` calldata embedding the owner signature.
	pub data: Bytes,
}

/// Shed account derivation and hook-batch signing against one deployment
/// of the factory.
#[derive(Debug, Clone, Default)]
pub struct CowShed {
	options: ShedOptions,
}

impl CowShed {
	pub fn new(options: ShedOptions) -> Self {
		Self { options }
	}

	pub fn options(&self) -> &ShedOptions {
		&self.options
	}

	/// The deterministic proxy account for an owner. Pure function; no
	/// chain read.
	pub fn shed_account(&self, owner: Address) -> Address {
		proxy_address(owner, &self.options)
	}

	/// EIP-712 digest the owner must sign for this batch.
	pub fn signing_hash(
		&self,
		chain_id: u64,
		owner: Address,
		calls: Vec<Call>,
		nonce: B256,
		deadline: U256,
	) -> B256 {
		let proxy = self.shed_account(owner);
		let message = ExecuteHooks {
			calls,
			nonce,
			deadline,
		};
		message.eip712_signing_hash(&domain(chain_id, proxy))
	}

	/// Signs a hook batch and encodes the factory `executeHooks` calldata.
	///
	/// The signature authorizes the proxy of `signer.address()`; the
	/// returned calldata deploys the proxy on first use.
	pub async fn sign_calls(
		&self,
		signer: &dyn HookSigner,
		params: SignCallsParams,
	) -> Result<SignedMulticall, ShedError> {
		if params.calls.is_empty() {
			return Err(ShedError::InvalidInput(
				"hook batch must contain at least one call".to_string(),
			));
		}

		let owner = signer.address();
		let shed_account = self.shed_account(owner);

		let hash = self.signing_hash(
			params.chain_id,
			owner,
			params.calls.clone(),
			params.nonce,
			params.deadline,
		);
		let signature = signer.sign_hash(hash).await?;

		let data = ICowShedFactory::executeHooksCall {
			calls: params.calls,
			nonce: params.nonce,
			deadline: params.deadline,
			user: owner,
			signature,
		}
		.abi_encode();

		Ok(SignedMulticall {
			shed_account,
			to: self.options.factory,
			data: data.into(),
		})
	}
}

fn domain(chain_id: u64, proxy: Address) -> Eip712Domain {
	eip712_domain! {
		name: "COWShed",
		version: "1.0.0",
		chain_id: chain_id,
		verifying_contract: proxy,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::LocalHookSigner;
	use alloy_primitives::address;

	const TEST_KEY: &str = "0x0123456789012345678901234567890123456789012345678901234567890123";

	fn test_call() -> Call {
		Call {
			target: address!("4444444444444444444444444444444444444444"),
			value: U256::ZERO,
			callData: vec![0xde, 0xad, 0xbe, 0xef].into(),
			allowFailure: false,
			isDelegateCall: true,
		}
	}

	#[test]
	fn signing_hash_is_deterministic_and_chain_bound() {
		let shed = CowShed::default();
		let owner = address!("1111111111111111111111111111111111111111");
		let nonce = B256::repeat_byte(0x01);
		let deadline = U256::from(1_700_000_000u64);

		let h1 = shed.signing_hash(1, owner, vec![test_call()], nonce, deadline);
		let h2 = shed.signing_hash(1, owner, vec![test_call()], nonce, deadline);
		let other_chain = shed.signing_hash(100, owner, vec![test_call()], nonce, deadline);

		assert_eq!(h1, h2);
		assert_ne!(h1, other_chain);
	}

	#[tokio::test]
	async fn sign_calls_encodes_execute_hooks() {
		let shed = CowShed::default();
		let signer = LocalHookSigner::from_hex(TEST_KEY).unwrap();
		let nonce = B256::repeat_byte(0x02);
		let deadline = U256::from(1_700_000_000u64);

		let signed = shed
			.sign_calls(
				&signer,
				SignCallsParams {
					chain_id: 1,
					calls: vec![test_call()],
					nonce,
					deadline,
				},
			)
			.await
			.unwrap();

		assert_eq!(signed.to, crate::COW_SHED_FACTORY);
		assert_eq!(signed.shed_account, shed.shed_account(signer.address()));

		// Assert on decoded call fields, not raw signature bytes.
		let decoded = ICowShedFactory::executeHooksCall::abi_decode(&signed.data, true).unwrap();
		assert_eq!(decoded.calls, vec![test_call()]);
		assert_eq!(decoded.nonce, nonce);
		assert_eq!(decoded.deadline, deadline);
		assert_eq!(decoded.user, signer.address());
		assert_eq!(decoded.signature.len(), 65);
	}

	#[tokio::test]
	async fn empty_batches_are_rejected() {
		let shed = CowShed::default();
		let signer = LocalHookSigner::from_hex(TEST_KEY).unwrap();

		let result = shed
			.sign_calls(
				&signer,
				SignCallsParams {
					chain_id: 1,
					calls: vec![],
					nonce: B256::ZERO,
					deadline: U256::ZERO,
				},
			)
			.await;

		assert!(matches!(result, Err(ShedError::InvalidInput(_))));
	}
}
