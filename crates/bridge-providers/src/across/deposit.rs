//! Across deposit-call construction and deposit-event extraction.
//!
//! The unsigned call is a weiroll program delegate-called from the proxy
//! account: read the proxy's sell-token balance, derive the output amount
//! from the quoted relay fee with the on-chain math contract, approve the
//! spoke pool and `depositV3`. Using the balance at execution time
//! (instead of the quoted amount) makes the hook robust against the small
//! surplus a settlement can leave behind.

use crate::weiroll::{CommandKind, PlanValue, ReturnKind, WeirollPlanner};
use alloy_primitives::{Address, Bytes, U256};
use alloy_rpc_types::Log;
use alloy_sol_types::{sol, SolCall, SolEvent};
use bridge_types::{chains, BridgeError, EvmCall, QuoteBridgeRequest};

sol! {
	interface IERC20 {
		function balanceOf(address account) external view returns (uint256);
		function approve(address spender, uint256 amount) external returns (bool);
	}

	/// On-chain fee math: `amount - amount * pct / 1e18`.
	interface IAcrossMath {
		function multiplyAndSubtract(uint256 amount, uint256 pct) external pure returns (uint256);
	}

	interface IAcrossSpokePool {
		function depositV3(
			address depositor,
			address recipient,
			address inputToken,
			address outputToken,
			uint256 inputAmount,
			uint256 outputAmount,
			uint256 destinationChainId,
			address exclusiveRelayer,
			uint32 quoteTimestamp,
			uint32 fillDeadline,
			uint32 exclusivityDeadline,
			bytes message
		) external payable;
	}

	/// Spoke-pool deposit event, emitted once per `depositV3`.
	#[derive(Debug)]
	event V3FundsDeposited(
		address inputToken,
		address outputToken,
		uint256 inputAmount,
		uint256 outputAmount,
		uint256 indexed destinationChainId,
		uint32 indexed depositId,
		uint32 quoteTimestamp,
		uint32 fillDeadline,
		uint32 exclusivityDeadline,
		address indexed depositor,
		address recipient,
		address exclusiveRelayer,
		bytes message
	);
}

/// The fee-math contract for an origin chain.
pub fn math_contract_address(chain_id: u64) -> Option<Address> {
	use alloy_primitives::address;
	match chain_id {
		chains::MAINNET => Some(address!("f2ae6728b6f146556977Af0A68bFbf5bADA22863")),
		chains::ARBITRUM_ONE => Some(address!("5771A4b4029832e79a75De7B485E5fBbec28848f")),
		chains::BASE => Some(address!("d4e943dc6ddc885f6229ce33c2e3dfe402a12c81")),
		_ => None,
	}
}

/// The Across spoke pool for a chain.
pub fn spoke_pool_address(chain_id: u64) -> Option<Address> {
	use alloy_primitives::address;
	match chain_id {
		chains::MAINNET => Some(address!("5c7BCd6E7De5423a257D81B442095A1a6ced35C5")),
		chains::POLYGON => Some(address!("9295ee1d8C5b022Be115A2AD3c30C72E34e7F096")),
		chains::BASE => Some(address!("09aea4b2242abC8bb4BB78D537A67a245A7bEC64")),
		chains::ARBITRUM_ONE => Some(address!("e35e9842fceaca96570b734083f4a58e8f7c5f2a")),
		chains::SEPOLIA => Some(address!("5ef6C01E11889d86803e0B23e3cB3F9E9d97B662")),
		_ => None,
	}
}

/// Timing and exclusivity fields carried over from the quote.
#[derive(Debug, Clone, Copy)]
pub struct DepositQuoteParams {
	pub relay_fee_pct: U256,
	pub exclusive_relayer: Address,
	pub quote_timestamp: u32,
	pub fill_deadline: u32,
	pub exclusivity_deadline: u32,
}

/// Plans the unsigned delegate-call executing the bridge deposit.
pub fn create_across_deposit_call(
	request: &QuoteBridgeRequest,
	shed_account: Address,
	spoke_pool: Address,
	quote: &DepositQuoteParams,
) -> Result<EvmCall, BridgeError> {
	let origin_chain_id = request.sell_token_chain_id;
	let math_contract = math_contract_address(origin_chain_id).ok_or_else(|| {
		BridgeError::Validation(format!(
			"No Across math contract on chain {}",
			origin_chain_id
		))
	})?;

	let mut planner = WeirollPlanner::new();

	// Bridged amount: balance of the intermediate token at execution time.
	let input_amount = planner.add_returning(
		request.sell_token_address,
		CommandKind::StaticCall,
		IERC20::balanceOfCall::SELECTOR,
		&[shed_account.into()],
		ReturnKind::Word,
	)?;

	// Output amount for the actual balance, at the quoted relay fee.
	let output_amount = planner.add_returning(
		math_contract,
		CommandKind::Call,
		IAcrossMath::multiplyAndSubtractCall::SELECTOR,
		&[input_amount.into(), quote.relay_fee_pct.into()],
		ReturnKind::Word,
	)?;

	planner.add(
		request.sell_token_address,
		CommandKind::Call,
		IERC20::approveCall::SELECTOR,
		&[spoke_pool.into(), input_amount.into()],
	)?;

	planner.add(
		spoke_pool,
		CommandKind::Call,
		IAcrossSpokePool::depositV3Call::SELECTOR,
		&[
			shed_account.into(),
			request.recipient().into(),
			request.sell_token_address.into(),
			request.buy_token_address.into(),
			input_amount.into(),
			output_amount.into(),
			U256::from(request.buy_token_chain_id).into(),
			quote.exclusive_relayer.into(),
			quote.quote_timestamp.into(),
			quote.fill_deadline.into(),
			quote.exclusivity_deadline.into(),
			PlanValue::Bytes(Bytes::new()),
		],
	)?;

	Ok(planner.into_call())
}

/// Extracts the ordered deposit events the spoke pool emitted.
pub fn deposit_events(logs: &[Log], spoke_pool: Address) -> Vec<V3FundsDeposited> {
	logs.iter()
		.filter(|log| log.address() == spoke_pool)
		.filter_map(|log| V3FundsDeposited::decode_log(&log.inner, true).ok())
		.map(|decoded| decoded.data)
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::weiroll::{IWeirollVm, WEIROLL_ADDRESS};
	use alloy_primitives::{address, B256};

	fn request() -> QuoteBridgeRequest {
		QuoteBridgeRequest {
			kind: bridge_types::OrderKind::Sell,
			sell_token_chain_id: chains::MAINNET,
			sell_token_address: address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
			sell_token_decimals: 18,
			buy_token_chain_id: chains::ARBITRUM_ONE,
			buy_token_address: address!("82aF49447D8a07e3bd95BD0d56f35241523fBab1"),
			buy_token_decimals: 18,
			amount: U256::from(10u64).pow(U256::from(18)),
			account: address!("1111111111111111111111111111111111111111"),
			owner: None,
			receiver: Some(address!("2222222222222222222222222222222222222222")),
			app_code: "test".to_string(),
		}
	}

	fn quote_params() -> DepositQuoteParams {
		DepositQuoteParams {
			relay_fee_pct: U256::from(10u64).pow(U256::from(16)),
			exclusive_relayer: Address::ZERO,
			quote_timestamp: 1_700_000_000,
			fill_deadline: 1_700_020_000,
			exclusivity_deadline: 0,
		}
	}

	fn selector_of(command: &B256) -> [u8; 4] {
		[command[0], command[1], command[2], command[3]]
	}

	fn target_of(command: &B256) -> Address {
		Address::from_slice(&command[12..32])
	}

	#[test]
	fn deposit_plan_reads_balance_then_deposits() {
		let shed_account = address!("3333333333333333333333333333333333333333");
		let spoke_pool = spoke_pool_address(chains::MAINNET).unwrap();

		let call =
			create_across_deposit_call(&request(), shed_account, spoke_pool, &quote_params())
				.unwrap();
		assert_eq!(call.to, WEIROLL_ADDRESS);
		assert_eq!(call.value, U256::ZERO);

		let decoded = IWeirollVm::executeCall::abi_decode(&call.data, true).unwrap();

		// balanceOf, multiplyAndSubtract, approve, depositV3 (the latter as
		// an extended command with its index word)
		assert_eq!(decoded.commands.len(), 5);

		assert_eq!(
			selector_of(&decoded.commands[0]),
			IERC20::balanceOfCall::SELECTOR
		);
		// balance is read with a static call
		assert_eq!(decoded.commands[0][4], 0x02);
		assert_eq!(target_of(&decoded.commands[0]), request().sell_token_address);

		assert_eq!(
			selector_of(&decoded.commands[1]),
			IAcrossMath::multiplyAndSubtractCall::SELECTOR
		);
		assert_eq!(
			target_of(&decoded.commands[1]),
			math_contract_address(chains::MAINNET).unwrap()
		);

		assert_eq!(
			selector_of(&decoded.commands[2]),
			IERC20::approveCall::SELECTOR
		);

		assert_eq!(
			selector_of(&decoded.commands[3]),
			IAcrossSpokePool::depositV3Call::SELECTOR
		);
		// twelve arguments need the extended index word
		assert_eq!(decoded.commands[3][4] & 0x40, 0x40);
		assert_eq!(target_of(&decoded.commands[3]), spoke_pool);

		// the quoted relay fee is a literal in state
		let fee_word = B256::from(quote_params().relay_fee_pct);
		assert!(decoded
			.state
			.iter()
			.any(|slot| slot.as_ref() == fee_word.as_slice()));
		// so is the recipient
		let recipient_word = B256::left_padding_from(request().recipient().as_slice());
		assert!(decoded
			.state
			.iter()
			.any(|slot| slot.as_ref() == recipient_word.as_slice()));
	}

	#[test]
	fn deposit_reuses_the_balance_slot_for_input_amount() {
		let shed_account = address!("3333333333333333333333333333333333333333");
		let spoke_pool = spoke_pool_address(chains::MAINNET).unwrap();

		let call =
			create_across_deposit_call(&request(), shed_account, spoke_pool, &quote_params())
				.unwrap();
		let decoded = IWeirollVm::executeCall::abi_decode(&call.data, true).unwrap();

		// balanceOf writes slot 1; approve's second argument and the
		// extended depositV3 index word both reference it
		assert_eq!(decoded.commands[0][11], 0x01);
		assert_eq!(decoded.commands[2][6], 0x01);
		let deposit_indices = &decoded.commands[4];
		assert_eq!(deposit_indices[4], 0x01);
	}

	#[test]
	fn no_math_contract_on_unsupported_chain() {
		let mut req = request();
		req.sell_token_chain_id = chains::GNOSIS_CHAIN;

		let result = create_across_deposit_call(
			&req,
			Address::ZERO,
			spoke_pool_address(chains::MAINNET).unwrap(),
			&quote_params(),
		);
		assert!(matches!(result, Err(BridgeError::Validation(_))));
	}

	#[test]
	fn deposit_events_filter_by_spoke_pool() {
		let spoke_pool = spoke_pool_address(chains::MAINNET).unwrap();
		let event = V3FundsDeposited {
			inputToken: Address::repeat_byte(0x11),
			outputToken: Address::repeat_byte(0x22),
			inputAmount: U256::from(1000u64),
			outputAmount: U256::from(990u64),
			destinationChainId: U256::from(chains::ARBITRUM_ONE),
			depositId: 42,
			quoteTimestamp: 1_700_000_000,
			fillDeadline: 1_700_020_000,
			exclusivityDeadline: 0,
			depositor: Address::repeat_byte(0x33),
			recipient: Address::repeat_byte(0x44),
			exclusiveRelayer: Address::ZERO,
			message: Bytes::new(),
		};

		let log = |emitter| Log {
			inner: alloy_primitives::Log {
				address: emitter,
				data: event.encode_log_data(),
			},
			..Default::default()
		};

		let events = deposit_events(&[log(spoke_pool), log(Address::repeat_byte(0x99))], spoke_pool);
		assert_eq!(events.len(), 1);
		assert_eq!(events[0].depositId, 42);
	}
}
