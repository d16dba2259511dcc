//! Bungee deposit-call construction and build-tx verification.
//!
//! The SocketGateway calldata returned by `build-tx` is opaque, so before
//! it is wrapped into a hook it is verified against the quoted route: the
//! selector must be one the route's bridge is known to use, and the input
//! amount embedded in the calldata must equal the quoted amount. The hook
//! itself is a weiroll program that reads the proxy's balance at execution
//! time, splices it into the verified calldata with an on-chain
//! byte-surgery helper and re-dispatches the route through `executeRoute`.

use crate::weiroll::{CommandKind, PlanValue, ReturnKind, WeirollPlanner};
use alloy_primitives::{address, Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};
use bridge_types::{BridgeError, EvmCall, QuoteBridgeRequest};

/// Sentinel the API uses for a chain's native asset.
pub const NATIVE_ETH_ADDRESS: Address = address!("EeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

/// Gateway calldata starts with the 4-byte route id.
const ROUTE_ID_BYTES: usize = 4;

sol! {
	interface IERC20 {
		function balanceOf(address account) external view returns (uint256);
		function approve(address spender, uint256 amount) external returns (bool);
	}

	/// Byte-surgery helpers for splicing execution-time amounts into the
	/// quoted gateway calldata.
	interface IBungeeCowswapLib {
		function replaceBytes(bytes data, uint256 startIndex, uint256 length, bytes newValue) external pure returns (bytes);
		function applyPctDiff(uint256 base, uint256 compare, uint256 target) external pure returns (uint256);
	}

	interface ISocketGateway {
		function executeRoute(uint32 routeId, bytes routeData) external payable returns (bytes);
	}
}

/// A gateway function a bridge is known to dispatch to, and where in the
/// full calldata its amount words live.
///
/// SocketGateway calldata is `4-byte routeId ++ 4-byte selector ++ params`;
/// offsets index into the full calldata. Only Across routes carry an
/// output amount that needs rescaling.
#[derive(Debug, Clone, Copy)]
pub struct GatewayFunction {
	pub selector: [u8; 4],
	pub amount_offset: usize,
	pub output_amount_offset: Option<usize>,
}

/// Known gateway functions per internal bridge name.
pub fn gateway_functions(bridge: &str) -> &'static [GatewayFunction] {
	match bridge {
		// bridgeERC20To / bridgeNativeTo; the output amount sits inside the
		// AcrossBridgeData struct
		"across" => &[
			GatewayFunction {
				selector: [0x79, 0x2e, 0xbc, 0xb9],
				amount_offset: 8,
				output_amount_offset: Some(488),
			},
			GatewayFunction {
				selector: [0xe4, 0x21, 0xf3, 0x52],
				amount_offset: 8,
				output_amount_offset: Some(392),
			},
		],
		"cctp" => &[GatewayFunction {
			selector: [0xb7, 0xdf, 0xe9, 0xd0],
			amount_offset: 8,
			output_amount_offset: None,
		}],
		// bridgeERC20To (amount is the 5th param) / bridgeNativeTo (4th)
		"gnosis-native-bridge" => &[
			GatewayFunction {
				selector: [0x3b, 0xf5, 0xc2, 0x28],
				amount_offset: 136,
				output_amount_offset: None,
			},
			GatewayFunction {
				selector: [0xfc, 0xb2, 0x3e, 0xb0],
				amount_offset: 104,
				output_amount_offset: None,
			},
		],
		_ => &[],
	}
}

/// Maps the API's bridge display name to the internal bridge name.
pub fn bridge_internal_name(display_name: &str) -> Option<&'static str> {
	match display_name {
		"Across" => Some("across"),
		"Circle CCTP" => Some("cctp"),
		"Gnosis Native" => Some("gnosis-native-bridge"),
		_ => None,
	}
}

/// Checks that gateway calldata matches the quoted route and returns the
/// matched function.
///
/// Fails when the bridge is unknown, the selector is not one of the
/// bridge's known functions, or the embedded amount differs from the quote.
pub fn verify_gateway_calldata(
	calldata: &[u8],
	bridge_display_name: &str,
	quoted_input_amount: U256,
) -> Result<GatewayFunction, BridgeError> {
	let bridge = bridge_internal_name(bridge_display_name).ok_or_else(|| {
		BridgeError::Validation(format!(
			"Unknown Bungee bridge '{}', cannot verify calldata",
			bridge_display_name
		))
	})?;

	if calldata.len() < 8 {
		return Err(BridgeError::Validation(
			"Gateway calldata shorter than routeId + selector".to_string(),
		));
	}
	let selector: [u8; 4] = [calldata[4], calldata[5], calldata[6], calldata[7]];

	let function = gateway_functions(bridge)
		.iter()
		.find(|f| f.selector == selector)
		.ok_or_else(|| {
			BridgeError::Validation(format!(
				"Gateway selector 0x{} is not a known {} function",
				hex::encode(selector),
				bridge
			))
		})?;

	let start = function.amount_offset;
	let end = start + 32;
	if calldata.len() < end {
		return Err(BridgeError::Validation(
			"Gateway calldata too short for its amount word".to_string(),
		));
	}
	let embedded = U256::from_be_slice(&calldata[start..end]);
	if embedded != quoted_input_amount {
		return Err(BridgeError::Validation(format!(
			"Gateway calldata amount {} does not match quoted amount {}",
			embedded, quoted_input_amount
		)));
	}

	Ok(*function)
}

/// Inputs of the deposit plan, captured at quote time.
#[derive(Debug, Clone)]
pub struct BungeeDepositParams {
	/// SocketGateway the route executes on.
	pub gateway_address: Address,
	/// Full gateway calldata: routeId ++ selector ++ params.
	pub gateway_calldata: Bytes,
	/// Spender to approve; absent on native-asset routes.
	pub spender_address: Option<Address>,
	/// Byte-surgery helper contract on the origin chain.
	pub cowswap_lib: Address,
	/// Display name of the route's bridge.
	pub bridge_display_name: String,
}

/// Plans the unsigned delegate-call executing the verified deposit.
pub fn create_bungee_deposit_call(
	request: &QuoteBridgeRequest,
	shed_account: Address,
	deposit: &BungeeDepositParams,
) -> Result<EvmCall, BridgeError> {
	let function = verify_gateway_calldata(
		&deposit.gateway_calldata,
		&deposit.bridge_display_name,
		request.amount,
	)?;

	let calldata = deposit.gateway_calldata.as_ref();
	let route_id = u32::from_be_bytes([calldata[0], calldata[1], calldata[2], calldata[3]]);
	let route_data = Bytes::copy_from_slice(&calldata[ROUTE_ID_BYTES..]);

	let mut planner = WeirollPlanner::new();

	// The balance is kept raw so the same slot serves both the uint256
	// arguments and the byte-splice payload.
	let balance = planner.add_returning(
		request.sell_token_address,
		CommandKind::Call,
		IERC20::balanceOfCall::SELECTOR,
		&[shed_account.into()],
		ReturnKind::Raw,
	)?;

	if request.sell_token_address != NATIVE_ETH_ADDRESS {
		let spender = deposit.spender_address.ok_or_else(|| {
			BridgeError::quote("Bungee build-tx returned no approval spender for an ERC-20 route")
		})?;
		planner.add(
			request.sell_token_address,
			CommandKind::Call,
			IERC20::approveCall::SELECTOR,
			&[spender.into(), balance.as_word()],
		)?;
	}

	// Offsets index the full calldata; the route id is stripped before
	// splicing.
	let input_offset = function.amount_offset - ROUTE_ID_BYTES;
	let mut route_data_ref = planner.add_returning(
		deposit.cowswap_lib,
		CommandKind::Call,
		IBungeeCowswapLib::replaceBytesCall::SELECTOR,
		&[
			PlanValue::Bytes(route_data),
			U256::from(input_offset).into(),
			U256::from(32u64).into(),
			balance.as_bytes(),
		],
		ReturnKind::Bytes,
	)?;

	// Across fills a fixed output amount, so it is rescaled by the same
	// proportion the input amount grew by.
	if let Some(output_offset) = function.output_amount_offset {
		if calldata.len() < output_offset + 32 {
			return Err(BridgeError::Validation(
				"Gateway calldata too short for its output amount word".to_string(),
			));
		}
		let quoted_input = U256::from_be_slice(
			&calldata[function.amount_offset..function.amount_offset + 32],
		);
		let quoted_output = U256::from_be_slice(&calldata[output_offset..output_offset + 32]);

		let new_output = planner.add_returning(
			deposit.cowswap_lib,
			CommandKind::Call,
			IBungeeCowswapLib::applyPctDiffCall::SELECTOR,
			&[
				quoted_input.into(),
				balance.as_word(),
				quoted_output.into(),
			],
			ReturnKind::Raw,
		)?;
		route_data_ref = planner.add_returning(
			deposit.cowswap_lib,
			CommandKind::Call,
			IBungeeCowswapLib::replaceBytesCall::SELECTOR,
			&[
				route_data_ref.into(),
				U256::from(output_offset - ROUTE_ID_BYTES).into(),
				U256::from(32u64).into(),
				new_output.as_bytes(),
			],
			ReturnKind::Bytes,
		)?;
	}

	planner.add(
		deposit.gateway_address,
		CommandKind::Call,
		ISocketGateway::executeRouteCall::SELECTOR,
		&[route_id.into(), route_data_ref.into()],
	)?;

	Ok(planner.into_call())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::weiroll::{IWeirollVm, WEIROLL_ADDRESS};
	use alloy_primitives::{address, B256};
	use bridge_types::{chains, OrderKind};

	const ACROSS_ERC20_SELECTOR: [u8; 4] = [0x79, 0x2e, 0xbc, 0xb9];
	const ACROSS_NATIVE_SELECTOR: [u8; 4] = [0xe4, 0x21, 0xf3, 0x52];
	const CCTP_SELECTOR: [u8; 4] = [0xb7, 0xdf, 0xe9, 0xd0];

	fn gateway_calldata(selector: [u8; 4], amount_offset: usize, amount: U256) -> Vec<u8> {
		let mut data = vec![0u8; 552];
		// routeId
		data[0..4].copy_from_slice(&[0x00, 0x00, 0x01, 0x8f]);
		data[4..8].copy_from_slice(&selector);
		data[amount_offset..amount_offset + 32].copy_from_slice(&amount.to_be_bytes::<32>());
		data
	}

	fn request() -> QuoteBridgeRequest {
		QuoteBridgeRequest {
			kind: OrderKind::Sell,
			sell_token_chain_id: chains::MAINNET,
			sell_token_address: address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
			sell_token_decimals: 6,
			buy_token_chain_id: chains::GNOSIS_CHAIN,
			buy_token_address: address!("DDAfbb505ad214D7b80b1f830fcCc89B60fb7A83"),
			buy_token_decimals: 6,
			amount: U256::from(5_000_000u64),
			account: address!("1111111111111111111111111111111111111111"),
			owner: None,
			receiver: None,
			app_code: "test".to_string(),
		}
	}

	fn deposit_params(selector: [u8; 4], bridge: &str, amount: U256) -> BungeeDepositParams {
		let offset = gateway_functions(bridge_internal_name(bridge).unwrap())
			.iter()
			.find(|f| f.selector == selector)
			.unwrap()
			.amount_offset;
		BungeeDepositParams {
			gateway_address: address!("3a23F943181408EAC424116Af7b7790c94Cb97a5"),
			gateway_calldata: Bytes::from(gateway_calldata(selector, offset, amount)),
			spender_address: Some(address!("4444444444444444444444444444444444444444")),
			cowswap_lib: address!("5555555555555555555555555555555555555555"),
			bridge_display_name: bridge.to_string(),
		}
	}

	fn selector_of(command: &B256) -> [u8; 4] {
		[command[0], command[1], command[2], command[3]]
	}

	fn target_of(command: &B256) -> Address {
		Address::from_slice(&command[12..32])
	}

	#[test]
	fn accepts_across_bridge_erc20_calldata() {
		let amount = U256::from(1_000_000u64);
		let data = gateway_calldata(ACROSS_ERC20_SELECTOR, 8, amount);

		let function = verify_gateway_calldata(&data, "Across", amount).unwrap();
		assert_eq!(function.selector, ACROSS_ERC20_SELECTOR);
		assert_eq!(function.amount_offset, 8);
		assert_eq!(function.output_amount_offset, Some(488));
	}

	#[test]
	fn accepts_across_bridge_native_calldata() {
		let amount = U256::from(1_000_000u64);
		let data = gateway_calldata(ACROSS_NATIVE_SELECTOR, 8, amount);

		let function = verify_gateway_calldata(&data, "Across", amount).unwrap();
		assert_eq!(function.output_amount_offset, Some(392));
	}

	#[test]
	fn accepts_gnosis_native_at_its_own_offset() {
		let amount = U256::from(777u64);
		let data = gateway_calldata([0x3b, 0xf5, 0xc2, 0x28], 136, amount);
		assert!(verify_gateway_calldata(&data, "Gnosis Native", amount).is_ok());

		let data = gateway_calldata([0xfc, 0xb2, 0x3e, 0xb0], 104, amount);
		assert!(verify_gateway_calldata(&data, "Gnosis Native", amount).is_ok());
	}

	#[test]
	fn rejects_amount_mismatch() {
		let data = gateway_calldata(CCTP_SELECTOR, 8, U256::from(999u64));
		let result = verify_gateway_calldata(&data, "Circle CCTP", U256::from(1000u64));
		assert!(matches!(result, Err(BridgeError::Validation(_))));
	}

	#[test]
	fn rejects_foreign_selector_and_unknown_bridge() {
		let amount = U256::from(1u64);
		// CCTP selector claimed by an Across route
		let data = gateway_calldata(CCTP_SELECTOR, 8, amount);
		assert!(verify_gateway_calldata(&data, "Across", amount).is_err());
		assert!(verify_gateway_calldata(&data, "Hop", amount).is_err());
	}

	#[test]
	fn across_plan_splices_input_and_rescales_output() {
		let request = request();
		let params = deposit_params(ACROSS_ERC20_SELECTOR, "Across", request.amount);
		let shed_account = address!("6666666666666666666666666666666666666666");

		let call = create_bungee_deposit_call(&request, shed_account, &params).unwrap();
		assert_eq!(call.to, WEIROLL_ADDRESS);
		assert_eq!(call.value, U256::ZERO);

		let decoded = IWeirollVm::executeCall::abi_decode(&call.data, true).unwrap();

		// balanceOf, approve, replaceBytes(input), applyPctDiff,
		// replaceBytes(output), executeRoute
		assert_eq!(decoded.commands.len(), 6);
		assert_eq!(
			selector_of(&decoded.commands[0]),
			IERC20::balanceOfCall::SELECTOR
		);
		// raw return: call flag plus tuple-return flag
		assert_eq!(decoded.commands[0][4], 0x81);

		assert_eq!(
			selector_of(&decoded.commands[1]),
			IERC20::approveCall::SELECTOR
		);
		assert_eq!(target_of(&decoded.commands[1]), request.sell_token_address);

		assert_eq!(
			selector_of(&decoded.commands[2]),
			IBungeeCowswapLib::replaceBytesCall::SELECTOR
		);
		assert_eq!(target_of(&decoded.commands[2]), params.cowswap_lib);

		assert_eq!(
			selector_of(&decoded.commands[3]),
			IBungeeCowswapLib::applyPctDiffCall::SELECTOR
		);
		assert_eq!(
			selector_of(&decoded.commands[4]),
			IBungeeCowswapLib::replaceBytesCall::SELECTOR
		);

		assert_eq!(
			selector_of(&decoded.commands[5]),
			ISocketGateway::executeRouteCall::SELECTOR
		);
		assert_eq!(target_of(&decoded.commands[5]), params.gateway_address);

		// the route data literal is the calldata with the route id stripped
		let stripped = &params.gateway_calldata[ROUTE_ID_BYTES..];
		assert!(decoded
			.state
			.iter()
			.any(|slot| slot.len() >= 32 + stripped.len()
				&& &slot[32..32 + stripped.len()] == stripped));
		// the route id survives as a literal word
		let route_id_word = B256::from(U256::from(0x018fu64));
		assert!(decoded
			.state
			.iter()
			.any(|slot| slot.as_ref() == route_id_word.as_slice()));
	}

	#[test]
	fn non_across_plan_skips_the_output_rescale() {
		let request = request();
		let params = deposit_params(CCTP_SELECTOR, "Circle CCTP", request.amount);

		let call = create_bungee_deposit_call(&request, Address::repeat_byte(0x66), &params)
			.unwrap();
		let decoded = IWeirollVm::executeCall::abi_decode(&call.data, true).unwrap();

		// balanceOf, approve, replaceBytes, executeRoute
		assert_eq!(decoded.commands.len(), 4);
		assert!(!decoded.commands.iter().any(|command| {
			selector_of(command) == IBungeeCowswapLib::applyPctDiffCall::SELECTOR
		}));
	}

	#[test]
	fn native_sell_token_skips_the_approval() {
		let mut request = request();
		request.sell_token_address = NATIVE_ETH_ADDRESS;
		let mut params = deposit_params(ACROSS_NATIVE_SELECTOR, "Across", request.amount);
		params.spender_address = None;

		let call = create_bungee_deposit_call(&request, Address::repeat_byte(0x66), &params)
			.unwrap();
		let decoded = IWeirollVm::executeCall::abi_decode(&call.data, true).unwrap();

		assert!(!decoded
			.commands
			.iter()
			.any(|command| selector_of(command) == IERC20::approveCall::SELECTOR));
	}

	#[test]
	fn erc20_route_without_spender_is_rejected() {
		let request = request();
		let mut params = deposit_params(CCTP_SELECTOR, "Circle CCTP", request.amount);
		params.spender_address = None;

		let result = create_bungee_deposit_call(&request, Address::repeat_byte(0x66), &params);
		assert!(matches!(result, Err(BridgeError::ProviderQuote { .. })));
	}
}
