//! Trade-event extraction and positional correlation.
//!
//! Within one settlement transaction the Nth trade event for an order
//! corresponds to the Nth bridge-deposit event. This is a heuristic over
//! the node's log order (authoritative once mined), not a protocol
//! guarantee; it lives here so a stronger correlation key can replace it
//! without touching providers.

use alloy_primitives::{address, Address};
use alloy_rpc_types::Log;
use alloy_sol_types::{sol, SolEvent};
use tracing::warn;

sol! {
	/// Settlement-contract trade event.
	#[derive(Debug)]
	event Trade(
		address indexed owner,
		address sellToken,
		address buyToken,
		uint256 sellAmount,
		uint256 buyAmount,
		uint256 feeAmount,
		bytes orderUid
	);
}

/// The settlement contract, same address on every supported chain.
pub const GPV2_SETTLEMENT: Address = address!("9008D19f58AAbD9eD0D60971565AA8510560ab41");

/// Extracts the ordered trade events a settlement transaction emitted.
pub fn trade_events(logs: &[Log]) -> Vec<Trade> {
	logs.iter()
		.filter(|log| log.address() == GPV2_SETTLEMENT)
		.filter_map(|log| Trade::decode_log(&log.inner, true).ok())
		.map(|decoded| decoded.data)
		.collect()
}

/// Position of an order's trade within the settlement, by order uid
/// (0x-prefixed hex, case-insensitive).
pub fn find_trade_index(trades: &[Trade], order_uid: &str) -> Option<usize> {
	let wanted = order_uid.trim_start_matches("0x").to_lowercase();
	trades
		.iter()
		.position(|trade| hex::encode(&trade.orderUid) == wanted)
}

/// Positional correlation: the deposit at the trade's index, if any.
///
/// Returns `None` (with a warning) when fewer deposit events than trades
/// were emitted, i.e. the order's settlement had no bridging leg.
pub fn nth_for_trade<T>(trade_index: usize, deposits: &[T]) -> Option<&T> {
	let deposit = deposits.get(trade_index);
	if deposit.is_none() {
		warn!(
			trade_index,
			deposit_count = deposits.len(),
			"trade event found but no deposit event at its index"
		);
	}
	deposit
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{Bytes, U256};

	fn trade_log(order_uid: &[u8], emitter: Address) -> Log {
		let event = Trade {
			owner: Address::repeat_byte(0x11),
			sellToken: Address::repeat_byte(0x22),
			buyToken: Address::repeat_byte(0x33),
			sellAmount: U256::from(1000u64),
			buyAmount: U256::from(990u64),
			feeAmount: U256::from(10u64),
			orderUid: Bytes::copy_from_slice(order_uid),
		};

		Log {
			inner: alloy_primitives::Log {
				address: emitter,
				data: event.encode_log_data(),
			},
			..Default::default()
		}
	}

	#[test]
	fn extracts_only_settlement_trades() {
		let logs = vec![
			trade_log(&[0xaa; 56], GPV2_SETTLEMENT),
			trade_log(&[0xbb; 56], Address::repeat_byte(0x99)),
			trade_log(&[0xcc; 56], GPV2_SETTLEMENT),
		];

		let trades = trade_events(&logs);
		assert_eq!(trades.len(), 2);
		assert_eq!(trades[0].orderUid.as_ref(), &[0xaa; 56]);
		assert_eq!(trades[1].orderUid.as_ref(), &[0xcc; 56]);
	}

	#[test]
	fn finds_trade_by_order_uid() {
		let logs = vec![
			trade_log(&[0xaa; 56], GPV2_SETTLEMENT),
			trade_log(&[0xbb; 56], GPV2_SETTLEMENT),
		];
		let trades = trade_events(&logs);

		let uid_b = format!("0x{}", hex::encode([0xbb; 56]));
		assert_eq!(find_trade_index(&trades, &uid_b), Some(1));
		assert_eq!(find_trade_index(&trades, "0xdeadbeef"), None);
	}

	#[test]
	fn second_trade_pairs_with_second_deposit() {
		let logs = vec![
			trade_log(&[0xaa; 56], GPV2_SETTLEMENT),
			trade_log(&[0xbb; 56], GPV2_SETTLEMENT),
		];
		let trades = trade_events(&logs);
		let deposits = ["D0", "D1"];

		let uid_b = format!("0x{}", hex::encode([0xbb; 56]));
		let index = find_trade_index(&trades, &uid_b).unwrap();
		assert_eq!(nth_for_trade(index, &deposits), Some(&"D1"));
	}

	#[test]
	fn missing_deposit_is_none_not_error() {
		let deposits: [&str; 1] = ["D0"];
		assert_eq!(nth_for_trade(1, &deposits), None);
	}
}
