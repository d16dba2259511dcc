//! Bungee status resolution.
//!
//! The Bungee indexer only reports PENDING/COMPLETED per leg, which cannot
//! distinguish "still filling" from "expired and refunded". For routes that
//! went through Across the source transaction hash is re-checked against the
//! Across status API to recover the terminal states.

use crate::across::{map_deposit_status, AcrossApi};
use bridge_types::{BridgeError, BridgeStatus, BridgeStatusResult};
use tracing::debug;

use super::api::{BungeeEvent, TxStatus};

enum Classification {
	InProgress,
	Executed,
	/// Source leg done, destination pending, bridged via Across.
	CheckAcross,
	/// Destination completed before the source: indexer data is corrupt.
	Inconsistent,
}

fn classify(event: &BungeeEvent) -> Classification {
	match (event.src_tx_status, event.dest_tx_status) {
		(TxStatus::Pending, Some(TxStatus::Completed)) => Classification::Inconsistent,
		(TxStatus::Pending, _) => Classification::InProgress,
		(TxStatus::Completed, Some(TxStatus::Completed)) => Classification::Executed,
		(TxStatus::Completed, _) => {
			if event.bridge_name == "Across" {
				Classification::CheckAcross
			} else {
				Classification::InProgress
			}
		}
	}
}

/// Resolves the bridging status from an order's indexed events.
///
/// No events yet means `Unknown`, not an error: the indexer lags the chain.
pub async fn status_from_events(
	events: &[BungeeEvent],
	across: &AcrossApi,
) -> Result<BridgeStatusResult, BridgeError> {
	let Some(event) = events.first() else {
		return Ok(BridgeStatusResult::unknown());
	};

	match classify(event) {
		Classification::InProgress => Ok(BridgeStatusResult {
			status: BridgeStatus::InProgress,
			deposit_tx_hash: event.src_transaction_hash,
			fill_tx_hash: None,
		}),
		Classification::Executed => Ok(BridgeStatusResult {
			status: BridgeStatus::Executed,
			deposit_tx_hash: event.src_transaction_hash,
			fill_tx_hash: event.dest_transaction_hash,
		}),
		Classification::CheckAcross => {
			let Some(src_tx) = event.src_transaction_hash else {
				return Ok(BridgeStatusResult {
					status: BridgeStatus::InProgress,
					deposit_tx_hash: None,
					fill_tx_hash: None,
				});
			};

			debug!(src_tx = %src_tx, "re-checking Across leg of a Bungee route");
			let response = across
				.deposit_status_by_tx(event.from_chain_id, src_tx)
				.await?;
			let mut result = map_deposit_status(&response);
			// Across may mark a slow fill as in-progress; keep the known
			// deposit hash either way.
			if result.deposit_tx_hash.is_none() {
				result.deposit_tx_hash = Some(src_tx);
			}
			if result.status == BridgeStatus::Executed {
				result.fill_tx_hash = result.fill_tx_hash.or(event.dest_transaction_hash);
			} else if result.status != BridgeStatus::Expired
				&& result.status != BridgeStatus::Refund
			{
				result.status = BridgeStatus::InProgress;
			}
			Ok(result)
		}
		Classification::Inconsistent => Err(BridgeError::OrderParsing(format!(
			"Unknown bridging status for order {}: destination completed before source",
			event.order_id
		))),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{Address, B256};

	fn event(
		bridge: &str,
		src: TxStatus,
		dest: Option<TxStatus>,
		src_hash: Option<B256>,
	) -> BungeeEvent {
		BungeeEvent {
			src_transaction_hash: src_hash,
			bridge_name: bridge.to_string(),
			from_chain_id: 1,
			to_chain_id: 100,
			order_id: "0xorder".to_string(),
			recipient: Address::repeat_byte(0x22),
			sender: Address::repeat_byte(0x11),
			src_amount: "1000000".to_string(),
			src_token_address: Address::repeat_byte(0x33),
			dest_token_address: Address::repeat_byte(0x44),
			dest_transaction_hash: None,
			dest_amount: None,
			src_tx_status: src,
			dest_tx_status: dest,
		}
	}

	fn across_api() -> AcrossApi {
		// Never reached by the non-Across paths under test.
		AcrossApi::new(Some("http://localhost:1".to_string()))
	}

	#[tokio::test]
	async fn no_events_is_unknown() {
		let result = status_from_events(&[], &across_api()).await.unwrap();
		assert_eq!(result.status, BridgeStatus::Unknown);
	}

	#[tokio::test]
	async fn pending_source_is_in_progress() {
		let src_hash = Some(B256::repeat_byte(0x01));
		let events = [event("Circle CCTP", TxStatus::Pending, None, src_hash)];

		let result = status_from_events(&events, &across_api()).await.unwrap();
		assert_eq!(result.status, BridgeStatus::InProgress);
		assert_eq!(result.deposit_tx_hash, src_hash);
	}

	#[tokio::test]
	async fn both_legs_completed_is_executed() {
		let mut e = event(
			"Circle CCTP",
			TxStatus::Completed,
			Some(TxStatus::Completed),
			Some(B256::repeat_byte(0x01)),
		);
		e.dest_transaction_hash = Some(B256::repeat_byte(0x02));

		let result = status_from_events(&[e], &across_api()).await.unwrap();
		assert_eq!(result.status, BridgeStatus::Executed);
		assert_eq!(result.fill_tx_hash, Some(B256::repeat_byte(0x02)));
	}

	#[tokio::test]
	async fn non_across_pending_destination_is_in_progress() {
		let events = [event(
			"Gnosis Native",
			TxStatus::Completed,
			Some(TxStatus::Pending),
			Some(B256::repeat_byte(0x01)),
		)];

		let result = status_from_events(&events, &across_api()).await.unwrap();
		assert_eq!(result.status, BridgeStatus::InProgress);
	}

	#[tokio::test]
	async fn across_leg_without_source_hash_stays_in_progress() {
		// Nothing to re-check against the Across API yet.
		let events = [event(
			"Across",
			TxStatus::Completed,
			Some(TxStatus::Pending),
			None,
		)];

		let result = status_from_events(&events, &across_api()).await.unwrap();
		assert_eq!(result.status, BridgeStatus::InProgress);
	}

	#[tokio::test]
	async fn destination_before_source_is_a_hard_error() {
		let events = [event(
			"Circle CCTP",
			TxStatus::Pending,
			Some(TxStatus::Completed),
			None,
		)];

		let result = status_from_events(&events, &across_api()).await;
		assert!(matches!(result, Err(BridgeError::OrderParsing(_))));
	}
}
