//! App-data parsing and bridge post-hook extraction.
//!
//! An order's app data carries the hooks to execute around settlement. The
//! bridging leg is the post-hook whose dappId starts with the provider
//! prefix; everything else in the document is ignored.

use crate::OrderbookError;
use bridge_types::BridgePostHook;
use serde::Deserialize;
use std::str::FromStr;

#[derive(Debug, Deserialize)]
struct AppDataDoc {
	#[serde(default)]
	metadata: Option<AppDataMetadata>,
}

#[derive(Debug, Deserialize)]
struct AppDataMetadata {
	#[serde(default)]
	hooks: Option<AppDataHooks>,
}

#[derive(Debug, Deserialize)]
struct AppDataHooks {
	#[serde(default)]
	post: Vec<AppDataHook>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppDataHook {
	target: String,
	call_data: String,
	gas_limit: String,
	#[serde(default)]
	dapp_id: Option<String>,
}

/// Finds the bridging post-hook in a full app-data document.
///
/// Returns `Ok(None)` when the document has no post-hook with a matching
/// dappId prefix, meaning the order simply has no bridging leg. A document that
/// does not parse is an error: we cannot tell whether a leg exists.
pub fn find_bridge_post_hook(
	full_app_data: &str,
	dapp_id_prefix: &str,
) -> Result<Option<BridgePostHook>, OrderbookError> {
	let doc: AppDataDoc = serde_json::from_str(full_app_data)
		.map_err(|e| OrderbookError::Decode(format!("app data is not valid JSON: {}", e)))?;

	let hooks = match doc.metadata.and_then(|m| m.hooks) {
		Some(hooks) => hooks.post,
		None => return Ok(None),
	};

	for hook in hooks {
		let dapp_id = match &hook.dapp_id {
			Some(dapp_id) if dapp_id.starts_with(dapp_id_prefix) => dapp_id.clone(),
			_ => continue,
		};

		let target = alloy_primitives::Address::from_str(&hook.target)
			.map_err(|e| OrderbookError::Decode(format!("hook target invalid: {}", e)))?;
		let call_data = alloy_primitives::Bytes::from_str(&hook.call_data)
			.map_err(|e| OrderbookError::Decode(format!("hook calldata invalid: {}", e)))?;
		let gas_limit = hook
			.gas_limit
			.parse::<u64>()
			.map_err(|e| OrderbookError::Decode(format!("hook gas limit invalid: {}", e)))?;

		return Ok(Some(BridgePostHook {
			target,
			call_data,
			gas_limit,
			dapp_id,
		}));
	}

	Ok(None)
}

#[cfg(test)]
mod tests {
	use super::*;

	const PREFIX: &str = "cow-sdk://bridging/providers";

	fn app_data(dapp_id: &str) -> String {
		format!(
			r#"{{
				"appCode": "test",
				"metadata": {{
					"hooks": {{
						"post": [
							{{
								"target": "0x00E989b87700514118Fa55326CD1cCE82faebEF6",
								"callData": "0xdeadbeef",
								"gasLimit": "1100000",
								"dappId": "{}"
							}}
						]
					}}
				}}
			}}"#,
			dapp_id
		)
	}

	#[test]
	fn finds_hook_with_matching_prefix() {
		let doc = app_data("cow-sdk://bridging/providers/across");
		let hook = find_bridge_post_hook(&doc, PREFIX).unwrap().unwrap();
		assert_eq!(hook.dapp_id, "cow-sdk://bridging/providers/across");
		assert_eq!(hook.gas_limit, 1_100_000);
		assert_eq!(hook.call_data.as_ref(), &[0xde, 0xad, 0xbe, 0xef]);
	}

	#[test]
	fn ignores_unrelated_hooks() {
		let doc = app_data("some-other-dapp");
		assert!(find_bridge_post_hook(&doc, PREFIX).unwrap().is_none());
	}

	#[test]
	fn no_hooks_metadata_is_not_an_error() {
		assert!(find_bridge_post_hook("{}", PREFIX).unwrap().is_none());
		assert!(find_bridge_post_hook(r#"{"metadata":{}}"#, PREFIX)
			.unwrap()
			.is_none());
	}

	#[test]
	fn malformed_document_is_an_error() {
		assert!(find_bridge_post_hook("not json", PREFIX).is_err());
	}
}
