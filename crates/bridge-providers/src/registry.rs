//! Provider registry keyed by dappId.

use crate::BridgeProvider;
use std::sync::Arc;

/// The configured set of bridge providers.
///
/// Hooks recovered from settled orders carry their producer's dappId; the
/// registry routes them back to exactly one provider.
#[derive(Clone)]
pub struct ProviderRegistry {
	providers: Vec<Arc<dyn BridgeProvider>>,
}

impl ProviderRegistry {
	pub fn new(providers: Vec<Arc<dyn BridgeProvider>>) -> Self {
		Self { providers }
	}

	pub fn providers(&self) -> &[Arc<dyn BridgeProvider>] {
		&self.providers
	}

	/// The provider whose dappId matches the hook's, if registered.
	pub fn find_by_dapp_id(&self, dapp_id: &str) -> Option<Arc<dyn BridgeProvider>> {
		self.providers
			.iter()
			.find(|provider| provider.info().dapp_id == dapp_id)
			.cloned()
	}
}
