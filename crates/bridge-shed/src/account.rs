//! Typed-data signing capability for hook pre-authorization.
//!
//! The shed never persists key material; it only needs the owner address
//! and a way to sign a 32-byte EIP-712 digest.

use crate::ShedError;
use alloy_primitives::{Address, Bytes, B256};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use std::str::FromStr;

/// An opaque typed-data-signing capability keyed by a private key or a
/// delegated signer.
#[async_trait]
pub trait HookSigner: Send + Sync {
	/// Address the signatures recover to; owner of the proxy account.
	fn address(&self) -> Address;

	/// Signs a 32-byte EIP-712 digest, returning the 65-byte signature.
	async fn sign_hash(&self, hash: B256) -> Result<Bytes, ShedError>;
}

/// In-memory private-key signer.
pub struct LocalHookSigner {
	signer: PrivateKeySigner,
}

impl LocalHookSigner {
	pub fn new(signer: PrivateKeySigner) -> Self {
		Self { signer }
	}

	/// Creates a signer from a hex-encoded private key.
	pub fn from_hex(key: &str) -> Result<Self, ShedError> {
		let signer = PrivateKeySigner::from_str(key)
			.map_err(|e| ShedError::InvalidInput(format!("Invalid private key: {}", e)))?;
		Ok(Self { signer })
	}
}

#[async_trait]
impl HookSigner for LocalHookSigner {
	fn address(&self) -> Address {
		self.signer.address()
	}

	async fn sign_hash(&self, hash: B256) -> Result<Bytes, ShedError> {
		let signature = self
			.signer
			.sign_hash(&hash)
			.await
			.map_err(|e| ShedError::Signing(e.to_string()))?;
		Ok(Bytes::from(signature.as_bytes().to_vec()))
	}
}
