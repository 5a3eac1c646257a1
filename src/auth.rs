//! Credentials, scopes, and secrets used for APS token exchanges.

pub mod scope;
pub mod secret;

pub use scope::*;
pub use secret::*;

// self
use crate::_prelude::*;

/// Confidential client credentials registered with APS.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientCredentials {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: Secret,
}
impl ClientCredentials {
	/// Pairs a client identifier with its secret.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		Self { client_id: client_id.into(), client_secret: Secret::new(client_secret) }
	}
}
/// Bearer token issued by the client-credentials exchange.
///
/// Tokens are fetched per relay invocation and dropped afterwards; nothing caches them.
#[derive(Clone, Debug)]
pub struct AccessToken {
	/// Opaque bearer value.
	pub secret: Secret,
	/// Lifetime reported by the token endpoint, when present.
	pub expires_in: Option<Duration>,
}
impl AccessToken {
	/// Bearer value suitable for an `Authorization` header. Callers must avoid logging it.
	pub fn bearer(&self) -> &str {
		self.secret.expose()
	}

	/// Length of the bearer value in bytes.
	pub fn len(&self) -> usize {
		self.secret.expose().len()
	}

	/// Returns true when the token endpoint handed back an empty value.
	pub fn is_empty(&self) -> bool {
		self.secret.expose().is_empty()
	}
}
