//! Upload relay that turns GLB massing models into Forma elements.
//!
//! The crate exposes a small axum service: an inbound GLB body is validated, an APS bearer token is
//! obtained through the client-credentials grant, and the model is submitted to the Forma Integrate
//! API as an external `mass` element. The caller receives the element URN together with a Forma
//! deep link.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod relay;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{ClientCredentials, ScopeSet},
		config::{PayloadLimits, RelayConfig, RelayEndpoints},
		http::ReqwestHttpClient,
		relay::Relay,
	};

	/// Client identifier seeded into [`test_config`].
	pub const TEST_CLIENT_ID: &str = "relay-client";
	/// Client secret seeded into [`test_config`].
	pub const TEST_CLIENT_SECRET: &str = "relay-secret";

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> Result<ReqwestHttpClient> {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.map_err(crate::error::ConfigError::from)?;

		Ok(ReqwestHttpClient::with_client(client))
	}

	/// Relay configuration whose token and Integrate endpoints live under `base`.
	pub fn test_config(base: &str) -> Result<RelayConfig> {
		let base = base.trim_end_matches('/');
		let parse = |key: &'static str, value: String| {
			Url::parse(&value).map_err(|source| crate::error::ConfigError::InvalidUrl { key, source })
		};

		Ok(RelayConfig {
			credentials: Some(ClientCredentials::new(TEST_CLIENT_ID, TEST_CLIENT_SECRET)),
			scope: ScopeSet::default_aps(),
			port: 0,
			endpoints: RelayEndpoints {
				token: parse("APS_TOKEN_URL", format!("{base}/authentication/v2/token"))?,
				integrate: parse("FORMA_INTEGRATE_URL", format!("{base}/forma/integrate/v1"))?,
				link: parse(
					"FORMA_LINK_URL",
					crate::config::DEFAULT_FORMA_LINK_URL.to_owned(),
				)?,
			},
			limits: PayloadLimits::default(),
		})
	}

	/// Wraps `config` in a [`Relay`] backed by [`test_reqwest_http_client`].
	pub fn test_relay(config: RelayConfig) -> Result<Arc<Relay>> {
		let http_client = test_reqwest_http_client()?;

		Ok(Arc::new(Relay::with_http_client(Arc::new(config), http_client)))
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Date, Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;

// Installed by the `forma-relay` binary.
use color_eyre as _;
#[cfg(test)]
use {httpmock as _, tower as _};
