//! Process-wide relay settings, loaded once at startup and shared read-only.
//!
//! Values come from an optional `forma-relay` settings file followed by the process environment
//! (later sources win). The environment keys keep the names the deployment already uses:
//! `APS_CLIENT_ID`, `APS_CLIENT_SECRET`, `APS_SCOPES`, `PORT`, plus endpoint and limit overrides.
//! Empty values count as unset.

// crates.io
use config::{Config, ConfigBuilder, Environment, File, Map, builder::DefaultState};
// self
use crate::{
	_prelude::*,
	auth::{ClientCredentials, ScopeSet},
	error::ConfigError,
};

/// APS two-legged token endpoint.
pub const DEFAULT_APS_TOKEN_URL: &str =
	"https://developer.api.autodesk.com/authentication/v2/token";
/// Forma Integrate API root; element routes hang off `/projects/{id}/elements`.
pub const DEFAULT_FORMA_INTEGRATE_URL: &str =
	"https://developer.api.autodesk.com/forma/integrate/v1";
/// Forma web application project route used for deep links.
pub const DEFAULT_FORMA_LINK_URL: &str = "https://forma.autodesk.com/projects";
/// Default listen port.
pub const DEFAULT_PORT: u16 = 4000;
/// Largest GLB the relay forwards; Forma itself stops at roughly 20 MB.
pub const DEFAULT_MAX_GLB_BYTES: usize = 18 * 1024 * 1024;
/// Largest request body the HTTP layer buffers.
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 20 * 1024 * 1024;

/// Upstream endpoints the relay talks to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayEndpoints {
	/// OAuth 2.0 token endpoint for the client-credentials grant.
	pub token: Url,
	/// Forma Integrate API root.
	pub integrate: Url,
	/// Forma project route used to compose deep links.
	pub link: Url,
}

/// Size ceilings applied to inbound GLB bodies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PayloadLimits {
	/// Relay-level ceiling; larger payloads are rejected before any network call.
	pub max_glb_bytes: usize,
	/// Transport-level ceiling for buffering a request body.
	pub body_limit_bytes: usize,
}
impl Default for PayloadLimits {
	fn default() -> Self {
		Self { max_glb_bytes: DEFAULT_MAX_GLB_BYTES, body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES }
	}
}

/// Immutable relay configuration.
#[derive(Clone, Debug)]
pub struct RelayConfig {
	/// APS credentials; `None` when either half is missing, which fails token fetches only.
	pub credentials: Option<ClientCredentials>,
	/// Scopes requested on every token exchange.
	pub scope: ScopeSet,
	/// TCP port the HTTP server binds on all interfaces.
	pub port: u16,
	/// Upstream endpoints.
	pub endpoints: RelayEndpoints,
	/// Payload ceilings.
	pub limits: PayloadLimits,
}
impl RelayConfig {
	/// Loads settings from `forma-relay.{toml,json,yaml,...}` (optional) and the environment.
	pub fn load() -> Result<Self> {
		let builder = Config::builder()
			.add_source(File::with_name("forma-relay").required(false))
			.add_source(Environment::default());

		Self::from_builder(builder)
	}

	/// Loads settings from an explicit variable map instead of the process environment.
	pub fn from_env_map(vars: Map<String, String>) -> Result<Self> {
		Self::from_builder(Config::builder().add_source(Environment::default().source(Some(vars))))
	}

	fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
		let raw: RawSettings =
			builder.build().map_err(ConfigError::from)?.try_deserialize().map_err(ConfigError::from)?;

		raw.resolve()
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSettings {
	aps_client_id: Option<String>,
	aps_client_secret: Option<String>,
	aps_scopes: Option<String>,
	aps_token_url: Option<String>,
	forma_integrate_url: Option<String>,
	forma_link_url: Option<String>,
	port: Option<u16>,
	max_glb_bytes: Option<usize>,
	body_limit_bytes: Option<usize>,
}
impl RawSettings {
	fn resolve(self) -> Result<RelayConfig> {
		let credentials = match (non_empty(self.aps_client_id), non_empty(self.aps_client_secret)) {
			(Some(id), Some(secret)) => Some(ClientCredentials::new(id, secret)),
			_ => None,
		};
		let scope = match non_empty(self.aps_scopes) {
			Some(raw) if !raw.trim().is_empty() =>
				ScopeSet::from_str(&raw).map_err(ConfigError::from)?,
			_ => ScopeSet::default_aps(),
		};
		let endpoints = RelayEndpoints {
			token: parse_url("APS_TOKEN_URL", self.aps_token_url, DEFAULT_APS_TOKEN_URL)?,
			integrate: parse_url(
				"FORMA_INTEGRATE_URL",
				self.forma_integrate_url,
				DEFAULT_FORMA_INTEGRATE_URL,
			)?,
			link: parse_url("FORMA_LINK_URL", self.forma_link_url, DEFAULT_FORMA_LINK_URL)?,
		};
		let limits = PayloadLimits {
			max_glb_bytes: self.max_glb_bytes.unwrap_or(DEFAULT_MAX_GLB_BYTES),
			body_limit_bytes: self.body_limit_bytes.unwrap_or(DEFAULT_BODY_LIMIT_BYTES),
		};

		Ok(RelayConfig {
			credentials,
			scope,
			port: self.port.unwrap_or(DEFAULT_PORT),
			endpoints,
			limits,
		})
	}
}

fn non_empty(value: Option<String>) -> Option<String> {
	value.filter(|value| !value.is_empty())
}

fn parse_url(key: &'static str, value: Option<String>, default: &str) -> Result<Url> {
	let raw = non_empty(value);
	let raw = raw.as_deref().unwrap_or(default);

	Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { key, source }.into())
}
