//! GLB upload pipeline: validate, authenticate, submit, and map the Integrate API reply.
//!
//! [`Relay::upload`] is a linear chain with one fail-fast branch per step:
//!
//! 1. reject empty payloads, then payloads above [`PayloadLimits::max_glb_bytes`](crate::config::PayloadLimits),
//!    then requests without a project identifier (no network traffic for any of these);
//! 2. fetch a fresh APS token;
//! 3. POST an [`ElementEnvelope`] to the project's element route;
//! 4. parse the reply as JSON, check the status, and extract the element URN.
//!
//! There is no compensation step. When Forma reports success without an identifier the element
//! may exist even though the caller sees an error, so retrying such a request can create a
//! duplicate.

pub mod envelope;
pub mod extract;
pub mod link;

pub use envelope::*;

// crates.io
use reqwest::header::CONTENT_TYPE;
// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	config::RelayConfig,
	error::{TransportError, UpstreamError, ValidationError},
	http::ReqwestHttpClient,
	oauth::TokenProvider,
	obs::{self, Stage},
};

/// Characters of a non-JSON reply kept for diagnostics.
pub const RAW_PREVIEW_CHARS: usize = 500;

const TARGET: &str = "element endpoint";

/// One inbound upload.
#[derive(Clone, Copy, Debug)]
pub struct UploadRequest<'a> {
	/// Target project; empty counts as missing.
	pub project_id: Option<&'a str>,
	/// Display name; empty falls back to [`link::default_name`].
	pub name: Option<&'a str>,
	/// Raw GLB bytes.
	pub payload: &'a [u8],
}

/// Result of a successful upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadOutcome {
	/// Project the element was created in.
	pub project_id: String,
	/// Identifier returned by the Integrate API.
	pub element_urn: String,
	/// Deep link opening the project with the element selected.
	pub forma_link: String,
	/// Name the element was created with.
	pub name: String,
}

/// Relays GLB uploads into Forma.
#[derive(Clone, Debug)]
pub struct Relay {
	config: Arc<RelayConfig>,
	http_client: ReqwestHttpClient,
	tokens: TokenProvider,
}
impl Relay {
	/// Creates a relay with the default redirect-free HTTP client.
	pub fn new(config: Arc<RelayConfig>) -> Result<Self> {
		let http_client = ReqwestHttpClient::new()?;

		Ok(Self::with_http_client(config, http_client))
	}

	/// Creates a relay that shares `http_client` between token and element calls.
	pub fn with_http_client(config: Arc<RelayConfig>, http_client: ReqwestHttpClient) -> Self {
		let tokens = TokenProvider::new(&config, http_client.clone());

		Self { config, http_client, tokens }
	}

	/// Configuration the relay was built from.
	pub fn config(&self) -> &RelayConfig {
		&self.config
	}

	/// Token provider used for every upload.
	pub fn tokens(&self) -> &TokenProvider {
		&self.tokens
	}

	/// Validates `request`, creates the element, and returns its identifier and deep link.
	pub async fn upload(&self, request: UploadRequest<'_>) -> Result<UploadOutcome> {
		let payload = request.payload;

		if payload.is_empty() {
			return Err(ValidationError::EmptyPayload.into());
		}

		let limit = self.config.limits.max_glb_bytes;

		if payload.len() > limit {
			tracing::warn!(bytes = payload.len(), limit, "Rejected oversized GLB.");

			return Err(ValidationError::PayloadTooLarge { limit }.into());
		}

		tracing::info!(bytes = payload.len(), "Received GLB.");

		let project_id = request
			.project_id
			.filter(|id| !id.is_empty())
			.ok_or(ValidationError::MissingProjectId)?;
		let name = match request.name.filter(|name| !name.is_empty()) {
			Some(name) => name.to_owned(),
			None => link::default_name(OffsetDateTime::now_utc().date()),
		};
		let token = self.tokens.fetch_token().await?;

		obs::observe(
			Stage::ElementCreate,
			"create_element",
			self.create_element(&token, project_id, name, payload),
		)
		.await
	}

	async fn create_element(
		&self,
		token: &AccessToken,
		project_id: &str,
		name: String,
		payload: &[u8],
	) -> Result<UploadOutcome> {
		let endpoint = link::elements_endpoint(&self.config.endpoints.integrate, project_id)?;
		let body = serde_json::to_vec(&ElementEnvelope::mass(name.clone(), payload))?;

		tracing::info!(
			project_id,
			name = name.as_str(),
			glb_size = payload.len(),
			"Uploading to Forma Integrate API."
		);

		let response = self
			.http_client
			.post(endpoint)
			.bearer_auth(token.bearer())
			.header(CONTENT_TYPE, "application/json")
			.body(body)
			.send()
			.await
			.map_err(|e| TransportError::network(TARGET, e))?;
		let status = response.status();
		let text = response.text().await.map_err(|e| TransportError::network(TARGET, e))?;
		let Ok(json) = serde_json::from_str::<Value>(&text) else {
			tracing::error!(status = status.as_u16(), "Forma returned non-JSON.");

			return Err(UpstreamError::NonJson {
				status: status.as_u16(),
				raw: preview(&text, RAW_PREVIEW_CHARS),
			}
			.into());
		};

		if !status.is_success() {
			tracing::error!(status = status.as_u16(), body = %json, "Forma Integrate API error.");

			return Err(
				UpstreamError::ElementApi { status: status.as_u16(), details: error_details(json) }
					.into(),
			);
		}

		let Some((rule, element_urn)) = extract::first_match(extract::ELEMENT_ID_RULES, &json)
		else {
			tracing::warn!(body = %json, "No URN in successful response.");

			return Err(UpstreamError::MissingIdentifier { raw: json }.into());
		};
		let element_urn = element_urn.to_owned();

		tracing::info!(element_urn = element_urn.as_str(), rule, "Forma element created.");

		let forma_link = link::element_link(&self.config.endpoints.link, project_id, &element_urn);

		Ok(UploadOutcome { project_id: project_id.to_owned(), element_urn, forma_link, name })
	}
}

/// The `errors` member of a failure body, or the whole body when that member is absent or falsy
/// (`null`, `false`, `0`, `""`).
pub fn error_details(body: Value) -> Value {
	let errors = body.get("errors").filter(|errors| is_truthy(errors)).cloned();

	errors.unwrap_or(body)
}

fn is_truthy(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::Bool(flag) => *flag,
		Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.),
		Value::String(text) => !text.is_empty(),
		Value::Array(_) | Value::Object(_) => true,
	}
}

/// Leading `max_chars` characters of `text`.
pub fn preview(text: &str, max_chars: usize) -> String {
	text.chars().take(max_chars).collect()
}
