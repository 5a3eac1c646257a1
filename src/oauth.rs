//! APS client-credentials token exchange.
//!
//! [`TokenProvider`] is a stateless function of the relay configuration: every call performs a fresh
//! exchange against the token endpoint. Credentials travel in the URL-encoded form body
//! (`client_id`, `client_secret`) together with `grant_type=client_credentials` and the
//! space-delimited `scope`.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, ClientId, ClientSecret, EndpointNotSet, EndpointSet, HttpClientError,
	RequestTokenError, Scope, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicRequestTokenError},
};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ClientCredentials, ScopeSet, Secret},
	config::RelayConfig,
	error::{ConfigError, TransportError, UpstreamError},
	http::{ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot},
	obs::{self, Stage},
};

type ConfiguredBasicClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;
type FacadeTokenResponse = oauth2::basic::BasicTokenResponse;

const TARGET: &str = "token endpoint";

/// Obtains APS bearer tokens with the client-credentials grant.
#[derive(Clone, Debug)]
pub struct TokenProvider {
	http_client: ReqwestHttpClient,
	token_url: Url,
	credentials: Option<ClientCredentials>,
	scope: ScopeSet,
}
impl TokenProvider {
	/// Creates a provider for the configured endpoint, credentials, and scopes.
	pub fn new(config: &RelayConfig, http_client: ReqwestHttpClient) -> Self {
		Self {
			http_client,
			token_url: config.endpoints.token.clone(),
			credentials: config.credentials.clone(),
			scope: config.scope.clone(),
		}
	}

	/// Performs one exchange and returns the issued bearer token.
	///
	/// Fails with [`ConfigError::MissingCredentials`] before any network call when credentials
	/// are absent, and with [`UpstreamError::TokenEndpoint`] when the endpoint answers with a
	/// non-success status. Nothing is retried.
	pub async fn fetch_token(&self) -> Result<AccessToken> {
		obs::observe(Stage::TokenExchange, "fetch_token", self.exchange()).await
	}

	async fn exchange(&self) -> Result<AccessToken> {
		let credentials = self.credentials.as_ref().ok_or(ConfigError::MissingCredentials)?;
		let oauth_client = self.oauth_client(credentials)?;
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.instrumented(meta.clone());
		let mut request = oauth_client.exchange_client_credentials();

		for scope in self.scope.iter() {
			request = request.add_scope(Scope::new(scope.to_owned()));
		}

		let response = request
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(meta.take(), err))?;
		let token = map_token_response(response)?;

		tracing::info!(
			token_length = token.len(),
			expires_in = token.expires_in.map(|ttl| ttl.whole_seconds()),
			"Obtained APS access token."
		);

		Ok(token)
	}

	fn oauth_client(&self, credentials: &ClientCredentials) -> Result<ConfiguredBasicClient> {
		let token_url = TokenUrl::new(self.token_url.to_string())
			.map_err(|source| ConfigError::InvalidUrl { key: "APS_TOKEN_URL", source })?;

		Ok(BasicClient::new(ClientId::new(credentials.client_id.clone()))
			.set_client_secret(ClientSecret::new(credentials.client_secret.expose().to_owned()))
			.set_auth_type(AuthType::RequestBody)
			.set_token_uri(token_url))
	}
}

fn map_token_response(response: FacadeTokenResponse) -> Result<AccessToken> {
	let bearer = response.access_token().secret();

	if bearer.is_empty() {
		return Err(UpstreamError::TokenResponse { reason: "access_token is empty".into() }.into());
	}

	let expires_in = response
		.expires_in()
		.and_then(|ttl| i64::try_from(ttl.as_secs()).ok())
		.map(Duration::seconds);

	Ok(AccessToken { secret: Secret::new(bearer.to_owned()), expires_in })
}

fn map_request_error(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<ReqwestError>>,
) -> Error {
	if let Some(meta) = meta.filter(ResponseMetadata::is_failure) {
		tracing::error!(status = meta.status, "APS token request was rejected.");

		return UpstreamError::TokenEndpoint {
			status: meta.status.unwrap_or_default(),
			status_text: meta.status_text.unwrap_or_default(),
			body: meta.body.unwrap_or_default(),
		}
		.into();
	}

	match err {
		RequestTokenError::Request(error) => map_transport_error(error),
		RequestTokenError::Parse(source, _body) => UpstreamError::TokenResponseParse { source }.into(),
		RequestTokenError::ServerResponse(response) => UpstreamError::TokenResponse {
			reason: format!("token endpoint returned `{}`", response.error().as_ref()),
		}
		.into(),
		RequestTokenError::Other(message) => UpstreamError::TokenResponse { reason: message }.into(),
	}
}

fn map_transport_error(err: HttpClientError<ReqwestError>) -> Error {
	match err {
		HttpClientError::Reqwest(inner) => TransportError::network(TARGET, *inner).into(),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::io(TARGET, inner).into(),
		HttpClientError::Other(message) => UpstreamError::TokenResponse {
			reason: format!("HTTP client error occurred while calling the {TARGET}: {message}"),
		}
		.into(),
		_ => UpstreamError::TokenResponse {
			reason: format!("HTTP client error occurred while calling the {TARGET}"),
		}
		.into(),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::config::{PayloadLimits, RelayEndpoints};

	fn config(credentials: Option<ClientCredentials>) -> RelayConfig {
		let url = |value: &str| Url::parse(value).expect("Failed to parse test endpoint URL.");

		RelayConfig {
			credentials,
			scope: ScopeSet::default_aps(),
			port: 0,
			endpoints: RelayEndpoints {
				token: url("https://example.com/token"),
				integrate: url("https://example.com/integrate"),
				link: url("https://example.com/projects"),
			},
			limits: PayloadLimits::default(),
		}
	}

	#[tokio::test]
	async fn missing_credentials_fail_before_network() {
		let http_client = ReqwestHttpClient::new().expect("Failed to build default HTTP client.");
		let provider = TokenProvider::new(&config(None), http_client);
		let err = provider.fetch_token().await.expect_err("Missing credentials must fail.");

		assert!(matches!(err, Error::Config(ConfigError::MissingCredentials)));
	}

	#[test]
	fn rejected_status_wins_over_oauth_error_shape() {
		let meta = ResponseMetadata {
			status: Some(401),
			status_text: Some("Unauthorized".into()),
			body: Some("{\"developerMessage\":\"bad secret\"}".into()),
		};
		let err = map_request_error(
			Some(meta),
			RequestTokenError::Other("Unexpected response Content-Type".into()),
		);

		match err {
			Error::Upstream(UpstreamError::TokenEndpoint { status, status_text, body }) => {
				assert_eq!(status, 401);
				assert_eq!(status_text, "Unauthorized");
				assert_eq!(body, "{\"developerMessage\":\"bad secret\"}");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn successful_status_with_unusable_body_is_a_token_response_error() {
		let meta = ResponseMetadata { status: Some(200), ..Default::default() };
		let err = map_request_error(Some(meta), RequestTokenError::Other("no token".into()));

		assert!(matches!(err, Error::Upstream(UpstreamError::TokenResponse { .. })));
	}
}
