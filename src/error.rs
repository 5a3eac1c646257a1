//! Relay-level error types shared by the token exchange, the upload pipeline, and the HTTP layer.

// self
use crate::_prelude::*;

/// Relay-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const MIB: usize = 1024 * 1024;

/// Canonical relay error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Inbound request rejected before any network call.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// APS or Forma answered, but not with something usable.
	#[error(transparent)]
	Upstream(#[from] UpstreamError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Element envelope could not be encoded as JSON.
	#[error("Element envelope could not be encoded.")]
	Encode(#[from] serde_json::Error),
}

/// Configuration failures raised while loading settings or preparing requests.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Client credentials are absent from the environment.
	#[error("APS_CLIENT_ID or APS_CLIENT_SECRET is not set.")]
	MissingCredentials,
	/// Settings sources could not be read or deserialized.
	#[error("Relay settings could not be loaded.")]
	Load(#[from] config::ConfigError),
	/// A configured endpoint is not a valid URL.
	#[error("Setting `{key}` is not a valid URL.")]
	InvalidUrl {
		/// Setting name.
		key: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A configured endpoint cannot carry path segments (for example `mailto:`).
	#[error("Setting `{key}` must be a hierarchical URL.")]
	UnsupportedUrl {
		/// Setting name.
		key: &'static str,
	},
	/// Scope override cannot be normalized.
	#[error("APS_SCOPES is invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Client-caused request problems. Display strings are returned to callers verbatim.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ValidationError {
	/// Body is missing, empty, or not sent as `application/octet-stream`.
	#[error("No valid GLB binary received")]
	EmptyPayload,
	/// The `projectId` query parameter is absent or empty.
	#[error("Missing required 'projectId' query parameter")]
	MissingProjectId,
	/// Body exceeds the configured GLB ceiling.
	#[error("GLB file too large (max ~{}MB)", megabytes(.limit))]
	PayloadTooLarge {
		/// Ceiling in bytes that was exceeded.
		limit: usize,
	},
}

/// Non-success or malformed answers from APS and Forma.
#[derive(Debug, ThisError)]
pub enum UpstreamError {
	/// Token endpoint answered with a non-success status.
	#[error("APS token request failed: {status} {status_text} - {body}")]
	TokenEndpoint {
		/// HTTP status code.
		status: u16,
		/// Canonical reason phrase for `status`.
		status_text: String,
		/// Raw response body.
		body: String,
	},
	/// Token endpoint responded with JSON that does not describe a token.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Token endpoint succeeded but no usable bearer token could be taken from it.
	#[error("Failed to obtain valid APS token: {reason}.")]
	TokenResponse {
		/// What was wrong with the response.
		reason: String,
	},
	/// Element endpoint body is not JSON.
	#[error("Forma returned invalid JSON")]
	NonJson {
		/// HTTP status code.
		status: u16,
		/// Leading portion of the body.
		raw: String,
	},
	/// Element endpoint answered with a non-success status.
	#[error("Forma Integrate API failed: {status}")]
	ElementApi {
		/// HTTP status code.
		status: u16,
		/// The body's `errors` member, or the whole body when absent.
		details: Value,
	},
	/// Element endpoint succeeded without any recognizable identifier.
	#[error("Element created but no URN returned")]
	MissingIdentifier {
		/// Full parsed body.
		raw: Value,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the {target}.")]
	Network {
		/// Which upstream was being called.
		target: &'static str,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the {target}.")]
	Io {
		/// Which upstream was being called.
		target: &'static str,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error raised while calling `target`.
	pub fn network(target: &'static str, src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { target, source: Box::new(src) }
	}

	/// Wraps an IO failure raised while calling `target`.
	pub fn io(target: &'static str, source: std::io::Error) -> Self {
		Self::Io { target, source }
	}
}

fn megabytes(bytes: &usize) -> usize {
	bytes.div_ceil(MIB)
}
