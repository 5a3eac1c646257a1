//! JSON bodies returned by the relay and the mapping from [`Error`] to HTTP responses.

// crates.io
use axum::{
	Json,
	http::StatusCode,
	response::{IntoResponse, Response},
};
// self
use crate::{
	_prelude::*,
	error::{UpstreamError, ValidationError},
	relay::UploadOutcome,
};

/// `status` marker on successful bodies.
pub const STATUS_OK: &str = "ok";
/// `status` marker on failure bodies.
pub const STATUS_ERROR: &str = "error";

/// Plain `{status, message}` body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBody {
	/// `ok` or `error`.
	pub status: String,
	/// Human-readable message.
	pub message: String,
}
impl StatusBody {
	/// Successful body with `message`.
	pub fn ok(message: impl Into<String>) -> Self {
		Self { status: STATUS_OK.into(), message: message.into() }
	}
}

/// Body of `GET /aps-token`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenProbeBody {
	/// Always `ok`.
	pub status: &'static str,
	/// Human-readable message.
	pub message: String,
	/// Length of the issued bearer token; the token itself is never returned.
	pub token_length: usize,
}

/// Body of a successful `POST /kl-massing`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadBody {
	/// Always `ok`.
	pub status: &'static str,
	/// Human-readable message.
	pub message: String,
	/// Project the element was created in.
	pub project_id: String,
	/// Identifier returned by the Integrate API.
	pub element_urn: String,
	/// Deep link opening the project with the element selected.
	pub forma_link: String,
	/// Name the element was created with.
	pub name: String,
}
impl From<UploadOutcome> for UploadBody {
	fn from(outcome: UploadOutcome) -> Self {
		Self {
			status: STATUS_OK,
			message: "GLB successfully uploaded to Forma".into(),
			project_id: outcome.project_id,
			element_urn: outcome.element_urn,
			forma_link: outcome.forma_link,
			name: outcome.name,
		}
	}
}

/// Failure body: `{status:"error", message}` plus best-effort diagnostics.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ErrorBody {
	/// Always `error`.
	pub status: &'static str,
	/// Human-readable message.
	pub message: String,
	/// Structured upstream error list.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Value>,
	/// Raw upstream body (possibly truncated).
	#[serde(skip_serializing_if = "Option::is_none")]
	pub raw: Option<Value>,
}
impl ErrorBody {
	/// Failure body carrying only `message`.
	pub fn new(message: impl Into<String>) -> Self {
		Self { status: STATUS_ERROR, message: message.into(), details: None, raw: None }
	}
}

/// An HTTP status paired with an [`ErrorBody`].
#[derive(Clone, Debug)]
pub struct ApiError {
	/// Response status.
	pub status: StatusCode,
	/// Response body.
	pub body: ErrorBody,
}
impl ApiError {
	/// Pairs `status` with `body`.
	pub fn new(status: StatusCode, body: ErrorBody) -> Self {
		Self { status, body }
	}
}
impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		let message = err.to_string();
		let status = status_of(&err);
		let mut body = ErrorBody::new(message);

		match err {
			Error::Upstream(UpstreamError::NonJson { raw, .. }) => body.raw = Some(Value::String(raw)),
			Error::Upstream(UpstreamError::ElementApi { details, .. }) => body.details = Some(details),
			Error::Upstream(UpstreamError::MissingIdentifier { raw }) => body.raw = Some(raw),
			_ => (),
		}

		Self { status, body }
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		(self.status, Json(self.body)).into_response()
	}
}

/// HTTP status reported for `err`.
pub fn status_of(err: &Error) -> StatusCode {
	match err {
		Error::Validation(ValidationError::PayloadTooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
		Error::Validation(_) => StatusCode::BAD_REQUEST,
		Error::Upstream(UpstreamError::NonJson { .. } | UpstreamError::ElementApi { .. }) =>
			StatusCode::BAD_GATEWAY,
		Error::Transport(_) => StatusCode::BAD_GATEWAY,
		Error::Upstream(_) | Error::Config(_) | Error::Encode(_) =>
			StatusCode::INTERNAL_SERVER_ERROR,
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::error::ConfigError;

	#[test]
	fn validation_errors_are_client_errors() {
		assert_eq!(status_of(&ValidationError::EmptyPayload.into()), StatusCode::BAD_REQUEST);
		assert_eq!(status_of(&ValidationError::MissingProjectId.into()), StatusCode::BAD_REQUEST);
		assert_eq!(
			status_of(&ValidationError::PayloadTooLarge { limit: 1 }.into()),
			StatusCode::PAYLOAD_TOO_LARGE
		);
	}

	#[test]
	fn upstream_diagnostics_are_attached() {
		let err: Error =
			UpstreamError::ElementApi { status: 422, details: json!([{ "code": "invalid" }]) }.into();
		let api = ApiError::from(err);

		assert_eq!(api.status, StatusCode::BAD_GATEWAY);
		assert_eq!(api.body.message, "Forma Integrate API failed: 422");
		assert_eq!(api.body.details, Some(json!([{ "code": "invalid" }])));
		assert_eq!(api.body.raw, None);

		let err: Error = UpstreamError::MissingIdentifier { raw: json!({ "data": {} }) }.into();
		let api = ApiError::from(err);

		assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(api.body.raw, Some(json!({ "data": {} })));
	}

	#[test]
	fn missing_credentials_map_to_internal_error() {
		let api = ApiError::from(Error::from(ConfigError::MissingCredentials));

		assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(
			serde_json::to_value(&api.body).expect("Error body should serialize."),
			json!({ "status": "error", "message": "APS_CLIENT_ID or APS_CLIENT_SECRET is not set." })
		);
	}
}
