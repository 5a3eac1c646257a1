//! HTTP surface: liveness, token probe, and the GLB upload route.

pub mod response;

pub use response::*;

// crates.io
use axum::{
	Json, Router,
	body::Bytes,
	extract::{DefaultBodyLimit, Query, State, rejection::BytesRejection},
	http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
	routing::{get, post},
};
// self
use crate::{
	_prelude::*,
	error::ValidationError,
	relay::{Relay, UploadRequest},
};

/// Media type accepted for raw GLB bodies.
pub const GLB_CONTENT_TYPE: &str = "application/octet-stream";

/// Query string of `POST /kl-massing`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadQuery {
	/// Target Forma project.
	pub project_id: Option<String>,
	/// Optional element display name.
	pub name: Option<String>,
}

/// Builds the relay router with `relay` as shared state.
pub fn router(relay: Arc<Relay>) -> Router {
	let body_limit = relay.config().limits.body_limit_bytes;

	Router::new()
		.route("/", get(liveness))
		.route("/aps-token", get(aps_token))
		.route("/kl-massing", post(kl_massing))
		.layer(DefaultBodyLimit::max(body_limit))
		.with_state(relay)
}

async fn liveness() -> Json<StatusBody> {
	Json(StatusBody::ok("KL Massing relay is running"))
}

async fn aps_token(State(relay): State<Arc<Relay>>) -> Result<Json<TokenProbeBody>, ApiError> {
	match relay.tokens().fetch_token().await {
		Ok(token) => Ok(Json(TokenProbeBody {
			status: STATUS_OK,
			message: "APS token acquired".into(),
			token_length: token.len(),
		})),
		Err(e) => {
			tracing::error!(error = %e, "APS token probe failed.");

			Err(ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::new(e.to_string())))
		},
	}
}

async fn kl_massing(
	State(relay): State<Arc<Relay>>,
	query: Option<Query<UploadQuery>>,
	headers: HeaderMap,
	body: Result<Bytes, BytesRejection>,
) -> Result<Json<UploadBody>, ApiError> {
	let query = query.map(|Query(query)| query).unwrap_or_default();
	let body = match body {
		Ok(body) if is_octet_stream(&headers) => body,
		Ok(_) => return Err(Error::from(ValidationError::EmptyPayload).into()),
		Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
			let limit = relay.config().limits.max_glb_bytes;

			tracing::warn!(rejection = %rejection, "Rejected body above the transport limit.");

			return Err(Error::from(ValidationError::PayloadTooLarge { limit }).into());
		},
		Err(rejection) => {
			tracing::warn!(rejection = %rejection, "Unreadable upload body.");

			return Err(Error::from(ValidationError::EmptyPayload).into());
		},
	};
	let request = UploadRequest {
		project_id: query.project_id.as_deref(),
		name: query.name.as_deref(),
		payload: &body,
	};
	let outcome = relay.upload(request).await.map_err(|e| {
		tracing::error!(error = %e, "Upload to Forma failed.");

		ApiError::from(e)
	})?;

	Ok(Json(UploadBody::from(outcome)))
}

/// Resolves on Ctrl-C; stays pending when the signal handler cannot be installed.
pub async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %e, "Failed to listen for shutdown signal.");

		std::future::pending::<()>().await;
	}

	tracing::info!("Shutting down.");
}

fn is_octet_stream(headers: &HeaderMap) -> bool {
	headers
		.get(CONTENT_TYPE)
		.and_then(|value| value.to_str().ok())
		.and_then(|value| value.split(';').next())
		.is_some_and(|essence| essence.trim().eq_ignore_ascii_case(GLB_CONTENT_TYPE))
}
