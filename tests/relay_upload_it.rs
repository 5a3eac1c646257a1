// crates.io
use httpmock::prelude::*;
// self
use forma_relay::{
	_preludet::*,
	error::{TransportError, UpstreamError, ValidationError},
	relay::{UploadRequest, link},
};

const TOKEN_PATH: &str = "/authentication/v2/token";
const ELEMENTS_PATH: &str = "/forma/integrate/v1/projects/abc123/elements";
const TOKEN_BODY: &str =
	"{\"access_token\":\"relay-token\",\"token_type\":\"Bearer\",\"expires_in\":3599}";

async fn mock_token(server: &MockServer) -> httpmock::Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await
}

async fn mock_elements<'a>(server: &'a MockServer, status: u16, body: &str) -> httpmock::Mock<'a> {
	server
		.mock_async(|when, then| {
			when.method(POST)
				.path(ELEMENTS_PATH)
				.header("authorization", "Bearer relay-token")
				.header("content-type", "application/json");
			then.status(status).header("content-type", "application/json").body(body);
		})
		.await
}

fn request<'a>(
	project_id: Option<&'a str>,
	name: Option<&'a str>,
	payload: &'a [u8],
) -> UploadRequest<'a> {
	UploadRequest { project_id, name, payload }
}

#[tokio::test]
async fn five_megabyte_upload_yields_urn_and_link() {
	let server = MockServer::start_async().await;
	let token = mock_token(&server).await;
	let elements = mock_elements(&server, 201, "{\"data\":{\"id\":\"urn:xyz\"}}").await;
	let relay = test_relay(test_config(&server.url("")).expect("Test configuration should build."))
		.expect("Test relay should build.");
	let payload = vec![0_u8; 5 * 1024 * 1024];
	let outcome = relay
		.upload(request(Some("abc123"), None, &payload))
		.await
		.expect("Upload should succeed.");

	assert_eq!(outcome.project_id, "abc123");
	assert_eq!(outcome.element_urn, "urn:xyz");
	assert_eq!(
		outcome.forma_link,
		"https://forma.autodesk.com/projects/abc123?selectedElement=urn:xyz"
	);
	assert_eq!(outcome.name, link::default_name(OffsetDateTime::now_utc().date()));

	token.assert_async().await;
	elements.assert_async().await;
}

#[tokio::test]
async fn every_identifier_shape_is_accepted() {
	let shapes = [
		("{\"data\":{\"id\":\"urn:primary\"}}", "urn:primary"),
		("{\"data\":{\"attributes\":{\"urn\":\"urn:nested\"}}}", "urn:nested"),
		("{\"urn\":\"urn:top\"}", "urn:top"),
	];

	for (body, expected) in shapes {
		let server = MockServer::start_async().await;
		let _token = mock_token(&server).await;
		let elements = mock_elements(&server, 200, body).await;
		let relay =
			test_relay(test_config(&server.url("")).expect("Test configuration should build."))
				.expect("Test relay should build.");
		let outcome = relay
			.upload(request(Some("abc123"), Some("Block A"), b"glTF"))
			.await
			.expect("Upload should succeed for every known shape.");

		assert_eq!(outcome.element_urn, expected);
		assert_eq!(outcome.name, "Block A");
		assert!(outcome.forma_link.contains("abc123"));
		assert!(outcome.forma_link.ends_with(expected));

		elements.assert_async().await;
	}
}

#[tokio::test]
async fn oversized_payload_fails_before_any_network_call() {
	let server = MockServer::start_async().await;
	let token = mock_token(&server).await;
	let mut config = test_config(&server.url("")).expect("Test configuration should build.");

	config.limits.max_glb_bytes = 16;

	let relay = test_relay(config).expect("Test relay should build.");
	let err = relay
		.upload(request(Some("abc123"), None, &[1_u8; 17]))
		.await
		.expect_err("Oversized payloads must be rejected.");

	assert!(matches!(err, Error::Validation(ValidationError::PayloadTooLarge { limit: 16 })));

	token.assert_calls_async(0).await;
}

#[tokio::test]
async fn empty_payload_and_missing_project_fail_before_any_network_call() {
	let server = MockServer::start_async().await;
	let token = mock_token(&server).await;
	let relay = test_relay(test_config(&server.url("")).expect("Test configuration should build."))
		.expect("Test relay should build.");
	let err = relay
		.upload(request(Some("abc123"), None, &[]))
		.await
		.expect_err("Empty payloads must be rejected.");

	assert!(matches!(err, Error::Validation(ValidationError::EmptyPayload)));

	for project_id in [None, Some("")] {
		let err = relay
			.upload(request(project_id, None, b"glTF"))
			.await
			.expect_err("Missing project identifiers must be rejected.");

		assert!(matches!(err, Error::Validation(ValidationError::MissingProjectId)));
	}

	token.assert_calls_async(0).await;
}

#[tokio::test]
async fn rejected_token_exchange_skips_element_creation() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_client\"}");
		})
		.await;
	let elements = mock_elements(&server, 201, "{\"data\":{\"id\":\"urn:never\"}}").await;
	let relay = test_relay(test_config(&server.url("")).expect("Test configuration should build."))
		.expect("Test relay should build.");
	let err = relay
		.upload(request(Some("abc123"), None, b"glTF"))
		.await
		.expect_err("A rejected token exchange must fail the upload.");

	assert!(matches!(err, Error::Upstream(UpstreamError::TokenEndpoint { status: 401, .. })));

	token.assert_async().await;
	elements.assert_calls_async(0).await;
}

#[tokio::test]
async fn success_without_identifier_never_fabricates_one() {
	let server = MockServer::start_async().await;
	let _token = mock_token(&server).await;
	let elements = mock_elements(&server, 201, "{\"data\":{\"type\":\"elements\"}}").await;
	let relay = test_relay(test_config(&server.url("")).expect("Test configuration should build."))
		.expect("Test relay should build.");
	let err = relay
		.upload(request(Some("abc123"), None, b"glTF"))
		.await
		.expect_err("A body without identifiers must fail the upload.");

	match err {
		Error::Upstream(UpstreamError::MissingIdentifier { raw }) => {
			assert_eq!(raw["data"]["type"], "elements");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	elements.assert_async().await;
}

#[tokio::test]
async fn non_json_reply_is_truncated_for_diagnostics() {
	let server = MockServer::start_async().await;
	let _token = mock_token(&server).await;
	let html = format!("<html>{}</html>", "x".repeat(1_000));
	let elements = server
		.mock_async(|when, then| {
			when.method(POST).path(ELEMENTS_PATH);
			then.status(200).header("content-type", "text/html").body(html.clone());
		})
		.await;
	let relay = test_relay(test_config(&server.url("")).expect("Test configuration should build."))
		.expect("Test relay should build.");
	let err = relay
		.upload(request(Some("abc123"), None, b"glTF"))
		.await
		.expect_err("Non-JSON replies must fail the upload.");

	match err {
		Error::Upstream(UpstreamError::NonJson { status, raw }) => {
			assert_eq!(status, 200);
			assert_eq!(raw.chars().count(), 500);
			assert!(raw.starts_with("<html>"));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	elements.assert_async().await;
}

#[tokio::test]
async fn api_failure_surfaces_error_list() {
	let server = MockServer::start_async().await;
	let _token = mock_token(&server).await;
	let elements = mock_elements(
		&server,
		422,
		"{\"errors\":[{\"status\":\"422\",\"detail\":\"Representation too large\"}]}",
	)
	.await;
	let relay = test_relay(test_config(&server.url("")).expect("Test configuration should build."))
		.expect("Test relay should build.");
	let err = relay
		.upload(request(Some("abc123"), None, b"glTF"))
		.await
		.expect_err("A 422 from Forma must fail the upload.");

	match err {
		Error::Upstream(UpstreamError::ElementApi { status, details }) => {
			assert_eq!(status, 422);
			assert_eq!(details[0]["detail"], "Representation too large");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	elements.assert_async().await;
}

#[tokio::test]
async fn api_failure_without_error_list_returns_whole_body() {
	let server = MockServer::start_async().await;
	let _token = mock_token(&server).await;
	let _elements = mock_elements(&server, 403, "{\"message\":\"Forbidden\"}").await;
	let relay = test_relay(test_config(&server.url("")).expect("Test configuration should build."))
		.expect("Test relay should build.");
	let err = relay
		.upload(request(Some("abc123"), None, b"glTF"))
		.await
		.expect_err("A 403 from Forma must fail the upload.");

	match err {
		Error::Upstream(UpstreamError::ElementApi { status, details }) => {
			assert_eq!(status, 403);
			assert_eq!(details["message"], "Forbidden");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[tokio::test]
async fn unreachable_integrate_api_is_a_transport_error() {
	let server = MockServer::start_async().await;
	let _token = mock_token(&server).await;
	let mut config = test_config(&server.url("")).expect("Test configuration should build.");

	config.endpoints.integrate =
		Url::parse("http://127.0.0.1:9/forma/integrate/v1").expect("Failed to parse closed-port URL.");

	let relay = test_relay(config).expect("Test relay should build.");
	let err = relay
		.upload(request(Some("abc123"), None, b"glTF"))
		.await
		.expect_err("Connection failures must fail the upload.");

	assert!(matches!(err, Error::Transport(TransportError::Network { .. })));
}
