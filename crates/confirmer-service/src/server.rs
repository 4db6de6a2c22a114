//! HTTP server for the confirmation API.
//!
//! This module provides a minimal HTTP server exposing the
//! confirmation poller to its browser consumers. Both the donation
//! verification form and the dashboard widget call the same /api/verify
//! endpoint rather than carrying their own polling logic.

use axum::{
	extract::State,
	http::{header, HeaderMap, StatusCode},
	response::{IntoResponse, Json, Response},
	routing::{get, post},
	Router,
};
use confirmer_client::implementations::hiro::HiroClient;
use confirmer_config::Config;
use confirmer_core::{ConfirmError, Confirmation, ConfirmationPoller};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// The one confirmation poller every consumer goes through.
	pub poller: Arc<ConfirmationPoller<HiroClient>>,
	/// Shared-secret bearer token; requests are open when unset.
	pub auth_token: Option<String>,
}

/// Body of a verification request.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
	/// Transaction id supplied by the donor or dashboard user.
	#[serde(rename = "txId")]
	pub tx_id: String,
}

/// Body of a successful verification response.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
	/// Echo of the submitted transaction id.
	#[serde(rename = "txId")]
	pub tx_id: String,
	/// Terminal outcome: "confirmed" or "benign_abort".
	pub outcome: &'static str,
	/// Abort reason, present only for benign aborts.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reason: Option<String>,
}

/// API error response envelope.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
	/// Error type/code.
	pub error: String,
	/// Human-readable description.
	pub message: String,
}

/// Starts the HTTP server for the confirmation API.
pub async fn start_server(
	config: Config,
	poller: Arc<ConfirmationPoller<HiroClient>>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app_state = AppState {
		poller,
		auth_token: config.api.auth_token.clone(),
	};

	// The browser consumers live on other origins
	let app = Router::new()
		.nest(
			"/api",
			Router::new()
				.route("/verify", post(handle_verify))
				.route("/health", get(handle_health)),
		)
		.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
		.with_state(app_state);

	let bind_address = format!("{}:{}", config.api.host, config.api.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Confirmer API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

/// Handles GET /api/health requests.
async fn handle_health() -> impl IntoResponse {
	Json(serde_json::json!({ "status": "ok" }))
}

/// Handles POST /api/verify requests.
///
/// Runs the confirmation poller for the submitted transaction id and
/// maps the outcome onto the response the UI consumers render from:
/// confirmed, benign abort with its reason, or a failure with kind and
/// message.
async fn handle_verify(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(request): Json<VerifyRequest>,
) -> Response {
	if let Some(expected) = &state.auth_token {
		if !bearer_matches(&headers, expected) {
			return error_response(
				StatusCode::UNAUTHORIZED,
				"unauthorized",
				"Missing or invalid bearer token",
			);
		}
	}

	match state.poller.confirm(&request.tx_id).await {
		Ok(Confirmation::Confirmed) => (
			StatusCode::OK,
			Json(VerifyResponse {
				tx_id: request.tx_id,
				outcome: "confirmed",
				reason: None,
			}),
		)
			.into_response(),
		Ok(Confirmation::BenignAbort { reason }) => (
			StatusCode::OK,
			Json(VerifyResponse {
				tx_id: request.tx_id,
				outcome: "benign_abort",
				reason: Some(reason),
			}),
		)
			.into_response(),
		Err(error) => {
			tracing::warn!(tx_id = %request.tx_id, error = %error, "Verification failed");
			confirm_error_response(&error)
		},
	}
}

/// Maps a confirmation error onto an HTTP response.
fn confirm_error_response(error: &ConfirmError) -> Response {
	let (status, code) = match error {
		ConfirmError::InvalidTxId(_) => (StatusCode::BAD_REQUEST, "invalid_tx_id"),
		ConfirmError::Aborted { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "transaction_aborted"),
		ConfirmError::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "confirmation_timeout"),
		ConfirmError::Network(_)
		| ConfirmError::Api { .. }
		| ConfirmError::MalformedResponse(_) => (StatusCode::BAD_GATEWAY, "status_api_error"),
		ConfirmError::Cancelled => (StatusCode::INTERNAL_SERVER_ERROR, "cancelled"),
	};
	error_response(status, code, &error.to_string())
}

/// Builds a JSON error response.
fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
	(
		status,
		Json(ErrorResponse {
			error: code.to_string(),
			message: message.to_string(),
		}),
	)
		.into_response()
}

/// Checks the Authorization header against the configured shared secret.
fn bearer_matches(headers: &HeaderMap, expected: &str) -> bool {
	headers
		.get(header::AUTHORIZATION)
		.and_then(|value| value.to_str().ok())
		.and_then(|value| value.strip_prefix("Bearer "))
		.map(|token| token == expected)
		.unwrap_or(false)
}
