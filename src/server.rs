//! HTTP surface of the relay: health check, provider callback, and direct exchange.
//!
//! The callback route always answers with a redirect because its caller is a browser
//! navigation; the direct exchange route is a normal JSON API and reports structured
//! errors with appropriate status codes instead.

// crates.io
use axum::{
	Json, Router,
	extract::{Query, State, rejection::JsonRejection},
	http::{HeaderValue, Method, StatusCode, header},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use tower_http::cors::CorsLayer;
// self
use crate::{
	_prelude::*,
	auth::IdentityProfile,
	obs::FlowKind,
	relay::CallbackRelay,
	wire,
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
	/// Relay orchestrator; read-only configuration, shared across requests.
	pub relay: Arc<CallbackRelay>,
}

/// Builds the relay router with CORS restricted to the configured frontend origin.
pub fn router(relay: Arc<CallbackRelay>) -> Router {
	let cors = cors_layer(relay.frontend());

	Router::new()
		.route("/health", get(health))
		.route("/api/auth/github/callback", get(github_callback))
		.route("/api/auth/github/user", post(github_user))
		.fallback(not_found)
		.layer(cors)
		.with_state(AppState { relay })
}

fn cors_layer(frontend: &Url) -> CorsLayer {
	let layer = CorsLayer::new()
		.allow_methods([Method::GET, Method::POST])
		.allow_headers([header::CONTENT_TYPE])
		.allow_credentials(true);

	match HeaderValue::from_str(&frontend.origin().ascii_serialization()) {
		Ok(origin) => layer.allow_origin(origin),
		Err(_) => layer,
	}
}

#[derive(Serialize)]
struct HealthReply {
	status: &'static str,
	message: &'static str,
	#[serde(with = "time::serde::rfc3339")]
	timestamp: OffsetDateTime,
}

async fn health() -> Json<HealthReply> {
	Json(HealthReply {
		status: "ok",
		message: "GitHub OAuth relay is running.",
		timestamp: OffsetDateTime::now_utc(),
	})
}

#[derive(Deserialize)]
struct CallbackQuery {
	code: Option<String>,
	state: Option<String>,
}

// The contract here is "always redirects": every failure path converges on a redirect
// carrying an encoded outcome, never a raw error body.
async fn github_callback(
	State(state): State<AppState>,
	Query(query): Query<CallbackQuery>,
) -> Response {
	let location =
		state.relay.handle_callback(query.code.as_deref(), query.state.as_deref()).await;

	(StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

#[derive(Deserialize)]
struct DirectExchangeRequest {
	code: Option<String>,
}

#[derive(Serialize)]
struct DirectExchangeReply {
	success: bool,
	user: IdentityProfile,
}

#[derive(Serialize)]
struct ApiError {
	error: String,
	message: String,
}

async fn github_user(
	State(state): State<AppState>,
	body: Result<Json<DirectExchangeRequest>, JsonRejection>,
) -> Response {
	let Ok(Json(request)) = body else {
		return api_error(
			StatusCode::BAD_REQUEST,
			wire::ERROR_MISSING_CODE,
			"Request body must be JSON with an authorization code.",
		);
	};
	let Some(code) = request.code.filter(|value| !value.is_empty()) else {
		return api_error(
			StatusCode::BAD_REQUEST,
			wire::ERROR_MISSING_CODE,
			"Missing authorization code.",
		);
	};

	match state.relay.resolve_profile(FlowKind::DirectExchange, &code).await {
		Ok(user) =>
			(StatusCode::OK, Json(DirectExchangeReply { success: true, user })).into_response(),
		Err(err) => {
			tracing::error!(error = %err, "Direct exchange failed.");

			api_error(error_status(&err), error_code(&err), &err.to_string())
		},
	}
}

async fn not_found() -> Response {
	api_error(StatusCode::NOT_FOUND, "not_found", "Route not found.")
}

fn api_error(status: StatusCode, error: &str, message: &str) -> Response {
	(status, Json(ApiError { error: error.into(), message: message.into() })).into_response()
}

fn error_status(err: &Error) -> StatusCode {
	match err {
		Error::MissingCode | Error::TokenExchange { .. } => StatusCode::BAD_REQUEST,
		_ => StatusCode::INTERNAL_SERVER_ERROR,
	}
}

fn error_code(err: &Error) -> &'static str {
	match err {
		Error::MissingCode => wire::ERROR_MISSING_CODE,
		Error::TokenExchange { .. } => wire::ERROR_TOKEN_EXCHANGE_FAILED,
		_ => wire::ERROR_OAUTH_FAILED,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::TransportError;

	#[test]
	fn error_mapping_matches_the_api_contract() {
		assert_eq!(error_status(&Error::MissingCode), StatusCode::BAD_REQUEST);
		assert_eq!(
			error_status(&Error::TokenExchange { reason: "bad code".into() }),
			StatusCode::BAD_REQUEST,
		);
		assert_eq!(
			error_status(&Error::ProfileFetch { status: Some(500), reason: "boom".into() }),
			StatusCode::INTERNAL_SERVER_ERROR,
		);
		assert_eq!(
			error_status(&Error::Transport(TransportError::Io(std::io::Error::other("io")))),
			StatusCode::INTERNAL_SERVER_ERROR,
		);
		assert_eq!(error_code(&Error::MissingCode), wire::ERROR_MISSING_CODE);
		assert_eq!(
			error_code(&Error::TokenExchange { reason: "bad code".into() }),
			wire::ERROR_TOKEN_EXCHANGE_FAILED,
		);
	}
}
