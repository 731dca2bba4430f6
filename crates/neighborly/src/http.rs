//! HTTP API for neighborly.
//!
//! Exposes the proximity search over a small axum router. Every response
//! uses the `{success, data}` / `{success, error}` envelope the front end
//! consumes.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::auth::SessionAuth;
use crate::error::Error;
use crate::search::ProximityService;

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// The proximity search engine.
    pub service: Arc<ProximityService>,
    /// The session collaborator.
    pub auth: Arc<dyn SessionAuth>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

/// Successful response envelope.
#[derive(Debug, Serialize)]
struct ApiSuccess<T> {
    success: bool,
    data: T,
}

/// Failure response envelope.
#[derive(Debug, Serialize, Deserialize)]
struct ApiFailure {
    success: bool,
    error: String,
}

fn success<T: Serialize>(data: T) -> Response {
    (
        StatusCode::OK,
        Json(ApiSuccess {
            success: true,
            data,
        }),
    )
        .into_response()
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ApiFailure {
            success: false,
            error: message.into(),
        }),
    )
        .into_response()
}

/// Map an engine error onto the envelope and an HTTP status.
fn error_response(err: &Error) -> Response {
    if err.is_unauthorized() {
        return failure(StatusCode::UNAUTHORIZED, err.to_string());
    }
    error!(error = %err, "nearby request failed");
    failure(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

/// Query parameters for the nearby endpoint.
///
/// The radius arrives as a raw string so malformed values can fall back to
/// the default instead of failing extraction.
#[derive(Debug, Deserialize)]
struct NearbyParams {
    radius: Option<String>,
}

impl NearbyParams {
    /// Parse the radius permissively; anything unusable becomes `None` and
    /// the service substitutes the configured default.
    fn radius_miles(&self) -> Option<f64> {
        self.radius.as_deref().and_then(|s| s.trim().parse().ok())
    }
}

/// Extract the bearer token from the request headers.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// `GET /api/nearby?radius=<miles>`
async fn nearby(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<NearbyParams>,
) -> Response {
    let Some(token) = bearer_token(&headers) else {
        return failure(StatusCode::UNAUTHORIZED, Error::Unauthorized.to_string());
    };

    let actor = match state.auth.resolve(token).await {
        Ok(Some(actor)) => actor,
        Ok(None) => {
            return failure(StatusCode::UNAUTHORIZED, Error::Unauthorized.to_string());
        }
        Err(e) => return error_response(&e),
    };

    match state.service.find_nearby(actor, params.radius_miles()).await {
        Ok(response) => success(response),
        Err(e) => error_response(&e),
    }
}

/// `GET /health`
async fn health() -> Response {
    (StatusCode::OK, "ok").into_response()
}

/// Build the application router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/nearby", get(nearby))
        .route("/health", get(health))
        .with_state(state)
}

/// Serve the API on the given listener until the process is stopped.
///
/// # Errors
///
/// Returns an error if the server fails to start or terminates abnormally.
pub async fn serve(listener: tokio::net::TcpListener, state: AppState) -> crate::error::Result<()> {
    let addr = listener.local_addr()?;
    info!("listening on http://{addr}");
    axum::serve(listener, router(state))
        .await
        .map_err(crate::error::Error::Io)
}
