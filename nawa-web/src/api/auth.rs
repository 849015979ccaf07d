//! Authentication middleware for nawa-web
//!
//! Three variants, all comparing against a statically configured secret:
//! - `require_read_auth`: `apiKey` query parameter vs the developer secret
//! - `require_delete_auth`: `apiKey` query parameter vs the delete secret
//! - `require_bearer_auth`: `Authorization: Bearer` header vs the developer secret
//!
//! Missing credential → 401, secret not configured → 500, mismatch → 403.

use axum::{
    extract::{Query, Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use nawa_common::auth::{bearer_token, check_credential, AuthFailure};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

use crate::AppState;

#[derive(Debug, Deserialize)]
struct ApiKeyQuery {
    #[serde(rename = "apiKey")]
    api_key: Option<String>,
}

fn api_key(request: &Request) -> Option<String> {
    Query::<ApiKeyQuery>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(query)| query.api_key)
}

fn authorize(
    request: &Request,
    provided: Option<&str>,
    configured: Option<&str>,
    scope: &'static str,
) -> Result<(), AuthError> {
    check_credential(provided, configured).map_err(|failure| {
        match failure {
            AuthFailure::NotConfigured => error!(
                "{} secret not configured; refusing {} {}",
                scope,
                request.method(),
                request.uri().path()
            ),
            _ => warn!(
                "Rejected {} {} ({} auth): {}",
                request.method(),
                request.uri().path(),
                scope,
                failure
            ),
        }
        AuthError(failure)
    })
}

/// Query-parameter auth against the developer secret
pub async fn require_read_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let provided = api_key(&request);
    authorize(&request, provided.as_deref(), state.secrets.developer.as_deref(), "read")?;
    Ok(next.run(request).await)
}

/// Query-parameter auth against the delete secret
pub async fn require_delete_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let provided = api_key(&request);
    authorize(&request, provided.as_deref(), state.secrets.delete.as_deref(), "delete")?;
    Ok(next.run(request).await)
}

/// Bearer-header auth against the developer secret
pub async fn require_bearer_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let provided = bearer_token(header).map(str::to_string);
    authorize(&request, provided.as_deref(), state.secrets.developer.as_deref(), "bearer")?;
    Ok(next.run(request).await)
}

/// Authentication failure as an HTTP response
#[derive(Debug)]
pub struct AuthError(pub AuthFailure);

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            AuthFailure::Missing => StatusCode::UNAUTHORIZED,
            AuthFailure::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            AuthFailure::Mismatch => StatusCode::FORBIDDEN,
        };

        let body = Json(json!({
            "success": false,
            "error": self.0.to_string(),
        }));

        (status, body).into_response()
    }
}
