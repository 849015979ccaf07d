//! nawa-web library - HTTP surface and admin tooling for site submissions
//!
//! Public form endpoints create contact, newsletter and workshop records;
//! read, delete and developer endpoints sit behind static API keys.

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use chrono::{DateTime, Utc};
use nawa_common::config::Settings;
use nawa_common::db::Registry;
use sqlx::SqlitePool;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

pub mod admin;
pub mod api;
pub mod config;
pub mod email;
pub mod error;

pub use crate::error::{ApiError, ApiResult};
use crate::email::Mailer;

/// Static secrets gating the protected endpoints
#[derive(Clone, Default)]
pub struct ApiSecrets {
    /// Read, health and developer-utility endpoints
    pub developer: Option<String>,
    /// Destructive endpoints
    pub delete: Option<String>,
}

impl ApiSecrets {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            developer: settings.developer_api_key.clone(),
            delete: settings.delete_api_key.clone(),
        }
    }
}

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Repositories over the shared connection pool
    pub registry: Registry,
    pub secrets: ApiSecrets,
    pub mailer: Mailer,
    /// Directory holding the background image and other served assets
    pub assets_dir: PathBuf,
    /// Allowed browser origin; any origin when `None`
    pub cors_origin: Option<String>,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, secrets: ApiSecrets, mailer: Mailer, assets_dir: PathBuf) -> Self {
        Self {
            registry: Registry::new(db),
            secrets,
            mailer,
            assets_dir,
            cors_origin: None,
            startup_time: Utc::now(),
        }
    }

    pub fn with_cors_origin(mut self, origin: Option<String>) -> Self {
        self.cors_origin = origin;
        self
    }

    pub fn db(&self) -> &SqlitePool {
        self.registry.pool()
    }
}

/// Build application router
///
/// Route groups:
/// - public: form submissions
/// - read auth (`apiKey` = developer secret): listings, health, developer utilities
/// - delete auth (`apiKey` = delete secret): deletions
/// - bearer auth (`Authorization: Bearer` developer secret): admin summary
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{delete, get, post};
    use nawa_common::db::{Contacts, Newsletters, Workshops};

    let public = Router::new()
        .route("/api/contact", post(api::create_submission::<Contacts>))
        .route("/api/newsletter", post(api::create_submission::<Newsletters>))
        .route("/api/workshop", post(api::create_workshop));

    let read = Router::new()
        .route("/api/contact", get(api::list_submissions::<Contacts>))
        .route("/api/newsletter", get(api::list_submissions::<Newsletters>))
        .route("/api/workshop", get(api::list_submissions::<Workshops>))
        .route("/api/health", get(api::health_check))
        .route("/api/preview-email", get(api::preview_email))
        .route("/api/assets/nawa-background", get(api::background_image))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_read_auth,
        ));

    let destructive = Router::new()
        .route("/api/contact", delete(api::delete_submissions::<Contacts>))
        .route("/api/contact/:id", delete(api::delete_submission::<Contacts>))
        .route("/api/newsletter", delete(api::delete_submissions::<Newsletters>))
        .route("/api/newsletter/:id", delete(api::delete_submission::<Newsletters>))
        .route("/api/workshop", delete(api::delete_submissions::<Workshops>))
        .route("/api/workshop/:id", delete(api::delete_submission::<Workshops>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_delete_auth,
        ));

    let admin = Router::new()
        .route("/api/admin/counts", get(api::submission_counts))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_bearer_auth,
        ));

    let cors = cors_layer(state.cors_origin.as_deref());

    Router::new()
        .merge(public)
        .merge(read)
        .merge(destructive)
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    match origin.map(HeaderValue::from_str) {
        None => base.allow_origin(Any),
        Some(Ok(origin)) => base.allow_origin(origin),
        Some(Err(_)) => {
            warn!("Ignoring invalid CORS origin, allowing any origin");
            base.allow_origin(Any)
        }
    }
}
