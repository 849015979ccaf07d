//! Static assets used by the site's email and landing templates

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::path::{Path, PathBuf};
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::{error, warn};

use crate::AppState;

const BACKGROUND_STEM: &str = "nawa-background";
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// First `nawa-background.<ext>` present in the assets directory
pub fn find_background(assets_dir: &Path) -> Option<PathBuf> {
    IMAGE_EXTENSIONS
        .iter()
        .map(|ext| assets_dir.join(format!("{}.{}", BACKGROUND_STEM, ext)))
        .find(|path| path.is_file())
}

/// GET /api/assets/nawa-background
pub async fn background_image(State(state): State<AppState>, request: Request<Body>) -> Response {
    let Some(path) = find_background(&state.assets_dir) else {
        warn!("Background image not found in {}", state.assets_dir.display());
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "error": "Background image not found" })),
        )
            .into_response();
    };

    match ServeFile::new(&path).oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(e) => {
            error!("Failed to serve {}: {}", path.display(), e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": "Internal server error" })),
            )
                .into_response()
        }
    }
}
