//! Admin summary endpoint

use axum::{extract::State, Json};
use serde_json::{Map, Value};

use crate::error::ApiResult;
use crate::AppState;

/// GET /api/admin/counts
///
/// `{"contacts": n, "newsletters": n, "workshops": n}`
pub async fn submission_counts(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let counts = state.registry.counts().await?;
    let body: Map<String, Value> = counts
        .into_iter()
        .map(|(table, count)| (table.as_str().to_string(), Value::from(count)))
        .collect();
    Ok(Json(Value::Object(body)))
}
