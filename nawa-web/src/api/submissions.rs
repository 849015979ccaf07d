//! Submission endpoints, generic over the submission kind
//!
//! Each handler is instantiated once per kind in the router, e.g.
//! `create_submission::<Contacts>`.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use nawa_common::db::{SubmissionKind, WorkshopInput, Workshops};
use nawa_common::validation::ValidationErrors;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Body of a bulk delete request
#[derive(Debug, Deserialize)]
pub struct DeleteIdsRequest {
    pub ids: Vec<i64>,
}

fn payload<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(input)| input)
        .map_err(|rejection| ApiError::Validation(ValidationErrors::single("body", rejection.body_text())))
}

fn created(id: i64) -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, Json(json!({ "success": true, "id": id })))
}

/// POST /api/{kind}
pub async fn create_submission<K: SubmissionKind>(
    State(state): State<AppState>,
    input: Result<Json<K::Input>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let input = payload(input)?;
    let record = state.registry.repository::<K>().create(&input).await?;
    Ok(created(K::record_id(&record)))
}

/// POST /api/workshop
///
/// Same as [`create_submission`], then mails a confirmation to the
/// registrant in the background. Mail failures never affect the response.
pub async fn create_workshop(
    State(state): State<AppState>,
    input: Result<Json<WorkshopInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let input = payload(input)?;
    let registration = state.registry.repository::<Workshops>().create(&input).await?;
    let id = registration.id;

    let mailer = state.mailer.clone();
    tokio::spawn(async move {
        mailer.send_workshop_confirmation(&registration).await;
    });

    Ok(created(id))
}

/// GET /api/{kind}
pub async fn list_submissions<K: SubmissionKind>(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<K::Record>>> {
    let records = state.registry.repository::<K>().list().await?;
    debug!("Listing {} {} record(s)", records.len(), K::TABLE.label());
    Ok(Json(records))
}

/// DELETE /api/{kind}/:id
pub async fn delete_submission<K: SubmissionKind>(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = id.map_err(|_| ApiError::BadRequest("id must be an integer".to_string()))?;

    if state.registry.repository::<K>().delete_by_id(id).await? {
        Ok(Json(json!({ "success": true })))
    } else {
        Err(ApiError::NotFound(format!("{} not found", K::TABLE.label())))
    }
}

/// DELETE /api/{kind} with body `{"ids": [...]}`
pub async fn delete_submissions<K: SubmissionKind>(
    State(state): State<AppState>,
    request: Result<Json<DeleteIdsRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = request.map_err(|rejection| {
        ApiError::BadRequest(format!("Expected a JSON body {{\"ids\": [...]}}: {}", rejection.body_text()))
    })?;

    let deleted = state.registry.repository::<K>().delete_by_ids(&request.ids).await?;
    Ok(Json(json!({ "success": true, "deleted": deleted })))
}
