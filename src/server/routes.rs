use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use tracing::info;

use super::error::AppError;
use super::state::AppState;
use crate::domain::{CheckResponse, SubmitRequest, SubmitResponse};

/// `GET /api/check/:token`. A token without a record is a normal answer,
/// not an error.
pub async fn check_handler(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<CheckResponse>, AppError> {
    let lookup = state.with_store(move |store| store.exists(&token)).await?;
    Ok(Json(lookup.into()))
}

/// `POST /api/submit`. Stores the first submission for a token.
pub async fn submit_handler(
    State(state): State<AppState>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<Json<SubmitResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::MalformedPayload(e.body_text()))?;

    let record = state
        .with_store(move |store| store.insert(request.token.as_deref(), request.answers))
        .await?;
    info!(submitted_at = %record.submitted_at, "submission accepted");

    Ok(Json(SubmitResponse { success: true }))
}
