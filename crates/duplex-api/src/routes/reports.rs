use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;

use duplex_core::models::artifact::ArtifactKind;
use duplex_core::models::request::RequestId;
use duplex_orchestrator::service::NewReport;
use duplex_orchestrator::views::ReportView;

use crate::error::ApiError;
use crate::state::AppState;

/// Blocking submission: returns once both artifacts are terminal.
pub async fn submit_sync(
    State(state): State<AppState>,
    Json(new): Json<NewReport>,
) -> Result<Json<ReportView>, ApiError> {
    let view = state.service.submit_sync(new).await?;
    Ok(Json(view))
}

/// Fire-and-return submission: 202 with both artifacts pending.
pub async fn submit_async(
    State(state): State<AppState>,
    Json(new): Json<NewReport>,
) -> Result<(StatusCode, Json<ReportView>), ApiError> {
    let view = state.service.submit_async(new).await?;
    Ok((StatusCode::ACCEPTED, Json(view)))
}

pub async fn list_reports(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReportView>>, ApiError> {
    Ok(Json(state.service.list().await?))
}

/// Download a completed artifact's bytes with its kind's content type.
pub async fn download_file(
    State(state): State<AppState>,
    Path((id, kind)): Path<(String, ArtifactKind)>,
) -> Result<impl IntoResponse, ApiError> {
    let id = RequestId::from(id);
    let body = state.service.file_body(&id, kind).await?;
    Ok(([(header::CONTENT_TYPE, kind.content_type())], body))
}

pub async fn delete_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.service.delete(&RequestId::from(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
