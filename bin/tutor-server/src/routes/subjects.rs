//! Tutoring subject listing.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::entities::SubjectStore;
use crate::error::ServerError;
use crate::schemas::subject::{SubjectResponse, SubjectsResponse};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_subjects), components(schemas(SubjectsResponse, SubjectResponse)))]
pub struct SubjectsApi;

/// Register subject routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/subjects", get(get_subjects))
}

/// List the available tutoring subjects (`GET /api/subjects`).
#[utoipa::path(
    get,
    path = "/api/subjects",
    tag = "subjects",
    responses(
        (status = 200, description = "All subjects", body = SubjectsResponse),
    )
)]
pub async fn get_subjects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SubjectsResponse>, ServerError> {
    let subjects = state.store.list_subjects().await?;
    Ok(Json(SubjectsResponse {
        subjects: subjects.iter().map(|s| s.to_response()).collect(),
    }))
}
