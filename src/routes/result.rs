use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::app_state::AppState;
use crate::models::job::JobId;
use crate::models::record::ResultRecord;
use crate::models::submission::NotFoundResponse;

/// GET /result/{id}: the completed record for a job.
pub async fn get_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ResultRecord>, (StatusCode, Json<NotFoundResponse>)> {
    let not_found = || (StatusCode::NOT_FOUND, Json(NotFoundResponse::new()));

    let id: JobId = id.parse().map_err(|_| not_found())?;

    state.results.load(&id).await.map(Json).ok_or_else(not_found)
}
