use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::catalog::{find_lookalikes, parse_limit};
use crate::error::{AppError, AppResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LookalikeParams {
    pub id: Option<String>,
    pub limit: Option<String>,
}

/// GET /movies/lookalike?id=862&limit=20
///
/// 400 without an `id`, 204 when nothing resembles the movie.
pub async fn get_lookalikes(
    State(state): State<AppState>,
    Query(params): Query<LookalikeParams>,
) -> AppResult<Response> {
    let raw_id = params
        .id
        .ok_or_else(|| AppError::BadRequest("id of movie was not given".to_string()))?;
    let movie_id: i64 = raw_id
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("id of movie must be an integer, got {raw_id:?}")))?;
    let limit = parse_limit(params.limit.as_deref(), state.default_limit)?;

    match find_lookalikes(&state.db, movie_id, limit).await? {
        Some(found) => Ok(Json(found).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}
