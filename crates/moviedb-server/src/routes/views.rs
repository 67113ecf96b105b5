//! View routes
//!
//! `GET /movies`, `GET /cast` and `GET /crew` share one handler shape:
//! `column=value` filters, repeatable `projection`, optional `limit`.

use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::Value;

use crate::catalog::{View, ViewQuery};
use crate::error::AppResult;
use crate::AppState;

type Params = Query<Vec<(String, String)>>;

/// GET /movies?title=Heat&projection=id&projection=release_date
pub async fn get_movies(State(state): State<AppState>, Query(params): Params) -> AppResult<Json<Value>> {
    query_view(&state, View::Movies, params).await
}

/// GET /cast?movie_id=862&gender=Male
pub async fn get_cast(State(state): State<AppState>, Query(params): Params) -> AppResult<Json<Value>> {
    query_view(&state, View::Cast, params).await
}

/// GET /crew?job=Director&limit=10
pub async fn get_crew(State(state): State<AppState>, Query(params): Params) -> AppResult<Json<Value>> {
    query_view(&state, View::Crew, params).await
}

async fn query_view(state: &AppState, view: View, params: Vec<(String, String)>) -> AppResult<Json<Value>> {
    let query = ViewQuery::from_params(params, state.default_limit)?;
    let allowed = state.columns.columns(&state.db, view).await?;
    query.validate(allowed)?;

    let rows: Value = query
        .to_sql(view)
        .build_query_scalar()
        .fetch_one(&state.db)
        .await?;

    Ok(Json(rows))
}
