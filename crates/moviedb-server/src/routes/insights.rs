//! Report routes
//!
//! `GET /cast/multiRole`, `GET /misc/bestProfitPerWorker`,
//! `GET /misc/loyalCrewMembers` and `GET /misc/genreDistribution`.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::catalog::{
    best_profit_per_worker, genre_distribution, loyal_crew_members, multi_role_actors, parse_limit,
    GenreShare, Lookup, LoyalCrewMember, LoyalCrewQuery, MultiRoleActor, ProfitPerWorker,
};
use crate::error::{AppError, AppResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MultiRoleParams {
    pub gender: Option<String>,
    pub limit: Option<String>,
}

/// GET /cast/multiRole?gender=Female&limit=20
pub async fn get_multi_role_actors(
    State(state): State<AppState>,
    Query(params): Query<MultiRoleParams>,
) -> AppResult<Json<Vec<MultiRoleActor>>> {
    let limit = parse_limit(params.limit.as_deref(), state.default_limit)?;
    let gender = params.gender.as_deref();

    if let Some(gender) = gender {
        let genders = Lookup::Gender.values(&state.db).await?;
        if !genders.iter().any(|known| known == gender) {
            return Err(AppError::BadRequest(format!(
                "invalid gender given. must be: {}",
                genders.join(", ")
            )));
        }
    }

    Ok(Json(multi_role_actors(&state.db, gender, limit).await?))
}

#[derive(Debug, Deserialize)]
pub struct ProfitParams {
    pub genre: Option<String>,
    pub limit: Option<String>,
}

/// GET /misc/bestProfitPerWorker?genre=Animation
pub async fn get_best_profit_per_worker(
    State(state): State<AppState>,
    Query(params): Query<ProfitParams>,
) -> AppResult<Json<Vec<ProfitPerWorker>>> {
    let genre = params
        .genre
        .ok_or_else(|| AppError::BadRequest("genre was not given".to_string()))?;
    let limit = parse_limit(params.limit.as_deref(), state.default_limit)?;

    if !Lookup::Genre.unknown(&state.db, std::slice::from_ref(&genre)).await?.is_empty() {
        return Err(AppError::BadRequest(format!("invalid genre given: {genre}")));
    }

    Ok(Json(best_profit_per_worker(&state.db, &genre, limit).await?))
}

/// GET /misc/loyalCrewMembers?job=Director&job=Screenplay
pub async fn get_loyal_crew_members(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> AppResult<Json<Vec<LoyalCrewMember>>> {
    let query = LoyalCrewQuery::from_params(params, state.default_limit)?;

    let unknown = Lookup::Job.unknown(&state.db, &query.jobs).await?;
    if !unknown.is_empty() {
        return Err(AppError::BadRequest(format!("invalid job given: {}", unknown.join(", "))));
    }

    Ok(Json(loyal_crew_members(&state.db, &query).await?))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

/// GET /misc/genreDistribution?query=toys%20-space
pub async fn get_genre_distribution(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<GenreShare>>> {
    let search = params
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("no match query given".to_string()))?;

    Ok(Json(genre_distribution(&state.db, &search).await?))
}
