//! HTTP routes

use axum::{routing::get, Router};

use crate::AppState;

mod health;
mod insights;
mod lookalike;
mod views;

/// Every route, without middleware
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/movies", get(views::get_movies))
        .route("/movies/lookalike", get(lookalike::get_lookalikes))
        .route("/cast", get(views::get_cast))
        .route("/cast/multiRole", get(insights::get_multi_role_actors))
        .route("/crew", get(views::get_crew))
        .route("/misc/bestProfitPerWorker", get(insights::get_best_profit_per_worker))
        .route("/misc/loyalCrewMembers", get(insights::get_loyal_crew_members))
        .route("/misc/genreDistribution", get(insights::get_genre_distribution))
        .with_state(state)
}
