//! moviedb read API
//!
//! HTTP service over the normalized movie catalog loaded by `moviedb-ingest`.
//!
//! - `GET /movies`, `GET /cast`, `GET /crew`: filtered reads of the `v_*`
//!   views. Any parameter other than `projection` and `limit` is an equality
//!   filter on a column of the view.
//! - `GET /movies/lookalike?id=N`: movies sharing genres, cast and crew with
//!   movie `N`, best match first.
//! - `GET /cast/multiRole`: actors credited with several characters in one
//!   movie, optionally for one gender.
//! - `GET /misc/bestProfitPerWorker?genre=G`: net revenue per credited cast
//!   and crew member.
//! - `GET /misc/loyalCrewMembers`: crew whose movies all share a single
//!   production company, optionally for given jobs.
//! - `GET /misc/genreDistribution?query=Q`: genre counts over a text search.
//! - `GET /health`: liveness with a database probe.
//!
//! Errors are returned as `{"error": {"message": ..., "status": ...}}`.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

use axum::Router;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;

pub mod catalog;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;

pub use config::Config;
pub use error::{AppError, AppResult};

use catalog::ColumnAllowList;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub columns: Arc<ColumnAllowList>,
    pub default_limit: i64,
}

impl AppState {
    pub fn new(db: PgPool, default_limit: i64) -> Self {
        Self {
            db,
            columns: Arc::new(ColumnAllowList::new()),
            default_limit,
        }
    }

    pub fn with_columns(mut self, columns: ColumnAllowList) -> Self {
        self.columns = Arc::new(columns);
        self
    }
}

/// Routes with the middleware stack applied
pub fn app(state: AppState, config: &Config) -> Router {
    routes::router(state)
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}
