//! HTTP layers shared by every route

use axum::http::{header, HeaderValue, Method};
use std::time::Duration;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::Level;

use crate::config::CorsConfig;

const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(60 * 60);

/// Origins from `config`; none configured (or a `*` entry) opens the API to all
fn allowed_origins(config: &CorsConfig) -> AllowOrigin {
    if config.allowed_origins.iter().all(|o| o != "*") && !config.allowed_origins.is_empty() {
        let parsed: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(%origin, "Ignoring malformed CORS origin");
                    None
                },
            })
            .collect();
        AllowOrigin::list(parsed)
    } else {
        AllowOrigin::any()
    }
}

pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(allowed_origins(config))
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
        .max_age(PREFLIGHT_MAX_AGE)
}

/// One span per request; 5xx responses are reported as failures
pub fn tracing_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::INFO).latency_unit(LatencyUnit::Millis))
        .on_failure(DefaultOnFailure::new().level(Level::ERROR))
}
