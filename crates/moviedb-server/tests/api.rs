//! Request handling that fails before touching the database

mod common;

use axum::http::StatusCode;
use common::*;

#[tokio::test]
async fn test_lookalike_without_id_is_bad_request() {
    let app = offline_router();
    let (status, body) = get(&app, "/movies/lookalike").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "id of movie was not given");
    assert_eq!(body["error"]["status"], 400);
}

#[tokio::test]
async fn test_lookalike_with_non_numeric_id_is_bad_request() {
    let app = offline_router();
    let (status, _) = get(&app, "/movies/lookalike?id=toy-story").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_columns_are_named() {
    let app = offline_router();
    let (status, body) = get(&app, "/movies?colour=red&projection=title&projection=mood").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "following columns are not supported: colour, mood");
}

#[tokio::test]
async fn test_columns_are_checked_per_view() {
    let app = offline_router();

    // `job` belongs to the crew view only
    let (status, body) = get(&app, "/cast?job=Director").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("job"));
}

#[tokio::test]
async fn test_invalid_limit_is_bad_request() {
    let app = offline_router();
    let (status, _) = get(&app, "/crew?limit=lots").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_reports_unreachable_database() {
    let app = offline_router();
    let (status, body) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["status"], 503);
}

#[tokio::test]
async fn test_report_parameters_are_checked_first() {
    let app = offline_router();

    let (status, body) = get(&app, "/misc/bestProfitPerWorker").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "genre was not given");

    let (status, body) = get(&app, "/misc/genreDistribution?query=%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "no match query given");

    let (status, _) = get(&app, "/cast/multiRole?limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/misc/loyalCrewMembers?limit=many").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
