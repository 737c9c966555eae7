//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no server or
//! database is involved.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use autodash_api::error::AppError;
use autodash_core::catalog::QueryId;
use autodash_core::error::CoreError;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn validation_error_returns_400() {
    let err = AppError::Core(CoreError::Validation("start_date is not a valid date".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "start_date is not a valid date");
}

#[tokio::test]
async fn connection_error_returns_503_without_details() {
    let err = AppError::Core(CoreError::Connection(
        "password authentication failed for user \"dash\"".into(),
    ));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "CONNECTION_ERROR");
    assert_eq!(json["error"], "Could not connect to the database");
}

#[tokio::test]
async fn query_timeout_returns_502_naming_query() {
    let err = AppError::Core(CoreError::QueryTimeout {
        query: QueryId::MonthlySales,
        timeout_secs: 30,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "QUERY_ERROR");
    assert!(json["error"].as_str().unwrap().contains("monthly_sales"));
}

#[tokio::test]
async fn load_deadline_returns_502_naming_query() {
    let err = AppError::Core(CoreError::LoadDeadline {
        query: QueryId::ManufacturerRatings,
        budget_ms: 800,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "QUERY_ERROR");
    assert!(json["error"].as_str().unwrap().contains("manufacturer_ratings"));
}

#[tokio::test]
async fn render_error_returns_500() {
    let err = AppError::Core(CoreError::Render {
        query: QueryId::CategoryDistribution,
        message: "all amounts are zero".into(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "RENDER_ERROR");
}

#[tokio::test]
async fn internal_errors_are_sanitized() {
    let err = AppError::Core(CoreError::Internal("template exploded".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}
