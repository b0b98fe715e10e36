//! Integration tests for identity rejection, the error envelope, and
//! general HTTP behaviour through the full middleware stack.

mod common;

use assert_matches::assert_matches;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, build_test_app, get};
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Test: unknown route returns 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let response = get(build_test_app(), "/this-route-does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: x-request-id header is present in response
// ---------------------------------------------------------------------------

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let response = get(build_test_app(), "/this-route-does-not-exist").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");

    // The value should be a valid UUID (36 chars with hyphens).
    let id_str = request_id.to_str().unwrap();
    assert_eq!(id_str.len(), 36, "x-request-id should be a UUID string");
}

// ---------------------------------------------------------------------------
// Test: missing X-User-Id header yields 401 with the error envelope
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_identity_header_is_unauthorized() {
    let response = get(build_test_app(), "/api/v1/dashboard/stats").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Rejections use the same envelope as handler errors: success is
    // false, error carries the message, data is absent.
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_matches!(json["error"].as_str(), Some(msg) if msg.contains("X-User-Id"));
    assert!(json.get("data").is_none());
}

// ---------------------------------------------------------------------------
// Test: non-numeric X-User-Id header yields 401
// ---------------------------------------------------------------------------

#[tokio::test]
async fn malformed_identity_header_is_unauthorized() {
    let request = Request::builder()
        .uri("/api/v1/dashboard/stats")
        .header("x-user-id", "not-a-number")
        .body(Body::empty())
        .unwrap();
    let response = build_test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Test: admin routes reject anonymous callers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn admin_routes_require_identity() {
    let response = get(build_test_app(), "/api/v1/admin/users").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Test: generate rejects anonymous callers before reading the body
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generate_requires_identity() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/generate")
        .header("content-type", "application/json")
        .body(Body::empty())
        .unwrap();
    let response = build_test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Test: CORS preflight OPTIONS request returns correct headers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cors_preflight_returns_correct_headers() {
    // CORS preflight requires custom headers, so we build the request manually.
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/generate")
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .body(Body::empty())
        .unwrap();
    let response = build_test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();

    // Access-Control-Allow-Origin must match the request origin.
    let allow_origin = headers
        .get("access-control-allow-origin")
        .expect("Missing Access-Control-Allow-Origin header")
        .to_str()
        .unwrap();
    assert_eq!(allow_origin, "http://localhost:5173");

    // Access-Control-Allow-Methods must include POST.
    let allow_methods = headers
        .get("access-control-allow-methods")
        .expect("Missing Access-Control-Allow-Methods header")
        .to_str()
        .unwrap();
    assert!(
        allow_methods.contains("POST"),
        "Allow-Methods should contain POST, got: {allow_methods}"
    );
}
