mod common;

use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum_test::TestServer;
use shortlink::routes::api_router;

const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

fn server() -> TestServer {
    let (state, _) = common::create_memory_state();
    TestServer::new(api_router(state)).unwrap()
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = server();

    let response = server
        .get("/v1/health")
        .add_header(X_REQUEST_ID, HeaderValue::from_static("req-1234"))
        .await;

    response.assert_status_ok();
    assert_eq!(response.header(X_REQUEST_ID), "req-1234");
}

#[tokio::test]
async fn test_request_id_is_generated_when_missing() {
    let server = server();

    let first = server.get("/v1/unknown-code").await;
    let second = server.get("/v1/unknown-code").await;

    first.assert_status(StatusCode::NOT_FOUND);
    let first_id = first.header(X_REQUEST_ID);
    let second_id = second.header(X_REQUEST_ID);
    assert!(!first_id.is_empty());
    assert_ne!(first_id, second_id);
}

#[tokio::test]
async fn test_cors_preflight_for_shorten() {
    let server = server();

    let response = server
        .method(Method::OPTIONS, "/v1/shorten")
        .add_header(
            HeaderName::from_static("origin"),
            HeaderValue::from_static("https://app.example.com"),
        )
        .add_header(
            HeaderName::from_static("access-control-request-method"),
            HeaderValue::from_static("POST"),
        )
        .add_header(
            HeaderName::from_static("access-control-request-headers"),
            HeaderValue::from_static("authorization,content-type"),
        )
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("access-control-allow-origin"), "*");
    assert!(
        response
            .header("access-control-allow-methods")
            .to_str()
            .unwrap()
            .contains("POST")
    );
}
