use crate::helpers::{json_body, TestApp};
use serde_json::json;

#[tokio::test]
async fn health_check_works() {
    // given
    let app = TestApp::spawn().await;

    // when
    let response = app.get_health_check().await;

    // then
    assert!(response.status().is_success());
    assert_eq!(response.content_length(), Some(0));
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    // given
    let app = TestApp::spawn().await;

    // when
    let response = app.get_health_check().await;

    // then
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn unknown_routes_return_404_with_an_error_body() {
    // given
    let app = TestApp::spawn().await;

    // when
    let response = app.get("/no-such-route", None).await;

    // then
    assert_eq!(response.status(), 404);
    assert_eq!(
        json_body(response).await,
        json!({ "success": false, "message": "Route not found" })
    );
}
