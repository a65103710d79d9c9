use crate::helpers::{json_body, TestApp};
use serde_json::json;

#[tokio::test]
async fn register_returns_201_with_a_token_and_the_user() {
    // given
    let app = TestApp::spawn().await;
    let body = json!({
        "name": "Jane Doe",
        "email": "Jane.Doe@Example.com",
        "password": "correct horse",
    });

    // when
    let response = app.post_register(&body).await;

    // then
    assert_eq!(response.status(), 201);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "User created successfully");
    assert!(body["data"]["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["data"]["user"]["email"], "jane.doe@example.com");
    assert!(body["data"]["user"].get("password").is_none());
    assert!(body["data"]["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn register_stores_a_hashed_password() {
    // given
    let app = TestApp::spawn().await;
    let user = app.register_user().await;

    // when
    let (password_hash,): (String,) =
        sqlx::query_as("SELECT password_hash FROM users WHERE id = $1")
            .bind(user.id)
            .fetch_one(&app.db_pool)
            .await
            .expect("Failed to fetch saved user");

    // then
    assert_ne!(password_hash, user.password);
    assert!(password_hash.starts_with("$argon2id$"));
}

#[tokio::test]
async fn register_returns_409_for_a_taken_email() {
    // given
    let app = TestApp::spawn().await;
    let user = app.register_user().await;
    let body = json!({
        "name": "Someone Else",
        "email": user.email.to_uppercase(),
        "password": "another secret",
    });

    // when
    let response = app.post_register(&body).await;

    // then
    assert_eq!(response.status(), 409);
    assert_eq!(
        json_body(response).await,
        json!({ "success": false, "message": "User already exists with this email" })
    );
}

#[tokio::test]
async fn register_returns_400_for_invalid_data() {
    // given
    let app = TestApp::spawn().await;
    let test_cases = vec![
        (json!({ "email": "jane@example.com", "password": "secret1" }), "missing name"),
        (json!({ "name": "Jane Doe", "password": "secret1" }), "missing email"),
        (json!({ "name": "Jane Doe", "email": "jane@example.com" }), "missing password"),
        (
            json!({ "name": "Jane Doe", "email": "not-an-email", "password": "secret1" }),
            "invalid email",
        ),
        (
            json!({ "name": "Jo", "email": "jane@example.com", "password": "secret1" }),
            "name too short",
        ),
        (
            json!({ "name": "Jane Doe", "email": "jane@example.com", "password": "12345" }),
            "password too short",
        ),
    ];

    for (body, description) in test_cases {
        // when
        let response = app.post_register(&body).await;

        // then
        assert_eq!(
            response.status(),
            400,
            "The API did not fail with 400 Bad Request when the payload was {description}"
        );
        assert_eq!(json_body(response).await["success"], false);
    }
}

#[tokio::test]
async fn registration_is_rolled_back_when_no_token_can_be_issued() {
    // given
    let app = TestApp::spawn_with(|config| {
        config.application.token_expiry_seconds = i64::MAX;
    })
    .await;
    let body = json!({
        "name": "Jane Doe",
        "email": "jane@example.com",
        "password": "correct horse",
    });

    // when
    let response = app.post_register(&body).await;

    // then
    assert_eq!(response.status(), 500);
    let (users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(&app.db_pool)
        .await
        .expect("Failed to count users");
    assert_eq!(users, 0);
}

#[tokio::test]
async fn login_returns_a_token_for_valid_credentials() {
    // given
    let app = TestApp::spawn().await;
    let user = app.register_user().await;

    // when
    let response = app
        .post_login(&json!({ "email": user.email, "password": user.password }))
        .await;

    // then
    assert_eq!(response.status(), 200);
    let body = json_body(response).await;
    assert_eq!(body["message"], "User signed in successfully");
    assert_eq!(body["data"]["user"]["id"], user.id.to_string());

    let token = body["data"]["token"].as_str().unwrap();
    let response = app.get(&format!("/users/{}", user.id), Some(token)).await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn login_returns_401_for_unknown_email_or_wrong_password() {
    // given
    let app = TestApp::spawn().await;
    let user = app.register_user().await;
    let test_cases = vec![
        (json!({ "email": "nobody@example.com", "password": user.password }), "unknown email"),
        (json!({ "email": user.email, "password": "wrong password" }), "wrong password"),
    ];

    for (body, description) in test_cases {
        // when
        let response = app.post_login(&body).await;

        // then
        assert_eq!(response.status(), 401, "Login succeeded with {description}");
        assert_eq!(
            json_body(response).await,
            json!({ "success": false, "message": "Invalid email or password" })
        );
    }
}

#[tokio::test]
async fn logout_acknowledges_the_request() {
    // given
    let app = TestApp::spawn().await;

    // when
    let response = app.post("/auth/logout", &json!({}), None).await;

    // then
    assert_eq!(response.status(), 200);
    assert_eq!(
        json_body(response).await,
        json!({ "success": true, "message": "User signed out successfully" })
    );
}

#[tokio::test]
async fn protected_routes_reject_missing_or_forged_tokens() {
    // given
    let app = TestApp::spawn().await;
    let user = app.register_user().await;
    let endpoint = format!("/users/{}", user.id);
    let forged = format!("{}x", user.token);

    for token in [None, Some("garbage"), Some(forged.as_str())] {
        // when
        let response = app.get(&endpoint, token).await;

        // then
        assert_eq!(response.status(), 401);
        assert_eq!(json_body(response).await["success"], false);
    }
}

#[tokio::test]
async fn tokens_of_deleted_users_are_rejected() {
    // given
    let app = TestApp::spawn().await;
    let user = app.register_user().await;
    let endpoint = format!("/users/{}", user.id);
    let response = app.delete(&endpoint, Some(&user.token)).await;
    assert_eq!(response.status(), 200);

    // when
    let response = app.get(&endpoint, Some(&user.token)).await;

    // then
    assert_eq!(response.status(), 401);
}
