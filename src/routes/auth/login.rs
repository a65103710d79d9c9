use super::Session;
use crate::{
    app_state::AppState,
    authentication::{validate_credentials, AuthError, Credentials},
    domain::UserEmail,
    error::ApiError,
    repo::UsersRepo,
    utils::{ApiJson, ApiResponse},
};
use anyhow::Context;
use axum::extract::State;
use secrecy::Secret;
use serde::Deserialize;

#[tracing::instrument(
    name = "Sign in",
    skip(app_state, payload),
    fields(user_email = %payload.email, user_id = tracing::field::Empty)
)]
pub(super) async fn login(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<LoginPayload>,
) -> Result<ApiResponse<Session>, ApiError> {
    let email = UserEmail::parse(payload.email).map_err(|_| invalid_credentials())?;

    let user_id = validate_credentials(
        &app_state.db_pool,
        Credentials {
            email,
            password: payload.password,
        },
    )
    .await
    .map_err(|e| match e {
        AuthError::InvalidCredentials(_) => invalid_credentials(),
        AuthError::UnexpectedError(e) => ApiError::Unexpected(e),
    })?;

    tracing::Span::current().record("user_id", tracing::field::display(user_id));

    let user = UsersRepo::find(&app_state.db_pool, user_id)
        .await?
        .context("Authenticated user vanished")?;
    let token = app_state
        .token_signer
        .issue(user_id)
        .context("Failed to issue access token")?;

    Ok(ApiResponse::ok(
        "User signed in successfully",
        Session { token, user },
    ))
}

#[derive(Deserialize)]
pub(super) struct LoginPayload {
    email: String,
    password: Secret<String>,
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Invalid email or password".into())
}
