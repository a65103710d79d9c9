use super::Session;
use crate::{
    app_state::AppState,
    domain::NewUser,
    error::ApiError,
    routes::users::post::{insert_user, UserPayload},
    utils::{ApiJson, ApiResponse},
};
use anyhow::Context;
use axum::extract::State;

/// Creates the account and issues its first token as one unit: the user row
/// is committed only once the token exists.
#[tracing::instrument(
    name = "Register a new user",
    skip(app_state, payload),
    fields(user_email = %payload.email, user_id = tracing::field::Empty)
)]
pub(super) async fn register(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<UserPayload>,
) -> Result<ApiResponse<Session>, ApiError> {
    let new_user: NewUser = payload.try_into().map_err(ApiError::Validation)?;

    let mut transaction = app_state
        .db_pool
        .begin()
        .await
        .context("Failed to begin transaction")?;

    let user = insert_user(&mut transaction, new_user).await?;
    tracing::Span::current().record("user_id", tracing::field::display(user.id));

    let token = app_state
        .token_signer
        .issue(user.id)
        .context("Failed to issue access token")?;

    transaction
        .commit()
        .await
        .context("Failed to commit transaction")?;

    Ok(ApiResponse::created(
        "User created successfully",
        Session { token, user },
    ))
}
