use super::{ensure_account_owner, post::email_conflict};
use crate::{
    app_state::AppState,
    authentication::{hash_password, AuthenticatedUserId},
    domain::{Password, User, UserEmail, UserName},
    error::ApiError,
    repo::{is_unique_violation, UserUpdate, UsersRepo},
    utils::{parse_id, ApiJson, ApiResponse},
};
use axum::extract::{Path, State};
use secrecy::Secret;
use serde::Deserialize;

#[tracing::instrument(name = "Update user", skip(app_state, caller, payload))]
pub(super) async fn update_user(
    State(app_state): State<AppState>,
    caller: AuthenticatedUserId,
    Path(user_id): Path<String>,
    ApiJson(payload): ApiJson<UpdateUserPayload>,
) -> Result<ApiResponse<User>, ApiError> {
    let user_id = parse_id(&user_id)?;
    ensure_account_owner(caller, user_id)?;

    let mut update = UserUpdate {
        name: payload.name.map(UserName::parse).transpose().map_err(ApiError::Validation)?,
        email: payload.email.map(UserEmail::parse).transpose().map_err(ApiError::Validation)?,
        password_hash: None,
    };

    if let Some(email) = &update.email {
        if UsersRepo::email_taken(&app_state.db_pool, email, Some(user_id)).await? {
            return Err(email_conflict());
        }
    }

    if let Some(password) = payload.password {
        let password = Password::parse(password).map_err(ApiError::Validation)?;
        update.password_hash = Some(hash_password(password.into_secret()).await?);
    }

    let user = UsersRepo::update(&app_state.db_pool, user_id, &update)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                email_conflict()
            } else {
                ApiError::Unexpected(e)
            }
        })?
        .ok_or_else(ApiError::user_not_found)?;

    Ok(ApiResponse::ok("User updated successfully", user))
}

#[derive(Deserialize)]
pub(super) struct UpdateUserPayload {
    name: Option<String>,
    email: Option<String>,
    password: Option<Secret<String>>,
}
