use crate::{
    app_state::AppState,
    authentication::hash_password,
    domain::{NewUser, Password, User, UserEmail, UserName},
    error::ApiError,
    repo::{is_unique_violation, NewUserRecord, UsersRepo},
    utils::{ApiJson, ApiResponse},
};
use anyhow::Context;
use axum::extract::State;
use secrecy::Secret;
use serde::Deserialize;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

#[tracing::instrument(
    name = "Create a user",
    skip(app_state, payload),
    fields(user_email = %payload.email)
)]
pub(super) async fn create_user(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<UserPayload>,
) -> Result<ApiResponse<User>, ApiError> {
    let new_user: NewUser = payload.try_into().map_err(ApiError::Validation)?;

    let mut transaction = app_state
        .db_pool
        .begin()
        .await
        .context("Failed to begin transaction")?;
    let user = insert_user(&mut transaction, new_user).await?;
    transaction
        .commit()
        .await
        .context("Failed to commit transaction")?;

    Ok(ApiResponse::created("User created successfully", user))
}

/// Body accepted by both user creation and registration.
#[derive(Deserialize)]
pub(crate) struct UserPayload {
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) password: Secret<String>,
}

impl TryFrom<UserPayload> for NewUser {
    type Error = String;

    fn try_from(payload: UserPayload) -> Result<Self, Self::Error> {
        Ok(NewUser {
            name: UserName::parse(payload.name)?,
            email: UserEmail::parse(payload.email)?,
            password: Password::parse(payload.password)?,
        })
    }
}

/// Stores a user with a freshly salted password hash, failing with
/// `Conflict` when the email is already registered.
#[tracing::instrument(name = "Insert user", skip(transaction, new_user))]
pub(crate) async fn insert_user(
    transaction: &mut Transaction<'_, Postgres>,
    new_user: NewUser,
) -> Result<User, ApiError> {
    if UsersRepo::email_taken(&mut **transaction, &new_user.email, None).await? {
        return Err(email_conflict());
    }

    let password_hash = hash_password(new_user.password.into_secret()).await?;
    let record = NewUserRecord {
        id: Uuid::new_v4(),
        name: new_user.name,
        email: new_user.email,
        password_hash,
    };

    UsersRepo::insert(&mut **transaction, &record)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                email_conflict()
            } else {
                ApiError::Unexpected(e)
            }
        })
}

pub(crate) fn email_conflict() -> ApiError {
    ApiError::Conflict("User already exists with this email".into())
}
