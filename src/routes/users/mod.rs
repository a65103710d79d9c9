use crate::{
    app_state::AppState,
    authentication::{AuthenticatedUserId, BearerAuthLayer},
    error::ApiError,
};
use axum::{routing::get, Router};
use delete::delete_user;
use get::{get_user, list_users};
use post::create_user;
use put::update_user;
use uuid::Uuid;

mod delete;
mod get;
pub(crate) mod post;
mod put;

pub fn router(app_state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/users/:id", get(get_user).put(update_user).delete(delete_user))
        .route_layer(BearerAuthLayer::new(app_state.clone()));

    Router::new()
        .route("/users", get(list_users).post(create_user))
        .merge(protected)
}

/// Only the account holder may act on their own account.
pub(crate) fn ensure_account_owner(
    AuthenticatedUserId(caller_id): AuthenticatedUserId,
    account_id: Uuid,
) -> Result<(), ApiError> {
    if caller_id == account_id {
        Ok(())
    } else {
        tracing::info!("User `{caller_id}` tried to access account `{account_id}`");
        Err(ApiError::Forbidden(
            "You are not the owner of the account. Access denied".into(),
        ))
    }
}
