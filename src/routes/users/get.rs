use crate::{
    app_state::AppState,
    domain::User,
    error::ApiError,
    repo::UsersRepo,
    utils::{parse_id, ApiResponse},
};
use axum::extract::{Path, State};

#[tracing::instrument(name = "List users", skip(app_state))]
pub(super) async fn list_users(
    State(app_state): State<AppState>,
) -> Result<ApiResponse<Vec<User>>, ApiError> {
    let users = UsersRepo::list(&app_state.db_pool).await?;

    Ok(ApiResponse::ok("Users fetched successfully", users))
}

#[tracing::instrument(name = "Get user details", skip(app_state))]
pub(super) async fn get_user(
    State(app_state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<ApiResponse<User>, ApiError> {
    let user_id = parse_id(&user_id)?;
    let user = UsersRepo::find(&app_state.db_pool, user_id)
        .await?
        .ok_or_else(ApiError::user_not_found)?;

    Ok(ApiResponse::ok("User details fetched successfully", user))
}
