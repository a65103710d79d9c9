use super::ensure_account_owner;
use crate::{
    app_state::AppState,
    authentication::AuthenticatedUserId,
    error::ApiError,
    repo::UsersRepo,
    utils::{parse_id, ApiResponse},
};
use axum::extract::{Path, State};

#[tracing::instrument(name = "Delete user", skip(app_state, caller))]
pub(super) async fn delete_user(
    State(app_state): State<AppState>,
    caller: AuthenticatedUserId,
    Path(user_id): Path<String>,
) -> Result<ApiResponse<()>, ApiError> {
    let user_id = parse_id(&user_id)?;
    ensure_account_owner(caller, user_id)?;

    if UsersRepo::delete(&app_state.db_pool, user_id).await? {
        Ok(ApiResponse::message("User deleted successfully"))
    } else {
        Err(ApiError::user_not_found())
    }
}
