use super::find_owned;
use crate::{
    app_state::AppState,
    authentication::AuthenticatedUserId,
    error::ApiError,
    repo::SubscriptionsRepo,
    utils::{parse_id, ApiResponse},
};
use anyhow::Context;
use axum::extract::{Path, State};

#[tracing::instrument(name = "Delete subscription", skip(app_state, caller))]
pub(super) async fn delete_subscription(
    State(app_state): State<AppState>,
    caller: AuthenticatedUserId,
    Path(subscription_id): Path<String>,
) -> Result<ApiResponse<()>, ApiError> {
    let subscription_id = parse_id(&subscription_id)?;

    let mut transaction = app_state
        .db_pool
        .begin()
        .await
        .context("Failed to begin transaction")?;

    find_owned(&mut transaction, caller, subscription_id).await?;

    if !SubscriptionsRepo::delete(&mut *transaction, subscription_id).await? {
        return Err(ApiError::subscription_not_found());
    }

    transaction
        .commit()
        .await
        .context("Failed to commit transaction")?;

    Ok(ApiResponse::message("Subscription deleted successfully"))
}
