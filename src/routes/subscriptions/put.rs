use super::{find_owned, payload::SubscriptionPayload};
use crate::{
    app_state::AppState,
    authentication::AuthenticatedUserId,
    domain::{Subscription, SubscriptionStatus},
    error::ApiError,
    reminder_workflow::schedule_reminders,
    repo::SubscriptionsRepo,
    utils::{parse_id, ApiJson, ApiResponse},
};
use anyhow::Context;
use axum::extract::{Path, State};
use time::OffsetDateTime;

#[tracing::instrument(name = "Update subscription", skip(app_state, caller, payload))]
pub(super) async fn update_subscription(
    State(app_state): State<AppState>,
    caller: AuthenticatedUserId,
    Path(subscription_id): Path<String>,
    ApiJson(payload): ApiJson<SubscriptionPayload>,
) -> Result<ApiResponse<Subscription>, ApiError> {
    let subscription_id = parse_id(&subscription_id)?;
    let now = OffsetDateTime::now_utc();

    let mut transaction = app_state
        .db_pool
        .begin()
        .await
        .context("Failed to begin transaction")?;

    let existing = find_owned(&mut transaction, caller, subscription_id).await?;
    let changes = payload
        .apply_to(&existing)
        .and_then(|fields| fields.finalize(now))
        .map_err(ApiError::Validation)?;

    let subscription = SubscriptionsRepo::update(&mut *transaction, subscription_id, &changes)
        .await?
        .ok_or_else(ApiError::subscription_not_found)?;

    if subscription.status == SubscriptionStatus::Active {
        schedule_reminders(&mut transaction, subscription_id, now)
            .await
            .context("Failed to schedule renewal reminders")?;
    }

    transaction
        .commit()
        .await
        .context("Failed to commit transaction")?;

    Ok(ApiResponse::ok("Subscription updated successfully", subscription))
}

#[tracing::instrument(name = "Cancel subscription", skip(app_state, caller))]
pub(super) async fn cancel_subscription(
    State(app_state): State<AppState>,
    caller: AuthenticatedUserId,
    Path(subscription_id): Path<String>,
) -> Result<ApiResponse<Subscription>, ApiError> {
    let subscription_id = parse_id(&subscription_id)?;

    let mut transaction = app_state
        .db_pool
        .begin()
        .await
        .context("Failed to begin transaction")?;

    let existing = find_owned(&mut transaction, caller, subscription_id).await?;
    let mut fields = existing.fields();
    fields.status = SubscriptionStatus::Canceled;
    let changes = fields
        .finalize(OffsetDateTime::now_utc())
        .map_err(ApiError::Validation)?;

    let subscription = SubscriptionsRepo::update(&mut *transaction, subscription_id, &changes)
        .await?
        .ok_or_else(ApiError::subscription_not_found)?;

    transaction
        .commit()
        .await
        .context("Failed to commit transaction")?;

    Ok(ApiResponse::ok("Subscription canceled successfully", subscription))
}
