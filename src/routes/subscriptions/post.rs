use super::payload::SubscriptionPayload;
use crate::{
    app_state::AppState,
    authentication::AuthenticatedUserId,
    domain::Subscription,
    error::ApiError,
    reminder_workflow::schedule_reminders,
    repo::SubscriptionsRepo,
    utils::{ApiJson, ApiResponse},
};
use anyhow::Context;
use axum::extract::State;
use time::OffsetDateTime;

#[tracing::instrument(
    name = "Create a subscription",
    skip(app_state, caller_id, payload),
    fields(user_id = %caller_id, subscription_id = tracing::field::Empty)
)]
pub(super) async fn create_subscription(
    State(app_state): State<AppState>,
    AuthenticatedUserId(caller_id): AuthenticatedUserId,
    ApiJson(payload): ApiJson<SubscriptionPayload>,
) -> Result<ApiResponse<Subscription>, ApiError> {
    let now = OffsetDateTime::now_utc();
    let subscription = payload
        .into_fields()
        .and_then(|fields| fields.finalize(now))
        .map_err(ApiError::Validation)?;

    let mut transaction = app_state
        .db_pool
        .begin()
        .await
        .context("Failed to begin transaction")?;

    let subscription = SubscriptionsRepo::insert(&mut *transaction, caller_id, &subscription).await?;
    tracing::Span::current().record("subscription_id", tracing::field::display(subscription.id));

    schedule_reminders(&mut transaction, subscription.id, now)
        .await
        .context("Failed to schedule renewal reminders")?;

    transaction
        .commit()
        .await
        .context("Failed to commit transaction")?;

    Ok(ApiResponse::created(
        "Subscription created successfully",
        subscription,
    ))
}
