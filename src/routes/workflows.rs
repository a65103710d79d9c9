use crate::{
    app_state::AppState,
    authentication::WorkflowCaller,
    error::ApiError,
    reminder_workflow::{schedule_reminders, TriggerOutcome},
    utils::{ApiJson, ApiResponse},
};
use anyhow::Context;
use axum::{extract::State, routing::post, Router};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

pub fn router() -> Router<AppState> {
    Router::new().route("/workflows/subscription/reminder", post(subscription_reminder))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReminderTrigger {
    subscription_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TriggerReport {
    outcome: &'static str,
    planned_reminders: u64,
}

impl From<TriggerOutcome> for TriggerReport {
    fn from(outcome: TriggerOutcome) -> Self {
        let (outcome, planned_reminders) = match outcome {
            TriggerOutcome::Scheduled { planned } => ("scheduled", planned),
            TriggerOutcome::SubscriptionMissing => ("subscription_missing", 0),
            TriggerOutcome::Inactive => ("inactive", 0),
            TriggerOutcome::RenewalPassed => ("renewal_passed", 0),
        };

        Self {
            outcome,
            planned_reminders,
        }
    }
}

#[tracing::instrument(
    name = "Trigger subscription reminder workflow",
    skip(db_pool, trigger),
    fields(subscription_id = %trigger.subscription_id)
)]
async fn subscription_reminder(
    _caller: WorkflowCaller,
    State(db_pool): State<PgPool>,
    ApiJson(trigger): ApiJson<ReminderTrigger>,
) -> Result<ApiResponse<TriggerReport>, ApiError> {
    let mut connection = db_pool
        .acquire()
        .await
        .context("Failed to acquire a database connection")?;

    let outcome = schedule_reminders(
        &mut connection,
        trigger.subscription_id,
        OffsetDateTime::now_utc(),
    )
    .await?;

    Ok(ApiResponse::ok("Reminder workflow triggered", outcome.into()))
}
