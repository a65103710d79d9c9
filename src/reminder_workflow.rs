use crate::{
    configuration::{ReminderWorkerSettings, Settings},
    domain::{is_remindable, plan_reminders, SubscriptionStatus},
    email_client::EmailClient,
    repo::{RemindersRepo, SubscriptionsRepo},
    startup::get_connection_pool,
};
use sqlx::{Executor, FromRow, PgConnection, PgPool, Postgres, Transaction};
use time::{Duration, OffsetDateTime};
use tracing::Span;
use uuid::Uuid;

const MAX_DELIVERY_RETRIES: i16 = 5;

#[derive(Debug, PartialEq, Eq)]
pub enum TriggerOutcome {
    Scheduled { planned: u64 },
    SubscriptionMissing,
    Inactive,
    RenewalPassed,
}

/// Plans the reminder sequence of one subscription.
///
/// Missing, inactive and past-due subscriptions end the workflow quietly.
/// Replaying the trigger for an unchanged renewal date plans nothing new.
#[tracing::instrument(name = "Schedule renewal reminders", skip(connection))]
pub async fn schedule_reminders(
    connection: &mut PgConnection,
    subscription_id: Uuid,
    now: OffsetDateTime,
) -> Result<TriggerOutcome, anyhow::Error> {
    let Some((subscription, _)) =
        SubscriptionsRepo::find_with_owner(&mut *connection, subscription_id).await?
    else {
        tracing::info!("Subscription not found. Workflow stopped");
        return Ok(TriggerOutcome::SubscriptionMissing);
    };

    if subscription.status != SubscriptionStatus::Active {
        tracing::info!(
            status = subscription.status.as_ref(),
            "Subscription is not active. Workflow stopped"
        );
        return Ok(TriggerOutcome::Inactive);
    }

    if subscription.renewal_date < now {
        tracing::info!("Renewal date has passed. Workflow stopped");
        return Ok(TriggerOutcome::RenewalPassed);
    }

    let steps = plan_reminders(subscription.renewal_date, now);
    for step in steps.iter().filter(|step| step.remind_at > now) {
        tracing::info!(
            remind_at = %step.remind_at,
            "Sleeping until the {} reminder",
            step.label
        );
    }

    let planned =
        RemindersRepo::enqueue(&mut *connection, subscription_id, subscription.renewal_date, &steps)
            .await?;

    Ok(TriggerOutcome::Scheduled { planned })
}

pub async fn run_worker_until_stopped(config: Settings) -> Result<(), anyhow::Error> {
    let db_pool = get_connection_pool(&config.database);
    let email_client = config.email_client.client()?;
    worker_loop(&db_pool, &email_client, &config.reminder_worker).await
}

async fn worker_loop(
    db_pool: &PgPool,
    email_client: &EmailClient,
    settings: &ReminderWorkerSettings,
) -> Result<(), anyhow::Error> {
    loop {
        match try_execute_task(db_pool, email_client, OffsetDateTime::now_utc()).await {
            Ok(ExecutionOutcome::TaskCompleted | ExecutionOutcome::TaskRescheduled) => {}
            Ok(ExecutionOutcome::EmptyQueue) => tokio::time::sleep(settings.idle_interval()).await,
            Err(_) => tokio::time::sleep(settings.error_interval()).await,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ExecutionOutcome {
    TaskCompleted,
    TaskRescheduled,
    EmptyQueue,
}

/// Runs the earliest reminder step due at `now`, if any.
#[tracing::instrument(
    skip_all,
    fields(
        subscription_id = tracing::field::Empty,
        days_before = tracing::field::Empty),
    err
)]
pub async fn try_execute_task(
    db_pool: &PgPool,
    email_client: &EmailClient,
    now: OffsetDateTime,
) -> Result<ExecutionOutcome, anyhow::Error> {
    let Some((mut transaction, task)) = dequeue_task(db_pool, now).await? else {
        return Ok(ExecutionOutcome::EmptyQueue);
    };

    Span::current()
        .record("subscription_id", tracing::field::display(task.subscription_id))
        .record("days_before", i64::from(task.days_before));

    match SubscriptionsRepo::find_with_owner(&mut *transaction, task.subscription_id).await? {
        Some((subscription, owner))
            if subscription.renewal_date == task.renewal_date
                && is_remindable(subscription.status, subscription.renewal_date, now) =>
        {
            tracing::info!("Triggering {} reminder", task.label);

            if let Err(e) = email_client
                .send_renewal_reminder(&owner.email, &owner.name, &subscription, task.days_before)
                .await
            {
                if task.n_retries < MAX_DELIVERY_RETRIES {
                    tracing::warn!(
                        error_cause_chain = ?e,
                        error.message = %e,
                        "Failed to deliver renewal reminder. Retrying later."
                    );
                    reschedule_task(transaction, &task, now).await?;
                    return Ok(ExecutionOutcome::TaskRescheduled);
                }

                tracing::error!(
                    error_cause_chain = ?e,
                    error.message = %e,
                    "Failed to deliver renewal reminder. Giving up."
                );
            }
        }
        _ => tracing::info!("Subscription no longer due for this reminder. Step dropped"),
    }

    delete_task(transaction, &task).await?;

    Ok(ExecutionOutcome::TaskCompleted)
}

type PgTransaction = Transaction<'static, Postgres>;

#[derive(Debug, FromRow)]
struct ReminderTask {
    subscription_id: Uuid,
    days_before: i16,
    renewal_date: OffsetDateTime,
    label: String,
    n_retries: i16,
}

#[tracing::instrument(skip_all)]
async fn dequeue_task(
    db_pool: &PgPool,
    now: OffsetDateTime,
) -> Result<Option<(PgTransaction, ReminderTask)>, anyhow::Error> {
    let mut transaction = db_pool.begin().await?;
    let query = sqlx::query_as::<_, ReminderTask>(
        r#"
        SELECT subscription_id, days_before, renewal_date, label, n_retries
        FROM reminder_tasks
        WHERE remind_at <= $1
        ORDER BY remind_at, days_before DESC
        FOR UPDATE
        SKIP LOCKED
        LIMIT 1
        "#,
    )
    .bind(now);

    match query.fetch_optional(&mut *transaction).await? {
        Some(task) => Ok(Some((transaction, task))),
        None => Ok(None),
    }
}

#[tracing::instrument(skip_all)]
async fn delete_task(mut transaction: PgTransaction, task: &ReminderTask) -> Result<(), anyhow::Error> {
    let query = sqlx::query(
        r#"
        DELETE FROM reminder_tasks
        WHERE
            subscription_id = $1 AND
            days_before = $2 AND
            renewal_date = $3
        "#,
    )
    .bind(task.subscription_id)
    .bind(task.days_before)
    .bind(task.renewal_date);

    transaction.execute(query).await?;
    transaction.commit().await?;

    Ok(())
}

/// Pushes a failed step back with exponential backoff.
#[tracing::instrument(skip_all)]
async fn reschedule_task(
    mut transaction: PgTransaction,
    task: &ReminderTask,
    now: OffsetDateTime,
) -> Result<(), anyhow::Error> {
    let backoff = Duration::minutes(1) * 2i32.pow(task.n_retries.max(0) as u32);
    let query = sqlx::query(
        r#"
        UPDATE reminder_tasks
        SET remind_at = $4, n_retries = n_retries + 1
        WHERE
            subscription_id = $1 AND
            days_before = $2 AND
            renewal_date = $3
        "#,
    )
    .bind(task.subscription_id)
    .bind(task.days_before)
    .bind(task.renewal_date)
    .bind(now + backoff);

    transaction.execute(query).await?;
    transaction.commit().await?;

    Ok(())
}
