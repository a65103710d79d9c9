use crate::domain::ReminderStep;
use anyhow::Context;
use sqlx::{PgExecutor, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

pub struct RemindersRepo;

impl RemindersRepo {
    /// Persists planned reminder steps. Steps already planned for the same
    /// subscription, offset and renewal date are left alone.
    #[tracing::instrument(name = "Enqueue reminder steps", skip(executor, steps), fields(steps = steps.len()))]
    pub async fn enqueue<'conn>(
        executor: impl PgExecutor<'conn>,
        subscription_id: Uuid,
        renewal_date: OffsetDateTime,
        steps: &[ReminderStep],
    ) -> Result<u64, anyhow::Error> {
        if steps.is_empty() {
            return Ok(0);
        }

        let now = OffsetDateTime::now_utc();
        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO reminder_tasks \
            (subscription_id, days_before, renewal_date, remind_at, label, created_at) ",
        );
        builder.push_values(steps, |mut row, step| {
            row.push_bind(subscription_id)
                .push_bind(step.days_before)
                .push_bind(renewal_date)
                .push_bind(step.remind_at)
                .push_bind(step.label.clone())
                .push_bind(now);
        });
        builder.push(" ON CONFLICT DO NOTHING");

        let result = builder
            .build()
            .execute(executor)
            .await
            .context("Failed to enqueue reminder steps")?;

        Ok(result.rows_affected())
    }

    /// Pending `(days_before, remind_at)` steps of one subscription in firing
    /// order. Only used to inspect the planned schedule, e.g. from the API
    /// tests; the worker dequeues through its own locking query.
    pub async fn pending_for<'conn>(
        executor: impl PgExecutor<'conn>,
        subscription_id: Uuid,
    ) -> Result<Vec<(i16, OffsetDateTime)>, anyhow::Error> {
        let rows = sqlx::query_as::<_, (i16, OffsetDateTime)>(
            r#"
            SELECT days_before, remind_at FROM reminder_tasks
            WHERE subscription_id = $1
            ORDER BY remind_at, days_before DESC
            "#,
        )
        .bind(subscription_id)
        .fetch_all(executor)
        .await
        .context("Failed to fetch pending reminders")?;

        Ok(rows)
    }
}
