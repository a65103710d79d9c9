use crate::domain::{
    Category, Currency, Frequency, PaymentMethod, Price, Subscription, SubscriptionDescription,
    SubscriptionName, SubscriptionStatus, UserEmail, ValidSubscription,
};
use anyhow::Context;
use sqlx::{postgres::PgArguments, query::QueryAs, FromRow, PgExecutor, Postgres};
use time::OffsetDateTime;
use uuid::Uuid;

const COLUMNS: &str = "id, user_id, name, description, price, currency, frequency, category, \
    payment_method, status, start_date, renewal_date, created_at, updated_at";

#[derive(FromRow)]
struct SubscriptionRecord {
    id: Uuid,
    user_id: Uuid,
    name: String,
    description: String,
    price: f64,
    currency: String,
    frequency: String,
    category: String,
    payment_method: String,
    status: String,
    start_date: OffsetDateTime,
    renewal_date: OffsetDateTime,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<SubscriptionRecord> for Subscription {
    type Error = anyhow::Error;

    fn try_from(record: SubscriptionRecord) -> Result<Self, Self::Error> {
        let invalid = |e: String| anyhow::anyhow!("Stored subscription {} is invalid: {e}", record.id);

        Ok(Subscription {
            id: record.id,
            user_id: record.user_id,
            name: SubscriptionName::parse(record.name.clone()).map_err(invalid)?,
            description: SubscriptionDescription::parse(record.description.clone())
                .map_err(invalid)?,
            price: Price::parse(record.price).map_err(invalid)?,
            currency: Currency::try_from(record.currency.clone()).map_err(invalid)?,
            frequency: Frequency::try_from(record.frequency.clone()).map_err(invalid)?,
            category: Category::try_from(record.category.clone()).map_err(invalid)?,
            payment_method: PaymentMethod::try_from(record.payment_method.clone())
                .map_err(invalid)?,
            status: SubscriptionStatus::try_from(record.status.clone()).map_err(invalid)?,
            start_date: record.start_date,
            renewal_date: record.renewal_date,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

fn into_subscriptions(records: Vec<SubscriptionRecord>) -> Result<Vec<Subscription>, anyhow::Error> {
    records.into_iter().map(Subscription::try_from).collect()
}

fn bind_fields<'q>(
    query: QueryAs<'q, Postgres, SubscriptionRecord, PgArguments>,
    subscription: &'q ValidSubscription,
) -> QueryAs<'q, Postgres, SubscriptionRecord, PgArguments> {
    query
        .bind(subscription.name.as_ref())
        .bind(subscription.description.as_ref())
        .bind(subscription.price.value())
        .bind(subscription.currency.as_ref())
        .bind(subscription.frequency.as_ref())
        .bind(subscription.category.as_ref())
        .bind(subscription.payment_method.as_ref())
        .bind(subscription.status.as_ref())
        .bind(subscription.start_date)
        .bind(subscription.renewal_date)
}

/// Contact details of a subscription's owner.
#[derive(Clone, Debug)]
pub struct SubscriptionOwner {
    pub name: String,
    pub email: UserEmail,
}

pub struct SubscriptionsRepo;

impl SubscriptionsRepo {
    #[tracing::instrument(name = "Insert a new subscription", skip(executor, subscription))]
    pub async fn insert<'conn>(
        executor: impl PgExecutor<'conn>,
        user_id: Uuid,
        subscription: &ValidSubscription,
    ) -> Result<Subscription, anyhow::Error> {
        let sql = format!(
            r#"
            INSERT INTO subscriptions (
                name, description, price, currency, frequency, category, payment_method,
                status, start_date, renewal_date, id, user_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
            RETURNING {COLUMNS}
            "#
        );

        bind_fields(sqlx::query_as(&sql), subscription)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(OffsetDateTime::now_utc())
            .fetch_one(executor)
            .await
            .context("Failed to insert subscription")?
            .try_into()
    }

    #[tracing::instrument(name = "Fetch a subscription", skip(executor))]
    pub async fn find<'conn>(
        executor: impl PgExecutor<'conn>,
        subscription_id: Uuid,
    ) -> Result<Option<Subscription>, anyhow::Error> {
        let sql = format!("SELECT {COLUMNS} FROM subscriptions WHERE id = $1");

        sqlx::query_as::<_, SubscriptionRecord>(&sql)
            .bind(subscription_id)
            .fetch_optional(executor)
            .await
            .context("Failed to fetch subscription")?
            .map(Subscription::try_from)
            .transpose()
    }

    /// Fetches a subscription and holds a row lock on it until the enclosing
    /// transaction ends, so read-modify-write updates do not interleave.
    #[tracing::instrument(name = "Fetch and lock a subscription", skip(executor))]
    pub async fn find_for_update<'conn>(
        executor: impl PgExecutor<'conn>,
        subscription_id: Uuid,
    ) -> Result<Option<Subscription>, anyhow::Error> {
        let sql = format!("SELECT {COLUMNS} FROM subscriptions WHERE id = $1 FOR UPDATE");

        sqlx::query_as::<_, SubscriptionRecord>(&sql)
            .bind(subscription_id)
            .fetch_optional(executor)
            .await
            .context("Failed to fetch and lock subscription")?
            .map(Subscription::try_from)
            .transpose()
    }

    /// Fetches a subscription together with its owner's contact details.
    #[tracing::instrument(name = "Fetch a subscription with its owner", skip(executor))]
    pub async fn find_with_owner<'conn>(
        executor: impl PgExecutor<'conn>,
        subscription_id: Uuid,
    ) -> Result<Option<(Subscription, SubscriptionOwner)>, anyhow::Error> {
        #[derive(FromRow)]
        struct Row {
            #[sqlx(flatten)]
            subscription: SubscriptionRecord,
            owner_name: String,
            owner_email: String,
        }

        let columns = COLUMNS
            .split(", ")
            .map(|column| format!("s.{}", column.trim()))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            r#"
            SELECT {columns}, u.name AS owner_name, u.email AS owner_email
            FROM subscriptions s
            JOIN users u ON u.id = s.user_id
            WHERE s.id = $1
            "#
        );

        let Some(row) = sqlx::query_as::<_, Row>(&sql)
            .bind(subscription_id)
            .fetch_optional(executor)
            .await
            .context("Failed to fetch subscription with owner")?
        else {
            return Ok(None);
        };

        let owner = SubscriptionOwner {
            name: row.owner_name,
            email: UserEmail::parse(row.owner_email).map_err(|e| anyhow::anyhow!(e))?,
        };

        Ok(Some((row.subscription.try_into()?, owner)))
    }

    #[tracing::instrument(name = "Fetch all subscriptions", skip(executor))]
    pub async fn list<'conn>(
        executor: impl PgExecutor<'conn>,
    ) -> Result<Vec<Subscription>, anyhow::Error> {
        let sql = format!("SELECT {COLUMNS} FROM subscriptions ORDER BY created_at");

        let records = sqlx::query_as::<_, SubscriptionRecord>(&sql)
            .fetch_all(executor)
            .await
            .context("Failed to fetch subscriptions")?;

        into_subscriptions(records)
    }

    #[tracing::instrument(name = "Fetch subscriptions of a user", skip(executor))]
    pub async fn list_by_user<'conn>(
        executor: impl PgExecutor<'conn>,
        user_id: Uuid,
    ) -> Result<Vec<Subscription>, anyhow::Error> {
        let sql =
            format!("SELECT {COLUMNS} FROM subscriptions WHERE user_id = $1 ORDER BY created_at");

        let records = sqlx::query_as::<_, SubscriptionRecord>(&sql)
            .bind(user_id)
            .fetch_all(executor)
            .await
            .context("Failed to fetch user subscriptions")?;

        into_subscriptions(records)
    }

    /// Active subscriptions renewing within `[from, until]`, soonest first.
    #[tracing::instrument(name = "Fetch upcoming renewals", skip(executor))]
    pub async fn list_renewing_between<'conn>(
        executor: impl PgExecutor<'conn>,
        from: OffsetDateTime,
        until: OffsetDateTime,
    ) -> Result<Vec<Subscription>, anyhow::Error> {
        let sql = format!(
            r#"
            SELECT {COLUMNS} FROM subscriptions
            WHERE status = $1 AND renewal_date BETWEEN $2 AND $3
            ORDER BY renewal_date
            "#
        );

        let records = sqlx::query_as::<_, SubscriptionRecord>(&sql)
            .bind(SubscriptionStatus::Active.as_ref())
            .bind(from)
            .bind(until)
            .fetch_all(executor)
            .await
            .context("Failed to fetch upcoming renewals")?;

        into_subscriptions(records)
    }

    #[tracing::instrument(name = "Update a subscription", skip(executor, subscription))]
    pub async fn update<'conn>(
        executor: impl PgExecutor<'conn>,
        subscription_id: Uuid,
        subscription: &ValidSubscription,
    ) -> Result<Option<Subscription>, anyhow::Error> {
        let sql = format!(
            r#"
            UPDATE subscriptions SET
                name = $1, description = $2, price = $3, currency = $4, frequency = $5,
                category = $6, payment_method = $7, status = $8, start_date = $9,
                renewal_date = $10, updated_at = $12
            WHERE id = $11
            RETURNING {COLUMNS}
            "#
        );

        bind_fields(sqlx::query_as(&sql), subscription)
            .bind(subscription_id)
            .bind(OffsetDateTime::now_utc())
            .fetch_optional(executor)
            .await
            .context("Failed to update subscription")?
            .map(Subscription::try_from)
            .transpose()
    }

    #[tracing::instrument(name = "Delete a subscription", skip(executor))]
    pub async fn delete<'conn>(
        executor: impl PgExecutor<'conn>,
        subscription_id: Uuid,
    ) -> Result<bool, anyhow::Error> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(subscription_id)
            .execute(executor)
            .await
            .context("Failed to delete subscription")?;

        Ok(result.rows_affected() > 0)
    }
}
