use crate::domain::{User, UserEmail, UserName};
use anyhow::Context;
use secrecy::{ExposeSecret, Secret};
use sqlx::{FromRow, PgExecutor};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug)]
pub struct NewUserRecord {
    pub id: Uuid,
    pub name: UserName,
    pub email: UserEmail,
    pub password_hash: Secret<String>,
}

/// Fields to change on an existing user; `None` leaves a column untouched.
#[derive(Debug, Default)]
pub struct UserUpdate {
    pub name: Option<UserName>,
    pub email: Option<UserEmail>,
    pub password_hash: Option<Secret<String>>,
}

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    name: String,
    email: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<UserRecord> for User {
    type Error = anyhow::Error;

    fn try_from(record: UserRecord) -> Result<Self, Self::Error> {
        Ok(User {
            id: record.id,
            name: UserName::parse(record.name).map_err(|e| anyhow::anyhow!(e))?,
            email: UserEmail::parse(record.email).map_err(|e| anyhow::anyhow!(e))?,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

pub struct UsersRepo;

impl UsersRepo {
    #[tracing::instrument(name = "Insert a new user record", skip(executor, new_user), fields(user_id = %new_user.id))]
    pub async fn insert<'conn>(
        executor: impl PgExecutor<'conn>,
        new_user: &NewUserRecord,
    ) -> Result<User, anyhow::Error> {
        let now = OffsetDateTime::now_utc();
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (id, name, email, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING id, name, email, created_at, updated_at
            "#,
        )
        .bind(new_user.id)
        .bind(new_user.name.as_ref())
        .bind(new_user.email.as_ref())
        .bind(new_user.password_hash.expose_secret())
        .bind(now)
        .fetch_one(executor)
        .await
        .context("Failed to insert user")?;

        record.try_into()
    }

    #[tracing::instrument(name = "Check whether an email is taken", skip(executor))]
    pub async fn email_taken<'conn>(
        executor: impl PgExecutor<'conn>,
        email: &UserEmail,
        except: Option<Uuid>,
    ) -> Result<bool, anyhow::Error> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1 AND id IS DISTINCT FROM $2)",
        )
        .bind(email.as_ref())
        .bind(except)
        .fetch_one(executor)
        .await
        .context("Failed to look up email")?;

        Ok(taken)
    }

    pub async fn fetch_credentials_by_email<'conn>(
        executor: impl PgExecutor<'conn>,
        email: &UserEmail,
    ) -> Result<Option<(Uuid, Secret<String>)>, anyhow::Error> {
        let row = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT id, password_hash FROM users WHERE email = $1",
        )
        .bind(email.as_ref())
        .fetch_optional(executor)
        .await
        .context("Failed to fetch user credentials")?;

        Ok(row.map(|(id, password_hash)| (id, Secret::new(password_hash))))
    }

    pub async fn exists<'conn>(
        executor: impl PgExecutor<'conn>,
        user_id: Uuid,
    ) -> Result<bool, anyhow::Error> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(executor)
                .await
                .context("Failed to look up user")?;

        Ok(exists)
    }

    #[tracing::instrument(name = "Fetch a user", skip(executor))]
    pub async fn find<'conn>(
        executor: impl PgExecutor<'conn>,
        user_id: Uuid,
    ) -> Result<Option<User>, anyhow::Error> {
        sqlx::query_as::<_, UserRecord>(
            "SELECT id, name, email, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(executor)
        .await
        .context("Failed to fetch user")?
        .map(User::try_from)
        .transpose()
    }

    #[tracing::instrument(name = "Fetch all users", skip(executor))]
    pub async fn list<'conn>(executor: impl PgExecutor<'conn>) -> Result<Vec<User>, anyhow::Error> {
        sqlx::query_as::<_, UserRecord>(
            "SELECT id, name, email, created_at, updated_at FROM users ORDER BY created_at",
        )
        .fetch_all(executor)
        .await
        .context("Failed to fetch users")?
        .into_iter()
        .map(User::try_from)
        .collect()
    }

    #[tracing::instrument(name = "Update a user", skip(executor, update))]
    pub async fn update<'conn>(
        executor: impl PgExecutor<'conn>,
        user_id: Uuid,
        update: &UserUpdate,
    ) -> Result<Option<User>, anyhow::Error> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                updated_at = $5
            WHERE id = $1
            RETURNING id, name, email, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(update.name.as_ref().map(|name| name.as_ref().to_string()))
        .bind(update.email.as_ref().map(|email| email.as_ref().to_string()))
        .bind(
            update
                .password_hash
                .as_ref()
                .map(|hash| hash.expose_secret().clone()),
        )
        .bind(OffsetDateTime::now_utc())
        .fetch_optional(executor)
        .await
        .context("Failed to update user")?
        .map(User::try_from)
        .transpose()
    }

    #[tracing::instrument(name = "Delete a user", skip(executor))]
    pub async fn delete<'conn>(
        executor: impl PgExecutor<'conn>,
        user_id: Uuid,
    ) -> Result<bool, anyhow::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(executor)
            .await
            .context("Failed to delete user")?;

        Ok(result.rows_affected() > 0)
    }
}
