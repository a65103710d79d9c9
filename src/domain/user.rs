use super::{UserEmail, UserName};
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// Public view of a stored user. The password hash never leaves the store.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: UserName,
    pub email: UserEmail,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}
