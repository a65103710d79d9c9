mod reminders;
mod subscriptions;
mod users;

pub use reminders::RemindersRepo;
pub use subscriptions::{SubscriptionOwner, SubscriptionsRepo};
pub use users::{NewUserRecord, UserUpdate, UsersRepo};

/// Whether `error` was caused by a unique constraint violation.
pub fn is_unique_violation(error: &anyhow::Error) -> bool {
    error
        .chain()
        .filter_map(|cause| cause.downcast_ref::<sqlx::Error>())
        .filter_map(|e| e.as_database_error())
        .any(|e| e.is_unique_violation())
}
