pub mod auth;
pub mod health_check;
pub mod subscriptions;
pub mod users;
pub mod workflows;
