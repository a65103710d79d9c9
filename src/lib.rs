pub mod app_state;
pub mod authentication;
pub mod configuration;
pub mod domain;
pub mod email_client;
pub mod error;
pub mod reminder_workflow;
pub mod repo;
pub mod routes;
pub mod startup;
pub mod telemetry;
pub mod utils;
