use crate::authentication::TokenSigner;
use axum::extract::FromRef;
use secrecy::Secret;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub token_signer: TokenSigner,
    pub workflow_secret: WorkflowSecret,
}

/// Shared secret workflow callbacks must present.
#[derive(Clone)]
pub struct WorkflowSecret(pub Secret<String>);

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.db_pool.clone()
    }
}

impl FromRef<AppState> for WorkflowSecret {
    fn from_ref(state: &AppState) -> Self {
        state.workflow_secret.clone()
    }
}
