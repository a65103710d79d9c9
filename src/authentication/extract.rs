use crate::{app_state::WorkflowSecret, error::ApiError};
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};
use uuid::Uuid;

pub const WORKFLOW_SECRET_HEADER: &str = "x-workflow-secret";

/// Id of the caller, set by [`super::BearerAuthLayer`].
#[derive(Clone, Copy, Debug)]
pub struct AuthenticatedUserId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUserId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUserId>()
            .copied()
            .ok_or_else(|| {
                tracing::error!("Authenticated user id not found in request extensions");
                ApiError::Unexpected(anyhow::anyhow!("Route is missing the bearer auth layer"))
            })
    }
}

/// Marker for requests carrying the shared workflow secret in the
/// `x-workflow-secret` header.
#[derive(Clone, Copy, Debug)]
pub struct WorkflowCaller;

#[async_trait]
impl<S> FromRequestParts<S> for WorkflowCaller
where
    S: Send + Sync,
    WorkflowSecret: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let expected = WorkflowSecret::from_ref(state);
        let provided = parts
            .headers
            .get(WORKFLOW_SECRET_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Workflow secret is missing".into()))?;

        if secrets_match(provided, expected.0.expose_secret()) {
            Ok(WorkflowCaller)
        } else {
            Err(ApiError::Unauthorized("Workflow secret is invalid".into()))
        }
    }
}

// Fixed-length digests keep the comparison independent of where the inputs differ.
fn secrets_match(provided: &str, expected: &str) -> bool {
    Sha256::digest(provided.as_bytes()) == Sha256::digest(expected.as_bytes())
}
