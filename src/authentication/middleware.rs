use super::extract::AuthenticatedUserId;
use crate::{app_state::AppState, error::ApiError, repo::UsersRepo};
use anyhow::Context as _;
use axum::{
    body::Body,
    http::{header::AUTHORIZATION, HeaderMap, Request, Response},
    response::IntoResponse,
};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use tower::{Layer, Service};
use tracing::Instrument;
use uuid::Uuid;

/// Rejects requests without a valid `Authorization: Bearer <token>` header
/// for an existing user, and exposes the caller's id to handlers.
#[derive(Clone)]
pub struct BearerAuthLayer {
    app_state: AppState,
}

impl BearerAuthLayer {
    pub fn new(app_state: AppState) -> Self {
        Self { app_state }
    }
}

impl<S> Layer<S> for BearerAuthLayer {
    type Service = BearerAuth<S>;

    fn layer(&self, inner: S) -> Self::Service {
        BearerAuth {
            inner,
            app_state: self.app_state.clone(),
        }
    }
}

#[derive(Clone)]
pub struct BearerAuth<S> {
    inner: S,
    app_state: AppState,
}

async fn authenticate(app_state: &AppState, headers: &HeaderMap) -> Result<Uuid, ApiError> {
    let token = bearer_token(headers)
        .ok_or_else(|| ApiError::Unauthorized("Unauthorized".into()))?;

    let user_id = app_state.token_signer.verify(token).map_err(|e| {
        tracing::info!(error.message = %e, "Rejected bearer token");
        ApiError::Unauthorized("Unauthorized".into())
    })?;

    let exists = UsersRepo::exists(&app_state.db_pool, user_id)
        .await
        .context("Failed to look up token owner")?;

    if exists {
        Ok(user_id)
    } else {
        tracing::info!("Token owner `{user_id}` no longer exists");
        Err(ApiError::Unauthorized("Unauthorized".into()))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

impl<ReqBody, S> Service<Request<ReqBody>> for BearerAuth<S>
where
    S: Service<Request<ReqBody>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send,
    ReqBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    #[inline]
    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let span = tracing::info_span!("Authenticate bearer token", user_id = tracing::field::Empty);
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let app_state = self.app_state.clone();

        Box::pin(
            async move {
                let outcome = authenticate(&app_state, req.headers()).await;
                match outcome {
                    Ok(user_id) => {
                        tracing::Span::current().record("user_id", tracing::field::display(user_id));
                        req.extensions_mut().insert(AuthenticatedUserId(user_id));
                    }
                    Err(e) => return Ok(e.into_response()),
                }

                inner.call(req).await
            }
            .instrument(span),
        )
    }
}
