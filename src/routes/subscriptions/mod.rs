use crate::{
    app_state::AppState,
    authentication::{AuthenticatedUserId, BearerAuthLayer},
    domain::Subscription,
    error::ApiError,
    repo::SubscriptionsRepo,
    routes::users::ensure_account_owner,
};
use axum::{
    routing::{get, put},
    Router,
};
use sqlx::PgConnection;
use uuid::Uuid;
use delete::delete_subscription;
use get::{get_subscription, list_subscriptions, list_user_subscriptions, upcoming_renewals};
use post::create_subscription;
use put::{cancel_subscription, update_subscription};

mod delete;
mod get;
mod payload;
mod post;
mod put;

pub fn router(app_state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route(
            "/subscriptions",
            get(list_subscriptions).post(create_subscription),
        )
        .route(
            "/subscriptions/:id",
            get(get_subscription)
                .put(update_subscription)
                .delete(delete_subscription),
        )
        .route("/subscriptions/:id/cancel", put(cancel_subscription))
        .route("/subscriptions/user/:id", get(list_user_subscriptions))
        .route_layer(BearerAuthLayer::new(app_state.clone()));

    Router::new()
        .route("/subscriptions/upcoming-renewals", get(upcoming_renewals))
        .merge(protected)
}

/// Loads a subscription the caller is allowed to modify and locks its row
/// for the rest of the caller's transaction.
async fn find_owned(
    connection: &mut PgConnection,
    caller: AuthenticatedUserId,
    subscription_id: Uuid,
) -> Result<Subscription, ApiError> {
    let subscription = SubscriptionsRepo::find_for_update(connection, subscription_id)
        .await?
        .ok_or_else(ApiError::subscription_not_found)?;
    ensure_account_owner(caller, subscription.user_id)?;

    Ok(subscription)
}
