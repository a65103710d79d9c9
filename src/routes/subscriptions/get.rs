use crate::{
    app_state::AppState,
    authentication::AuthenticatedUserId,
    domain::Subscription,
    error::ApiError,
    repo::SubscriptionsRepo,
    routes::users::ensure_account_owner,
    utils::{parse_id, ApiResponse},
};
use axum::extract::{rejection::QueryRejection, Path, Query, State};
use serde::Deserialize;
use sqlx::PgPool;
use time::{Duration, OffsetDateTime};

#[tracing::instrument(name = "List subscriptions", skip(app_state))]
pub(super) async fn list_subscriptions(
    State(app_state): State<AppState>,
) -> Result<ApiResponse<Vec<Subscription>>, ApiError> {
    let subscriptions = SubscriptionsRepo::list(&app_state.db_pool).await?;

    Ok(ApiResponse::ok(
        "All Subscriptions fetched successfully",
        subscriptions,
    ))
}

#[tracing::instrument(name = "Get subscription details", skip(app_state))]
pub(super) async fn get_subscription(
    State(app_state): State<AppState>,
    Path(subscription_id): Path<String>,
) -> Result<ApiResponse<Subscription>, ApiError> {
    let subscription_id = parse_id(&subscription_id)?;
    let subscription = SubscriptionsRepo::find(&app_state.db_pool, subscription_id)
        .await?
        .ok_or_else(ApiError::subscription_not_found)?;

    Ok(ApiResponse::ok(
        "Subscription details fetched successfully",
        subscription,
    ))
}

#[tracing::instrument(name = "List user subscriptions", skip(app_state, caller))]
pub(super) async fn list_user_subscriptions(
    State(app_state): State<AppState>,
    caller: AuthenticatedUserId,
    Path(user_id): Path<String>,
) -> Result<ApiResponse<Vec<Subscription>>, ApiError> {
    let user_id = parse_id(&user_id)?;
    ensure_account_owner(caller, user_id)?;

    let subscriptions = SubscriptionsRepo::list_by_user(&app_state.db_pool, user_id).await?;

    Ok(ApiResponse::ok(
        "User subscriptions fetched successfully",
        subscriptions,
    ))
}

#[derive(Debug, Deserialize)]
pub(super) struct UpcomingRenewalsQuery {
    days: Option<i64>,
}

const DEFAULT_WINDOW_DAYS: i64 = 7;
const MAX_WINDOW_DAYS: i64 = 365;

impl UpcomingRenewalsQuery {
    fn window(&self) -> Result<Duration, ApiError> {
        match self.days.unwrap_or(DEFAULT_WINDOW_DAYS) {
            days @ 1..=MAX_WINDOW_DAYS => Ok(Duration::days(days)),
            days => Err(ApiError::Validation(format!(
                "`days` must be between 1 and {MAX_WINDOW_DAYS}, got {days}"
            ))),
        }
    }
}

#[tracing::instrument(name = "List upcoming renewals", skip(db_pool, query))]
pub(super) async fn upcoming_renewals(
    State(db_pool): State<PgPool>,
    query: Result<Query<UpcomingRenewalsQuery>, QueryRejection>,
) -> Result<ApiResponse<Vec<Subscription>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::Validation(e.body_text()))?;
    let window = query.window()?;

    let now = OffsetDateTime::now_utc();
    let subscriptions = SubscriptionsRepo::list_renewing_between(&db_pool, now, now + window).await?;

    Ok(ApiResponse::ok(
        "Upcoming renewals fetched successfully",
        subscriptions,
    ))
}
