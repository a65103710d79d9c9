use crate::utils::ApiResponse;

/// Tokens are stateless; clients sign out by discarding theirs.
#[tracing::instrument(name = "Sign out")]
pub(super) async fn logout() -> ApiResponse<()> {
    ApiResponse::message("User signed out successfully")
}
