use crate::{app_state::AppState, domain::User};
use axum::{routing::post, Router};
use login::login;
use logout::logout;
use register::register;
use secrecy::{ExposeSecret, Secret};
use serde::{Serialize, Serializer};

mod login;
mod logout;
mod register;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

/// Issued token together with the account it belongs to.
#[derive(Serialize)]
struct Session {
    #[serde(serialize_with = "expose_token")]
    token: Secret<String>,
    user: User,
}

fn expose_token<S: Serializer>(token: &Secret<String>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(token.expose_secret())
}
