pub mod auth;
pub mod error;
pub mod gate;
pub mod middleware;
pub mod quotes;
pub mod topics;
pub mod users;

use axum::{
    Json, Router,
    handler::Handler,
    middleware::from_fn,
    routing::{get, post},
};

use crate::auth::AppState;
use crate::middleware::{optional_auth, require_auth};

/// The full route table. Reads on /quotes run with optional auth so
/// anonymous browsing works; every mutation requires a credential.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/topics", get(topics::list_topics))
        .route(
            "/quotes",
            get(quotes::list_quotes.layer(from_fn(optional_auth)))
                .post(quotes::create_quote.layer(from_fn(require_auth))),
        )
        .route(
            "/quotes/{id}",
            get(quotes::get_quote.layer(from_fn(optional_auth)))
                .put(quotes::update_quote.layer(from_fn(require_auth)))
                .delete(quotes::delete_quote.layer(from_fn(require_auth))),
        )
        .route("/user", get(users::current_user.layer(from_fn(require_auth))))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}
