use anyhow::anyhow;
use axum::{Extension, Json, extract::State, response::IntoResponse};

use quotable_types::models::Actor;

use crate::auth::{self, AppState};
use crate::error::ApiError;

pub async fn current_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<impl IntoResponse, ApiError> {
    let Actor::User { id, .. } = actor else {
        return Err(ApiError::Unauthorized);
    };

    let db = state.clone();
    let user = tokio::task::spawn_blocking(move || db.db.get_user_by_id(id))
        .await
        .map_err(|e| anyhow!("spawn_blocking join error: {}", e))??
        .ok_or(ApiError::NotFound)?;

    Ok(Json(auth::to_user_data(user)?))
}
