use anyhow::anyhow;
use axum::{Json, extract::State, response::IntoResponse};

use quotable_types::api::Topic;

use crate::auth::AppState;
use crate::error::ApiError;

pub async fn list_topics(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.list_topics())
        .await
        .map_err(|e| anyhow!("spawn_blocking join error: {}", e))??;

    let topics: Vec<Topic> = rows
        .into_iter()
        .map(|row| Topic {
            id: row.id,
            name: row.name,
        })
        .collect();

    Ok(Json(topics))
}
