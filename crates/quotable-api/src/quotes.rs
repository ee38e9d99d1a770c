use anyhow::anyhow;
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use quotable_db::models::QuoteRow;
use quotable_db::queries::{DEFAULT_PAGE_SIZE, Page};
use quotable_db::visibility::{QuoteFilter, Visibility};
use quotable_types::api::{CreateQuoteRequest, QuoteResponse, UpdateQuoteRequest};
use quotable_types::models::{Actor, Role};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::gate::{self, Action, Decision};

#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    pub q: Option<String>,
    pub topic_id: Option<i64>,
    #[serde(default)]
    pub only_my: bool,
    #[serde(default)]
    pub is_favorite: bool,
    /// Restrict to one owner's quotes (self-targeting, or any owner for
    /// admins).
    pub user_id: Option<i64>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

pub async fn list_quotes(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<QuoteQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page =
        Page::new(query.limit, query.offset).map_err(|e| ApiError::Validation(e.to_string()))?;
    let visibility = Visibility::resolve(&actor, query.only_my, query.user_id);
    let filter = QuoteFilter {
        search: query.q,
        topic_id: query.topic_id,
        favorite_only: query.is_favorite,
    };

    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.list_quotes(visibility, &filter, page))
        .await
        .map_err(|e| anyhow!("spawn_blocking join error: {}", e))??;

    let quotes: Vec<QuoteResponse> = rows.into_iter().map(quote_response).collect();
    Ok(Json(quotes))
}

pub async fn get_quote(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let quote = tokio::task::spawn_blocking(move || db.db.get_quote(id))
        .await
        .map_err(|e| anyhow!("spawn_blocking join error: {}", e))??
        .ok_or(ApiError::NotFound)?;

    if quote.is_public {
        return Ok(Json(quote_response(quote)));
    }

    // Private row: owner and admins only.
    match actor {
        Actor::Anonymous => Err(ApiError::Forbidden),
        Actor::User { id: me, role } => {
            if quote.user_id == Some(me) || role == Role::Admin {
                Ok(Json(quote_response(quote)))
            } else {
                Err(ApiError::Forbidden)
            }
        }
    }
}

pub async fn create_quote(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateQuoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let text = req.text.trim().to_string();
    if text.is_empty() {
        return Err(ApiError::Validation("text required".to_string()));
    }
    let author = normalize_author(req.author);
    let is_public = req.is_public.unwrap_or(true);
    // The column stays nullable for legacy ownerless rows; on this route
    // the actor is always authenticated.
    let owner = actor.user_id();

    let db = state.clone();
    let topic_id = req.topic_id;
    let quote = tokio::task::spawn_blocking(move || {
        db.db
            .insert_quote(&text, author.as_deref(), is_public, owner, topic_id)
    })
    .await
    .map_err(|e| anyhow!("spawn_blocking join error: {}", e))??;

    Ok((StatusCode::CREATED, Json(quote_response(quote))))
}

pub async fn update_quote(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateQuoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Existence first, then authorization: a missing id is 404, a denied
    // mutation is 403.
    let db = state.clone();
    let existing = tokio::task::spawn_blocking(move || db.db.get_quote(id))
        .await
        .map_err(|e| anyhow!("spawn_blocking join error: {}", e))??
        .ok_or(ApiError::NotFound)?;

    if let Decision::Deny(_) = gate::authorize(&actor, Action::Update, &existing) {
        return Err(ApiError::Forbidden);
    }

    // Field-by-field merge: anything absent from the body keeps its stored
    // value.
    let text = match req.text {
        Some(t) => {
            let t = t.trim().to_string();
            if t.is_empty() {
                return Err(ApiError::Validation("text must not be empty".to_string()));
            }
            t
        }
        None => existing.text.clone(),
    };
    let author = match req.author {
        Some(a) => normalize_author(Some(a)),
        None => existing.author.clone(),
    };
    let is_favorite = req.is_favorite.unwrap_or(existing.is_favorite);
    let is_public = req.is_public.unwrap_or(existing.is_public);
    let topic_id = match req.topic_id {
        Some(topic) => topic,
        None => existing.topic_id,
    };

    let db = state.clone();
    let updated = tokio::task::spawn_blocking(move || {
        db.db
            .update_quote(id, &text, author.as_deref(), is_favorite, is_public, topic_id)
    })
    .await
    .map_err(|e| anyhow!("spawn_blocking join error: {}", e))??
    // A concurrent delete can win between the check above and this write.
    .ok_or(ApiError::NotFound)?;

    Ok(Json(quote_response(updated)))
}

pub async fn delete_quote(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let existing = tokio::task::spawn_blocking(move || db.db.get_quote(id))
        .await
        .map_err(|e| anyhow!("spawn_blocking join error: {}", e))??
        .ok_or(ApiError::NotFound)?;

    if let Decision::Deny(_) = gate::authorize(&actor, Action::Delete, &existing) {
        return Err(ApiError::Forbidden);
    }

    let db = state.clone();
    tokio::task::spawn_blocking(move || db.db.delete_quote(id))
        .await
        .map_err(|e| anyhow!("spawn_blocking join error: {}", e))??;

    Ok(Json(serde_json::json!({ "message": "deleted" })))
}

fn normalize_author(author: Option<String>) -> Option<String> {
    author
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(String::from)
}

fn quote_response(row: QuoteRow) -> QuoteResponse {
    QuoteResponse {
        id: row.id,
        text: row.text,
        author: row.author,
        is_public: row.is_public,
        is_favorite: row.is_favorite,
        user_id: row.user_id,
        topic_id: row.topic_id,
        username: row.username,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}
