use serde::{Deserialize, Deserializer, Serialize};

use crate::models::Role;

// -- JWT Claims --

/// JWT claims shared between quotable-api (REST middleware) and anything
/// else that needs to mint or verify tokens. Canonical definition lives
/// here in quotable-types to eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub role: Role,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// A user record as returned to clients. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserData {
    pub id: i64,
    pub email: Option<String>,
    pub username: String,
    pub role: Role,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserData,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    /// Matches either the email or the username.
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserData,
}

// -- Quotes --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateQuoteRequest {
    pub text: String,
    pub author: Option<String>,
    pub is_public: Option<bool>,
    pub topic_id: Option<i64>,
}

/// Partial update: every field absent from the body keeps its stored value.
/// `topic_id` distinguishes absent (keep) from explicit null (clear).
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateQuoteRequest {
    pub text: Option<String>,
    pub author: Option<String>,
    pub is_favorite: Option<bool>,
    pub is_public: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub topic_id: Option<Option<i64>>,
}

/// Wraps a present field in Some so `{"topic_id": null}` deserializes as
/// Some(None) while a missing field stays None.
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub id: i64,
    pub text: String,
    pub author: Option<String>,
    pub is_public: bool,
    pub is_favorite: bool,
    pub user_id: Option<i64>,
    pub topic_id: Option<i64>,
    /// Owner's display name, joined in by the repository. Null for
    /// ownerless (anonymous-authored) rows.
    pub username: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

// -- Topics --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: i64,
    pub name: String,
}
