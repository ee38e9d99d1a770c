use std::sync::Arc;

use anyhow::anyhow;
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};

use quotable_db::Database;
use quotable_db::models::UserRow;
use quotable_types::api::{
    Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserData,
};
use quotable_types::models::Role;

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = req.email.trim().to_lowercase();
    let username = req.username.trim().to_string();

    // Validate input
    if email.is_empty() || username.is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation(
            "username, email and password required".to_string(),
        ));
    }
    if username.len() < 3 || username.len() > 32 {
        return Err(ApiError::Validation(
            "username must be 3-32 characters".to_string(),
        ));
    }
    if req.password.len() < 8 {
        return Err(ApiError::Validation(
            "password must be at least 8 characters".to_string(),
        ));
    }

    // Check if the email or username is taken
    let db = state.clone();
    let (email_check, username_check) = (email.clone(), username.clone());
    let taken = tokio::task::spawn_blocking(move || {
        db.db.identity_taken(&email_check, &username_check)
    })
    .await
    .map_err(|e| anyhow!("spawn_blocking join error: {}", e))??;
    if taken {
        return Err(ApiError::Conflict(
            "Email or username already taken".to_string(),
        ));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| anyhow!("password hashing failed: {}", e))?
        .to_string();

    let db = state.clone();
    let user = tokio::task::spawn_blocking(move || {
        db.db.create_user(&email, &username, &password_hash)
    })
    .await
    .map_err(|e| anyhow!("spawn_blocking join error: {}", e))??;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: to_user_data(user)?,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let identity = req.email.trim().to_lowercase();
    if identity.is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation(
            "provide email and password".to_string(),
        ));
    }

    let db = state.clone();
    let lookup = identity.clone();
    let user = tokio::task::spawn_blocking(move || db.db.get_user_by_identity(&lookup))
        .await
        .map_err(|e| anyhow!("spawn_blocking join error: {}", e))??
        .ok_or(ApiError::Unauthorized)?;

    // Verify password
    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|e| anyhow!("corrupt stored hash for user {}: {}", user.id, e))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthorized)?;

    let role = Role::parse(&user.role)
        .ok_or_else(|| anyhow!("unknown role '{}' on user {}", user.role, user.id))?;
    let token = create_token(&state.jwt_secret, user.id, &user.username, role)?;

    Ok(Json(LoginResponse {
        token,
        user: to_user_data(user)?,
    }))
}

pub(crate) fn to_user_data(row: UserRow) -> Result<UserData, ApiError> {
    let role = Role::parse(&row.role)
        .ok_or_else(|| anyhow!("unknown role '{}' on user {}", row.role, row.id))?;
    Ok(UserData {
        id: row.id,
        email: row.email,
        username: row.username,
        role,
        created_at: row.created_at,
    })
}

fn create_token(secret: &str, user_id: i64, username: &str, role: Role) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        role,
        exp: (chrono::Utc::now() + chrono::Duration::days(7)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
