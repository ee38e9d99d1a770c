use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use tracing::warn;

use quotable_types::api::Claims;
use quotable_types::models::Actor;

use crate::error::ApiError;

pub fn jwt_secret() -> String {
    std::env::var("QUOTABLE_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into())
}

fn verify(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let secret = jwt_secret();
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

fn bearer_token(req: &Request) -> Option<&str> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())?;
    // A bare token without the Bearer prefix is accepted too.
    Some(header.strip_prefix("Bearer ").unwrap_or(header))
}

/// Extract and validate the JWT from the Authorization header. Missing or
/// invalid credentials reject the request.
pub async fn require_auth(mut req: Request, next: Next) -> Result<Response, ApiError> {
    let token = bearer_token(&req).ok_or(ApiError::Unauthorized)?;
    let claims = verify(token).map_err(|_| ApiError::Unauthorized)?;

    req.extensions_mut().insert(Actor::User {
        id: claims.sub,
        role: claims.role,
    });
    Ok(next.run(req).await)
}

/// Same header handling, but absence or an invalid token demotes the
/// request to anonymous instead of rejecting it.
pub async fn optional_auth(mut req: Request, next: Next) -> Response {
    let actor = match bearer_token(&req) {
        None => Actor::Anonymous,
        Some(token) => match verify(token) {
            Ok(claims) => Actor::User {
                id: claims.sub,
                role: claims.role,
            },
            Err(_) => {
                warn!("optional auth: invalid token, continuing as anonymous");
                Actor::Anonymous
            }
        },
    };

    req.extensions_mut().insert(actor);
    next.run(req).await
}
