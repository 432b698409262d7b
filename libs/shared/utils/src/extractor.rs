use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};

use shared_config::AppConfig;
use shared_models::auth::{User, UserRole};
use shared_models::error::AppError;

use crate::jwt::{bearer_token, validate_token};

/// Validates the bearer token and stores the resulting `User` in the
/// request extensions for the handlers.
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_value = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    let token = bearer_token(auth_value)
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))?;

    let user = validate_token(token, &config.supabase_jwt_secret)
        .map_err(|e| AppError::Auth(e.to_string()))?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Role of the authenticated user, or a 400 when the token carries an
/// unknown role.
pub fn require_role(user: &User) -> Result<UserRole, AppError> {
    user.user_role()
        .ok_or_else(|| AppError::BadRequest("Unrecognized user role".to_string()))
}

pub fn require_specific_role(user: &User, expected: UserRole) -> Result<(), AppError> {
    match require_role(user)? {
        role if role == expected => Ok(()),
        _ => Err(AppError::Forbidden(format!("Reserved to {} accounts", expected))),
    }
}
