//! Middleware de autenticación JWT
//!
//! El servicio consume la identidad del llamante como dato opaco: el
//! token lo emite un colaborador externo y aquí solo se decodifica a
//! `AuthenticatedUser { user_id, role }`, inyectado en las extensions
//! del request.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Claims del JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// user id
    pub sub: String,
    pub role: String,
    pub exp: usize,
    pub iat: usize,
}

/// Identidad del llamante que se inyecta en las requests
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub role: UserRole,
}

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Extraer token del header Authorization
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|auth_str| auth_str.to_str().ok())
        .and_then(|auth_str| auth_str.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Authorization token required".to_string()))?;

    let token_data = decode::<Claims>(
        auth_header,
        &DecodingKey::from_secret(state.config.jwt_secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;

    let claims = token_data.claims;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user id in token".to_string()))?;

    let role = UserRole::from_claim(&claims.role)
        .ok_or_else(|| AppError::Unauthorized("Unknown role in token".to_string()))?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser { user_id, role });

    Ok(next.run(request).await)
}
