use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};

use crate::auth::{self, TokenError};
use crate::config;
use crate::error::ApiError;

/// Admin context extracted from a verified session token.
///
/// Every privileged route requires a bearer token and verifies it against
/// the shared secret before the handler runs.
#[derive(Clone, Debug)]
pub struct AdminContext {
    /// When the presented session was issued (epoch ms)
    pub issued_at_ms: i64,
}

/// Session-token middleware for privileged routes
pub async fn session_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, impl IntoResponse> {
    let secret = match &config::config().security.admin_access_key {
        Some(secret) => secret.clone(),
        None => {
            tracing::error!("ADMIN_ACCESS_KEY not configured");
            let api_error = ApiError::internal_server_error("Server configuration error");
            return Err((
                StatusCode::from_u16(api_error.status_code()).unwrap(),
                Json(api_error.to_json()),
            ));
        }
    };

    let token = match extract_bearer_token(&headers) {
        Ok(token) => token,
        Err(msg) => {
            let api_error = ApiError::unauthorized(msg);
            return Err((
                StatusCode::from_u16(api_error.status_code()).unwrap(),
                Json(api_error.to_json()),
            ));
        }
    };

    let issued_at_ms = match auth::verify_session_token(&token, &secret, auth::now_ms()) {
        Ok(issued) => issued,
        Err(err) => {
            let msg = match err {
                TokenError::Expired => "Session expired",
                TokenError::Malformed | TokenError::Forged => "Invalid session token",
            };
            tracing::warn!("Rejected session token: {}", err);
            let api_error = ApiError::unauthorized(msg);
            return Err((
                StatusCode::from_u16(api_error.status_code()).unwrap(),
                Json(api_error.to_json()),
            ));
        }
    };

    request.extensions_mut().insert(AdminContext { issued_at_ms });

    Ok(next.run(request).await)
}

/// Extract the session token from the Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty session token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
