use axum::{http::StatusCode, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth;
use crate::config;

#[derive(Debug, Deserialize)]
pub struct ValidateKeyRequest {
    pub key: Option<String>,
}

/// POST /auth/validate-key - Validate the pre-shared admin key
///
/// Expected input: `{"key": "string"}`
///
/// Responses:
/// - 200 `{valid, sessionToken, expiresAt}` - key checked; token minted on
///   match, `valid:false` with null fields on mismatch
/// - 400 `{valid:false, error}` - key missing or empty
/// - 500 `{valid:false, error}` - server-side secret not configured
///
/// No rate limiting and no lockout; one log line per attempt. Nothing is
/// persisted server-side - the token itself carries its issue time.
pub async fn validate_key(Json(payload): Json<ValidateKeyRequest>) -> (StatusCode, Json<Value>) {
    let key = match payload.key {
        Some(key) if !key.is_empty() => key,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "valid": false, "error": "Key is required" })),
            );
        }
    };

    let secret = match &config::config().security.admin_access_key {
        Some(secret) => secret,
        None => {
            tracing::error!("ADMIN_ACCESS_KEY not configured");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "valid": false, "error": "Server configuration error" })),
            );
        }
    };

    let result = auth::validate_key(&key, secret, auth::now_ms());
    tracing::info!(
        "Admin key validation: {}",
        if result.valid { "SUCCESS" } else { "FAILED" }
    );

    let body = match serde_json::to_value(&result) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!("Failed to serialize key validation result: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "valid": false, "error": "Internal server error" })),
            );
        }
    };

    (StatusCode::OK, Json(body))
}
