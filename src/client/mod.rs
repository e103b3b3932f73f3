//! Typed client for the admin surface.
//!
//! `login` exchanges the pre-shared key for a session, and `AdminClient`
//! turns typed CRUD calls into proxy invocations. Every call is one fresh
//! round trip with no retries or caching.

use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::KeyValidation;
use crate::database::operations::OrderBy;
use crate::session::{Clock, Session, SessionError, SessionManager, SessionState, SessionStore};
use crate::types::Table;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Not authenticated: no live admin session")]
    NotAuthenticated,
}

/// Exchange the pre-shared key for a session via the Key Validator.
///
/// On success the session is persisted through the manager and the call
/// returns true; a wrong key returns false without touching stored state.
pub async fn login<S: SessionStore, C: Clock>(
    base_url: &str,
    manager: &SessionManager<S, C>,
    key: &str,
) -> Result<bool, ClientError> {
    let http = reqwest::Client::new();
    let response = http
        .post(format!("{}/auth/validate-key", base_url))
        .json(&json!({ "key": key }))
        .send()
        .await?;

    let status = response.status();
    let body: Value = response.json().await?;

    if !status.is_success() {
        return Err(ClientError::Server {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    let validation: KeyValidation = serde_json::from_value(body).map_err(|e| {
        ClientError::Server {
            status: status.as_u16(),
            message: format!("Unexpected validation response: {}", e),
        }
    })?;

    match (validation.valid, validation.session_token, validation.expires_at) {
        (true, Some(token), Some(expires_at)) => {
            manager.establish(Session { token, expires_at })?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Logout is purely local: delete the persisted session, no server call.
pub fn logout<S: SessionStore, C: Clock>(
    manager: &SessionManager<S, C>,
) -> Result<(), ClientError> {
    manager.clear()?;
    Ok(())
}

/// Thin wrapper that routes CRUD operations through the admin proxy with
/// the session token attached.
pub struct AdminClient {
    base_url: String,
    token: String,
    http: reqwest::Client,
}

impl AdminClient {
    /// Build a client from the current session; fails if there is none or
    /// it has expired.
    pub fn from_session<S: SessionStore, C: Clock>(
        base_url: impl Into<String>,
        manager: &SessionManager<S, C>,
    ) -> Result<Self, ClientError> {
        match manager.current()? {
            SessionState::Authenticated(session) => Ok(Self {
                base_url: base_url.into(),
                token: session.token,
                http: reqwest::Client::new(),
            }),
            SessionState::Unauthenticated => Err(ClientError::NotAuthenticated),
        }
    }

    pub async fn select(
        &self,
        table: Table,
        order_by: Option<OrderBy>,
    ) -> Result<Value, ClientError> {
        self.invoke(json!({
            "operation": "select",
            "table": table,
            "orderBy": order_by,
        }))
        .await
    }

    pub async fn insert(&self, table: Table, data: Value) -> Result<Value, ClientError> {
        self.invoke(json!({
            "operation": "insert",
            "table": table,
            "data": data,
        }))
        .await
    }

    pub async fn update(&self, table: Table, id: Uuid, data: Value) -> Result<Value, ClientError> {
        self.invoke(json!({
            "operation": "update",
            "table": table,
            "id": id,
            "data": data,
        }))
        .await
    }

    pub async fn delete(&self, table: Table, id: Uuid) -> Result<Value, ClientError> {
        self.invoke(json!({
            "operation": "delete",
            "table": table,
            "id": id,
        }))
        .await
    }

    pub async fn upsert(&self, table: Table, data: Value) -> Result<Value, ClientError> {
        self.invoke(json!({
            "operation": "upsert",
            "table": table,
            "data": data,
        }))
        .await
    }

    /// One round trip to the proxy. Throws the proxy's error on any
    /// non-success response; returns the `data` payload otherwise.
    async fn invoke(&self, body: Value) -> Result<Value, ClientError> {
        let response = self
            .http
            .post(format!("{}/admin/operations", self.base_url))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let mut payload: Value = response.json().await?;

        if !status.is_success() {
            return Err(ClientError::Server {
                status: status.as_u16(),
                message: error_message(&payload),
            });
        }

        Ok(payload["data"].take())
    }
}

fn error_message(body: &Value) -> String {
    body.get("message")
        .or_else(|| body.get("error"))
        .and_then(|v| v.as_str())
        .unwrap_or("Unknown error")
        .to_string()
}
