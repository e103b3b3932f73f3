//! Public read views for the portfolio site, plus contact-inquiry intake.
//!
//! These endpoints need no privilege: they serve exactly what the public
//! page renders. Each is a single query returning JSON rows via
//! row_to_json so the handler stays schema-agnostic.

use axum::{
    extract::Path,
    response::Json,
};
use serde::Deserialize;
use serde_json::Value;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::notify::{InquiryEvent, NotificationHub};

/// GET /api/portfolio/personal-info - The singleton personal_info row, or
/// null when the site has not been set up yet
pub async fn personal_info() -> ApiResult<Value> {
    let pool = DatabaseManager::pool().await?;

    let row = sqlx::query("SELECT row_to_json(t) AS row FROM personal_info AS t LIMIT 1")
        .fetch_optional(&pool)
        .await
        .map_err(DatabaseError::from)?;

    let data = match row {
        Some(row) => row.try_get::<Value, _>("row").map_err(DatabaseError::from)?,
        None => Value::Null,
    };

    Ok(ApiResponse::success(data))
}

/// GET /api/portfolio/projects - All projects, newest first
pub async fn projects() -> ApiResult<Value> {
    let pool = DatabaseManager::pool().await?;
    let data = fetch_rows(
        &pool,
        "SELECT row_to_json(t) AS row FROM projects AS t ORDER BY t.created_at DESC",
    )
    .await?;
    Ok(ApiResponse::success(data))
}

/// GET /api/portfolio/skills - All skills, grouped the way the site renders
/// them: by category, strongest first within each
pub async fn skills() -> ApiResult<Value> {
    let pool = DatabaseManager::pool().await?;
    let data = fetch_rows(
        &pool,
        "SELECT row_to_json(t) AS row FROM skills AS t \
         ORDER BY t.category ASC, t.proficiency_level DESC",
    )
    .await?;
    Ok(ApiResponse::success(data))
}

/// GET /api/portfolio/work-experience - Work history, most recent first
pub async fn work_experience() -> ApiResult<Value> {
    let pool = DatabaseManager::pool().await?;
    let data = fetch_rows(
        &pool,
        "SELECT row_to_json(t) AS row FROM work_experience AS t ORDER BY t.start_date DESC",
    )
    .await?;
    Ok(ApiResponse::success(data))
}

/// GET /api/portfolio/projects/:id/skills - Skills used on one project,
/// joined with the skill name for the project card
pub async fn project_skills(Path(project_id): Path<Uuid>) -> ApiResult<Value> {
    let pool = DatabaseManager::pool().await?;

    let rows = sqlx::query(
        "SELECT row_to_json(x) AS row FROM ( \
             SELECT ps.id, ps.project_id, ps.skill_id, ps.skill_level, \
                    s.name AS skill_name, s.category AS skill_category \
             FROM project_skills ps \
             JOIN skills s ON s.id = ps.skill_id \
             WHERE ps.project_id = $1 \
             ORDER BY ps.skill_level DESC \
         ) x",
    )
    .bind(project_id)
    .fetch_all(&pool)
    .await
    .map_err(DatabaseError::from)?;

    let records = rows
        .into_iter()
        .map(|row| row.try_get::<Value, _>("row"))
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::from)?;

    Ok(ApiResponse::success(Value::Array(records)))
}

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub email: String,
    pub message: String,
}

/// POST /api/contact - Submit a contact inquiry
///
/// Inserts the inquiry and publishes a notification event for the admin
/// unread counter / live stream. The event is fire-and-forget; the insert
/// is what matters.
pub async fn submit_contact(Json(payload): Json<ContactRequest>) -> ApiResult<Value> {
    let email = payload.email.trim();
    let message = payload.message.trim();

    if message.is_empty() {
        return Err(ApiError::bad_request("Message must not be empty"));
    }
    validate_email(email)?;

    let pool = DatabaseManager::pool().await?;

    let row = sqlx::query(
        "INSERT INTO contact_inquiries AS t (email, message) VALUES ($1, $2) \
         RETURNING t.id, t.email, t.created_at, row_to_json(t) AS row",
    )
    .bind(email)
    .bind(message)
    .fetch_one(&pool)
    .await
    .map_err(DatabaseError::from)?;

    let record = row.try_get::<Value, _>("row").map_err(DatabaseError::from)?;

    let event = InquiryEvent {
        id: row.try_get("id").map_err(DatabaseError::from)?,
        email: row.try_get("email").map_err(DatabaseError::from)?,
        created_at: row.try_get("created_at").map_err(DatabaseError::from)?,
    };
    NotificationHub::global().publish(event);

    Ok(ApiResponse::created(record))
}

async fn fetch_rows(pool: &PgPool, sql: &str) -> Result<Value, ApiError> {
    let rows = sqlx::query(sql)
        .fetch_all(pool)
        .await
        .map_err(DatabaseError::from)?;

    let records = rows
        .into_iter()
        .map(|row| row.try_get::<Value, _>("row"))
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::from)?;

    Ok(Value::Array(records))
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.is_empty() {
        return Err(ApiError::bad_request("Email must not be empty"));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || !parts[1].contains('.') {
        return Err(ApiError::bad_request("Invalid email format"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plausible_emails() {
        assert!(validate_email("visitor@example.com").is_ok());
        assert!(validate_email("a.b+c@mail.example.co").is_ok());
    }

    #[test]
    fn rejects_implausible_emails() {
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@nodot").is_err());
        assert!(validate_email("a@b@c.com").is_err());
    }

    #[test]
    fn contact_request_deserializes() {
        let req: ContactRequest = serde_json::from_str(
            r#"{"email": "visitor@example.com", "message": "Hello"}"#,
        )
        .unwrap();
        assert_eq!(req.email, "visitor@example.com");
        assert_eq!(req.message, "Hello");
    }
}
