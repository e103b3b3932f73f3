use std::convert::Infallible;
use std::time::Duration;

use axum::{
    response::sse::{Event, KeepAlive, Sse},
    response::Json,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use sqlx::Row;
use tokio::sync::broadcast;

use crate::database::manager::DatabaseManager;
use crate::database::operations::{self, AdminOperation};
use crate::error::ApiError;
use crate::notify::NotificationHub;

/// POST /admin/operations - Privileged CRUD proxy
///
/// Body: `{operation, table, data?, id?, orderBy?}` with operation one of
/// select/insert/update/delete/upsert. The table must be one of the known
/// portfolio tables; anything else is a 400, not a pass-through.
///
/// Returns `{data, error: null}` mirroring the underlying client's result
/// shape. Data-layer failures are logged with full detail and surfaced as
/// generic errors.
pub async fn operations(Json(payload): Json<Value>) -> Result<Json<Value>, ApiError> {
    let op: AdminOperation = serde_json::from_value(payload)
        .map_err(|e| ApiError::bad_request(format!("Invalid operation request: {}", e)))?;

    tracing::info!("Admin operation: {} on table: {}", op.name(), op.table());

    let pool = DatabaseManager::pool().await?;
    let data = operations::execute(&pool, op).await?;

    Ok(Json(json!({ "data": data, "error": null })))
}

/// GET /admin/notifications - Current unread inquiry count
///
/// The counter is seeded once from the stored inquiry count, then driven by
/// live events. Seeding failure (database down) degrades to the in-memory
/// counter rather than failing the request.
pub async fn notifications() -> Json<Value> {
    let hub = NotificationHub::global();

    if !hub.is_seeded() {
        match count_inquiries().await {
            Ok(count) => hub.seed_unread(count),
            Err(e) => tracing::warn!("Could not seed unread count: {}", e),
        }
    }

    Json(json!({ "unread": hub.unread() }))
}

/// POST /admin/notifications/seen - Mark all inquiries seen (idempotent)
pub async fn notifications_seen() -> Json<Value> {
    let hub = NotificationHub::global();
    hub.mark_seen();
    Json(json!({ "unread": hub.unread() }))
}

/// GET /admin/notifications/stream - Live inquiry events over SSE
///
/// One event per inserted contact inquiry, best-effort: subscribers that
/// lag past the channel capacity skip ahead, and there is no replay of
/// events published before the subscription existed. Dropping the response
/// cancels the subscription.
pub async fn notifications_stream() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = NotificationHub::global().subscribe();

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => match Event::default().event("inquiry").json_data(&event) {
                    Ok(sse_event) => return Some((Ok::<_, Infallible>(sse_event), rx)),
                    Err(e) => {
                        tracing::error!("Failed to encode inquiry event: {}", e);
                        continue;
                    }
                },
                // Lagged subscribers skip missed events; no replay guarantee
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Notification subscriber lagged, skipped {} events", skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

async fn count_inquiries() -> Result<u64, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let row = sqlx::query("SELECT COUNT(*) AS count FROM contact_inquiries")
        .fetch_one(&pool)
        .await
        .map_err(crate::database::manager::DatabaseError::from)?;

    let count: i64 = row
        .try_get("count")
        .map_err(crate::database::manager::DatabaseError::from)?;
    Ok(count.max(0) as u64)
}
