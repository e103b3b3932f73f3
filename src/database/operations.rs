//! Privileged CRUD dispatcher for the admin surface.
//!
//! Requests arrive as `{operation, table, data?, id?, orderBy?}` and are
//! parsed into the closed `AdminOperation` sum type before any SQL is built.
//! Table names come from the `Table` enum and payload column names are
//! validated identifiers, so no caller-supplied string reaches the query
//! text unchecked.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::types::Table;

/// Sort specification for select: one column, ascending or descending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

/// The permitted admin operations, one variant per wire `operation` value.
#[derive(Debug, Deserialize)]
#[serde(tag = "operation", rename_all = "lowercase")]
pub enum AdminOperation {
    Select {
        table: Table,
        #[serde(rename = "orderBy")]
        order_by: Option<OrderBy>,
    },
    Insert {
        table: Table,
        data: Map<String, Value>,
    },
    Update {
        table: Table,
        id: Uuid,
        data: Map<String, Value>,
    },
    Delete {
        table: Table,
        id: Uuid,
    },
    Upsert {
        table: Table,
        data: Map<String, Value>,
    },
}

impl AdminOperation {
    pub fn table(&self) -> Table {
        match self {
            AdminOperation::Select { table, .. }
            | AdminOperation::Insert { table, .. }
            | AdminOperation::Update { table, .. }
            | AdminOperation::Delete { table, .. }
            | AdminOperation::Upsert { table, .. } => *table,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AdminOperation::Select { .. } => "select",
            AdminOperation::Insert { .. } => "insert",
            AdminOperation::Update { .. } => "update",
            AdminOperation::Delete { .. } => "delete",
            AdminOperation::Upsert { .. } => "upsert",
        }
    }
}

/// Execute exactly one database call for the given operation and return the
/// data payload: an array for select, the affected row for insert/update/
/// upsert, null for delete.
pub async fn execute(pool: &PgPool, op: AdminOperation) -> Result<Value, DatabaseError> {
    match op {
        AdminOperation::Select { table, order_by } => select_all(pool, table, order_by).await,
        AdminOperation::Insert { table, data } => insert_one(pool, table, &data).await,
        AdminOperation::Update { table, id, data } => update_by_id(pool, table, id, &data).await,
        AdminOperation::Delete { table, id } => delete_by_id(pool, table, id).await,
        AdminOperation::Upsert { table, data } => upsert_singleton(pool, table, &data).await,
    }
}

/// Full-table scan, optionally ordered. No pagination or filtering.
async fn select_all(
    pool: &PgPool,
    table: Table,
    order_by: Option<OrderBy>,
) -> Result<Value, DatabaseError> {
    let mut sql = format!(
        "SELECT row_to_json(t) AS row FROM \"{}\" AS t",
        table.as_str()
    );

    if let Some(order) = order_by {
        let column = validated_identifier(&order.column)?;
        let direction = if order.ascending { "ASC" } else { "DESC" };
        sql.push_str(&format!(" ORDER BY t.\"{}\" {}", column, direction));
    }

    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    let records = rows
        .into_iter()
        .map(|row| row.try_get::<Value, _>("row"))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Value::Array(records))
}

/// Insert one record, returning the inserted row with generated fields.
///
/// The JSON payload is bound once as jsonb and typed per-column by
/// `jsonb_populate_record`, so date/array/numeric columns convert without
/// per-type binding logic. Only the columns present in the payload are
/// named, leaving database defaults (id, created_at) intact.
async fn insert_one(
    pool: &PgPool,
    table: Table,
    data: &Map<String, Value>,
) -> Result<Value, DatabaseError> {
    let columns = payload_columns(data)?;

    let column_list = columns
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ");
    let select_list = columns
        .iter()
        .map(|c| format!("r.\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!(
        "INSERT INTO \"{table}\" AS t ({column_list}) \
         SELECT {select_list} FROM jsonb_populate_record(NULL::\"{table}\", $1) AS r \
         RETURNING row_to_json(t) AS row",
        table = table.as_str(),
    );

    let row = sqlx::query(&sql)
        .bind(Value::Object(data.clone()))
        .fetch_one(pool)
        .await?;

    Ok(row.try_get::<Value, _>("row")?)
}

/// Partial update of the row with the given id, returning the updated row.
async fn update_by_id(
    pool: &PgPool,
    table: Table,
    id: Uuid,
    data: &Map<String, Value>,
) -> Result<Value, DatabaseError> {
    let columns = payload_columns(data)?;

    let assignments = columns
        .iter()
        .map(|c| format!("\"{c}\" = r.\"{c}\""))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!(
        "UPDATE \"{table}\" AS t SET {assignments} \
         FROM jsonb_populate_record(NULL::\"{table}\", $1) AS r \
         WHERE t.id = $2 RETURNING row_to_json(t) AS row",
        table = table.as_str(),
    );

    let row = sqlx::query(&sql)
        .bind(Value::Object(data.clone()))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(row.try_get::<Value, _>("row")?),
        None => Err(DatabaseError::NotFound(format!(
            "No {} row with id {}",
            table, id
        ))),
    }
}

/// Delete the row with the given id. Returns null: an acknowledgment, not
/// a row.
async fn delete_by_id(pool: &PgPool, table: Table, id: Uuid) -> Result<Value, DatabaseError> {
    let sql = format!("DELETE FROM \"{}\" WHERE id = $1", table.as_str());
    let result = sqlx::query(&sql).bind(id).execute(pool).await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!(
            "No {} row with id {}",
            table, id
        )));
    }

    Ok(Value::Null)
}

/// Singleton-record upsert: update the one existing row if present, insert
/// otherwise. This looks up at most one row with no filter, so it is only
/// correct for tables holding a single logical record (personal_info).
async fn upsert_singleton(
    pool: &PgPool,
    table: Table,
    data: &Map<String, Value>,
) -> Result<Value, DatabaseError> {
    let sql = format!("SELECT id FROM \"{}\" LIMIT 1", table.as_str());
    let existing = sqlx::query(&sql).fetch_optional(pool).await?;

    match existing {
        Some(row) => {
            let id: Uuid = row.try_get("id")?;
            update_by_id(pool, table, id, data).await
        }
        None => insert_one(pool, table, data).await,
    }
}

/// Validate payload column names and reject empty payloads.
fn payload_columns(data: &Map<String, Value>) -> Result<Vec<&str>, DatabaseError> {
    if data.is_empty() {
        return Err(DatabaseError::QueryError(
            "Record payload must not be empty".to_string(),
        ));
    }

    data.keys()
        .map(|k| validated_identifier(k))
        .collect::<Result<Vec<_>, _>>()
}

/// Accept only plain SQL identifiers: leading letter or underscore, then
/// letters, digits, underscores.
fn validated_identifier(name: &str) -> Result<&str, DatabaseError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid {
        Ok(name)
    } else {
        Err(DatabaseError::QueryError(format!(
            "Invalid column name: {:?}",
            name
        )))
    }
}
