use serde_json::Value;
use sqlx::{MySql, Transaction};

use crate::error::ApiError;

/// Write one audit entry inside the same transaction as the domain write it
/// documents, so the trail can never drift from the data.
pub async fn record(
    tx: &mut Transaction<'_, MySql>,
    entity: &str,
    record_id: u64,
    action: &str,
    actor_id: u64,
    reason: &str,
    old_values: Option<Value>,
    new_values: Option<Value>,
) -> Result<(), ApiError> {
    sqlx::query(
        "INSERT INTO audit_log (entity, record_id, action, actor_id, reason, old_values, new_values) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(entity)
    .bind(record_id)
    .bind(action)
    .bind(actor_id)
    .bind(reason)
    .bind(old_values.map(|v| v.to_string()))
    .bind(new_values.map(|v| v.to_string()))
    .execute(&mut **tx)
    .await?;
    Ok(())
}
