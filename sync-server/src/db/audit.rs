//! Sync audit log (`sync_logs`)

use async_trait::async_trait;
use shared::sync::SyncLogEntry;
use sqlx::PgPool;

use super::BoxError;

/// Destination of per-record audit entries.
///
/// A sink never fails the batch: write errors are logged and dropped.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, entry: SyncLogEntry);
}

/// Writes audit entries through the pool, outside the bulk transaction,
/// so entries of rolled-back calls are kept.
#[derive(Clone)]
pub struct PgAuditSink {
    pool: PgPool,
}

impl PgAuditSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditSink for PgAuditSink {
    async fn record(&self, entry: SyncLogEntry) {
        if let Err(e) = log(&self.pool, &entry).await {
            tracing::warn!(
                process = %entry.process,
                record_id = %entry.record_id,
                "Failed to write sync log entry: {e}"
            );
        }
    }
}

/// Write a sync log entry
pub async fn log(pool: &PgPool, entry: &SyncLogEntry) -> Result<(), BoxError> {
    sqlx::query(
        "INSERT INTO sync_logs (sync_type, record_id, process, row_data, event_date, result, error_message) VALUES ($1, $2, $3, $4, $5, $6, $7)"
    )
    .bind(&entry.sync_type)
    .bind(&entry.record_id)
    .bind(entry.process.as_str())
    .bind(&entry.row_data)
    .bind(entry.event_date)
    .bind(entry.result.as_str())
    .bind(&entry.error_message)
    .execute(pool)
    .await?;
    Ok(())
}
