//! Batch partial-success processor
//!
//! Every bulk endpoint runs the same pipeline over its record array:
//!
//! 1. required-field check
//! 2. type/range validation ([`RecordHandler::parse`])
//! 3. in-batch duplicate detection on the natural key (first one wins)
//! 4. reference resolution and upsert ([`RecordHandler::apply`]) inside a
//!    per-record savepoint
//!
//! A failing record is reported and skipped; the others carry on. The whole
//! call shares one transaction which is committed unless every record failed.

pub mod fields;

use async_trait::async_trait;
use serde_json::{Map, Value};
use shared::error::{AppError, ErrorCode};
use shared::sync::{
    BulkResponse, RecordFailure, SYNC_TYPE_API, SyncLogEntry, SyncProcess, SyncResult,
};
use std::collections::HashSet;
use thiserror::Error;

use crate::db::audit::AuditSink;
use crate::db::{BoxError, SyncDb, SyncTx};
use crate::error::ServiceError;

pub use fields::FieldReader;

/// Why a single record was rejected
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Missing required field(s): {}", .0.join(", "))]
    Missing(Vec<String>),
    #[error("Invalid fields: {}", .violations.join(", "))]
    Invalid {
        fields: Vec<String>,
        violations: Vec<String>,
    },
    #[error("Duplicate record in batch: {0}")]
    Duplicate(String),
    #[error("{resource} not found: {key}")]
    NotFound {
        code: ErrorCode,
        resource: &'static str,
        key: String,
    },
    #[error("Failed to save record: {0}")]
    Store(BoxError),
}

impl RecordError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Missing(_) => ErrorCode::MissingRequiredFields,
            Self::Invalid { .. } => ErrorCode::InvalidFields,
            Self::Duplicate(_) => ErrorCode::DuplicateInBatch,
            Self::NotFound { code, .. } => *code,
            Self::Store(_) => ErrorCode::DatabaseError,
        }
    }

    /// Offending field names, empty for non field-level errors
    pub fn fields(&self) -> Vec<String> {
        match self {
            Self::Missing(fields) | Self::Invalid { fields, .. } => fields.clone(),
            _ => Vec::new(),
        }
    }

    pub fn city_not_found(name: &str) -> Self {
        Self::NotFound {
            code: ErrorCode::CityNotFound,
            resource: "Business unit",
            key: name.to_string(),
        }
    }

    pub fn catalog_not_found(name: &str) -> Self {
        Self::NotFound {
            code: ErrorCode::CatalogNotFound,
            resource: "Catalog",
            key: name.to_string(),
        }
    }

    pub fn product_not_found(reference: &str) -> Self {
        Self::NotFound {
            code: ErrorCode::ProductNotFound,
            resource: "Product",
            key: reference.to_string(),
        }
    }
}

impl From<BoxError> for RecordError {
    fn from(e: BoxError) -> Self {
        Self::Store(e)
    }
}

/// Per-record-type strategy plugged into the batch processor
#[async_trait]
pub trait RecordHandler: Send + Sync {
    /// Validated, typed record
    type Record: Send + Sync;

    /// Audit log process name
    const PROCESS: SyncProcess;
    /// Name of the array field wrapping the records in the request body
    const RECORD_ARRAY: &'static str;
    /// Fields that must be present and non-blank
    const REQUIRED: &'static [&'static str];
    /// Fields forming the human-readable record id, joined with `/`
    const ID_FIELDS: &'static [&'static str];

    /// Type and range checks. Only called once every required field is present.
    fn parse(&self, raw: &Map<String, Value>) -> Result<Self::Record, RecordError>;

    /// Normalized natural key used for in-batch duplicate detection
    fn natural_key(&self, record: &Self::Record) -> String;

    /// Resolve references and write the record
    async fn apply(
        &self,
        tx: &mut dyn SyncTx,
        record: &Self::Record,
    ) -> Result<SyncResult, RecordError>;

    fn record_id(&self, raw: &Value) -> Option<String> {
        let parts: Vec<String> = Self::ID_FIELDS
            .iter()
            .filter_map(|name| match raw.get(*name)? {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("/"))
        }
    }
}

/// Join key parts into a case- and whitespace-insensitive key
pub fn normalize_key(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim().to_lowercase())
        .collect::<Vec<_>>()
        .join("|")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    AllSucceeded,
    Partial,
    AllFailed,
}

/// Tally of one processed record array
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub failures: Vec<RecordFailure>,
}

impl BatchReport {
    fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub fn succeeded(&self) -> usize {
        self.created + self.updated + self.deleted
    }

    pub fn outcome(&self) -> BatchOutcome {
        if self.failures.is_empty() {
            BatchOutcome::AllSucceeded
        } else if self.succeeded() == 0 {
            BatchOutcome::AllFailed
        } else {
            BatchOutcome::Partial
        }
    }

    fn count(&mut self, result: SyncResult) {
        match result {
            SyncResult::Created => self.created += 1,
            SyncResult::Updated => self.updated += 1,
            SyncResult::Deleted => self.deleted += 1,
            SyncResult::Failed => {}
        }
    }

    /// Reply body for this report: 201 when every record succeeded, 200 for
    /// partial success, 400 when every record failed
    pub fn into_bulk_response(self) -> BulkResponse {
        match self.outcome() {
            BatchOutcome::AllSucceeded => BulkResponse::successful(201, self.total),
            BatchOutcome::Partial => {
                let succeeded = self.succeeded();
                BulkResponse::partial(200, succeeded, self.total, self.failures)
            }
            BatchOutcome::AllFailed => BulkResponse::failed(
                400,
                ErrorCode::AllRecordsFailed.message(),
                self.failures,
            ),
        }
    }
}

/// Run one bulk call: open the transaction, process every record, then
/// commit or roll back.
///
/// An empty array is rejected before anything touches the store. When every
/// record fails the transaction is rolled back and the report comes back as
/// [`ServiceError::Rejected`].
pub async fn run<H: RecordHandler>(
    handler: &H,
    db: &dyn SyncDb,
    audit: &dyn AuditSink,
    records: &[Value],
    batch_size: usize,
) -> Result<BatchReport, ServiceError> {
    if records.is_empty() {
        return Err(AppError::no_records().into());
    }

    let mut tx = db.begin().await?;
    let report = match process(handler, tx.as_mut(), audit, records, batch_size).await {
        Ok(report) => report,
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(process = %H::PROCESS, "Rollback failed: {rollback_err}");
            }
            return Err(e.into());
        }
    };

    if report.outcome() == BatchOutcome::AllFailed {
        tx.rollback().await?;
        tracing::warn!(
            process = %H::PROCESS,
            total = report.total,
            "All records failed, transaction rolled back"
        );
        return Err(ServiceError::Rejected(report.into_bulk_response()));
    }

    tx.commit().await?;
    tracing::info!(
        process = %H::PROCESS,
        total = report.total,
        created = report.created,
        updated = report.updated,
        deleted = report.deleted,
        failed = report.failures.len(),
        "Bulk sync committed"
    );
    Ok(report)
}

/// Process `records` in chunks of `batch_size` inside `tx`.
///
/// Chunking only bounds the work between progress logs; indexes in the
/// report always refer to positions in the full array. Returns `Err` only
/// for failures of the transaction itself.
pub async fn process<H: RecordHandler>(
    handler: &H,
    tx: &mut dyn SyncTx,
    audit: &dyn AuditSink,
    records: &[Value],
    batch_size: usize,
) -> Result<BatchReport, BoxError> {
    let batch_size = batch_size.max(1);
    let mut report = BatchReport::new(records.len());
    let mut seen = HashSet::new();

    for (chunk_no, chunk) in records.chunks(batch_size).enumerate() {
        let offset = chunk_no * batch_size;
        tracing::debug!(
            process = %H::PROCESS,
            chunk = chunk_no + 1,
            offset,
            size = chunk.len(),
            "Processing chunk"
        );

        for (i, raw) in chunk.iter().enumerate() {
            let index = offset + i;
            let record_id = handler.record_id(raw);

            let (result, error_message) =
                match process_record(handler, tx, raw, &mut seen).await? {
                    Ok(result) => {
                        tracing::info!(
                            process = %H::PROCESS,
                            index,
                            record_id = record_id.as_deref().unwrap_or("-"),
                            result = %result,
                            "Record synced"
                        );
                        report.count(result);
                        (result, None)
                    }
                    Err(err) => {
                        tracing::warn!(
                            process = %H::PROCESS,
                            index,
                            record_id = record_id.as_deref().unwrap_or("-"),
                            code = %err.code(),
                            "Record rejected: {err}"
                        );
                        let message = err.to_string();
                        report.failures.push(RecordFailure {
                            index,
                            record_id: record_id.clone(),
                            code: err.code(),
                            message: message.clone(),
                            fields: err.fields(),
                            record: raw.clone(),
                        });
                        (SyncResult::Failed, Some(message))
                    }
                };

            audit
                .record(SyncLogEntry {
                    sync_type: SYNC_TYPE_API.to_string(),
                    record_id: record_id.unwrap_or_default(),
                    process: H::PROCESS,
                    row_data: raw.clone(),
                    event_date: shared::util::now_millis(),
                    result,
                    error_message,
                })
                .await;
        }
    }

    Ok(report)
}

/// Outer `Err` aborts the call; inner `Err` rejects only this record
async fn process_record<H: RecordHandler>(
    handler: &H,
    tx: &mut dyn SyncTx,
    raw: &Value,
    seen: &mut HashSet<String>,
) -> Result<Result<SyncResult, RecordError>, BoxError> {
    let record = match validate(handler, raw, seen) {
        Ok(record) => record,
        Err(e) => return Ok(Err(e)),
    };

    tx.savepoint().await?;
    match handler.apply(tx, &record).await {
        Ok(result) => {
            tx.release_savepoint().await?;
            Ok(Ok(result))
        }
        Err(e) => {
            tx.rollback_to_savepoint().await?;
            Ok(Err(e))
        }
    }
}

fn validate<H: RecordHandler>(
    handler: &H,
    raw: &Value,
    seen: &mut HashSet<String>,
) -> Result<H::Record, RecordError> {
    let Some(map) = raw.as_object() else {
        return Err(RecordError::Invalid {
            fields: Vec::new(),
            violations: vec!["record must be a JSON object".to_string()],
        });
    };

    let missing = fields::missing_fields(map, H::REQUIRED);
    if !missing.is_empty() {
        return Err(RecordError::Missing(missing));
    }

    let record = handler.parse(map)?;
    let key = handler.natural_key(&record);
    if !seen.insert(key.clone()) {
        return Err(RecordError::Duplicate(key));
    }
    Ok(record)
}
