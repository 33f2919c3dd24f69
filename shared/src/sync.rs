//! Bulk sync protocol types
//!
//! Used by clients pushing record arrays to the sync server, and by the
//! server to report per-record outcomes and write the audit log.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ErrorCode;

/// Channel recorded in `sync_logs.sync_type` for records received over the bulk API
pub const SYNC_TYPE_API: &str = "api";

/// Overall outcome of a bulk call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkStatus {
    /// Every record succeeded
    Successful,
    /// Some records succeeded, some failed
    PartialSuccess,
    /// No record succeeded (or the call was rejected before processing)
    Failed,
}

/// The `response` object of a bulk reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkSummary {
    /// HTTP status code of the reply
    pub code: u16,
    pub message: String,
    pub status: BulkStatus,
}

/// Reply to a bulk call: `{ response: { code, message, status }, errors: [...] }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkResponse {
    pub response: BulkSummary,
    #[serde(default)]
    pub errors: Vec<RecordFailure>,
}

impl BulkResponse {
    /// Every record succeeded
    pub fn successful(code: u16, total: usize) -> Self {
        Self {
            response: BulkSummary {
                code,
                message: processed_message(total, total),
                status: BulkStatus::Successful,
            },
            errors: Vec::new(),
        }
    }

    /// Some records failed, the rest were committed
    pub fn partial(code: u16, succeeded: usize, total: usize, errors: Vec<RecordFailure>) -> Self {
        Self {
            response: BulkSummary {
                code,
                message: processed_message(succeeded, total),
                status: BulkStatus::PartialSuccess,
            },
            errors,
        }
    }

    /// The call failed as a whole
    pub fn failed(code: u16, message: impl Into<String>, errors: Vec<RecordFailure>) -> Self {
        Self {
            response: BulkSummary {
                code,
                message: message.into(),
                status: BulkStatus::Failed,
            },
            errors,
        }
    }

    pub fn status(&self) -> BulkStatus {
        self.response.status
    }
}

/// `"<succeeded> of <total> processed successfully"`
pub fn processed_message(succeeded: usize, total: usize) -> String {
    format!("{succeeded} of {total} processed successfully")
}

/// Error detail for a rejected record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordFailure {
    /// Position of the record in the original request array
    pub index: usize,
    /// Natural identifier of the record, when it could be read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    pub code: ErrorCode,
    pub message: String,
    /// Offending field names (missing or invalid)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    /// The record payload as received (after sanitation)
    pub record: Value,
}

/// Record family handled by a bulk endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncProcess {
    Catalog,
    Product,
    ProductPrice,
    ProductStock,
    ProdUom,
}

impl SyncProcess {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Catalog => "catalog",
            Self::Product => "product",
            Self::ProductPrice => "product_price",
            Self::ProductStock => "product_stock",
            Self::ProdUom => "prod_uom",
        }
    }
}

impl std::fmt::Display for SyncProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-record outcome written to the audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncResult {
    Created,
    Updated,
    Deleted,
    Failed,
}

impl SyncResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for SyncResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the sync audit log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncLogEntry {
    pub sync_type: String,
    pub record_id: String,
    pub process: SyncProcess,
    pub row_data: Value,
    /// Unix millis
    pub event_date: i64,
    pub result: SyncResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_message() {
        let resp = BulkResponse::partial(200, 3, 4, Vec::new());
        assert_eq!(resp.status(), BulkStatus::PartialSuccess);
        assert_eq!(resp.response.message, "3 of 4 processed successfully");
    }

    #[test]
    fn test_bulk_response_serialize() {
        let failure = RecordFailure {
            index: 2,
            record_id: Some("P-1".to_string()),
            code: ErrorCode::MissingRequiredFields,
            message: "Missing required field(s): name".to_string(),
            fields: vec!["name".to_string()],
            record: serde_json::json!({ "reference": "P-1" }),
        };
        let resp = BulkResponse::failed(400, "All records failed", vec![failure]);
        let json = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["response"]["status"], "failed");
        assert_eq!(json["response"]["code"], 400);
        assert_eq!(json["errors"][0]["index"], 2);
        assert_eq!(json["errors"][0]["code"], 2006);
        assert_eq!(json["errors"][0]["fields"][0], "name");
    }

    #[test]
    fn test_successful_has_empty_errors() {
        let json = serde_json::to_value(BulkResponse::successful(201, 5)).unwrap();
        assert_eq!(json["response"]["status"], "successful");
        assert_eq!(json["errors"], serde_json::json!([]));
    }

    #[test]
    fn test_sync_process_names() {
        assert_eq!(SyncProcess::ProductPrice.as_str(), "product_price");
        assert_eq!(
            serde_json::to_string(&SyncProcess::ProdUom).unwrap(),
            "\"prod_uom\""
        );
    }

    #[test]
    fn test_sync_result() {
        assert_eq!(SyncResult::Updated.to_string(), "updated");
    }
}
