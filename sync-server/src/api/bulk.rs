//! POST bulk endpoints: catalogs, products, prices, stock, units of measure
//!
//! Each call:
//! 1. Parse the JSON body and check credentials (headers or body fields)
//! 2. Sanitize every string of the body
//! 3. Run the record array through the batch processor
//! 4. Reply in the bulk shape and notify on partial or failed outcomes

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::{HeaderMap, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use shared::error::{AppError, ErrorCode};
use shared::sync::{BulkResponse, BulkStatus};

use crate::batch::{self, BatchReport, RecordHandler};
use crate::error::{ServiceError, ServiceResult};
use crate::notify;
use crate::sanitize::sanitize_value;
use crate::state::AppState;
use crate::sync::{CatalogHandler, PriceHandler, ProductHandler, StockHandler, UomHandler};

#[derive(Debug, Default, Deserialize)]
pub struct BatchQuery {
    #[serde(rename = "batchSize")]
    pub batch_size: Option<String>,
}

pub async fn catalogs(
    State(state): State<AppState>,
    Query(query): Query<BatchQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    sync_records(&state, &CatalogHandler, &headers, &query, &body).await
}

pub async fn products(
    State(state): State<AppState>,
    Query(query): Query<BatchQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    sync_records(&state, &ProductHandler, &headers, &query, &body).await
}

pub async fn product_prices(
    State(state): State<AppState>,
    Query(query): Query<BatchQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let handler = PriceHandler {
        delete_inactive: state.delete_flags.prices,
    };
    sync_records(&state, &handler, &headers, &query, &body).await
}

pub async fn product_stock(
    State(state): State<AppState>,
    Query(query): Query<BatchQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let handler = StockHandler {
        delete_inactive: state.delete_flags.stock,
    };
    sync_records(&state, &handler, &headers, &query, &body).await
}

pub async fn product_unit_of_measure(
    State(state): State<AppState>,
    Query(query): Query<BatchQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let handler = UomHandler {
        delete_inactive: state.delete_flags.uom,
    };
    sync_records(&state, &handler, &headers, &query, &body).await
}

async fn sync_records<H: RecordHandler>(
    state: &AppState,
    handler: &H,
    headers: &HeaderMap,
    query: &BatchQuery,
    body: &[u8],
) -> Response {
    match run_bulk(state, handler, headers, query, body).await {
        Ok(response) => {
            if response.status() == BulkStatus::PartialSuccess {
                notify::send(
                    state.notifier.as_ref(),
                    notify::failure_report(H::PROCESS, &response),
                )
                .await;
            }
            let status = StatusCode::from_u16(response.response.code).unwrap_or(StatusCode::OK);
            (status, Json(response)).into_response()
        }
        Err(err) => {
            match &err {
                ServiceError::Rejected(response) => {
                    notify::send(
                        state.notifier.as_ref(),
                        notify::failure_report(H::PROCESS, response),
                    )
                    .await;
                }
                ServiceError::Db(e) => {
                    notify::send(
                        state.notifier.as_ref(),
                        notify::error_report(H::PROCESS, &e.to_string()),
                    )
                    .await;
                }
                ServiceError::App(e) => {
                    tracing::info!(process = %H::PROCESS, code = %e.code, "Bulk call refused: {e}");
                }
            }
            err.into_response()
        }
    }
}

async fn run_bulk<H: RecordHandler>(
    state: &AppState,
    handler: &H,
    headers: &HeaderMap,
    query: &BatchQuery,
    body: &[u8],
) -> ServiceResult<BulkResponse> {
    let raw: Value = serde_json::from_slice(body)
        .map_err(|e| AppError::invalid_request(format!("Request body must be valid JSON: {e}")))?;

    // Credentials are read before sanitation rewrites body strings
    state.credentials.authenticate(headers, &raw)?;

    let batch_size = parse_batch_size(query.batch_size.as_deref(), state.batch_size)?;

    let body = sanitize_value(&raw);
    let records = body
        .get(H::RECORD_ARRAY)
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::missing_record_array(H::RECORD_ARRAY))?;

    tracing::info!(
        process = %H::PROCESS,
        records = records.len(),
        batch_size,
        "Bulk sync received"
    );

    let report: BatchReport = batch::run(
        handler,
        state.db.as_ref(),
        state.audit.as_ref(),
        records,
        batch_size,
    )
    .await?;
    Ok(report.into_bulk_response())
}

/// `?batchSize=` must be a positive integer; absent falls back to the default
fn parse_batch_size(value: Option<&str>, default: usize) -> Result<usize, ServiceError> {
    match value {
        None => Ok(default),
        Some(v) => match v.trim().parse::<usize>() {
            Ok(n) if n >= 1 => Ok(n),
            _ => Err(AppError::new(ErrorCode::InvalidBatchSize)
                .with_detail("batchSize", v)
                .into()),
        },
    }
}
