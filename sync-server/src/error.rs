//! Service-layer error type for sync-server
//!
//! `ServiceError` bridges DB-layer errors (`sqlx::Error`, `BoxError`) and the
//! API-layer error (`AppError`), and carries the all-failed bulk reply. Every
//! variant renders in the bulk response shape.

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use shared::error::{AppError, ErrorCode};
use shared::sync::BulkResponse;

use crate::db::BoxError;

#[derive(Debug)]
pub enum ServiceError {
    /// Database or infrastructure error (sqlx, AWS SDK, etc.)
    Db(BoxError),
    /// Business-rule error raised before any record was processed
    App(AppError),
    /// Every record failed; the transaction was rolled back
    Rejected(BulkResponse),
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl ServiceError {
    /// Status code and bulk reply for this error
    pub fn to_bulk_response(&self) -> (StatusCode, BulkResponse) {
        match self {
            ServiceError::Rejected(response) => (StatusCode::BAD_REQUEST, response.clone()),
            ServiceError::App(e) => {
                let status = e.http_status();
                (
                    status,
                    BulkResponse::failed(status.as_u16(), e.message.clone(), Vec::new()),
                )
            }
            ServiceError::Db(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                BulkResponse::failed(
                    StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                    ErrorCode::InternalError.message(),
                    Vec::new(),
                ),
            ),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        if let ServiceError::Db(e) = &self {
            tracing::error!(error = %e, "Service database error");
        }
        let (status, body) = self.to_bulk_response();
        (status, Json(body)).into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
