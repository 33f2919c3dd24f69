//! Shared types for the catalog sync service
//!
//! Common types used by the sync server and its clients: the unified
//! error system, catalog row models and the bulk-sync wire protocol.

pub mod error;
pub mod models;
pub mod sync;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use sync::{BulkResponse, BulkStatus, RecordFailure, SyncLogEntry, SyncProcess, SyncResult};
