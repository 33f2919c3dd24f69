//! Catalog Model

use serde::{Deserialize, Serialize};

/// Catalog entity, unique on `(name, city_id)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Catalog {
    /// `None` until the row is first inserted
    pub id: Option<i64>,
    pub name: String,
    pub city_id: i64,
    pub is_active: bool,
    pub created: i64,
    pub modified: i64,
}
