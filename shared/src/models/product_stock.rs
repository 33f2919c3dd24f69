//! Product Stock Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stock of a product in a business unit, unique on `(product_reference, city_id)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ProductStock {
    /// `None` until the row is first inserted
    pub id: Option<i64>,
    pub product_reference: String,
    pub city_id: i64,
    pub stock: Decimal,
    pub is_active: bool,
    pub created: i64,
    pub modified: i64,
}
