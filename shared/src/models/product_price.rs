//! Product Price Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Price of a product inside a catalog, keyed by `(catalog_id, product_reference)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ProductPrice {
    pub catalog_id: i64,
    pub product_reference: String,
    pub price: Decimal,
    /// Discount percentage
    pub discount: Decimal,
    /// Consumption tax amount
    pub vlr_impu_consumo: Decimal,
    pub is_active: bool,
    pub created: i64,
    pub modified: i64,
}
