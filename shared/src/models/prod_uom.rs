//! Product Unit-of-Measure Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Ordering rules of a product, keyed by `product_reference`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ProdUom {
    pub product_reference: String,
    pub unit_of_measure: String,
    pub min_order_qty: Decimal,
    /// `None` = no upper bound
    pub max_order_qty: Option<Decimal>,
    pub order_increment: Decimal,
    pub is_active: bool,
    pub created: i64,
    pub modified: i64,
}
