//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product entity, keyed by `reference`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub reference: String,
    pub name: String,
    pub packing: Option<String>,
    /// Units of `packing_to` per `packing`
    pub convertion_rate: Decimal,
    pub vat_group: Option<String>,
    /// VAT percentage (e.g., 19 = 19%)
    pub vat: Decimal,
    pub packing_to: Option<String>,
    pub is_active: bool,
    pub created: i64,
    pub modified: i64,
}
