//! City (business unit) Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// City entity. Addressed by `name` on the wire ("business unit").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct City {
    pub id: i64,
    pub name: String,
    pub minimum_order: Decimal,
    pub prefix: Option<String>,
}
