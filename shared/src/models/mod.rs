//! Catalog row models
//!
//! Shared between the sync server and its clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! Timestamps are Unix milliseconds; monetary and quantity columns are `Decimal`.

pub mod catalog;
pub mod city;
pub mod prod_uom;
pub mod product;
pub mod product_price;
pub mod product_stock;

// Re-exports
pub use catalog::*;
pub use city::*;
pub use prod_uom::*;
pub use product::*;
pub use product_price::*;
pub use product_stock::*;
