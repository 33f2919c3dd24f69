//! Record strategies, one per bulk endpoint
//!
//! Each handler resolves its foreign references by business name inside the
//! call's transaction and stores the canonical product reference of the
//! looked-up row, not the one received.

pub mod catalog;
pub mod price;
pub mod product;
pub mod stock;
pub mod uom;

pub use catalog::CatalogHandler;
pub use price::PriceHandler;
pub use product::ProductHandler;
pub use stock::StockHandler;
pub use uom::UomHandler;
