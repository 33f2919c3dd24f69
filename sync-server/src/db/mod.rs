//! Database access layer
//!
//! Record handlers never touch a pool directly: every bulk call opens one
//! [`SyncTx`] from a [`SyncDb`] and passes it down the call chain. Dropping a
//! transaction without committing rolls it back.

pub mod audit;
#[cfg(test)]
pub mod memory;
pub mod pg;

use async_trait::async_trait;
use shared::models::{Catalog, City, ProdUom, Product, ProductPrice, ProductStock};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Source of bulk-call transactions
#[async_trait]
pub trait SyncDb: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn SyncTx>, BoxError>;
}

/// Transaction-scoped data accessor.
///
/// Name lookups are case-insensitive on the natural key. `save_*` inserts
/// the row when it does not exist yet and updates it otherwise.
#[async_trait]
pub trait SyncTx: Send {
    // ── Transaction control ──

    /// Open the per-record savepoint
    async fn savepoint(&mut self) -> Result<(), BoxError>;
    /// Keep the writes made since [`SyncTx::savepoint`]
    async fn release_savepoint(&mut self) -> Result<(), BoxError>;
    /// Discard the writes made since [`SyncTx::savepoint`]
    async fn rollback_to_savepoint(&mut self) -> Result<(), BoxError>;
    async fn commit(self: Box<Self>) -> Result<(), BoxError>;
    async fn rollback(self: Box<Self>) -> Result<(), BoxError>;

    // ── Lookups ──

    async fn find_city_by_name(&mut self, name: &str) -> Result<Option<City>, BoxError>;
    async fn find_catalog(&mut self, name: &str, city_id: i64) -> Result<Option<Catalog>, BoxError>;
    async fn find_product(&mut self, reference: &str) -> Result<Option<Product>, BoxError>;
    async fn find_price(
        &mut self,
        catalog_id: i64,
        product_reference: &str,
    ) -> Result<Option<ProductPrice>, BoxError>;
    async fn find_stock(
        &mut self,
        product_reference: &str,
        city_id: i64,
    ) -> Result<Option<ProductStock>, BoxError>;
    async fn find_uom(&mut self, product_reference: &str) -> Result<Option<ProdUom>, BoxError>;

    // ── Writes ──

    /// Returns the saved row with its id assigned
    async fn save_catalog(&mut self, catalog: &Catalog) -> Result<Catalog, BoxError>;
    async fn save_product(&mut self, product: &Product) -> Result<(), BoxError>;
    async fn save_price(&mut self, price: &ProductPrice) -> Result<(), BoxError>;
    async fn remove_price(&mut self, catalog_id: i64, product_reference: &str) -> Result<(), BoxError>;
    /// Returns the saved row with its id assigned
    async fn save_stock(&mut self, stock: &ProductStock) -> Result<ProductStock, BoxError>;
    async fn remove_stock(&mut self, id: i64) -> Result<(), BoxError>;
    async fn save_uom(&mut self, uom: &ProdUom) -> Result<(), BoxError>;
    async fn remove_uom(&mut self, product_reference: &str) -> Result<(), BoxError>;
}
