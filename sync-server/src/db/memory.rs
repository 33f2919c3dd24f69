//! In-memory sync store for tests
//!
//! Mirrors the transactional behaviour of the PostgreSQL accessor: writes go
//! to a working copy that is published on commit, and savepoints snapshot the
//! working copy.

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::{Catalog, City, ProdUom, Product, ProductPrice, ProductStock};
use shared::sync::SyncLogEntry;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::audit::AuditSink;
use super::{BoxError, SyncDb, SyncTx};

#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub cities: Vec<City>,
    pub catalogs: Vec<Catalog>,
    pub products: Vec<Product>,
    pub prices: Vec<ProductPrice>,
    pub stock: Vec<ProductStock>,
    pub uoms: Vec<ProdUom>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Clone, Default)]
pub struct MemoryDb {
    committed: Arc<Mutex<Tables>>,
    begun: Arc<AtomicUsize>,
    /// Product references whose save fails with a store error
    failing_products: Arc<Mutex<Vec<String>>>,
    /// Savepoints a transaction may open before the connection "drops"
    savepoint_budget: Arc<Mutex<Option<usize>>>,
    failing_commit: Arc<AtomicBool>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a city and return its id
    pub fn add_city(&self, name: &str) -> i64 {
        let mut tables = self.committed.lock().unwrap();
        let id = tables.next_id();
        tables.cities.push(City {
            id,
            name: name.to_string(),
            minimum_order: Decimal::ZERO,
            prefix: None,
        });
        id
    }

    /// Seed a catalog and return its id
    pub fn add_catalog(&self, name: &str, city_id: i64) -> i64 {
        let mut tables = self.committed.lock().unwrap();
        let id = tables.next_id();
        tables.catalogs.push(Catalog {
            id: Some(id),
            name: name.to_string(),
            city_id,
            is_active: true,
            created: 0,
            modified: 0,
        });
        id
    }

    /// Seed an active product
    pub fn add_product(&self, reference: &str) {
        self.committed.lock().unwrap().products.push(Product {
            reference: reference.to_string(),
            name: format!("Product {reference}"),
            packing: None,
            convertion_rate: Decimal::ONE,
            vat_group: None,
            vat: Decimal::ZERO,
            packing_to: None,
            is_active: true,
            created: 0,
            modified: 0,
        });
    }

    pub fn fail_product_save(&self, reference: &str) {
        self.failing_products
            .lock()
            .unwrap()
            .push(reference.to_lowercase());
    }

    /// Every transaction fails its savepoint after `n` successful ones
    pub fn fail_savepoint_after(&self, n: usize) {
        *self.savepoint_budget.lock().unwrap() = Some(n);
    }

    pub fn fail_commit(&self) {
        self.failing_commit.store(true, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> Tables {
        self.committed.lock().unwrap().clone()
    }

    /// Number of transactions opened so far
    pub fn transactions_begun(&self) -> usize {
        self.begun.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SyncDb for MemoryDb {
    async fn begin(&self) -> Result<Box<dyn SyncTx>, BoxError> {
        self.begun.fetch_add(1, Ordering::SeqCst);
        let working = self.committed.lock().unwrap().clone();
        Ok(Box::new(MemoryTx {
            committed: self.committed.clone(),
            failing_products: self.failing_products.lock().unwrap().clone(),
            savepoints_left: *self.savepoint_budget.lock().unwrap(),
            failing_commit: self.failing_commit.load(Ordering::SeqCst),
            working,
            savepoint: None,
        }))
    }
}

pub struct MemoryTx {
    committed: Arc<Mutex<Tables>>,
    failing_products: Vec<String>,
    savepoints_left: Option<usize>,
    failing_commit: bool,
    working: Tables,
    savepoint: Option<Tables>,
}

fn same(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[async_trait]
impl SyncTx for MemoryTx {
    async fn savepoint(&mut self) -> Result<(), BoxError> {
        if let Some(left) = self.savepoints_left.as_mut() {
            if *left == 0 {
                return Err("connection reset while creating savepoint".into());
            }
            *left -= 1;
        }
        self.savepoint = Some(self.working.clone());
        Ok(())
    }

    async fn release_savepoint(&mut self) -> Result<(), BoxError> {
        self.savepoint = None;
        Ok(())
    }

    async fn rollback_to_savepoint(&mut self) -> Result<(), BoxError> {
        let snapshot = self.savepoint.take().ok_or("no active savepoint")?;
        self.working = snapshot;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), BoxError> {
        if self.failing_commit {
            return Err("connection reset during commit".into());
        }
        let this = *self;
        *this.committed.lock().unwrap() = this.working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), BoxError> {
        Ok(())
    }

    async fn find_city_by_name(&mut self, name: &str) -> Result<Option<City>, BoxError> {
        Ok(self
            .working
            .cities
            .iter()
            .find(|c| same(&c.name, name))
            .cloned())
    }

    async fn find_catalog(&mut self, name: &str, city_id: i64) -> Result<Option<Catalog>, BoxError> {
        Ok(self
            .working
            .catalogs
            .iter()
            .find(|c| same(&c.name, name) && c.city_id == city_id)
            .cloned())
    }

    async fn find_product(&mut self, reference: &str) -> Result<Option<Product>, BoxError> {
        Ok(self
            .working
            .products
            .iter()
            .find(|p| same(&p.reference, reference))
            .cloned())
    }

    async fn find_price(
        &mut self,
        catalog_id: i64,
        product_reference: &str,
    ) -> Result<Option<ProductPrice>, BoxError> {
        Ok(self
            .working
            .prices
            .iter()
            .find(|p| p.catalog_id == catalog_id && p.product_reference == product_reference)
            .cloned())
    }

    async fn find_stock(
        &mut self,
        product_reference: &str,
        city_id: i64,
    ) -> Result<Option<ProductStock>, BoxError> {
        Ok(self
            .working
            .stock
            .iter()
            .find(|s| s.product_reference == product_reference && s.city_id == city_id)
            .cloned())
    }

    async fn find_uom(&mut self, product_reference: &str) -> Result<Option<ProdUom>, BoxError> {
        Ok(self
            .working
            .uoms
            .iter()
            .find(|u| u.product_reference == product_reference)
            .cloned())
    }

    async fn save_catalog(&mut self, catalog: &Catalog) -> Result<Catalog, BoxError> {
        let mut saved = catalog.clone();
        match catalog.id {
            Some(id) => {
                let row = self
                    .working
                    .catalogs
                    .iter_mut()
                    .find(|c| c.id == Some(id))
                    .ok_or("catalog row vanished")?;
                *row = saved.clone();
            }
            None => {
                saved.id = Some(self.working.next_id());
                self.working.catalogs.push(saved.clone());
            }
        }
        Ok(saved)
    }

    async fn save_product(&mut self, product: &Product) -> Result<(), BoxError> {
        if self
            .failing_products
            .contains(&product.reference.to_lowercase())
        {
            return Err(format!("value too long for product {}", product.reference).into());
        }
        match self
            .working
            .products
            .iter_mut()
            .find(|p| p.reference == product.reference)
        {
            Some(row) => *row = product.clone(),
            None => self.working.products.push(product.clone()),
        }
        Ok(())
    }

    async fn save_price(&mut self, price: &ProductPrice) -> Result<(), BoxError> {
        match self.working.prices.iter_mut().find(|p| {
            p.catalog_id == price.catalog_id && p.product_reference == price.product_reference
        }) {
            Some(row) => *row = price.clone(),
            None => self.working.prices.push(price.clone()),
        }
        Ok(())
    }

    async fn remove_price(&mut self, catalog_id: i64, product_reference: &str) -> Result<(), BoxError> {
        self.working
            .prices
            .retain(|p| !(p.catalog_id == catalog_id && p.product_reference == product_reference));
        Ok(())
    }

    async fn save_stock(&mut self, stock: &ProductStock) -> Result<ProductStock, BoxError> {
        let mut saved = stock.clone();
        match stock.id {
            Some(id) => {
                let row = self
                    .working
                    .stock
                    .iter_mut()
                    .find(|s| s.id == Some(id))
                    .ok_or("stock row vanished")?;
                *row = saved.clone();
            }
            None => {
                saved.id = Some(self.working.next_id());
                self.working.stock.push(saved.clone());
            }
        }
        Ok(saved)
    }

    async fn remove_stock(&mut self, id: i64) -> Result<(), BoxError> {
        self.working.stock.retain(|s| s.id != Some(id));
        Ok(())
    }

    async fn save_uom(&mut self, uom: &ProdUom) -> Result<(), BoxError> {
        match self
            .working
            .uoms
            .iter_mut()
            .find(|u| u.product_reference == uom.product_reference)
        {
            Some(row) => *row = uom.clone(),
            None => self.working.uoms.push(uom.clone()),
        }
        Ok(())
    }

    async fn remove_uom(&mut self, product_reference: &str) -> Result<(), BoxError> {
        self.working
            .uoms
            .retain(|u| u.product_reference != product_reference);
        Ok(())
    }
}

/// Collects audit entries in memory
#[derive(Clone, Default)]
pub struct MemoryAudit {
    entries: Arc<Mutex<Vec<SyncLogEntry>>>,
}

impl MemoryAudit {
    pub fn entries(&self) -> Vec<SyncLogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditSink for MemoryAudit {
    async fn record(&self, entry: SyncLogEntry) {
        self.entries.lock().unwrap().push(entry);
    }
}
