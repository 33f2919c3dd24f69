//! PostgreSQL implementation of the sync data accessor

use async_trait::async_trait;
use shared::models::{Catalog, City, ProdUom, Product, ProductPrice, ProductStock};
use sqlx::{PgPool, Postgres, Transaction};

use super::{BoxError, SyncDb, SyncTx};

const CATALOG_COLUMNS: &str = "id, name, city_id, is_active, created, modified";
const PRODUCT_COLUMNS: &str = "reference, name, packing, convertion_rate, vat_group, vat, packing_to, is_active, created, modified";
const PRICE_COLUMNS: &str =
    "catalog_id, product_reference, price, discount, vlr_impu_consumo, is_active, created, modified";
const STOCK_COLUMNS: &str = "id, product_reference, city_id, stock, is_active, created, modified";
const UOM_COLUMNS: &str = "product_reference, unit_of_measure, min_order_qty, max_order_qty, order_increment, is_active, created, modified";

#[derive(Clone)]
pub struct PgSyncDb {
    pool: PgPool,
}

impl PgSyncDb {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SyncDb for PgSyncDb {
    async fn begin(&self) -> Result<Box<dyn SyncTx>, BoxError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgSyncTx { tx }))
    }
}

pub struct PgSyncTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl SyncTx for PgSyncTx {
    async fn savepoint(&mut self) -> Result<(), BoxError> {
        sqlx::query("SAVEPOINT sync_record")
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn release_savepoint(&mut self) -> Result<(), BoxError> {
        sqlx::query("RELEASE SAVEPOINT sync_record")
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn rollback_to_savepoint(&mut self) -> Result<(), BoxError> {
        sqlx::query("ROLLBACK TO SAVEPOINT sync_record")
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), BoxError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), BoxError> {
        self.tx.rollback().await?;
        Ok(())
    }

    // ── Lookups ──

    async fn find_city_by_name(&mut self, name: &str) -> Result<Option<City>, BoxError> {
        let row: Option<City> = sqlx::query_as(
            "SELECT id, name, minimum_order, prefix FROM cities WHERE lower(name) = lower($1)",
        )
        .bind(name)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row)
    }

    async fn find_catalog(&mut self, name: &str, city_id: i64) -> Result<Option<Catalog>, BoxError> {
        let row: Option<Catalog> = sqlx::query_as(&format!(
            "SELECT {CATALOG_COLUMNS} FROM catalogs WHERE lower(name) = lower($1) AND city_id = $2"
        ))
        .bind(name)
        .bind(city_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row)
    }

    async fn find_product(&mut self, reference: &str) -> Result<Option<Product>, BoxError> {
        let row: Option<Product> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE lower(reference) = lower($1)"
        ))
        .bind(reference)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row)
    }

    async fn find_price(
        &mut self,
        catalog_id: i64,
        product_reference: &str,
    ) -> Result<Option<ProductPrice>, BoxError> {
        let row: Option<ProductPrice> = sqlx::query_as(&format!(
            "SELECT {PRICE_COLUMNS} FROM product_prices WHERE catalog_id = $1 AND product_reference = $2"
        ))
        .bind(catalog_id)
        .bind(product_reference)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row)
    }

    async fn find_stock(
        &mut self,
        product_reference: &str,
        city_id: i64,
    ) -> Result<Option<ProductStock>, BoxError> {
        let row: Option<ProductStock> = sqlx::query_as(&format!(
            "SELECT {STOCK_COLUMNS} FROM product_stock WHERE product_reference = $1 AND city_id = $2"
        ))
        .bind(product_reference)
        .bind(city_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row)
    }

    async fn find_uom(&mut self, product_reference: &str) -> Result<Option<ProdUom>, BoxError> {
        let row: Option<ProdUom> = sqlx::query_as(&format!(
            "SELECT {UOM_COLUMNS} FROM prod_uom WHERE product_reference = $1"
        ))
        .bind(product_reference)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row)
    }

    // ── Writes ──

    async fn save_catalog(&mut self, catalog: &Catalog) -> Result<Catalog, BoxError> {
        let saved: Catalog = match catalog.id {
            Some(id) => {
                sqlx::query_as(&format!(
                    "UPDATE catalogs SET name = $2, city_id = $3, is_active = $4, modified = $5 \
                     WHERE id = $1 RETURNING {CATALOG_COLUMNS}"
                ))
                .bind(id)
                .bind(&catalog.name)
                .bind(catalog.city_id)
                .bind(catalog.is_active)
                .bind(catalog.modified)
                .fetch_one(&mut *self.tx)
                .await?
            }
            None => {
                sqlx::query_as(&format!(
                    "INSERT INTO catalogs (name, city_id, is_active, created, modified) \
                     VALUES ($1, $2, $3, $4, $5) RETURNING {CATALOG_COLUMNS}"
                ))
                .bind(&catalog.name)
                .bind(catalog.city_id)
                .bind(catalog.is_active)
                .bind(catalog.created)
                .bind(catalog.modified)
                .fetch_one(&mut *self.tx)
                .await?
            }
        };
        Ok(saved)
    }

    async fn save_product(&mut self, product: &Product) -> Result<(), BoxError> {
        sqlx::query(
            r#"
            INSERT INTO products (
                reference, name, packing, convertion_rate, vat_group, vat,
                packing_to, is_active, created, modified
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (reference)
            DO UPDATE SET
                name = EXCLUDED.name, packing = EXCLUDED.packing,
                convertion_rate = EXCLUDED.convertion_rate, vat_group = EXCLUDED.vat_group,
                vat = EXCLUDED.vat, packing_to = EXCLUDED.packing_to,
                is_active = EXCLUDED.is_active, modified = EXCLUDED.modified
            "#,
        )
        .bind(&product.reference)
        .bind(&product.name)
        .bind(&product.packing)
        .bind(product.convertion_rate)
        .bind(&product.vat_group)
        .bind(product.vat)
        .bind(&product.packing_to)
        .bind(product.is_active)
        .bind(product.created)
        .bind(product.modified)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn save_price(&mut self, price: &ProductPrice) -> Result<(), BoxError> {
        sqlx::query(
            r#"
            INSERT INTO product_prices (
                catalog_id, product_reference, price, discount, vlr_impu_consumo,
                is_active, created, modified
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (catalog_id, product_reference)
            DO UPDATE SET
                price = EXCLUDED.price, discount = EXCLUDED.discount,
                vlr_impu_consumo = EXCLUDED.vlr_impu_consumo,
                is_active = EXCLUDED.is_active, modified = EXCLUDED.modified
            "#,
        )
        .bind(price.catalog_id)
        .bind(&price.product_reference)
        .bind(price.price)
        .bind(price.discount)
        .bind(price.vlr_impu_consumo)
        .bind(price.is_active)
        .bind(price.created)
        .bind(price.modified)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn remove_price(&mut self, catalog_id: i64, product_reference: &str) -> Result<(), BoxError> {
        sqlx::query("DELETE FROM product_prices WHERE catalog_id = $1 AND product_reference = $2")
            .bind(catalog_id)
            .bind(product_reference)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn save_stock(&mut self, stock: &ProductStock) -> Result<ProductStock, BoxError> {
        let saved: ProductStock = match stock.id {
            Some(id) => {
                sqlx::query_as(&format!(
                    "UPDATE product_stock SET stock = $2, is_active = $3, modified = $4 \
                     WHERE id = $1 RETURNING {STOCK_COLUMNS}"
                ))
                .bind(id)
                .bind(stock.stock)
                .bind(stock.is_active)
                .bind(stock.modified)
                .fetch_one(&mut *self.tx)
                .await?
            }
            None => {
                sqlx::query_as(&format!(
                    "INSERT INTO product_stock (product_reference, city_id, stock, is_active, created, modified) \
                     VALUES ($1, $2, $3, $4, $5, $6) RETURNING {STOCK_COLUMNS}"
                ))
                .bind(&stock.product_reference)
                .bind(stock.city_id)
                .bind(stock.stock)
                .bind(stock.is_active)
                .bind(stock.created)
                .bind(stock.modified)
                .fetch_one(&mut *self.tx)
                .await?
            }
        };
        Ok(saved)
    }

    async fn remove_stock(&mut self, id: i64) -> Result<(), BoxError> {
        sqlx::query("DELETE FROM product_stock WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn save_uom(&mut self, uom: &ProdUom) -> Result<(), BoxError> {
        sqlx::query(
            r#"
            INSERT INTO prod_uom (
                product_reference, unit_of_measure, min_order_qty, max_order_qty,
                order_increment, is_active, created, modified
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (product_reference)
            DO UPDATE SET
                unit_of_measure = EXCLUDED.unit_of_measure,
                min_order_qty = EXCLUDED.min_order_qty, max_order_qty = EXCLUDED.max_order_qty,
                order_increment = EXCLUDED.order_increment,
                is_active = EXCLUDED.is_active, modified = EXCLUDED.modified
            "#,
        )
        .bind(&uom.product_reference)
        .bind(&uom.unit_of_measure)
        .bind(uom.min_order_qty)
        .bind(uom.max_order_qty)
        .bind(uom.order_increment)
        .bind(uom.is_active)
        .bind(uom.created)
        .bind(uom.modified)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn remove_uom(&mut self, product_reference: &str) -> Result<(), BoxError> {
        sqlx::query("DELETE FROM prod_uom WHERE product_reference = $1")
            .bind(product_reference)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }
}
