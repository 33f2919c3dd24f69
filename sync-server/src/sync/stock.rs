//! Product stock per business unit

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use shared::models::ProductStock;
use shared::sync::{SyncProcess, SyncResult};

use crate::batch::{FieldReader, RecordError, RecordHandler, normalize_key};
use crate::db::SyncTx;

#[derive(Debug, Clone)]
pub struct StockRecord {
    pub product_reference: String,
    pub business_unit: String,
    pub stock: Decimal,
    pub is_active: Option<bool>,
}

pub struct StockHandler {
    /// Physically delete rows received with `is_active = 0`
    pub delete_inactive: bool,
}

#[async_trait]
impl RecordHandler for StockHandler {
    type Record = StockRecord;

    const PROCESS: SyncProcess = SyncProcess::ProductStock;
    const RECORD_ARRAY: &'static str = "product_stock";
    const REQUIRED: &'static [&'static str] = &["product_reference", "business_unit", "stock"];
    const ID_FIELDS: &'static [&'static str] = &["business_unit", "product_reference"];

    fn parse(&self, raw: &Map<String, Value>) -> Result<StockRecord, RecordError> {
        let mut reader = FieldReader::new(raw);
        let product_reference = reader.text("product_reference", 50);
        let business_unit = reader.text("business_unit", 100);
        let stock = reader.decimal("stock", Decimal::ZERO, None);
        let is_active = reader.flag("is_active");
        reader.finish()?;

        Ok(StockRecord {
            product_reference: product_reference.unwrap_or_default(),
            business_unit: business_unit.unwrap_or_default(),
            stock: stock.unwrap_or_default(),
            is_active,
        })
    }

    fn natural_key(&self, record: &StockRecord) -> String {
        normalize_key(&[&record.product_reference, &record.business_unit])
    }

    async fn apply(
        &self,
        tx: &mut dyn SyncTx,
        record: &StockRecord,
    ) -> Result<SyncResult, RecordError> {
        let city = tx
            .find_city_by_name(&record.business_unit)
            .await?
            .ok_or_else(|| RecordError::city_not_found(&record.business_unit))?;
        let product = tx
            .find_product(&record.product_reference)
            .await?
            .ok_or_else(|| RecordError::product_not_found(&record.product_reference))?;

        let existing = tx.find_stock(&product.reference, city.id).await?;

        if self.delete_inactive && record.is_active == Some(false) {
            if let Some(id) = existing.and_then(|s| s.id) {
                tx.remove_stock(id).await?;
            }
            return Ok(SyncResult::Deleted);
        }

        let now = shared::util::now_millis();
        let (stock, result) = match existing {
            Some(mut existing) => {
                existing.stock = record.stock;
                if let Some(active) = record.is_active {
                    existing.is_active = active;
                }
                existing.modified = now;
                (existing, SyncResult::Updated)
            }
            None => (
                ProductStock {
                    id: None,
                    product_reference: product.reference,
                    city_id: city.id,
                    stock: record.stock,
                    is_active: record.is_active.unwrap_or(true),
                    created: now,
                    modified: now,
                },
                SyncResult::Created,
            ),
        };

        tx.save_stock(&stock).await?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch;
    use crate::db::memory::{MemoryAudit, MemoryDb};
    use serde_json::json;
    use shared::error::ErrorCode;

    fn stock(reference: &str, unit: &str, qty: i64) -> Value {
        json!({ "product_reference": reference, "business_unit": unit, "stock": qty })
    }

    #[tokio::test]
    async fn test_stock_per_business_unit() {
        let db = MemoryDb::new();
        let bogota = db.add_city("Bogota");
        let cali = db.add_city("Cali");
        db.add_product("P-1");
        let audit = MemoryAudit::default();
        let handler = StockHandler { delete_inactive: false };

        let records = vec![stock("P-1", "Bogota", 10), stock("P-1", "Cali", 4)];
        let report = batch::run(&handler, &db, &audit, &records, 100)
            .await
            .unwrap();
        assert_eq!(report.created, 2);

        let report = batch::run(&handler, &db, &audit, &[stock("p-1", "BOGOTA", 7)], 100)
            .await
            .unwrap();
        assert_eq!(report.updated, 1);

        let rows = db.snapshot().stock;
        assert_eq!(rows.len(), 2);
        let in_bogota = rows.iter().find(|s| s.city_id == bogota).unwrap();
        assert_eq!(in_bogota.stock, Decimal::from(7));
        assert_eq!(in_bogota.product_reference, "P-1");
        let in_cali = rows.iter().find(|s| s.city_id == cali).unwrap();
        assert_eq!(in_cali.stock, Decimal::from(4));
    }

    #[tokio::test]
    async fn test_stock_duplicate_and_negative() {
        let db = MemoryDb::new();
        db.add_city("Bogota");
        db.add_product("P-1");
        db.add_product("P-2");
        let audit = MemoryAudit::default();
        let handler = StockHandler { delete_inactive: false };

        let records = vec![
            stock("P-1", "Bogota", 10),
            stock(" p-1", "bogota ", 12),
            stock("P-2", "Bogota", -3),
        ];
        let report = batch::run(&handler, &db, &audit, &records, 1)
            .await
            .unwrap();
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failures[0].index, 1);
        assert_eq!(report.failures[0].code, ErrorCode::DuplicateInBatch);
        assert_eq!(report.failures[1].index, 2);
        assert_eq!(report.failures[1].fields, vec!["stock"]);
        assert_eq!(db.snapshot().stock[0].stock, Decimal::from(10));
    }

    #[tokio::test]
    async fn test_inactive_stock_deleted_when_enabled() {
        let db = MemoryDb::new();
        db.add_city("Bogota");
        db.add_product("P-1");
        let audit = MemoryAudit::default();
        let handler = StockHandler { delete_inactive: true };

        batch::run(&handler, &db, &audit, &[stock("P-1", "Bogota", 10)], 100)
            .await
            .unwrap();
        let mut inactive = stock("P-1", "Bogota", 0);
        inactive["is_active"] = json!(false);

        let report = batch::run(&handler, &db, &audit, &[inactive], 100)
            .await
            .unwrap();
        assert_eq!(report.deleted, 1);
        assert!(db.snapshot().stock.is_empty());
    }
}
