//! Products, keyed by reference

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use shared::models::Product;
use shared::sync::{SyncProcess, SyncResult};

use crate::batch::{FieldReader, RecordError, RecordHandler, normalize_key};
use crate::db::SyncTx;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Optional fields stay `None` when absent so an update keeps the stored value.
#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub reference: String,
    pub name: String,
    pub packing: Option<String>,
    pub convertion_rate: Option<Decimal>,
    pub vat_group: Option<String>,
    pub vat: Option<Decimal>,
    pub packing_to: Option<String>,
    pub is_active: Option<bool>,
}

/// Products are never deleted; `is_active = 0` only deactivates them.
pub struct ProductHandler;

#[async_trait]
impl RecordHandler for ProductHandler {
    type Record = ProductRecord;

    const PROCESS: SyncProcess = SyncProcess::Product;
    const RECORD_ARRAY: &'static str = "products";
    const REQUIRED: &'static [&'static str] = &["reference", "name"];
    const ID_FIELDS: &'static [&'static str] = &["reference"];

    fn parse(&self, raw: &Map<String, Value>) -> Result<ProductRecord, RecordError> {
        let mut reader = FieldReader::new(raw);
        let reference = reader.text("reference", 50);
        let name = reader.text("name", 255);
        let packing = reader.text("packing", 50);
        let convertion_rate = reader.decimal("convertion_rate", Decimal::ZERO, None);
        let vat_group = reader.text("vat_group", 20);
        let vat = reader.decimal("vat", Decimal::ZERO, Some(HUNDRED));
        let packing_to = reader.text("packing_to", 50);
        let is_active = reader.flag("is_active");
        reader.finish()?;

        Ok(ProductRecord {
            reference: reference.unwrap_or_default(),
            name: name.unwrap_or_default(),
            packing,
            convertion_rate,
            vat_group,
            vat,
            packing_to,
            is_active,
        })
    }

    fn natural_key(&self, record: &ProductRecord) -> String {
        normalize_key(&[&record.reference])
    }

    async fn apply(
        &self,
        tx: &mut dyn SyncTx,
        record: &ProductRecord,
    ) -> Result<SyncResult, RecordError> {
        let now = shared::util::now_millis();

        let (product, result) = match tx.find_product(&record.reference).await? {
            Some(mut existing) => {
                existing.name = record.name.clone();
                if record.packing.is_some() {
                    existing.packing = record.packing.clone();
                }
                if let Some(rate) = record.convertion_rate {
                    existing.convertion_rate = rate;
                }
                if record.vat_group.is_some() {
                    existing.vat_group = record.vat_group.clone();
                }
                if let Some(vat) = record.vat {
                    existing.vat = vat;
                }
                if record.packing_to.is_some() {
                    existing.packing_to = record.packing_to.clone();
                }
                if let Some(active) = record.is_active {
                    existing.is_active = active;
                }
                existing.modified = now;
                (existing, SyncResult::Updated)
            }
            None => (
                Product {
                    reference: record.reference.clone(),
                    name: record.name.clone(),
                    packing: record.packing.clone(),
                    convertion_rate: record.convertion_rate.unwrap_or(Decimal::ONE),
                    vat_group: record.vat_group.clone(),
                    vat: record.vat.unwrap_or(Decimal::ZERO),
                    packing_to: record.packing_to.clone(),
                    is_active: record.is_active.unwrap_or(true),
                    created: now,
                    modified: now,
                },
                SyncResult::Created,
            ),
        };

        tx.save_product(&product).await?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{self, BatchOutcome};
    use crate::db::memory::{MemoryAudit, MemoryDb};
    use serde_json::json;

    fn valid(reference: &str) -> Value {
        json!({
            "reference": reference,
            "name": "Arroz Diana 500g",
            "packing": "UND",
            "convertion_rate": "12",
            "vat": 19,
        })
    }

    #[tokio::test]
    async fn test_three_valid_one_missing() {
        let db = MemoryDb::new();
        let audit = MemoryAudit::default();
        let records = vec![
            valid("P-1"),
            valid("P-2"),
            json!({ "reference": "P-3" }),
            valid("P-4"),
        ];

        let report = batch::run(&ProductHandler, &db, &audit, &records, 100)
            .await
            .unwrap();
        assert_eq!(report.outcome(), BatchOutcome::Partial);
        assert_eq!(report.succeeded() + report.failures.len(), records.len());

        let response = report.into_bulk_response();
        assert!(response.response.message.contains("3 of 4"));
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].index, 2);
        assert_eq!(response.errors[0].fields, vec!["name"]);
    }

    #[tokio::test]
    async fn test_resubmitting_updates_without_duplicating() {
        let db = MemoryDb::new();
        let audit = MemoryAudit::default();
        let records = vec![valid("P-1"), valid("P-2")];

        let first = batch::run(&ProductHandler, &db, &audit, &records, 100)
            .await
            .unwrap();
        assert_eq!(first.created, 2);
        let second = batch::run(&ProductHandler, &db, &audit, &records, 100)
            .await
            .unwrap();
        assert_eq!(second.updated, 2);
        assert_eq!(db.snapshot().products.len(), 2);
    }

    #[tokio::test]
    async fn test_update_keeps_fields_not_sent() {
        let db = MemoryDb::new();
        let audit = MemoryAudit::default();

        batch::run(&ProductHandler, &db, &audit, &[valid("P-1")], 100)
            .await
            .unwrap();
        let records = vec![json!({ "reference": "P-1", "name": "Arroz 1kg", "is_active": 0 })];
        batch::run(&ProductHandler, &db, &audit, &records, 100)
            .await
            .unwrap();

        let products = db.snapshot().products;
        assert_eq!(products.len(), 1);
        let product = &products[0];
        assert_eq!(product.name, "Arroz 1kg");
        assert_eq!(product.packing.as_deref(), Some("UND"));
        assert_eq!(product.convertion_rate, Decimal::from(12));
        assert_eq!(product.vat, Decimal::from(19));
        assert!(!product.is_active);
    }

    #[tokio::test]
    async fn test_defaults_on_create() {
        let db = MemoryDb::new();
        let audit = MemoryAudit::default();
        let records = vec![json!({ "reference": "P-1", "name": "Sal" })];

        batch::run(&ProductHandler, &db, &audit, &records, 100)
            .await
            .unwrap();
        let product = db.snapshot().products.remove(0);
        assert_eq!(product.convertion_rate, Decimal::ONE);
        assert_eq!(product.vat, Decimal::ZERO);
        assert!(product.is_active);
    }

    #[tokio::test]
    async fn test_vat_out_of_range() {
        let db = MemoryDb::new();
        let audit = MemoryAudit::default();
        let records = vec![
            json!({ "reference": "P-1", "name": "Sal", "vat": 120 }),
            valid("P-2"),
        ];

        let report = batch::run(&ProductHandler, &db, &audit, &records, 100)
            .await
            .unwrap();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].fields, vec!["vat"]);
        assert_eq!(
            report.failures[0].message,
            "Invalid fields: vat: must be between 0 and 100"
        );
    }
}
