//! Product unit-of-measure ordering rules, one row per product

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use shared::models::ProdUom;
use shared::sync::{SyncProcess, SyncResult};

use crate::batch::{FieldReader, RecordError, RecordHandler, normalize_key};
use crate::db::SyncTx;

#[derive(Debug, Clone)]
pub struct UomRecord {
    pub product_reference: String,
    pub unit_of_measure: String,
    pub min_order_qty: Option<Decimal>,
    pub max_order_qty: Option<Decimal>,
    pub order_increment: Option<Decimal>,
    pub is_active: Option<bool>,
}

pub struct UomHandler {
    /// Physically delete rows received with `is_active = 0`
    pub delete_inactive: bool,
}

#[async_trait]
impl RecordHandler for UomHandler {
    type Record = UomRecord;

    const PROCESS: SyncProcess = SyncProcess::ProdUom;
    const RECORD_ARRAY: &'static str = "product_unit_of_measure";
    const REQUIRED: &'static [&'static str] = &["product_reference", "unit_of_measure"];
    const ID_FIELDS: &'static [&'static str] = &["product_reference"];

    fn parse(&self, raw: &Map<String, Value>) -> Result<UomRecord, RecordError> {
        let mut reader = FieldReader::new(raw);
        let product_reference = reader.text("product_reference", 50);
        let unit_of_measure = reader.text("unit_of_measure", 20);
        let min_order_qty = reader.decimal("min_order_qty", Decimal::ZERO, None);
        let max_order_qty = reader.decimal("max_order_qty", Decimal::ZERO, None);
        let order_increment = reader.positive_decimal("order_increment");
        let is_active = reader.flag("is_active");
        reader.finish()?;

        Ok(UomRecord {
            product_reference: product_reference.unwrap_or_default(),
            unit_of_measure: unit_of_measure.unwrap_or_default(),
            min_order_qty,
            max_order_qty,
            order_increment,
            is_active,
        })
    }

    fn natural_key(&self, record: &UomRecord) -> String {
        normalize_key(&[&record.product_reference])
    }

    async fn apply(
        &self,
        tx: &mut dyn SyncTx,
        record: &UomRecord,
    ) -> Result<SyncResult, RecordError> {
        let product = tx
            .find_product(&record.product_reference)
            .await?
            .ok_or_else(|| RecordError::product_not_found(&record.product_reference))?;

        let existing = tx.find_uom(&product.reference).await?;

        if self.delete_inactive && record.is_active == Some(false) {
            if existing.is_some() {
                tx.remove_uom(&product.reference).await?;
            }
            return Ok(SyncResult::Deleted);
        }

        let now = shared::util::now_millis();
        let (uom, result) = match existing {
            Some(mut existing) => {
                existing.unit_of_measure = record.unit_of_measure.clone();
                if let Some(min) = record.min_order_qty {
                    existing.min_order_qty = min;
                }
                if record.max_order_qty.is_some() {
                    existing.max_order_qty = record.max_order_qty;
                }
                if let Some(increment) = record.order_increment {
                    existing.order_increment = increment;
                }
                if let Some(active) = record.is_active {
                    existing.is_active = active;
                }
                existing.modified = now;
                (existing, SyncResult::Updated)
            }
            None => (
                ProdUom {
                    product_reference: product.reference,
                    unit_of_measure: record.unit_of_measure.clone(),
                    min_order_qty: record.min_order_qty.unwrap_or(Decimal::ONE),
                    max_order_qty: record.max_order_qty,
                    order_increment: record.order_increment.unwrap_or(Decimal::ONE),
                    is_active: record.is_active.unwrap_or(true),
                    created: now,
                    modified: now,
                },
                SyncResult::Created,
            ),
        };

        check_order_range(&uom)?;
        tx.save_uom(&uom).await?;
        Ok(result)
    }
}

/// `max_order_qty` must not fall below the minimum the row ends up with
fn check_order_range(uom: &ProdUom) -> Result<(), RecordError> {
    match uom.max_order_qty {
        Some(max) if max < uom.min_order_qty => Err(RecordError::Invalid {
            fields: vec!["max_order_qty".to_string()],
            violations: vec![format!(
                "max_order_qty: must be greater than or equal to min_order_qty ({})",
                uom.min_order_qty
            )],
        }),
        _ => Ok(()),
    }
}
