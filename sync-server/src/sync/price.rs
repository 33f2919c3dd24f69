//! Product prices, keyed by catalog, business unit and product reference

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use shared::models::ProductPrice;
use shared::sync::{SyncProcess, SyncResult};

use crate::batch::{FieldReader, RecordError, RecordHandler, normalize_key};
use crate::db::SyncTx;

#[derive(Debug, Clone)]
pub struct PriceRecord {
    pub catalog: String,
    pub business_unit: String,
    pub product_reference: String,
    pub price: Decimal,
    pub discount: Option<Decimal>,
    pub vlr_impu_consumo: Option<Decimal>,
    pub is_active: Option<bool>,
}

pub struct PriceHandler {
    /// Physically delete rows received with `is_active = 0`
    pub delete_inactive: bool,
}

#[async_trait]
impl RecordHandler for PriceHandler {
    type Record = PriceRecord;

    const PROCESS: SyncProcess = SyncProcess::ProductPrice;
    const RECORD_ARRAY: &'static str = "product_prices";
    const REQUIRED: &'static [&'static str] =
        &["catalog", "business_unit", "product_reference", "price"];
    const ID_FIELDS: &'static [&'static str] = &["business_unit", "catalog", "product_reference"];

    fn parse(&self, raw: &Map<String, Value>) -> Result<PriceRecord, RecordError> {
        let mut reader = FieldReader::new(raw);
        let catalog = reader.text("catalog", 100);
        let business_unit = reader.text("business_unit", 100);
        let product_reference = reader.text("product_reference", 50);
        let price = reader.decimal("price", Decimal::ZERO, None);
        let discount = reader.decimal("discount", Decimal::ZERO, Some(Decimal::ONE_HUNDRED));
        let vlr_impu_consumo = reader.decimal("vlr_impu_consumo", Decimal::ZERO, None);
        let is_active = reader.flag("is_active");
        reader.finish()?;

        Ok(PriceRecord {
            catalog: catalog.unwrap_or_default(),
            business_unit: business_unit.unwrap_or_default(),
            product_reference: product_reference.unwrap_or_default(),
            price: price.unwrap_or_default(),
            discount,
            vlr_impu_consumo,
            is_active,
        })
    }

    fn natural_key(&self, record: &PriceRecord) -> String {
        normalize_key(&[
            &record.catalog,
            &record.business_unit,
            &record.product_reference,
        ])
    }

    async fn apply(
        &self,
        tx: &mut dyn SyncTx,
        record: &PriceRecord,
    ) -> Result<SyncResult, RecordError> {
        let city = tx
            .find_city_by_name(&record.business_unit)
            .await?
            .ok_or_else(|| RecordError::city_not_found(&record.business_unit))?;
        let catalog_id = tx
            .find_catalog(&record.catalog, city.id)
            .await?
            .and_then(|c| c.id)
            .ok_or_else(|| RecordError::catalog_not_found(&record.catalog))?;
        let product = tx
            .find_product(&record.product_reference)
            .await?
            .ok_or_else(|| RecordError::product_not_found(&record.product_reference))?;

        let existing = tx.find_price(catalog_id, &product.reference).await?;

        if self.delete_inactive && record.is_active == Some(false) {
            if existing.is_some() {
                tx.remove_price(catalog_id, &product.reference).await?;
            }
            return Ok(SyncResult::Deleted);
        }

        let now = shared::util::now_millis();
        let (price, result) = match existing {
            Some(mut existing) => {
                existing.price = record.price;
                if let Some(discount) = record.discount {
                    existing.discount = discount;
                }
                if let Some(tax) = record.vlr_impu_consumo {
                    existing.vlr_impu_consumo = tax;
                }
                if let Some(active) = record.is_active {
                    existing.is_active = active;
                }
                existing.modified = now;
                (existing, SyncResult::Updated)
            }
            None => (
                ProductPrice {
                    catalog_id,
                    product_reference: product.reference,
                    price: record.price,
                    discount: record.discount.unwrap_or(Decimal::ZERO),
                    vlr_impu_consumo: record.vlr_impu_consumo.unwrap_or(Decimal::ZERO),
                    is_active: record.is_active.unwrap_or(true),
                    created: now,
                    modified: now,
                },
                SyncResult::Created,
            ),
        };

        tx.save_price(&price).await?;
        Ok(result)
    }
}
