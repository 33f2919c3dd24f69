//! Catalogs, keyed by name within a business unit

use async_trait::async_trait;
use serde_json::{Map, Value};
use shared::models::Catalog;
use shared::sync::{SyncProcess, SyncResult};

use crate::batch::{FieldReader, RecordError, RecordHandler, normalize_key};
use crate::db::SyncTx;

#[derive(Debug, Clone)]
pub struct CatalogRecord {
    pub name: String,
    pub business_unit: String,
    pub is_active: Option<bool>,
}

/// Catalogs are never deleted; `is_active = 0` only deactivates them.
pub struct CatalogHandler;

#[async_trait]
impl RecordHandler for CatalogHandler {
    type Record = CatalogRecord;

    const PROCESS: SyncProcess = SyncProcess::Catalog;
    const RECORD_ARRAY: &'static str = "catalogs";
    const REQUIRED: &'static [&'static str] = &["name", "business_unit"];
    const ID_FIELDS: &'static [&'static str] = &["business_unit", "name"];

    fn parse(&self, raw: &Map<String, Value>) -> Result<CatalogRecord, RecordError> {
        let mut reader = FieldReader::new(raw);
        let name = reader.text("name", 100);
        let business_unit = reader.text("business_unit", 100);
        let is_active = reader.flag("is_active");
        reader.finish()?;

        Ok(CatalogRecord {
            name: name.unwrap_or_default(),
            business_unit: business_unit.unwrap_or_default(),
            is_active,
        })
    }

    fn natural_key(&self, record: &CatalogRecord) -> String {
        normalize_key(&[&record.name, &record.business_unit])
    }

    async fn apply(
        &self,
        tx: &mut dyn SyncTx,
        record: &CatalogRecord,
    ) -> Result<SyncResult, RecordError> {
        let city = tx
            .find_city_by_name(&record.business_unit)
            .await?
            .ok_or_else(|| RecordError::city_not_found(&record.business_unit))?;
        let now = shared::util::now_millis();

        let (catalog, result) = match tx.find_catalog(&record.name, city.id).await? {
            // Name matched case-insensitively; the stored casing is kept
            Some(mut existing) => {
                if let Some(active) = record.is_active {
                    existing.is_active = active;
                }
                existing.modified = now;
                (existing, SyncResult::Updated)
            }
            None => (
                Catalog {
                    id: None,
                    name: record.name.clone(),
                    city_id: city.id,
                    is_active: record.is_active.unwrap_or(true),
                    created: now,
                    modified: now,
                },
                SyncResult::Created,
            ),
        };

        tx.save_catalog(&catalog).await?;
        Ok(result)
    }
}
