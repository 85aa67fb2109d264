//! Presentation binding.
//!
//! The presentation consumes a typed snapshot of *validated* pricing rows
//! rather than having script text spliced into it. Publishing goes through a
//! [`ContentPatcher`]; the default one does nothing, so a plain update run
//! never touches the presentation.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::PathBuf;

use chrono::{DateTime, Local, NaiveDate};
use log::info;
use serde::{Deserialize, Serialize};

use crate::domain::{BusinessModel, PricingRecord, Product, UpdaterConfig, ValidationStatus};
use crate::error::AppError;
use crate::io::store::PricingStore;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Latest validated figures for one business model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFigures {
    pub as_of: NaiveDate,
    pub source: String,
    pub prices: Range,
    pub costs: Range,
    pub roi_pct: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductFigures {
    pub name: String,
    pub models: BTreeMap<BusinessModel, ModelFigures>,
}

/// Snapshot handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationData {
    pub generated_at: DateTime<Local>,
    pub products: BTreeMap<Product, ProductFigures>,
}

impl PresentationData {
    /// Keep the latest `VALIDADO` row per (product, model). Later rows win
    /// ties on date.
    pub fn from_records(records: &[PricingRecord], generated_at: DateTime<Local>) -> Self {
        let mut products: BTreeMap<Product, ProductFigures> = BTreeMap::new();

        for r in records.iter().filter(|r| r.status == ValidationStatus::Validated) {
            let entry = products.entry(r.product).or_insert_with(|| ProductFigures {
                name: r.product.display_name().to_string(),
                models: BTreeMap::new(),
            });

            let newer = entry
                .models
                .get(&r.business_model)
                .is_none_or(|existing| r.date >= existing.as_of);
            if newer {
                entry.models.insert(
                    r.business_model,
                    ModelFigures {
                        as_of: r.date,
                        source: r.source.clone(),
                        prices: Range { min: r.price_min, max: r.price_max },
                        costs: Range { min: r.cost_min, max: r.cost_max },
                        roi_pct: Range { min: r.roi_min, max: r.roi_max },
                    },
                );
            }
        }

        Self { generated_at, products }
    }

    pub fn entry_count(&self) -> usize {
        self.products.values().map(|p| p.models.len()).sum()
    }
}

/// Where validated data ends up for the presentation.
pub trait ContentPatcher {
    fn patch(&self, data: &PresentationData) -> Result<(), AppError>;
}

/// Publishing disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPatcher;

impl ContentPatcher for NoopPatcher {
    fn patch(&self, data: &PresentationData) -> Result<(), AppError> {
        info!(
            "Presentation update disabled; {} validated entries not published",
            data.entry_count()
        );
        Ok(())
    }
}

/// Writes the snapshot as pretty JSON for the presentation to load.
#[derive(Debug, Clone)]
pub struct JsonBindingPatcher {
    path: PathBuf,
}

impl JsonBindingPatcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ContentPatcher for JsonBindingPatcher {
    fn patch(&self, data: &PresentationData) -> Result<(), AppError> {
        let file = File::create(&self.path).map_err(|e| {
            AppError::io(format!("Failed to create presentation data '{}': {e}", self.path.display()))
        })?;
        serde_json::to_writer_pretty(file, data)
            .map_err(|e| AppError::io(format!("Failed to write presentation data: {e}")))?;
        info!(
            "Presentation data updated with {} entries at {}",
            data.entry_count(),
            self.path.display()
        );
        Ok(())
    }
}

/// The patcher selected by configuration.
pub fn patcher_for(config: &UpdaterConfig) -> Box<dyn ContentPatcher> {
    match &config.presentation_file {
        Some(path) => Box::new(JsonBindingPatcher::new(path.clone())),
        None => Box::new(NoopPatcher),
    }
}

/// Build the snapshot from the table and hand it to `patcher`.
pub fn publish(
    store: &PricingStore,
    patcher: &dyn ContentPatcher,
    now: DateTime<Local>,
) -> Result<PresentationData, AppError> {
    let records = store.read_all()?;
    let data = PresentationData::from_records(&records, now);
    patcher.patch(&data)?;
    Ok(data)
}
