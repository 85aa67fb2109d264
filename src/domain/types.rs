//! Shared domain types.
//!
//! The enumerations here are closed sets: the table only ever carries these
//! products, business models and statuses, and the fetcher only knows these
//! sources. Each one maps to the exact token used in the table file.

use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Product lines tracked in the pricing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Product {
    Aceite,
    Nutraceutico,
    Pulpa,
}

impl Product {
    pub const ALL: [Product; 3] = [Product::Aceite, Product::Nutraceutico, Product::Pulpa];

    /// Token stored in the `Producto` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Product::Aceite => "aceite",
            Product::Nutraceutico => "nutraceutico",
            Product::Pulpa => "pulpa",
        }
    }

    /// Title-cased label for the report.
    pub fn display_name(self) -> &'static str {
        match self {
            Product::Aceite => "Aceite",
            Product::Nutraceutico => "Nutraceutico",
            Product::Pulpa => "Pulpa",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(raw.trim()))
    }
}

/// Business models a product can be sold under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusinessModel {
    Maquila,
    Planta,
    Hibrido,
}

impl BusinessModel {
    pub const ALL: [BusinessModel; 3] = [BusinessModel::Maquila, BusinessModel::Planta, BusinessModel::Hibrido];

    /// Token stored in the `Modelo_Negocio` column.
    pub fn as_str(self) -> &'static str {
        match self {
            BusinessModel::Maquila => "maquila",
            BusinessModel::Planta => "planta",
            BusinessModel::Hibrido => "hibrido",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            BusinessModel::Maquila => "Maquila",
            BusinessModel::Planta => "Planta",
            BusinessModel::Hibrido => "Hibrido",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(raw.trim()))
    }
}

/// Review state of a stored row.
///
/// The updater only writes `Pending`; promotion to `Validated` or `Rejected`
/// happens by hand outside this tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStatus {
    Pending,
    Validated,
    Rejected,
}

impl ValidationStatus {
    /// Token stored in the `Validado` column.
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationStatus::Pending => "PENDIENTE",
            ValidationStatus::Validated => "VALIDADO",
            ValidationStatus::Rejected => "RECHAZADO",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDIENTE" => Some(ValidationStatus::Pending),
            "VALIDADO" => Some(ValidationStatus::Validated),
            "RECHAZADO" => Some(ValidationStatus::Rejected),
            _ => None,
        }
    }
}

/// Market data sources the fetcher can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum SourceId {
    #[value(name = "alibaba_essential_oils")]
    AlibabaEssentialOils,
    #[value(name = "dane_ipp")]
    DaneIpp,
    #[value(name = "bolsa_mercantil")]
    BolsaMercantil,
    #[value(name = "xm_energy")]
    XmEnergy,
}

impl SourceId {
    pub const ALL: [SourceId; 4] = [
        SourceId::AlibabaEssentialOils,
        SourceId::DaneIpp,
        SourceId::BolsaMercantil,
        SourceId::XmEnergy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SourceId::AlibabaEssentialOils => "alibaba_essential_oils",
            SourceId::DaneIpp => "dane_ipp",
            SourceId::BolsaMercantil => "bolsa_mercantil",
            SourceId::XmEnergy => "xm_energy",
        }
    }

    /// Reference page each source would be scraped from.
    pub fn default_url(self) -> &'static str {
        match self {
            SourceId::AlibabaEssentialOils => {
                "https://www.alibaba.com/trade/search?SearchText=passion+fruit+essential+oil"
            }
            SourceId::DaneIpp => {
                "https://www.dane.gov.co/index.php/estadisticas-por-tema/precios-y-costos/indice-de-precios-al-productor-ipp"
            }
            SourceId::BolsaMercantil => "https://www.bolsamercantil.com.co/",
            SourceId::XmEnergy => "https://www.xm.com.co/",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(raw.trim()))
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configured source and the endpoint it would be read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEndpoint {
    pub id: SourceId,
    pub url: String,
}

impl SourceEndpoint {
    pub fn with_default_url(id: SourceId) -> Self {
        Self {
            id,
            url: id.default_url().to_string(),
        }
    }
}

pub const FIELD_PRICE_MIN: &str = "price_min";
pub const FIELD_PRICE_MAX: &str = "price_max";
pub const FIELD_COST_MIN: &str = "cost_min";
pub const FIELD_COST_MAX: &str = "cost_max";
pub const FIELD_ROI_MIN: &str = "roi_min";
pub const FIELD_ROI_MAX: &str = "roi_max";
pub const FIELD_CONFIDENCE: &str = "confidence";
pub const FIELD_INFLATION_FACTOR: &str = "inflation_factor";

/// Raw payload returned by a source handler.
///
/// The set of numeric fields differs per source; nothing here normalizes
/// them. Only the price/cost/ROI fields survive into a [`PricingRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedData {
    /// Short source name written to the `Fuente` column.
    pub source: String,
    pub timestamp: DateTime<Local>,
    pub fields: BTreeMap<String, f64>,
}

impl FetchedData {
    pub fn new(source: impl Into<String>, timestamp: DateTime<Local>) -> Self {
        Self {
            source: source.into(),
            timestamp,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: f64) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.fields.get(name).copied()
    }

    pub fn price_min(&self) -> Option<f64> {
        self.get(FIELD_PRICE_MIN)
    }
}

/// One row of the pricing table.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingRecord {
    pub date: NaiveDate,
    pub source: String,
    pub product: Product,
    pub business_model: BusinessModel,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub cost_min: Option<f64>,
    pub cost_max: Option<f64>,
    /// Percent.
    pub roi_min: Option<f64>,
    /// Percent.
    pub roi_max: Option<f64>,
    pub notes: String,
    pub status: ValidationStatus,
}

impl PricingRecord {
    /// Build the row the update cycle appends for an accepted fetch.
    pub fn from_fetched(
        product: Product,
        business_model: BusinessModel,
        data: &FetchedData,
        date: NaiveDate,
    ) -> Self {
        Self {
            date,
            source: data.source.clone(),
            product,
            business_model,
            price_min: data.get(FIELD_PRICE_MIN),
            price_max: data.get(FIELD_PRICE_MAX),
            cost_min: data.get(FIELD_COST_MIN),
            cost_max: data.get(FIELD_COST_MAX),
            roi_min: data.get(FIELD_ROI_MIN),
            roi_max: data.get(FIELD_ROI_MAX),
            notes: format!("Auto-updated from {}", data.source),
            status: ValidationStatus::Pending,
        }
    }

    pub fn matches(&self, product: Product, business_model: BusinessModel) -> bool {
        self.product == product && self.business_model == business_model
    }
}
