//! Run configuration.
//!
//! Resolution order is defaults, then environment (a `.env` file is loaded
//! first if present), then command-line overrides applied by `app`.

use std::path::PathBuf;

use crate::domain::{BusinessModel, Product, SourceEndpoint, SourceId};
use crate::error::AppError;

pub const DEFAULT_DATA_FILE: &str = "ROI_Data_Template.csv";
pub const DEFAULT_MAX_DEVIATION: f64 = 0.30;
pub const DEFAULT_REPORT_WINDOW_DAYS: i64 = 30;
/// Upper bound on the report window (about a century).
pub const MAX_REPORT_WINDOW_DAYS: i64 = 36_500;

/// Everything a run needs, passed explicitly so tests can swap any part.
#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    /// Pricing table (CSV).
    pub data_file: PathBuf,
    /// Directory the dated report file is written to.
    pub report_dir: PathBuf,
    /// Target of the JSON presentation binding. `None` keeps publishing inert.
    pub presentation_file: Option<PathBuf>,

    pub products: Vec<Product>,
    pub models: Vec<BusinessModel>,

    /// Sources the fetcher recognizes.
    pub sources: Vec<SourceEndpoint>,
    /// Source every (product, model) pair is fetched from during a cycle.
    pub cycle_source: SourceId,

    /// Largest accepted relative change of `price_min` against the baseline.
    pub max_price_deviation: f64,
    pub report_window_days: i64,
    /// Fan fetches out over the rayon pool.
    pub parallel_fetch: bool,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            report_dir: PathBuf::from("."),
            presentation_file: None,
            products: Product::ALL.to_vec(),
            models: BusinessModel::ALL.to_vec(),
            sources: SourceId::ALL.into_iter().map(SourceEndpoint::with_default_url).collect(),
            cycle_source: SourceId::AlibabaEssentialOils,
            max_price_deviation: DEFAULT_MAX_DEVIATION,
            report_window_days: DEFAULT_REPORT_WINDOW_DAYS,
            parallel_fetch: true,
        }
    }
}

impl UpdaterConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the process environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(path) = get("ROI_DATA_FILE") {
            config.data_file = PathBuf::from(path);
        }
        if let Some(dir) = get("ROI_REPORT_DIR") {
            config.report_dir = PathBuf::from(dir);
        }
        if let Some(path) = get("ROI_PRESENTATION_FILE") {
            config.presentation_file = Some(PathBuf::from(path));
        }
        if let Some(raw) = get("ROI_SOURCE") {
            config.cycle_source = SourceId::parse(&raw)
                .ok_or_else(|| AppError::config(format!("ROI_SOURCE: unknown source '{raw}'.")))?;
        }
        if let Some(raw) = get("ROI_MAX_DEVIATION") {
            let value = raw
                .parse::<f64>()
                .map_err(|e| AppError::config(format!("ROI_MAX_DEVIATION: invalid number '{raw}': {e}")))?;
            if !(value.is_finite() && value > 0.0) {
                return Err(AppError::config("ROI_MAX_DEVIATION must be finite and > 0."));
            }
            config.max_price_deviation = value;
        }
        if let Some(raw) = get("ROI_REPORT_WINDOW_DAYS") {
            let value = raw
                .parse::<i64>()
                .map_err(|e| AppError::config(format!("ROI_REPORT_WINDOW_DAYS: invalid integer '{raw}': {e}")))?;
            if !(1..=MAX_REPORT_WINDOW_DAYS).contains(&value) {
                return Err(AppError::config(format!(
                    "ROI_REPORT_WINDOW_DAYS must be between 1 and {MAX_REPORT_WINDOW_DAYS}."
                )));
            }
            config.report_window_days = value;
        }

        Ok(config)
    }
}
