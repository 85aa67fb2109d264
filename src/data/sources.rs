//! Per-source payload handlers.
//!
//! None of these touch the network yet: each returns the fixed figures the
//! updater has been seeded with, stamped with the fetch time. They are the
//! seam where real scrapers/API clients plug in. A handler still refuses an
//! endpoint with no URL, so misconfiguration surfaces as a fetch error.

use chrono::{DateTime, Local};

use crate::domain::{
    FIELD_CONFIDENCE, FIELD_INFLATION_FACTOR, FIELD_PRICE_MAX, FIELD_PRICE_MIN, FetchedData, Product,
    SourceEndpoint,
};
use crate::error::AppError;

const ALIBABA_PRICE_MIN_USD: f64 = 250.0;
const ALIBABA_PRICE_MAX_USD: f64 = 320.0;
const ALIBABA_CONFIDENCE: f64 = 0.8;

const DANE_INFLATION_FACTOR: f64 = 1.05;

fn require_url(endpoint: &SourceEndpoint) -> Result<&str, AppError> {
    let url = endpoint.url.trim();
    if url.is_empty() {
        return Err(AppError::config(format!("No URL configured for source {}", endpoint.id)));
    }
    Ok(url)
}

/// Essential-oil listing prices (USD).
pub fn alibaba_essential_oils(
    _product: Product,
    endpoint: &SourceEndpoint,
    now: DateTime<Local>,
) -> Result<FetchedData, AppError> {
    require_url(endpoint)?;
    Ok(FetchedData::new("alibaba", now)
        .with_field(FIELD_PRICE_MIN, ALIBABA_PRICE_MIN_USD)
        .with_field(FIELD_PRICE_MAX, ALIBABA_PRICE_MAX_USD)
        .with_field(FIELD_CONFIDENCE, ALIBABA_CONFIDENCE))
}

/// Producer price index; only carries an inflation factor, no prices.
pub fn dane_ipp(_product: Product, endpoint: &SourceEndpoint, now: DateTime<Local>) -> Result<FetchedData, AppError> {
    require_url(endpoint)?;
    Ok(FetchedData::new("dane", now).with_field(FIELD_INFLATION_FACTOR, DANE_INFLATION_FACTOR))
}
