//! The update cycle shared by every command that refreshes the table.
//!
//! fetch (possibly in parallel) -> history lookup -> consistency check -> append
//!
//! Failures are contained per (product, model) pair: each is logged and
//! counted, and the loop moves on.

use chrono::NaiveDate;
use log::{debug, error, info, warn};
use rayon::prelude::*;

use crate::data::MarketDataFetcher;
use crate::domain::{BusinessModel, FetchedData, PricingRecord, Product, UpdaterConfig};
use crate::io::store::PricingStore;
use crate::validation::ConsistencyCheck;

/// Per-cycle tally of what happened to each pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub written: usize,
    pub no_data: usize,
    pub rejected: usize,
    pub failed: usize,
}

impl CycleSummary {
    pub fn pairs(&self) -> usize {
        self.written + self.no_data + self.rejected + self.failed
    }
}

/// Run one update cycle over `config.products × config.models`.
///
/// `today` is the date stamped on appended rows.
pub fn run_cycle(
    config: &UpdaterConfig,
    fetcher: &dyn MarketDataFetcher,
    store: &PricingStore,
    today: NaiveDate,
) -> CycleSummary {
    info!("Starting ROI data update cycle");

    let pairs: Vec<(Product, BusinessModel)> = config
        .products
        .iter()
        .flat_map(|&p| config.models.iter().map(move |&m| (p, m)))
        .collect();

    let fetch = |&(product, model): &(Product, BusinessModel)| {
        (product, model, fetcher.fetch(product, config.cycle_source))
    };
    // Order is preserved either way, so rows land in pair order.
    let fetched: Vec<(Product, BusinessModel, Option<FetchedData>)> = if config.parallel_fetch {
        pairs.par_iter().map(fetch).collect()
    } else {
        pairs.iter().map(fetch).collect()
    };

    let check = ConsistencyCheck::new(config.max_price_deviation);
    let mut summary = CycleSummary::default();

    for (product, model, data) in fetched {
        let Some(data) = data else {
            debug!("No data for {} - {}", product.as_str(), model.as_str());
            summary.no_data += 1;
            continue;
        };

        let mut history = match store.history_for(product, model) {
            Ok(history) => history,
            Err(err) if err.is_not_found() => {
                warn!("Pricing table {} not found, creating new one", store.path().display());
                Vec::new()
            }
            Err(err) => {
                error!("Error reading history for {} - {}: {err}", product.as_str(), model.as_str());
                summary.failed += 1;
                continue;
            }
        };
        // Stable: same-day rows keep file order, so the last one wins.
        history.sort_by_key(|r| r.date);

        if !check.is_consistent(&data, &history) {
            warn!(
                "Data validation failed for {} - {}, requires manual review",
                product.as_str(),
                model.as_str()
            );
            summary.rejected += 1;
            continue;
        }

        let record = PricingRecord::from_fetched(product, model, &data, today);
        match store.append_row(&record) {
            Ok(()) => {
                info!("Data updated for {} - {}", product.as_str(), model.as_str());
                summary.written += 1;
            }
            Err(err) => {
                error!("Error updating pricing table for {} - {}: {err}", product.as_str(), model.as_str());
                summary.failed += 1;
            }
        }
    }

    info!(
        "ROI data update cycle completed: {} written, {} without data, {} rejected, {} failed",
        summary.written, summary.no_data, summary.rejected, summary.failed
    );
    summary
}
