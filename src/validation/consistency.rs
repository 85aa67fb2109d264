//! Price consistency check against the previous observation.

use log::{info, warn};

use crate::domain::{DEFAULT_MAX_DEVIATION, FetchedData, PricingRecord};

/// Relative change of `new` against `baseline`.
///
/// A zero baseline divides by 1 instead.
pub fn price_deviation(new: f64, baseline: f64) -> f64 {
    let denominator = if baseline == 0.0 { 1.0 } else { baseline };
    (new - baseline).abs() / denominator
}

#[derive(Debug, Clone, Copy)]
pub struct ConsistencyCheck {
    pub max_deviation: f64,
}

impl Default for ConsistencyCheck {
    fn default() -> Self {
        Self {
            max_deviation: DEFAULT_MAX_DEVIATION,
        }
    }
}

impl ConsistencyCheck {
    pub fn new(max_deviation: f64) -> Self {
        Self { max_deviation }
    }

    /// `true` when `new_data` may be stored without manual review.
    ///
    /// The baseline is the last element of `history` as given; callers that
    /// want "most recent" must order it by date first. A missing `price_min`
    /// on either side skips the comparison.
    pub fn is_consistent(&self, new_data: &FetchedData, history: &[PricingRecord]) -> bool {
        let Some(latest) = history.last() else {
            return true;
        };

        let (Some(new_price), Some(baseline)) = (new_data.price_min(), latest.price_min) else {
            info!(
                "Skipping price check for {} - {}: price_min missing",
                latest.product.as_str(),
                latest.business_model.as_str()
            );
            return true;
        };

        let deviation = price_deviation(new_price, baseline);
        if deviation > self.max_deviation {
            warn!("Large price variation detected: {:.2}%", deviation * 100.0);
            return false;
        }

        true
    }
}

/// [`ConsistencyCheck::is_consistent`] with the default 30% threshold.
pub fn is_consistent(new_data: &FetchedData, history: &[PricingRecord]) -> bool {
    ConsistencyCheck::default().is_consistent(new_data, history)
}
