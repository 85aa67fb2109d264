//! Market data fetching.
//!
//! Fetching is fail-soft: "no data" is an ordinary outcome, so the trait
//! returns `Option` and implementations log their own failures instead of
//! propagating them.

use chrono::Local;
use log::{debug, error, info};

use crate::data::sources;
use crate::domain::{FetchedData, Product, SourceEndpoint, SourceId};
use crate::error::AppError;

/// Anything the update cycle can pull pricing payloads from.
///
/// `Sync` because the cycle may fan fetches out across threads.
pub trait MarketDataFetcher: Sync {
    fn fetch(&self, product: Product, source: SourceId) -> Option<FetchedData>;
}

/// Dispatches to the built-in mock handlers in [`sources`].
#[derive(Debug, Clone)]
pub struct StubMarketFetcher {
    endpoints: Vec<SourceEndpoint>,
}

impl StubMarketFetcher {
    pub fn new(endpoints: Vec<SourceEndpoint>) -> Self {
        Self { endpoints }
    }

    /// Fetch by source name; names that match no known source yield nothing.
    pub fn fetch_named(&self, product: Product, source: &str) -> Option<FetchedData> {
        match SourceId::parse(source) {
            Some(id) => self.fetch(product, id),
            None => {
                debug!("Unrecognized source '{source}', no data for {}", product.as_str());
                None
            }
        }
    }

    fn endpoint(&self, source: SourceId) -> Option<&SourceEndpoint> {
        self.endpoints.iter().find(|e| e.id == source)
    }

    fn dispatch(&self, product: Product, endpoint: &SourceEndpoint) -> Result<Option<FetchedData>, AppError> {
        let now = Local::now();
        match endpoint.id {
            SourceId::AlibabaEssentialOils => sources::alibaba_essential_oils(product, endpoint, now).map(Some),
            SourceId::DaneIpp => sources::dane_ipp(product, endpoint, now).map(Some),
            // Catalogued, but nobody has written a handler for these yet.
            SourceId::BolsaMercantil | SourceId::XmEnergy => Ok(None),
        }
    }
}

impl MarketDataFetcher for StubMarketFetcher {
    fn fetch(&self, product: Product, source: SourceId) -> Option<FetchedData> {
        let Some(endpoint) = self.endpoint(source) else {
            debug!("Source {source} is not configured, no data for {}", product.as_str());
            return None;
        };

        info!("Fetching data for {} from {} ({})", product.as_str(), source, endpoint.url);

        match self.dispatch(product, endpoint) {
            Ok(data) => data,
            Err(err) => {
                error!("Error fetching data from {source}: {err}");
                None
            }
        }
    }
}
