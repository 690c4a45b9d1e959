//! Provider integrations.
//!
//! Each provider has a blocking client and a pure decoder; [`SeriesSource`] is the seam
//! the pipeline fetches through, so runs can be driven from canned payloads.

pub mod ecb;
pub mod eurostat;
pub mod fred;
pub mod sheet;

use chrono::NaiveDate;
use reqwest::blocking::Client;

use crate::domain::{Provider, RawObservation};
use crate::error::AppError;

pub use ecb::EcbClient;
pub use eurostat::EurostatClient;
pub use fred::FredClient;
pub use sheet::{StockQuote, StockSheet, load_stock_sheet, read_stock_sheet};

/// Date range requested from providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
}

/// Fetches raw observations for one provider series.
///
/// Implementations must be shareable across threads; the pipeline fetches every
/// indicator concurrently.
pub trait SeriesSource: Sync {
    fn fetch(&self, provider: &Provider, window: &FetchWindow) -> Result<Vec<RawObservation>, AppError>;
}

/// Live HTTP clients for every provider.
pub struct HttpSources {
    fred: Option<FredClient>,
    eurostat: EurostatClient,
    ecb: EcbClient,
}

impl HttpSources {
    /// `fred_api_key` is only needed when the catalog fetches from FRED.
    pub fn new(fred_api_key: Option<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(concat!("econ-pulse/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            fred: fred_api_key.map(|key| FredClient::new(client.clone(), key)),
            eurostat: EurostatClient::new(client.clone()),
            ecb: EcbClient::new(client),
        })
    }
}

impl SeriesSource for HttpSources {
    fn fetch(&self, provider: &Provider, window: &FetchWindow) -> Result<Vec<RawObservation>, AppError> {
        match provider {
            Provider::Fred { series_id } => {
                let fred = self
                    .fred
                    .as_ref()
                    .ok_or_else(|| AppError::new(2, "Missing FRED_API_KEY in environment (.env)."))?;
                fred.fetch_series(series_id, window.from, window.to)
            }
            Provider::Eurostat { dataset, filters } => {
                self.eurostat.fetch_dataset(dataset, filters, window.from, window.to)
            }
            Provider::Ecb {
                dataflow,
                series_key,
            } => self.ecb.fetch_series(dataflow, series_key, window.from, window.to),
        }
    }
}
