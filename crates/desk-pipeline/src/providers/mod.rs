//! External collaborator interfaces and their concrete clients
//!
//! Every external dependency of the pipeline is modeled as a narrow trait
//! with one entry point, so workers depend on the interface and tests can
//! substitute providers freely.

pub mod market_data;
pub mod notifier;
pub mod scraper;
pub mod search;

pub use market_data::{MarketDataProvider, PricePoint, TiingoClient};
pub use notifier::{DiscordNotifier, Notifier, split_message};
pub use scraper::{PageScraper, PageSummarizer, PageSummary};
pub use search::{NewsSearchProvider, SearchHit, SerperClient, WebSearchProvider};

#[cfg(test)]
pub use market_data::MockMarketDataProvider;
#[cfg(test)]
pub use scraper::MockPageSummarizer;
#[cfg(test)]
pub use search::{MockNewsSearchProvider, MockWebSearchProvider};
