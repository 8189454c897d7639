use crate::errors::ExchangeError;
use crate::models::{FetcherStats, FundingRate, PerpetualContract};
use async_trait::async_trait;

pub mod coinex;

/// A source of perpetual futures market data that owns releasable resources.
#[async_trait]
pub trait PerpetualsSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_perpetual_contracts(&self) -> Result<Vec<PerpetualContract>, ExchangeError>;

    async fn fetch_funding_rates(&self) -> Result<Vec<FundingRate>, ExchangeError>;

    /// Snapshot of what has been fetched so far. Does not hit the network.
    fn stats(&self) -> Result<FetcherStats, ExchangeError>;

    /// Releases the source. Calling it more than once is a no-op.
    fn close(&self);
}
