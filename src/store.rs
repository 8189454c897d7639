use crate::models::{FetcherStats, FundingRate, PerpetualContract};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

// last_update_ms holds this when nothing has been fetched yet
const NEVER: i64 = 0;

#[derive(Clone, Default)]
pub struct ContractStore {
    contracts: Arc<DashMap<String, PerpetualContract>>,
    funding_rates: Arc<DashMap<String, FundingRate>>,
    last_update_ms: Arc<AtomicI64>,
}

impl ContractStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swaps in a full contract listing; markets missing from it are dropped.
    pub fn replace_contracts(&self, contracts: &[PerpetualContract]) {
        self.contracts.clear();
        for contract in contracts {
            self.contracts
                .insert(contract.market.clone(), contract.clone());
        }
        self.touch();
    }

    pub fn upsert_funding_rates(&self, rates: &[FundingRate]) {
        for rate in rates {
            self.funding_rates.insert(rate.market.clone(), rate.clone());
        }
        self.touch();
    }

    pub fn contract(&self, market: &str) -> Option<PerpetualContract> {
        self.contracts.get(market).map(|r| r.clone())
    }

    pub fn funding_rate(&self, market: &str) -> Option<FundingRate> {
        self.funding_rates.get(market).map(|r| r.clone())
    }

    pub fn stats(&self) -> FetcherStats {
        let active_contracts = self
            .contracts
            .iter()
            .filter(|r| r.value().is_active)
            .count();

        let last_update = match self.last_update_ms.load(Ordering::Acquire) {
            NEVER => None,
            ms => DateTime::from_timestamp_millis(ms),
        };

        FetcherStats {
            total_contracts: self.contracts.len(),
            active_contracts,
            last_update,
        }
    }

    pub fn clear(&self) {
        self.contracts.clear();
        self.funding_rates.clear();
        self.last_update_ms.store(NEVER, Ordering::Release);
    }

    fn touch(&self) {
        self.last_update_ms
            .store(Utc::now().timestamp_millis(), Ordering::Release);
    }
}
