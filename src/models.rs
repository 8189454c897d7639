use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractType {
    Linear,
    Inverse,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContractType::Linear => "linear",
            ContractType::Inverse => "inverse",
            ContractType::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// A perpetual futures market, normalized from the exchange's market listing.
#[derive(Debug, Clone, PartialEq)]
pub struct PerpetualContract {
    pub market: String,
    pub base_ccy: String,
    pub quote_ccy: String,
    pub contract_type: ContractType,
    pub maker_fee_rate: f64,
    pub taker_fee_rate: f64,
    pub min_amount: f64,
    pub tick_size: Option<f64>,
    pub max_leverage: Option<u32>,
    pub is_active: bool,
}

/// Funding rates are fractions: 0.0001 means 0.01% per funding interval.
#[derive(Debug, Clone, PartialEq)]
pub struct FundingRate {
    pub market: String,
    pub latest_funding_rate: f64,
    pub next_funding_rate: Option<f64>,
    pub mark_price: Option<f64>,
    pub next_funding_time_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetcherStats {
    pub total_contracts: usize,
    pub active_contracts: usize,
    /// None until the first successful fetch
    pub last_update: Option<DateTime<Utc>>,
}
