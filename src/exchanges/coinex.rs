use super::PerpetualsSource;
use crate::config::Config;
use crate::errors::ExchangeError;
use crate::models::{ContractType, FetcherStats, FundingRate, PerpetualContract};
use crate::store::ContractStore;
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicBool, Ordering};

/// Every CoinEx v2 response is wrapped like this. `data` stays raw until
/// `code` has been checked, since error responses carry `{}` there.
#[derive(Debug, Deserialize)]
struct CoinexResponse {
    code: i64,
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    message: String,
}

/// One entry of GET /futures/market
#[derive(Debug, Deserialize)]
struct MarketResponse {
    market: String,
    contract_type: ContractType,
    base_ccy: String,
    quote_ccy: String,
    maker_fee_rate: String,
    taker_fee_rate: String,
    min_amount: String,
    #[serde(default)]
    tick_size: Option<String>,
    #[serde(default)]
    leverage: Vec<u32>,
    #[serde(default = "available_by_default")]
    is_market_available: bool,
}

fn available_by_default() -> bool {
    true
}

/// One entry of GET /futures/funding-rate
#[derive(Debug, Deserialize)]
struct FundingRateResponse {
    market: String,
    latest_funding_rate: String,
    #[serde(default)]
    next_funding_rate: Option<String>,
    #[serde(default)]
    mark_price: Option<String>,
    #[serde(default)]
    next_funding_time: Option<u64>,
}

/// CoinEx sends decimals as strings
fn parse_decimal(field: &str, raw: &str) -> Result<f64, ExchangeError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ExchangeError::UnexpectedData(format!("invalid {field}: {raw:?}")))
}

/// Missing and empty strings both mean "not provided"
fn parse_optional_decimal(field: &str, raw: Option<&str>) -> Result<Option<f64>, ExchangeError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_decimal(field, s).map(Some),
    }
}

impl TryFrom<MarketResponse> for PerpetualContract {
    type Error = ExchangeError;

    fn try_from(raw: MarketResponse) -> Result<Self, Self::Error> {
        Ok(Self {
            maker_fee_rate: parse_decimal("maker_fee_rate", &raw.maker_fee_rate)?,
            taker_fee_rate: parse_decimal("taker_fee_rate", &raw.taker_fee_rate)?,
            min_amount: parse_decimal("min_amount", &raw.min_amount)?,
            tick_size: parse_optional_decimal("tick_size", raw.tick_size.as_deref())?,
            max_leverage: raw.leverage.iter().copied().max(),
            is_active: raw.is_market_available,
            market: raw.market,
            base_ccy: raw.base_ccy,
            quote_ccy: raw.quote_ccy,
            contract_type: raw.contract_type,
        })
    }
}

impl TryFrom<FundingRateResponse> for FundingRate {
    type Error = ExchangeError;

    fn try_from(raw: FundingRateResponse) -> Result<Self, Self::Error> {
        Ok(Self {
            latest_funding_rate: parse_decimal("latest_funding_rate", &raw.latest_funding_rate)?,
            next_funding_rate: parse_optional_decimal(
                "next_funding_rate",
                raw.next_funding_rate.as_deref(),
            )?,
            mark_price: parse_optional_decimal("mark_price", raw.mark_price.as_deref())?,
            next_funding_time_ms: raw.next_funding_time,
            market: raw.market,
        })
    }
}

/// Public-data client for CoinEx perpetual futures.
///
/// Every successful fetch is cached in a [`ContractStore`], which is what
/// [`PerpetualsSource::stats`] reports on. After [`PerpetualsSource::close`]
/// the cache is dropped and every call fails with [`ExchangeError::Closed`].
pub struct CoinexPerpetualsFetcher {
    client: reqwest::Client,
    base_url: String,
    store: ContractStore,
    closed: AtomicBool,
}

impl CoinexPerpetualsFetcher {
    /// Builds the HTTP client only; no request is sent until a fetch is called.
    pub fn new(config: &Config) -> Result<Self, ExchangeError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            store: ContractStore::new(),
            closed: AtomicBool::new(false),
        })
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Cached view of everything fetched so far
    pub fn store(&self) -> &ContractStore {
        &self.store
    }

    /// Fetches the funding rate of a single market (e.g. "BTCUSDT").
    pub async fn fetch_funding_rate(&self, market: &str) -> Result<FundingRate, ExchangeError> {
        let market = market.to_uppercase();
        let raw: Vec<FundingRateResponse> = self
            .get_list("/futures/funding-rate", &[("market", market.as_str())])
            .await?;

        // only trust the entry for the market we asked about
        let rate: FundingRate = raw
            .into_iter()
            .find(|r| r.market == market)
            .ok_or_else(|| {
                ExchangeError::UnexpectedData(format!(
                    "CoinEx returned no funding rate for {market}"
                ))
            })?
            .try_into()?;

        self.ensure_open()?;
        self.store.upsert_funding_rates(std::slice::from_ref(&rate));
        Ok(rate)
    }

    fn ensure_open(&self) -> Result<(), ExchangeError> {
        if self.is_closed() {
            tracing::warn!("[{}] used after close", self.name());
            return Err(ExchangeError::Closed);
        }
        Ok(())
    }

    /// GETs an endpoint whose `data` is a JSON array and decodes its items.
    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, ExchangeError> {
        self.ensure_open()?;

        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("[{}] GET {url} {query:?}", self.name());

        let body = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let response: CoinexResponse = serde_json::from_str(&body)?;

        // CoinEx signals errors via code, not just HTTP status
        if response.code != 0 {
            return Err(ExchangeError::Api {
                code: response.code,
                message: response.message,
            });
        }

        let data = response.data.ok_or_else(|| {
            ExchangeError::UnexpectedData(format!("CoinEx response for {path} has no data"))
        })?;

        Ok(serde_json::from_value(data)?)
    }
}

#[async_trait]
impl PerpetualsSource for CoinexPerpetualsFetcher {
    fn name(&self) -> &'static str {
        "coinex"
    }

    async fn fetch_perpetual_contracts(&self) -> Result<Vec<PerpetualContract>, ExchangeError> {
        let raw: Vec<MarketResponse> = self.get_list("/futures/market", &[]).await?;
        let contracts = raw
            .into_iter()
            .map(PerpetualContract::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        // close() may have landed while the request was in flight
        self.ensure_open()?;
        self.store.replace_contracts(&contracts);
        tracing::info!("[{}] fetched {} perpetual contracts", self.name(), contracts.len());
        Ok(contracts)
    }

    async fn fetch_funding_rates(&self) -> Result<Vec<FundingRate>, ExchangeError> {
        let raw: Vec<FundingRateResponse> = self.get_list("/futures/funding-rate", &[]).await?;
        let rates = raw
            .into_iter()
            .map(FundingRate::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        self.ensure_open()?;
        self.store.upsert_funding_rates(&rates);
        tracing::info!("[{}] fetched {} funding rates", self.name(), rates.len());
        Ok(rates)
    }

    fn stats(&self) -> Result<FetcherStats, ExchangeError> {
        self.ensure_open()?;
        Ok(self.store.stats())
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.store.clear();
        tracing::info!("[{}] fetcher closed", self.name());
    }
}
