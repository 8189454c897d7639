use crate::exchanges::PerpetualsSource;
use crate::models::{FetcherStats, FundingRate, PerpetualContract};
use std::io::Write;

/// How many entries of each collection get printed
pub const SAMPLE_SIZE: usize = 5;

/// `BTCUSDT: BTC/USDT (linear)`
pub fn format_contract(contract: &PerpetualContract) -> String {
    format!(
        "{}: {}/{} ({})",
        contract.market, contract.base_ccy, contract.quote_ccy, contract.contract_type
    )
}

/// Fractional rate as a percentage with 4 decimals: 0.00015 -> `0.0150%`
///
/// Ties round away from zero (0.0003125 -> `0.0313%`); `{:.4}` alone would
/// round them to even.
pub fn format_rate_pct(rate: f64) -> String {
    let pct = (rate * 100.0 * 1e4).round() / 1e4;
    format!("{pct:.4}%")
}

/// `BTCUSDT: 0.0100%`
pub fn format_funding_rate(rate: &FundingRate) -> String {
    format!("{}: {}", rate.market, format_rate_pct(rate.latest_funding_rate))
}

fn format_last_update(stats: &FetcherStats) -> String {
    stats
        .last_update
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "never".to_string())
}

/// Closes the source when dropped, whichever way `run` exits.
struct ReleaseGuard<'a, S: PerpetualsSource + ?Sized>(&'a S);

impl<S: PerpetualsSource + ?Sized> Drop for ReleaseGuard<'_, S> {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// Fetches contracts and funding rates, prints stats and a sample of each to `out`.
///
/// The first failure stops the report and is written to `err`; it is not
/// returned. `source` is closed exactly once, after everything else.
pub async fn run<S, W, E>(source: &S, out: &mut W, err: &mut E)
where
    S: PerpetualsSource + ?Sized,
    W: Write,
    E: Write,
{
    let _release = ReleaseGuard(source);

    if let Err(e) = fetch_and_report(source, out).await {
        tracing::debug!("[{}] report aborted: {e:#}", source.name());
        // nowhere left to report a failing error sink
        let _ = writeln!(err, "❌ Error: {e:#}");
    }
}

async fn fetch_and_report<S, W>(source: &S, out: &mut W) -> anyhow::Result<()>
where
    S: PerpetualsSource + ?Sized,
    W: Write,
{
    writeln!(out, "🚀 Fetching perpetual market data from {}...", source.name())?;

    let contracts = source.fetch_perpetual_contracts().await?;
    writeln!(out, "✅ Fetched {} perpetual contracts", contracts.len())?;

    let funding_rates = source.fetch_funding_rates().await?;
    writeln!(out, "✅ Fetched {} funding rates", funding_rates.len())?;

    let stats = source.stats()?;
    writeln!(out, "\n📊 Stats:")?;
    writeln!(out, "   Total contracts: {}", stats.total_contracts)?;
    writeln!(out, "   Active contracts: {}", stats.active_contracts)?;
    writeln!(out, "   Last update: {}", format_last_update(&stats))?;

    writeln!(out, "\n📋 Sample contracts:")?;
    for contract in contracts.iter().take(SAMPLE_SIZE) {
        writeln!(out, "   {}", format_contract(contract))?;
    }

    writeln!(out, "\n💰 Sample funding rates:")?;
    for rate in funding_rates.iter().take(SAMPLE_SIZE) {
        writeln!(out, "   {}", format_funding_rate(rate))?;
    }

    Ok(())
}
