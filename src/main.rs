use coinex_perps::config::Config;
use coinex_perps::exchanges::coinex::CoinexPerpetualsFetcher;
use coinex_perps::report;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Nothing has been acquired yet if either of these fails, so there is nothing to release
    let fetcher = match Config::from_env().and_then(|config| CoinexPerpetualsFetcher::new(&config))
    {
        Ok(fetcher) => fetcher,
        Err(e) => {
            eprintln!("❌ Error: {e}");
            return;
        }
    };

    report::run(&fetcher, &mut std::io::stdout(), &mut std::io::stderr()).await;
}
