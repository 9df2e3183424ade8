use anyhow::Result;
use dotenv::dotenv;
use envconfig::Envconfig;
use rates_indexer::{
    aggregator::RateAggregator,
    clock::RpcSlotClock,
    config::Config,
    integrations::{KaminoIntegration, MarginfiIntegration, ProtocolIntegration},
    registry::load_token_registry,
    snapshot::{MarketSnapshot, SnapshotSource},
};
use ratestypecrate::types::TokenRegistry;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

use std::{panic, process};

#[tokio::main]
pub async fn main() -> Result<()> {
    dotenv().ok();

    let orig_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        orig_hook(panic_info);
        process::exit(1);
    }));

    let config = Config::init_from_env()?;

    let pretty_logs = config.pretty_logs.unwrap_or(false);

    let filter = EnvFilter::from_default_env();
    let stackdriver = tracing_stackdriver::layer(); // writes to std::io::Stdout
    let subscriber = tracing_subscriber::registry().with(filter);
    if pretty_logs {
        let subscriber = subscriber.with(tracing_subscriber::fmt::layer().compact());
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = subscriber.with(stackdriver);
        tracing::subscriber::set_global_default(subscriber)?;
    };

    let registry = match &config.token_registry_path {
        Some(path) => load_token_registry(path).await?,
        None => {
            info!("No token registry configured, using built-in SOL/USDC registry");
            TokenRegistry::partial()
        }
    };

    let mut source = SnapshotSource::new(MarketSnapshot::load(&config.market_snapshot_path).await?);
    if let Some(rpc_url) = &config.rpc_url {
        source = source.with_slot_clock(RpcSlotClock::new(rpc_url.clone()));
    }

    // Marginfi first: its optimal utilizations feed the Kamino plateau column.
    let integrations: Vec<Box<dyn ProtocolIntegration>> = vec![
        Box::new(MarginfiIntegration::new(source.clone())),
        Box::new(KaminoIntegration::main_market(source)?),
    ];
    let aggregator = RateAggregator::from_config(integrations, &config);

    let rows = aggregator.aggregate(&registry).await;
    let json = serde_json::to_string_pretty(&rows)?;

    match &config.output_path {
        Some(path) => {
            tokio::fs::write(path, json).await?;
            info!("Wrote {} rows to {}", rows.len(), path);
        }
        None => println!("{}", json),
    }

    Ok(())
}
