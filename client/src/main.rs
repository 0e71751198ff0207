//! Stockroom CLI - pages a remote catalog collection into memory.
//!
//! Usage: `stockroom [products|transactions] [--populate]`
//!
//! The collection is loaded through the same proximity path a scrolling view
//! uses, then printed as the JSON view a renderer would receive.

use stockroom_client::{ClientError, Config, HttpGateway, Resource, Result, SyncSession};
use stockroom_engine::{PageOutcome, Product, Transaction};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockroom_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let mut resource = "products".to_string();
    let mut populate = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--populate" => populate = true,
            "products" | "transactions" => resource = arg,
            other => return Err(ClientError::Usage(format!("unknown argument '{other}'"))),
        }
    }

    tracing::info!(base_url = %config.api_base_url, %resource, "Starting Stockroom client");

    match resource.as_str() {
        "transactions" => run::<Transaction>(&config, populate).await,
        _ => run::<Product>(&config, populate).await,
    }
}

async fn run<T: Resource>(config: &Config, populate: bool) -> Result<()> {
    let gateway = HttpGateway::<T>::new(config)?;
    if populate {
        let response = gateway.populate().await?;
        tracing::info!(%response, "Remote catalog populated");
    }

    let session = SyncSession::<T, _>::with_update_policy(gateway, config.update_policy);

    // Every page brings a new last record into view until the remote runs dry.
    loop {
        session.observe_last().await;
        match session.request_more().await? {
            PageOutcome::Appended(_) => continue,
            PageOutcome::Exhausted | PageOutcome::Skipped => break,
        }
    }

    let json = session.view(|view| view.to_json_pretty()).await?;
    println!("{json}");

    Ok(())
}
