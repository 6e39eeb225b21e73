//! Checkout Builder Service
//!
//! Serves the point-of-sale checkout API: prices a selection, resolves the
//! token accounts involved, composes the payment and loyalty instructions,
//! and returns a shop-signed transaction for the buyer to counter-sign.

use anyhow::Result;
use checkout_builder::{api, config::Config, ledger::RpcLedger};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// API server port (overrides API_PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting checkout builder");

    // Load configuration
    let mut config = Config::from_env()?;
    if let Some(port) = args.port {
        config.api_port = port;
    }

    let ledger = Arc::new(RpcLedger::new(&config.rpc_url, config.shop_keypair.clone()));

    // Start API server
    let api_handle = tokio::spawn(api::run_api_server(Arc::new(config), ledger));

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
        res = api_handle => {
            error!("API server exited: {:?}", res);
        }
    }

    info!("Shutting down checkout builder");
    Ok(())
}
