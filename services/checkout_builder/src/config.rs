//! Service configuration

use crate::error::CheckoutError;
use anyhow::{Context, Result};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use std::sync::Arc;

#[derive(Clone)]
pub struct Config {
    /// Solana RPC URL
    pub rpc_url: String,

    /// Network label returned to wallet clients
    pub network: String,

    /// Shop signing keypair
    pub shop_keypair: Arc<Keypair>,

    /// Payment token mint
    pub payment_mint: Pubkey,

    /// Loyalty token mint
    pub loyalty_mint: Pubkey,

    /// API server port
    pub api_port: u16,

    /// Merchant display label
    pub label: String,

    /// Merchant icon URL
    pub icon: String,
}

impl Config {
    /// Load configuration from the environment, once at process start. The
    /// core never reads the environment mid-request.
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!("Could not load .env file: {}", e);
        }

        let shop_keypair = Arc::new(load_shop_keypair()?);

        let payment_mint = std::env::var("PAYMENT_MINT")
            .context("PAYMENT_MINT not set")?
            .parse()
            .context("Invalid PAYMENT_MINT")?;

        let loyalty_mint = std::env::var("LOYALTY_MINT")
            .context("LOYALTY_MINT not set")?
            .parse()
            .context("Invalid LOYALTY_MINT")?;

        Ok(Config {
            rpc_url: std::env::var("RPC_URL")
                .unwrap_or_else(|_| "https://api.devnet.solana.com".to_string()),

            network: std::env::var("NETWORK").unwrap_or_else(|_| "devnet".to_string()),

            shop_keypair,

            payment_mint,

            loyalty_mint,

            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("Invalid API_PORT")?,

            label: std::env::var("SHOP_LABEL").unwrap_or_else(|_| "Cookies Inc".to_string()),

            icon: std::env::var("SHOP_ICON")
                .unwrap_or_else(|_| "https://freesvg.org/img/1370962427.png".to_string()),
        })
    }
}

/// Load the shop keypair from the `SHOP_PRIVATE_KEY` environment variable
/// (base58-encoded secret key). Without it the server cannot produce a valid
/// transaction, so failure here is fatal for the deployment. Shared with the
/// provisioning binary, which runs before the rest of the configuration
/// exists.
pub fn load_shop_keypair() -> Result<Keypair, CheckoutError> {
    let secret = std::env::var("SHOP_PRIVATE_KEY")
        .map_err(|_| CheckoutError::Configuration("SHOP_PRIVATE_KEY not set".to_string()))?;
    let bytes = bs58::decode(secret.trim()).into_vec().map_err(|_| {
        CheckoutError::Configuration("SHOP_PRIVATE_KEY is not valid base58".to_string())
    })?;
    Keypair::from_bytes(&bytes).map_err(|_| {
        CheckoutError::Configuration("SHOP_PRIVATE_KEY is not a valid keypair".to_string())
    })
}
