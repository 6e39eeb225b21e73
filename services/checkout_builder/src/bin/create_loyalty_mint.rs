//! One-time loyalty mint provisioning
//!
//! Creates the loyalty token mint (0 decimals, shop as mint authority) and
//! prints the address to configure as `LOYALTY_MINT`. Runs before the rest
//! of the service configuration exists, so it reads only the shop key and
//! RPC URL from the environment.

use anyhow::Result;
use checkout_builder::checkout::LOYALTY_DECIMALS;
use checkout_builder::config::load_shop_keypair;
use solana_client::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig, program_pack::Pack, signature::Keypair, signer::Signer,
    system_instruction, transaction::Transaction,
};

fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Could not load .env file: {e}");
    }

    let shop = load_shop_keypair()?;
    let rpc_url = std::env::var("RPC_URL")
        .unwrap_or_else(|_| "https://api.devnet.solana.com".to_string());
    let client = RpcClient::new_with_commitment(rpc_url, CommitmentConfig::confirmed());

    println!("Shop public key: {}", shop.pubkey());
    println!("Creating loyalty token mint...");

    let mint = Keypair::new();
    let rent = client.get_minimum_balance_for_rent_exemption(spl_token::state::Mint::LEN)?;

    let create_account_ix = system_instruction::create_account(
        &shop.pubkey(),
        &mint.pubkey(),
        rent,
        spl_token::state::Mint::LEN as u64,
        &spl_token::id(),
    );
    let init_mint_ix = spl_token::instruction::initialize_mint(
        &spl_token::id(),
        &mint.pubkey(),
        &shop.pubkey(), // who can mint
        None,           // no freeze authority
        LOYALTY_DECIMALS,
    )?;

    let blockhash = client.get_latest_blockhash()?;
    let transaction = Transaction::new_signed_with_payer(
        &[create_account_ix, init_mint_ix],
        Some(&shop.pubkey()),
        &[&shop, &mint],
        blockhash,
    );
    let signature = client.send_and_confirm_transaction(&transaction)?;

    println!("Created mint {} in tx {}", mint.pubkey(), signature);
    println!("Set LOYALTY_MINT={}", mint.pubkey());
    Ok(())
}
