//! Narrow capability boundary over the ledger RPC

use crate::error::CheckoutError;
use solana_client::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    hash::Hash,
    program_pack::Pack,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};
use spl_associated_token_account::{
    get_associated_token_address, instruction::create_associated_token_account_idempotent,
};
use std::sync::Arc;
use tracing::info;

/// A token account resolved for one owner and one mint.
#[derive(Debug, Clone, Copy)]
pub struct TokenAccount {
    pub address: Pubkey,
    pub amount: u64,
}

/// Recent chain-state reference a transaction must cite to be valid. The
/// transaction becomes unsubmittable once the chain advances past
/// `last_valid_block_height`.
#[derive(Debug, Clone, Copy)]
pub struct Anchor {
    pub blockhash: Hash,
    pub last_valid_block_height: u64,
}

/// The ledger operations the checkout core consumes. Kept narrow so the
/// request-handling logic runs against an in-memory implementation in tests
/// without contacting any network.
pub trait Ledger: Send + Sync {
    /// Resolve the associated token account for `owner` and `mint`, creating
    /// it at the payer's expense if it does not exist yet. Resolving an
    /// already-created account must be a no-op.
    fn get_or_create_token_account(
        &self,
        mint: &Pubkey,
        owner: &Pubkey,
    ) -> Result<TokenAccount, CheckoutError>;

    /// Fetch the decimal precision recorded on a mint.
    fn mint_decimals(&self, mint: &Pubkey) -> Result<u8, CheckoutError>;

    /// Fetch a finalized recent blockhash and its validity bound.
    fn latest_anchor(&self) -> Result<Anchor, CheckoutError>;

    /// Submit a fully signed transaction and wait for confirmation.
    fn submit_transaction(&self, transaction: &Transaction) -> Result<Signature, CheckoutError>;
}

/// Production implementation over the blocking RPC client. The payer funds
/// any account creation this ledger performs.
pub struct RpcLedger {
    client: RpcClient,
    payer: Arc<Keypair>,
}

impl RpcLedger {
    pub fn new(rpc_url: &str, payer: Arc<Keypair>) -> Self {
        let client =
            RpcClient::new_with_commitment(rpc_url.to_string(), CommitmentConfig::confirmed());
        Self { client, payer }
    }

    fn fetch_token_account(
        &self,
        address: &Pubkey,
    ) -> Result<Option<TokenAccount>, CheckoutError> {
        let account = self
            .client
            .get_account_with_commitment(address, self.client.commitment())?
            .value;
        match account {
            Some(account) => {
                let state = spl_token::state::Account::unpack(&account.data).map_err(|e| {
                    CheckoutError::Network(format!("malformed token account {address}: {e}"))
                })?;
                Ok(Some(TokenAccount {
                    address: *address,
                    amount: state.amount,
                }))
            }
            None => Ok(None),
        }
    }
}

impl Ledger for RpcLedger {
    fn get_or_create_token_account(
        &self,
        mint: &Pubkey,
        owner: &Pubkey,
    ) -> Result<TokenAccount, CheckoutError> {
        let address = get_associated_token_address(owner, mint);
        if let Some(existing) = self.fetch_token_account(&address)? {
            return Ok(existing);
        }

        // The idempotent variant tolerates a concurrent creation of the same
        // account landing first.
        let create_ix = create_associated_token_account_idempotent(
            &self.payer.pubkey(),
            owner,
            mint,
            &spl_token::id(),
        );
        let anchor = self.latest_anchor()?;
        let transaction = Transaction::new_signed_with_payer(
            &[create_ix],
            Some(&self.payer.pubkey()),
            &[self.payer.as_ref()],
            anchor.blockhash,
        );
        let signature = self.submit_transaction(&transaction)?;
        info!("created token account {} for owner {} in tx {}", address, owner, signature);

        self.fetch_token_account(&address)?.ok_or_else(|| {
            CheckoutError::Network(format!("token account {address} missing after creation"))
        })
    }

    fn mint_decimals(&self, mint: &Pubkey) -> Result<u8, CheckoutError> {
        let account = self
            .client
            .get_account_with_commitment(mint, self.client.commitment())?
            .value
            .ok_or_else(|| CheckoutError::Network(format!("mint {mint} does not exist")))?;
        let state = spl_token::state::Mint::unpack(&account.data)
            .map_err(|e| CheckoutError::Network(format!("malformed mint {mint}: {e}")))?;
        Ok(state.decimals)
    }

    fn latest_anchor(&self) -> Result<Anchor, CheckoutError> {
        let (blockhash, last_valid_block_height) = self
            .client
            .get_latest_blockhash_with_commitment(CommitmentConfig::finalized())?;
        Ok(Anchor {
            blockhash,
            last_valid_block_height,
        })
    }

    fn submit_transaction(&self, transaction: &Transaction) -> Result<Signature, CheckoutError> {
        Ok(self.client.send_and_confirm_transaction(transaction)?)
    }
}
