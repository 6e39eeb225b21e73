//! The four-stage checkout transaction build
//!
//! A checkout attempt moves through a fixed sequence: pricing/validation,
//! account resolution, instruction composition, assembly and shop signing.
//! Any stage failure aborts the whole attempt; no partial transaction is
//! ever returned.

use crate::{
    config::Config,
    error::CheckoutError,
    ledger::Ledger,
    pricing,
    types::CheckoutResponse,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use solana_sdk::{
    instruction::AccountMeta, pubkey::Pubkey, signer::Signer, transaction::Transaction,
};
use spl_associated_token_account::get_associated_token_address;
use std::str::FromStr;
use tracing::info;

/// Loyalty balance at which the discount applies.
pub const LOYALTY_THRESHOLD: u64 = 5;
/// Units burned when the discount is granted.
pub const LOYALTY_BURN_AMOUNT: u64 = 5;
/// Units minted on a full-price checkout.
pub const LOYALTY_MINT_AMOUNT: u64 = 1;
/// Loyalty tokens are whole-unit only.
pub const LOYALTY_DECIMALS: u8 = 0;

pub const DISCOUNT_MESSAGE: &str = "50% Discount! 🍪";
pub const THANKS_MESSAGE: &str = "Thanks for your order! 🍪";

/// The loyalty leg of a checkout, selected once from the buyer's balance at
/// resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoyaltyAction {
    /// Full-price checkout: the shop mints a loyalty token to the buyer.
    Mint { amount: u64 },
    /// Discounted checkout: the buyer burns accumulated loyalty tokens.
    Burn { amount: u64 },
}

impl LoyaltyAction {
    pub fn for_balance(balance: u64) -> Self {
        if balance >= LOYALTY_THRESHOLD {
            Self::Burn {
                amount: LOYALTY_BURN_AMOUNT,
            }
        } else {
            Self::Mint {
                amount: LOYALTY_MINT_AMOUNT,
            }
        }
    }

    pub fn grants_discount(self) -> bool {
        matches!(self, Self::Burn { .. })
    }

    pub fn message(self) -> &'static str {
        if self.grants_discount() {
            DISCOUNT_MESSAGE
        } else {
            THANKS_MESSAGE
        }
    }
}

/// Build the partially-signed checkout transaction for one request.
pub fn build_checkout(
    config: &Config,
    ledger: &dyn Ledger,
    items: &[(String, String)],
    reference: Option<&str>,
    account: Option<&str>,
) -> Result<CheckoutResponse, CheckoutError> {
    // Pricing & validation. Everything client-supplied is checked before the
    // first ledger call, so a doomed request never pays an on-chain cost.
    let charge = pricing::calculate_price(items)?;
    if charge.is_zero() {
        return Err(CheckoutError::InvalidRequest(
            "can't checkout with charge of 0".to_string(),
        ));
    }
    let reference = parse_key(reference, "reference")?;
    let buyer = parse_key(account, "account")?;
    let shop = config.shop_keypair.pubkey();

    // Account resolution. Creating the buyer's loyalty account is the one
    // step with an irreversible on-chain cost; the shop pays it, since the
    // buyer has not signed anything yet.
    let buyer_loyalty = ledger.get_or_create_token_account(&config.loyalty_mint, &buyer)?;
    let payment_decimals = ledger.mint_decimals(&config.payment_mint)?;
    let buyer_payment = get_associated_token_address(&buyer, &config.payment_mint);
    let shop_payment = get_associated_token_address(&shop, &config.payment_mint);

    // Instruction composition.
    let action = LoyaltyAction::for_balance(buyer_loyalty.amount);
    let payable = charge.to_token_units(payment_decimals, action.grants_discount())?;

    let mut transfer_ix = spl_token::instruction::transfer_checked(
        &spl_token::id(),
        &buyer_payment,
        &config.payment_mint,
        &shop_payment,
        &buyer,
        &[],
        payable,
        payment_decimals,
    )
    .map_err(|e| CheckoutError::TransactionBuild(e.to_string()))?;
    // Off-chain indexers locate this transaction by scanning for the
    // reference key. It neither signs nor gets written.
    transfer_ix
        .accounts
        .push(AccountMeta::new_readonly(reference, false));

    let mut loyalty_ix = match action {
        LoyaltyAction::Burn { amount } => spl_token::instruction::burn_checked(
            &spl_token::id(),
            &buyer_loyalty.address,
            &config.loyalty_mint,
            &buyer,
            &[],
            amount,
            LOYALTY_DECIMALS,
        ),
        LoyaltyAction::Mint { amount } => spl_token::instruction::mint_to_checked(
            &spl_token::id(),
            &config.loyalty_mint,
            &buyer_loyalty.address,
            &shop,
            &[],
            amount,
            LOYALTY_DECIMALS,
        ),
    }
    .map_err(|e| CheckoutError::TransactionBuild(e.to_string()))?;
    // The shop co-authorizes every checkout. The mint branch already carries
    // its signature; the burn branch would not without this key.
    loyalty_ix
        .accounts
        .push(AccountMeta::new_readonly(shop, true));

    // Assembly & partial signing. The buyer pays the network fee and must
    // counter-sign client-side before submission.
    let anchor = ledger.latest_anchor()?;
    let mut transaction = Transaction::new_with_payer(&[transfer_ix, loyalty_ix], Some(&buyer));
    transaction
        .try_partial_sign(&[config.shop_keypair.as_ref()], anchor.blockhash)
        .map_err(|e| CheckoutError::TransactionBuild(e.to_string()))?;

    let bytes = bincode::serialize(&transaction)
        .map_err(|e| CheckoutError::TransactionBuild(e.to_string()))?;

    info!(
        "built checkout for buyer {}: {} units, {:?}, valid through height {}",
        buyer, payable, action, anchor.last_valid_block_height
    );

    Ok(CheckoutResponse {
        transaction: BASE64.encode(bytes),
        message: action.message().to_string(),
        network: config.network.clone(),
    })
}

fn parse_key(value: Option<&str>, field: &str) -> Result<Pubkey, CheckoutError> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CheckoutError::InvalidRequest(format!("no {field} provided")))?;
    Pubkey::from_str(value)
        .map_err(|_| CheckoutError::InvalidRequest(format!("invalid {field} provided")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balance_below_threshold_mints_one() {
        assert_eq!(
            LoyaltyAction::for_balance(4),
            LoyaltyAction::Mint {
                amount: LOYALTY_MINT_AMOUNT
            }
        );
    }

    #[test]
    fn balance_at_threshold_burns_five() {
        assert_eq!(
            LoyaltyAction::for_balance(5),
            LoyaltyAction::Burn {
                amount: LOYALTY_BURN_AMOUNT
            }
        );
    }

    #[test]
    fn messages_follow_eligibility() {
        assert_eq!(LoyaltyAction::for_balance(0).message(), THANKS_MESSAGE);
        assert_eq!(LoyaltyAction::for_balance(7).message(), DISCOUNT_MESSAGE);
    }
}
