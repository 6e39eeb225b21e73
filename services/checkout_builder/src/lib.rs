//! Checkout transaction builder
//!
//! Off-chain service that assembles partially-signed point-of-sale checkout
//! transactions: an SPL payment transfer with an attached payment reference,
//! plus a conditional loyalty mint-or-burn co-signed by the shop. The buyer
//! counter-signs and submits client-side.

pub mod api;
pub mod checkout;
pub mod config;
pub mod error;
pub mod ledger;
pub mod pricing;
pub mod types;

// Re-export key types
pub use checkout::{build_checkout, LoyaltyAction};
pub use config::Config;
pub use error::CheckoutError;
pub use ledger::{Anchor, Ledger, RpcLedger, TokenAccount};
