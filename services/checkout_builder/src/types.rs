//! Wire types for the checkout API

use serde::{Deserialize, Serialize};

/// JSON body of a checkout build request.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    /// Buyer account identifier, base58. Optional at the wire level so a
    /// missing field surfaces as a validation error rather than a
    /// deserialization failure.
    #[serde(default)]
    pub account: Option<String>,
}

/// Successful build response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    /// Base64-encoded partially-signed transaction.
    pub transaction: String,
    /// Human-readable status message.
    pub message: String,
    /// Network label for wallet clients.
    pub network: String,
}

/// Error body: exactly one short human-readable string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Static descriptor identifying the merchant to wallet clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantDescriptor {
    pub label: String,
    pub icon: String,
}
