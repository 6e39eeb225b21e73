//! Error types for the checkout service

use thiserror::Error;
use warp::http::StatusCode;

/// Everything a checkout request can fail with, grouped by who has to act.
///
/// `Display` is the short user-visible message; the payload strings carry
/// internal detail and only reach the logs via `Debug`.
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// Client-supplied data is insufficient or nonsensical.
    #[error("{0}")]
    InvalidRequest(String),

    /// The server is missing required secret material. Fatal for the
    /// deployment, not just the request.
    #[error("server configuration error")]
    Configuration(String),

    /// Ledger RPC unreachable or returned malformed data.
    #[error("ledger rpc error")]
    Network(String),

    /// Anchor expired, signing failed, or serialization failed.
    #[error("error creating transaction")]
    TransactionBuild(String),
}

impl CheckoutError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Configuration(_) | Self::Network(_) | Self::TransactionBuild(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl warp::reject::Reject for CheckoutError {}

impl From<solana_client::client_error::ClientError> for CheckoutError {
    fn from(err: solana_client::client_error::ClientError) -> Self {
        Self::Network(err.to_string())
    }
}
