//! HTTP surface for the checkout service

use crate::{
    checkout,
    config::Config,
    error::CheckoutError,
    ledger::Ledger,
    types::{CheckoutRequest, ErrorResponse, MerchantDescriptor},
};
use anyhow::Result;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{http::StatusCode, Filter, Rejection, Reply};

pub async fn run_api_server(config: Arc<Config>, ledger: Arc<dyn Ledger>) -> Result<()> {
    let port = config.api_port;
    let api = routes(config, ledger)
        .recover(handle_rejection)
        .with(warp::cors().allow_any_origin());

    tracing::info!("API server listening on port {}", port);

    warp::serve(api).run(([0, 0, 0, 0], port)).await;

    Ok(())
}

/// The filter tree, split out from [`run_api_server`] so tests can drive it
/// through `warp::test` without binding a socket.
pub fn routes(
    config: Arc<Config>,
    ledger: Arc<dyn Ledger>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    // Health check endpoint
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::json(&serde_json::json!({ "status": "ok" })));

    // Wallet discovery: a static descriptor, no business logic
    let descriptor = warp::path("checkout")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_config(config.clone()))
        .map(|config: Arc<Config>| {
            warp::reply::json(&MerchantDescriptor {
                label: config.label.clone(),
                icon: config.icon.clone(),
            })
        });

    // Build a partially-signed checkout transaction
    let build = warp::path("checkout")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::query::<Vec<(String, String)>>())
        .and(warp::body::json())
        .and(with_config(config))
        .and(with_ledger(ledger))
        .and_then(build_checkout_handler);

    health.or(descriptor).or(build)
}

// Helper filters
fn with_config(
    config: Arc<Config>,
) -> impl Filter<Extract = (Arc<Config>,), Error = Infallible> + Clone {
    warp::any().map(move || config.clone())
}

fn with_ledger(
    ledger: Arc<dyn Ledger>,
) -> impl Filter<Extract = (Arc<dyn Ledger>,), Error = Infallible> + Clone {
    warp::any().map(move || ledger.clone())
}

async fn build_checkout_handler(
    query: Vec<(String, String)>,
    body: CheckoutRequest,
    config: Arc<Config>,
    ledger: Arc<dyn Ledger>,
) -> Result<impl Reply, Rejection> {
    let reference = query
        .iter()
        .find(|(key, _)| key.as_str() == "reference")
        .map(|(_, value)| value.clone());

    let response = checkout::build_checkout(
        &config,
        ledger.as_ref(),
        &query,
        reference.as_deref(),
        body.account.as_deref(),
    )
    .map_err(|err| {
        if err.status() == StatusCode::BAD_REQUEST {
            tracing::info!("rejected checkout request: {}", err);
        } else {
            tracing::error!("checkout build failed: {:?}", err);
        }
        warp::reject::custom(err)
    })?;

    Ok(warp::reply::json(&response))
}

/// Convert rejections into the single-error JSON object of the API contract.
/// Internal detail stays in the logs.
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if let Some(checkout_err) = err.find::<CheckoutError>() {
        (checkout_err.status(), checkout_err.to_string())
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "not found".to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "method not allowed".to_string())
    } else if err.find::<warp::body::BodyDeserializeError>().is_some()
        || err.find::<warp::reject::InvalidQuery>().is_some()
    {
        (StatusCode::BAD_REQUEST, "malformed request".to_string())
    } else {
        tracing::error!("unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&ErrorResponse { error: message }),
        status,
    ))
}
