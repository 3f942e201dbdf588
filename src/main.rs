//! The binary exposes the gateway over HTTP:
//!
//! - [service] (merchant facing API surface)
//! - [paystation_gateway::gateway] (Paystation protocol, in the library)

use std::{
    net::{Ipv4Addr, SocketAddrV4},
    time::Duration,
};

use axum::Router;
use paystation_gateway::{Gateway, GatewayConfig, gateway::HttpTransport};
use tracing_subscriber::EnvFilter;

/// Merchant facing API
///
/// Starts purchases and receives customers coming back from the hosted payment page.
mod service;
mod state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_ansi(false)
        .init();

    match dotenvy::dotenv() {
        Ok(p) => tracing::info!(path = %p.display(), "Loaded environment variables from .env file"),
        Err(e) => tracing::warn!("Failed to load environment variables from .env: {e}"),
    };

    let timeout = std::env::var("PAYSTATION_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(HttpTransport::DEFAULT_TIMEOUT);
    let gateway = Gateway::with_transport(GatewayConfig::from_env(), HttpTransport::new(timeout)?);
    tracing::info!(config = ?gateway.config(), ?timeout, "Gateway configured");
    let state = state::AppState::new(gateway);

    let app = Router::new()
        .merge(service::api::router())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3030);

    let listener =
        tokio::net::TcpListener::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port)).await?;

    tracing::info!("Serving on port {port}");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
