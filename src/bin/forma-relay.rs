//! KL Massing relay server: `GET /`, `GET /aps-token`, `POST /kl-massing`.

// std
use std::{net::SocketAddr, sync::Arc};
// crates.io
use color_eyre::Result;
use tokio::net::TcpListener;
// self
use forma_relay::{api, config::RelayConfig, obs, relay::Relay};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	obs::init_subscriber();

	let config = Arc::new(RelayConfig::load()?);

	if config.credentials.is_none() {
		tracing::warn!("APS_CLIENT_ID or APS_CLIENT_SECRET is not set; uploads will fail.");
	}

	let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
	let relay = Arc::new(Relay::new(config)?);
	let listener = TcpListener::bind(addr).await?;

	tracing::info!(%addr, "KL Massing relay listening.");

	axum::serve(listener, api::router(relay))
		.with_graceful_shutdown(api::shutdown_signal())
		.await?;

	Ok(())
}
