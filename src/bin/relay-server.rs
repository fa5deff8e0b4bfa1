//! Relay server binary.
//!
//! The only place that touches ambient process state: environment variables are read
//! here, converted into an explicit [`RelayConfig`], and injected into the relay.

// std
use std::{env, net::Ipv4Addr, sync::Arc};
// crates.io
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use url::Url;
// self
use github_oauth_relay::{
	error::{ConfigError, Result, TransportError},
	provider::ProviderDescriptor,
	relay::{CallbackRelay, RelayConfig},
	server,
};

const DEFAULT_FRONTEND: &str = "http://localhost:5173";
const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() -> Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
		)
		.init();

	let config = config_from_env()?;
	let port = env::var("PORT").ok().and_then(|value| value.parse().ok()).unwrap_or(DEFAULT_PORT);

	tracing::info!(frontend = %config.frontend, port, "Starting the GitHub OAuth relay.");
	tracing::info!("Health check: http://localhost:{port}/health");
	tracing::info!("Provider callback: http://localhost:{port}/api/auth/github/callback");

	let relay = Arc::new(CallbackRelay::new(config)?);
	let router = server::router(relay);
	let listener =
		TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await.map_err(TransportError::from)?;

	axum::serve(listener, router).await.map_err(TransportError::from)?;

	Ok(())
}

fn config_from_env() -> Result<RelayConfig> {
	let client_id = non_empty_var("GITHUB_CLIENT_ID");
	let client_secret = non_empty_var("GITHUB_CLIENT_SECRET");
	let (client_id, client_secret) = match (client_id, client_secret) {
		(Some(id), Some(secret)) => (id, secret),
		_ => return Err(ConfigError::MissingCredentials.into()),
	};
	let frontend = non_empty_var("FRONTEND_URL").unwrap_or_else(|| DEFAULT_FRONTEND.into());
	let frontend = Url::parse(&frontend)
		.map_err(|source| ConfigError::InvalidUrl { what: "frontend", source })?;

	Ok(RelayConfig { descriptor: ProviderDescriptor::github(), client_id, client_secret, frontend })
}

fn non_empty_var(name: &str) -> Option<String> {
	env::var(name).ok().filter(|value| !value.is_empty())
}
