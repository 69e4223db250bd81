//! Serve command - runs the HTTP chat server

use std::net::SocketAddr;

use clap::Args;
use tokio::net::TcpListener;
use tracing::info;

use crate::api::{create_router, AppState};
use crate::config::AppConfig;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Bind address, overrides server.host
    #[arg(long)]
    pub host: Option<String>,

    /// Port, overrides server.port
    #[arg(long)]
    pub port: Option<u16>,
}

pub async fn run(config: &AppConfig, args: ServeArgs) -> anyhow::Result<()> {
    let chatbot = crate::create_chatbot_service(config)?;
    let app = create_router(AppState::new(chatbot));

    let addr = build_socket_addr(
        args.host.as_deref().unwrap_or(&config.server.host),
        args.port.unwrap_or(config.server.port),
    )?;
    info!("Starting chat server on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(super::shutdown_signal())
        .await?;

    Ok(())
}

fn build_socket_addr(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((host.parse::<std::net::IpAddr>()?, port)))
}
