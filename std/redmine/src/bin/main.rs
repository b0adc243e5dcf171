//! Binary entry point for the wmcp-redmine MCP server.

use clap::Parser;
use tokio::net::TcpListener;
use wmcp_redmine::{RedmineServer, config::Settings, openapi::PathSpecs, serve};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(settings.log_filter())
        .init();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting wmcp-redmine");

    let paths = PathSpecs::bundled()?;
    let server = RedmineServer::new(&settings, paths)?;
    let app = serve::router(&settings, server)?;

    let listener = TcpListener::bind(settings.bind_addr()).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        path = serve::MCP_PATH,
        auth = %settings.auth_method,
        "listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}
