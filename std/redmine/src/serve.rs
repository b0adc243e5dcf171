//! HTTP surface: the MCP streamable-HTTP endpoint behind the inbound auth
//! gate.

use crate::{
    RedmineServer,
    config::{AuthMethod, Settings},
    error::Error,
};
use axum::Router;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use rmcp_axum::auth::{AuthLayer, BearerAuth, HeaderAuth, SharedToken};

/// Route the MCP service is mounted at.
pub const MCP_PATH: &str = "/mcp";

/// Build the application router for `server`, guarded as `settings` asks.
pub fn router(settings: &Settings, server: RedmineServer) -> Result<Router, Error> {
    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );
    let app = Router::new().nest_service(MCP_PATH, service);

    let app = match settings.inbound_auth() {
        Some((AuthMethod::Bearer, token)) => {
            tracing::info!("inbound bearer auth enabled");
            app.layer(AuthLayer::new(BearerAuth::new(SharedToken::new(token))))
        }
        Some((AuthMethod::Header, token)) => {
            let auth = HeaderAuth::try_new(&settings.auth_header, SharedToken::new(token))?;
            tracing::info!(header = %auth.header(), "inbound header auth enabled");
            app.layer(AuthLayer::new(auth))
        }
        Some((AuthMethod::None, _)) | None => {
            tracing::info!("inbound auth disabled");
            app
        }
    };
    Ok(app)
}
