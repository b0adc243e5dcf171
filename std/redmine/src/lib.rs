//! MCP server exposing the Redmine REST API as tools.
//!
//! Five tools are served over streamable HTTP: a generic API request, two
//! lookups into the bundled OpenAPI description, and attachment upload and
//! download. Every tool answers with a YAML (or JSON) text blob; failures are
//! reported inside that blob rather than as protocol errors.

use rmcp::{
    ServerHandler,
    handler::server::router::tool::ToolRouter,
    model::{Implementation, ServerCapabilities, ServerInfo},
    tool_handler,
};
use std::sync::Arc;

pub mod client;
pub mod config;
pub mod encode;
pub mod envelope;
pub mod error;
pub mod openapi;
pub mod serve;
pub mod tools;

#[cfg(test)]
mod testing;

/// MCP server bound to one Redmine instance.
#[derive(Debug, Clone)]
pub struct RedmineServer {
    pub(crate) client: client::RedmineClient,
    pub(crate) paths: Arc<openapi::PathSpecs>,
    pub(crate) format: config::ResponseFormat,
    pub(crate) tool_router: ToolRouter<Self>,
}

#[tool_handler]
impl ServerHandler for RedmineServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "wmcp-redmine".into(),
                title: Some("Walrus MCP Redmine Server".into()),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(
                "Redmine server. Use redmine_paths_list and redmine_paths_info to discover \
                 endpoints, redmine_request to call them, and redmine_upload / \
                 redmine_download for attachments."
                    .into(),
            ),
        }
    }
}
