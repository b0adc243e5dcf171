//! Runtime configuration, resolved once at startup from flags and
//! environment variables.

use base64::Engine;
use clap::{Parser, ValueEnum};
use rmcp_axum::auth::DEFAULT_AUTH_HEADER;
use std::{fmt, str::FromStr};
use tracing_subscriber::EnvFilter;
use url::Url;

/// Port the server listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 8369;

/// Walrus MCP Redmine Server: exposes the Redmine REST API as MCP tools.
#[derive(Parser, Debug, Clone)]
#[command(name = "wmcp-redmine", version, about)]
pub struct Settings {
    /// Base URL of the Redmine instance.
    #[arg(long = "redmine-url", env = "REDMINE_URL", value_parser = parse_base_url)]
    pub url: Url,

    /// API key sent as `X-Redmine-API-Key` on every request.
    #[arg(long = "redmine-api-key", env = "REDMINE_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Address to bind the MCP endpoint to.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind the MCP endpoint to.
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Log verbosity (TRACE, DEBUG, INFO, WARN, ERROR).
    #[arg(long, env = "LOG_LEVEL", default_value = "INFO", value_parser = parse_log_level)]
    pub log_level: String,

    /// Extra guidance appended to the `redmine_request` tool description.
    /// Base64-encoded values are decoded; anything else is used verbatim.
    #[arg(
        long,
        env = "REDMINE_REQUEST_INSTRUCTIONS",
        default_value = "",
        value_parser = decode_instructions
    )]
    pub request_instructions: String,

    /// Text format of tool results.
    #[arg(
        long,
        env = "RESPONSE_FORMAT",
        value_enum,
        ignore_case = true,
        default_value_t = ResponseFormat::Yaml
    )]
    pub response_format: ResponseFormat,

    /// How inbound MCP requests are authenticated: none, bearer or header.
    #[arg(long, env = "MCP_AUTH_METHOD", default_value = "none")]
    pub auth_method: AuthMethod,

    /// Shared secret inbound requests must present.
    #[arg(long, env = "MCP_AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    /// Header carrying the secret when the header method is used.
    #[arg(long, env = "MCP_AUTH_HEADER", default_value = DEFAULT_AUTH_HEADER)]
    pub auth_header: String,
}

impl Settings {
    /// The inbound gate to install, if any. A method without a token, or
    /// with an empty one, disables the gate.
    pub fn inbound_auth(&self) -> Option<(AuthMethod, &str)> {
        let token = self.auth_token.as_deref().filter(|t| !t.is_empty());
        match (self.auth_method, token) {
            (AuthMethod::None, _) | (_, None) => None,
            (method, Some(token)) => Some((method, token)),
        }
    }

    /// Log filter: `RUST_LOG` when set, otherwise the configured level.
    pub fn log_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level_directive(&self.log_level)))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }

    /// Socket address string for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Inbound authentication method for the MCP endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMethod {
    #[default]
    None,
    Bearer,
    Header,
}

impl FromStr for AuthMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "bearer" => Ok(Self::Bearer),
            "header" => Ok(Self::Header),
            other => Err(format!(
                "unknown auth method {other:?}, expected none, bearer or header"
            )),
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Bearer => write!(f, "bearer"),
            Self::Header => write!(f, "header"),
        }
    }
}

/// Serialization used for tool results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ResponseFormat {
    #[default]
    Yaml,
    Json,
}

fn parse_base_url(s: &str) -> Result<Url, String> {
    let url = Url::parse(s).map_err(|e| format!("invalid Redmine URL {s:?}: {e}"))?;
    if url.cannot_be_a_base() {
        return Err(format!("Redmine URL {s:?} cannot be used as a base"));
    }
    Ok(url)
}

fn parse_log_level(s: &str) -> Result<String, String> {
    Ok(s.trim().to_ascii_uppercase())
}

/// Map conventional level names onto `tracing` directives. Unknown names
/// fall back to `info`.
fn level_directive(level: &str) -> &'static str {
    match level {
        "TRACE" => "trace",
        "DEBUG" => "debug",
        "WARN" | "WARNING" => "warn",
        "ERROR" | "CRITICAL" | "FATAL" => "error",
        _ => "info",
    }
}

fn decode_instructions(s: &str) -> Result<String, String> {
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(s.trim())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok());
    Ok(decoded.unwrap_or_else(|| s.to_string()))
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::config::{AuthMethod, DEFAULT_PORT, ResponseFormat, Settings, level_directive};
    use clap::Parser;

    /// Flags pinned to their defaults so exported variables such as `PORT`
    /// or `RESPONSE_FORMAT` cannot leak into tests.
    const PINNED: &[(&str, &str)] = &[
        ("--host", "0.0.0.0"),
        ("--port", "8369"),
        ("--log-level", "INFO"),
        ("--request-instructions", ""),
        ("--response-format", "yaml"),
        ("--auth-method", "none"),
        ("--auth-header", "X-MCP-Auth"),
    ];

    /// Settings pointing at `url`, with extra flags appended. Every
    /// environment-backed field not named in `extra` takes its default.
    pub(crate) fn settings(url: &str, extra: &[&str]) -> Settings {
        let mut args = vec!["wmcp-redmine", "--redmine-url", url, "--redmine-api-key", "test-key"];
        for (flag, value) in PINNED {
            if !extra.contains(flag) {
                args.extend_from_slice(&[*flag, *value]);
            }
        }
        args.extend_from_slice(extra);
        let mut settings = Settings::try_parse_from(args).expect("valid settings");
        if !extra.contains(&"--auth-token") {
            settings.auth_token = None;
        }
        settings
    }

    #[test]
    fn defaults() {
        let s = settings("https://redmine.example.com", &[]);
        assert_eq!(s.port, DEFAULT_PORT);
        assert_eq!(s.log_level, "INFO");
        assert_eq!(s.auth_method, AuthMethod::None);
        assert_eq!(s.auth_header, "X-MCP-Auth");
        assert_eq!(s.response_format, ResponseFormat::Yaml);
        assert_eq!(s.request_instructions, "");
        assert!(s.inbound_auth().is_none());
        assert_eq!(s.bind_addr(), "0.0.0.0:8369");
    }

    #[test]
    fn instructions_are_base64_decoded() {
        // "Always include project_id"
        let s = settings(
            "https://redmine.example.com",
            &["--request-instructions", "QWx3YXlzIGluY2x1ZGUgcHJvamVjdF9pZA=="],
        );
        assert_eq!(s.request_instructions, "Always include project_id");
    }

    #[test]
    fn undecodable_instructions_are_kept_verbatim() {
        let s = settings(
            "https://redmine.example.com",
            &["--request-instructions", "Use JSON paths only!"],
        );
        assert_eq!(s.request_instructions, "Use JSON paths only!");
    }

    #[test]
    fn auth_method_is_case_insensitive() {
        let s = settings(
            "https://redmine.example.com",
            &["--auth-method", "BeArEr", "--auth-token", "secret"],
        );
        assert_eq!(s.auth_method, AuthMethod::Bearer);
        assert_eq!(s.inbound_auth(), Some((AuthMethod::Bearer, "secret")));
    }

    #[test]
    fn method_without_token_disables_gate() {
        let s = settings("https://redmine.example.com", &["--auth-method", "header"]);
        assert_eq!(s.auth_method, AuthMethod::Header);
        assert!(s.inbound_auth().is_none());
    }

    #[test]
    fn empty_token_disables_gate() {
        let s = settings(
            "https://redmine.example.com",
            &["--auth-method", "bearer", "--auth-token", ""],
        );
        assert_eq!(s.auth_token.as_deref(), Some(""));
        assert!(s.inbound_auth().is_none());
    }

    #[test]
    fn unrelated_flags_keep_defaults() {
        let s = settings("https://redmine.example.com", &["--port", "9000"]);
        assert_eq!(s.port, 9000);
        assert_eq!(s.auth_token, None);
        assert_eq!(s.response_format, ResponseFormat::Yaml);
    }

    #[test]
    fn unknown_auth_method_is_fatal() {
        let result = Settings::try_parse_from([
            "wmcp-redmine",
            "--redmine-url",
            "https://redmine.example.com",
            "--redmine-api-key",
            "k",
            "--auth-method",
            "basic",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn invalid_port_is_fatal() {
        let result = Settings::try_parse_from([
            "wmcp-redmine",
            "--redmine-url",
            "https://redmine.example.com",
            "--redmine-api-key",
            "k",
            "--port",
            "eighty",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn response_format_accepts_any_case() {
        let s = settings("https://redmine.example.com", &["--response-format", "JSON"]);
        assert_eq!(s.response_format, ResponseFormat::Json);
    }

    #[test]
    fn log_level_is_uppercased() {
        let s = settings("https://redmine.example.com", &["--log-level", "debug"]);
        assert_eq!(s.log_level, "DEBUG");
    }

    #[test]
    fn level_names_map_to_directives() {
        assert_eq!(level_directive("INFO"), "info");
        assert_eq!(level_directive("WARNING"), "warn");
        assert_eq!(level_directive("CRITICAL"), "error");
        assert_eq!(level_directive("TRACE"), "trace");
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        assert_eq!(level_directive("VERBOSE"), "info");
        assert_eq!(level_directive(""), "info");
        let s = settings("https://redmine.example.com", &["--log-level", "verbose"]);
        assert_eq!(level_directive(&s.log_level), "info");
    }

    #[test]
    fn rejects_non_base_url() {
        let result = Settings::try_parse_from([
            "wmcp-redmine",
            "--redmine-url",
            "mailto:admin@example.com",
            "--redmine-api-key",
            "k",
        ]);
        assert!(result.is_err());
    }
}
