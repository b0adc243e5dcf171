//! Custom header authentication plugin.
//!
//! Extracts a credential from a configurable header and delegates
//! validation to a [`Validator`](super::Validator).
//!
//! ```rust,ignore
//! use rmcp_axum::auth::{AuthLayer, HeaderAuth, SharedToken};
//!
//! let auth = HeaderAuth::try_new("X-MCP-Auth", SharedToken::new("secret"))?;
//! let app = axum::Router::new()
//!     .nest_service("/mcp", service)
//!     .layer(AuthLayer::new(auth));
//! ```

use crate::auth::{Authenticator, Validator};
use http::header::{HeaderName, InvalidHeaderName};

/// Header consulted when no other name is configured.
pub const DEFAULT_AUTH_HEADER: &str = "X-MCP-Auth";

/// Header authenticator.
///
/// Reads the value of a single named header and passes it to the inner
/// [`Validator`]. A missing or non-ASCII header is rejected.
#[derive(Clone)]
pub struct HeaderAuth<V> {
    header: HeaderName,
    validator: V,
}

impl<V> HeaderAuth<V> {
    /// Build an authenticator for `header`, failing if the name is not a
    /// valid HTTP header name.
    pub fn try_new(header: &str, validator: V) -> Result<Self, InvalidHeaderName> {
        Ok(Self {
            header: HeaderName::try_from(header)?,
            validator,
        })
    }

    /// The header this authenticator reads.
    pub fn header(&self) -> &HeaderName {
        &self.header
    }
}

impl<V> Authenticator for HeaderAuth<V>
where
    V: Validator,
{
    type Claims = V::Claims;
    type Error = String;

    async fn authenticate(
        &self,
        parts: &http::request::Parts,
    ) -> Result<Self::Claims, Self::Error> {
        let value = parts
            .headers
            .get(&self.header)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| format!("missing {} header", self.header))?;

        self.validator.validate(value).await.map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use crate::auth::{HeaderAuth, SharedToken};

    #[test]
    fn header_names_are_normalized() {
        let auth = HeaderAuth::try_new("X-MCP-Auth", SharedToken::new("t")).unwrap();
        assert_eq!(auth.header().as_str(), "x-mcp-auth");
    }

    #[test]
    fn invalid_header_name_is_rejected() {
        assert!(HeaderAuth::try_new("not a header", SharedToken::new("t")).is_err());
    }
}
