//! Authentication middleware for MCP servers.
//!
//! Provides a tower middleware that validates incoming requests using a
//! user-defined [`Authenticator`] before they reach the wrapped service. On
//! success, the authenticated claims are inserted into HTTP extensions and
//! the request is forwarded unchanged. On failure the middleware answers with
//! a plain-text `401 Unauthorized` and the wrapped service is never called.
//!
//! Every request is checked independently; nothing is cached between calls.
//!
//! # Example
//!
//! ```rust,ignore
//! use rmcp_axum::auth::{AuthLayer, BearerAuth, SharedToken};
//!
//! let app = axum::Router::new()
//!     .nest_service("/mcp", service)
//!     .layer(AuthLayer::new(BearerAuth::new(SharedToken::new("secret"))));
//! ```

mod bearer;
mod header;
mod token;

pub use bearer::BearerAuth;
pub use header::{DEFAULT_AUTH_HEADER, HeaderAuth};
pub use token::SharedToken;

use futures::future::BoxFuture;
use http::{Request, Response, StatusCode};
use std::task::{Context, Poll};

/// Body returned with every rejected request.
pub const UNAUTHORIZED: &str = "Unauthorized";

/// Trait for validating incoming MCP requests.
///
/// Implement this with your auth logic (header lookup, token comparison, etc.).
/// On success, `Claims` is inserted into `http::Extensions`.
pub trait Authenticator: Clone + Send + Sync + 'static {
    /// The claims type produced on successful authentication.
    type Claims: Clone + Send + Sync + 'static;

    /// The error type returned on authentication failure.
    type Error: std::fmt::Display + Send;

    /// Validate the request and return claims, or an error.
    fn authenticate(
        &self,
        parts: &http::request::Parts,
    ) -> impl Future<Output = Result<Self::Claims, Self::Error>> + Send;
}

/// Trait for validating a credential string (e.g., a Bearer token).
///
/// Wrap an implementation in [`BearerAuth`] or [`HeaderAuth`], which handle
/// extracting the credential from the request headers.
pub trait Validator: Clone + Send + Sync + 'static {
    /// The claims type produced on successful validation.
    type Claims: Clone + Send + Sync + 'static;

    /// The error type returned on validation failure.
    type Error: std::fmt::Display + Send;

    /// Validate the credential string and return claims, or an error.
    fn validate(
        &self,
        credential: &str,
    ) -> impl Future<Output = Result<Self::Claims, Self::Error>> + Send;
}

/// Tower [`Layer`](tower::Layer) that applies [`AuthService`].
#[derive(Clone)]
pub struct AuthLayer<A> {
    authenticator: A,
}

impl<A> AuthLayer<A> {
    pub fn new(authenticator: A) -> Self {
        Self { authenticator }
    }
}

impl<A, S> tower::Layer<S> for AuthLayer<A>
where
    A: Clone,
{
    type Service = AuthService<A, S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            authenticator: self.authenticator.clone(),
            inner,
        }
    }
}

/// Tower service that authenticates requests before forwarding them.
#[derive(Clone)]
pub struct AuthService<A, S> {
    authenticator: A,
    inner: S,
}

impl<A, S, B> tower::Service<Request<B>> for AuthService<A, S>
where
    A: Authenticator,
    S: tower::Service<Request<B>, Response = Response<axum::body::Body>> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: Send,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        let authenticator = self.authenticator.clone();
        let mut inner = self.inner.clone();
        // swap to ensure poll_ready state is preserved
        std::mem::swap(&mut self.inner, &mut inner);

        Box::pin(async move {
            let (parts, body) = req.into_parts();

            match authenticator.authenticate(&parts).await {
                Ok(claims) => {
                    let mut req = Request::from_parts(parts, body);
                    req.extensions_mut().insert(claims);
                    inner.call(req).await
                }
                Err(err) => {
                    tracing::debug!(uri = %parts.uri, reason = %err, "rejected unauthenticated request");
                    Ok(unauthorized())
                }
            }
        })
    }
}

/// The fixed rejection response: `401` with a plain-text body.
pub fn unauthorized() -> Response<axum::body::Body> {
    let mut response = Response::new(axum::body::Body::from(UNAUTHORIZED));
    *response.status_mut() = StatusCode::UNAUTHORIZED;
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
