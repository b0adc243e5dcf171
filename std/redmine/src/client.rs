//! HTTP access to the Redmine REST API.
//!
//! [`RedmineClient::request`] issues exactly one call (redirects are not
//! followed) and folds every
//! outcome (success, HTTP error status, transport failure, undecodable body)
//! into an [`Envelope`]. It never returns an error.

use crate::{
    config::Settings,
    envelope::{Body, Envelope},
    error::Error,
};
use reqwest::{
    Method,
    header::{CONTENT_TYPE, LOCATION},
    redirect,
};
use serde_json::{Map, Value};
use std::time::Duration;
use url::Url;

/// Upper bound for one upstream exchange, connect through last body byte.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Header carrying the Redmine API key.
pub const API_KEY_HEADER: &str = "X-Redmine-API-Key";

/// One call to make against the API.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    path: String,
    method: String,
    data: Option<Value>,
    params: Option<Map<String, Value>>,
    content_type: String,
    content: Option<Vec<u8>>,
    raw: bool,
}

impl ApiRequest {
    /// A `GET` of `path` with a JSON content type.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: "get".into(),
            data: None,
            params: None,
            content_type: "application/json".into(),
            content: None,
            raw: false,
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// JSON request body.
    pub fn data(mut self, data: Option<Value>) -> Self {
        self.data = data;
        self
    }

    /// Query string parameters.
    pub fn params(mut self, params: Option<Map<String, Value>>) -> Self {
        self.params = params;
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Raw request body. Takes precedence over [`ApiRequest::data`].
    pub fn content(mut self, content: Vec<u8>) -> Self {
        self.content = Some(content);
        self
    }

    /// Keep a successful response body as bytes instead of decoding JSON.
    pub fn raw(mut self) -> Self {
        self.raw = true;
        self
    }
}

/// Client bound to one Redmine instance.
#[derive(Debug, Clone)]
pub struct RedmineClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl RedmineClient {
    pub fn new(settings: &Settings) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(Error::Client)?;
        Ok(Self {
            http,
            base_url: settings.url.clone(),
            api_key: settings.api_key.clone(),
        })
    }

    /// Resolve an API path against the base URL. Leading slashes are
    /// dropped so the path is always relative to the base.
    pub fn url_for(&self, path: &str) -> Result<Url, Error> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|source| Error::InvalidUrl {
                path: path.to_string(),
                source,
            })
    }

    /// Perform one exchange and describe its outcome.
    pub async fn request(&self, req: ApiRequest) -> Envelope {
        match self.exchange(req).await {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(error = %err, "redmine request failed before a response arrived");
                Envelope::failure(&err)
            }
        }
    }

    async fn exchange(&self, req: ApiRequest) -> Result<Envelope, Error> {
        let url = self.url_for(&req.path)?;
        let method = Method::from_bytes(req.method.to_ascii_uppercase().as_bytes())
            .map_err(|_| Error::InvalidMethod(req.method.clone()))?;
        tracing::debug!(%method, %url, "sending redmine request");

        let mut builder = self
            .http
            .request(method, url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(CONTENT_TYPE, &req.content_type);
        if let Some(params) = &req.params {
            builder = builder.query(&query_pairs(params));
        }
        if let Some(content) = req.content {
            builder = builder.body(content);
        } else if let Some(data) = &req.data {
            builder = builder.body(data.to_string());
        }

        let response = builder.send().await.map_err(Error::from_transport)?;
        let status = response.status();
        let status_error = if status.is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string();
            Some(Error::Redirect { status, location })
        } else {
            response.error_for_status_ref().err().map(Error::UpstreamStatus)
        };

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                let err = Error::from_transport(err);
                tracing::warn!(status = status.as_u16(), error = %err, "failed to read redmine response");
                return Ok(Envelope::upstream_failure(status.as_u16(), Body::Empty, &err));
            }
        };

        let envelope = match status_error {
            None if req.raw => Envelope::success(status.as_u16(), Body::raw(&bytes)),
            None => Envelope::success(status.as_u16(), Body::decode(&bytes)),
            Some(err) => {
                tracing::warn!(status = status.as_u16(), error = %err, "redmine returned an error status");
                Envelope::upstream_failure(status.as_u16(), Body::recover(&bytes), &err)
            }
        };
        Ok(envelope)
    }
}

/// Flatten a JSON object into query pairs. Arrays repeat their key, `null`
/// becomes an empty value and strings are sent without quotes.
fn query_pairs(params: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(params.len());
    for (key, value) in params {
        match value {
            Value::Array(items) => {
                pairs.extend(items.iter().map(|item| (key.clone(), query_value(item))));
            }
            other => pairs.push((key.clone(), query_value(other))),
        }
    }
    pairs
}

fn query_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
