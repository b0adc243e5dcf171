//! The uniform result shape returned by every network-issuing tool.

use crate::error::Error;
use base64::Engine;
use serde::{Serialize, Serializer};

/// Outcome of one tool call.
///
/// All three fields are always present. `error` is empty on success and
/// `status_code` is `0` only when no HTTP exchange took place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub status_code: u16,
    pub body: Body,
    pub error: String,
}

impl Envelope {
    /// A successful exchange.
    pub fn success(status_code: u16, body: Body) -> Self {
        Self {
            status_code,
            body,
            error: String::new(),
        }
    }

    /// A failure that happened before any response was received.
    pub fn failure(err: &Error) -> Self {
        Self {
            status_code: 0,
            body: Body::Empty,
            error: err.describe(),
        }
    }

    /// A failure that still carries the upstream status and body.
    pub fn upstream_failure(status_code: u16, body: Body, err: &Error) -> Self {
        Self {
            status_code,
            body,
            error: err.describe(),
        }
    }
}

/// Response payload after decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// No content was returned.
    Empty,
    /// Structured content.
    Json(serde_json::Value),
    /// Content that is not JSON, or that was requested undecoded.
    Raw(Vec<u8>),
}

impl Body {
    /// Decoding policy for successful responses: empty content is
    /// [`Body::Empty`], JSON is parsed, anything else is kept as bytes.
    pub fn decode(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return Self::Empty;
        }
        match serde_json::from_slice(bytes) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Raw(bytes.to_vec()),
        }
    }

    /// Keep the bytes as they are, only mapping empty content to
    /// [`Body::Empty`].
    pub fn raw(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            Self::Empty
        } else {
            Self::Raw(bytes.to_vec())
        }
    }

    /// Best-effort recovery of an error response: JSON if possible,
    /// otherwise the body as text.
    pub fn recover(bytes: &[u8]) -> Self {
        match serde_json::from_slice(bytes) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Json(serde_json::Value::String(
                String::from_utf8_lossy(bytes).into_owned(),
            )),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Json(value) => match value {
                serde_json::Value::Null => true,
                serde_json::Value::String(s) => s.is_empty(),
                serde_json::Value::Array(items) => items.is_empty(),
                serde_json::Value::Object(map) => map.is_empty(),
                _ => false,
            },
            Self::Raw(bytes) => bytes.is_empty(),
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }
}

impl Serialize for Body {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Empty => serializer.serialize_unit(),
            Self::Json(value) => value.serialize(serializer),
            Self::Raw(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => serializer.serialize_str(text),
                // YAML renders this as a `!binary` tag.
                Err(_) => serializer.serialize_newtype_variant(
                    "Body",
                    2,
                    "binary",
                    &base64::engine::general_purpose::STANDARD.encode(bytes),
                ),
            },
        }
    }
}
