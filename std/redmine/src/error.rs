//! Failure taxonomy for the Redmine server.
//!
//! Every failure a tool can hit maps to one variant here. Tools never
//! propagate these outward: they are folded into an [`Envelope`] whose
//! `error` field reads `"<kind>: <message>"`.
//!
//! [`Envelope`]: crate::envelope::Envelope

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while talking to Redmine or touching local files.
#[derive(Error, Debug)]
pub enum Error {
    /// A local path was not absolute.
    #[error("path must be fully qualified, got: {}", .0.display())]
    RelativePath(PathBuf),
    /// A local file to upload does not exist.
    #[error("file does not exist: {}", .0.display())]
    NotFound(PathBuf),
    /// A local path points at a directory where a file is required.
    #[error("path can't be a directory, got: {}", .0.display())]
    IsDirectory(PathBuf),
    /// The API path could not be resolved against the base URL.
    #[error("cannot resolve {path:?} against the base URL: {source}")]
    InvalidUrl {
        path: String,
        source: url::ParseError,
    },
    /// The HTTP method name is not usable.
    #[error("unsupported HTTP method: {0:?}")]
    InvalidMethod(String),
    /// The request did not complete within the fixed timeout.
    #[error("{0}")]
    Timeout(reqwest::Error),
    /// No connection could be established.
    #[error("{0}")]
    Connect(reqwest::Error),
    /// Any other failure on the wire.
    #[error("{0}")]
    Transport(reqwest::Error),
    /// Redmine answered with a 4xx or 5xx status.
    #[error("{0}")]
    UpstreamStatus(reqwest::Error),
    /// Redmine answered with a 3xx status. Redirects are never followed.
    #[error("redirect response '{status}' to {location:?} was not followed")]
    Redirect {
        status: reqwest::StatusCode,
        location: String,
    },
    /// The response body could not be read or decoded.
    #[error("{0}")]
    Decode(reqwest::Error),
    /// Attachment metadata lacked `attachment.filename`.
    #[error("attachment metadata has no filename")]
    MissingFilename,
    /// Local file I/O failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),
    /// The configured inbound auth header is not a valid header name.
    #[error("invalid auth header name: {0}")]
    AuthHeader(#[from] axum::http::header::InvalidHeaderName),
    /// The bundled OpenAPI document is malformed.
    #[error("invalid OpenAPI document: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Catch-all keeping a failure's kind label and message.
    #[error("{message}")]
    Other { kind: String, message: String },
}

impl Error {
    /// Classify a `reqwest` failure raised before or during the exchange.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err)
        } else if err.is_connect() {
            Self::Connect(err)
        } else if err.is_status() {
            Self::UpstreamStatus(err)
        } else if err.is_body() || err.is_decode() {
            Self::Decode(err)
        } else {
            Self::Transport(err)
        }
    }

    /// Stable label for the failure class.
    pub fn kind(&self) -> &str {
        match self {
            Self::RelativePath(_) | Self::NotFound(_) | Self::IsDirectory(_) => "InvalidPath",
            Self::InvalidUrl { .. } => "InvalidUrl",
            Self::InvalidMethod(_) => "InvalidMethod",
            Self::Timeout(_) => "TimeoutError",
            Self::Connect(_) => "ConnectError",
            Self::Transport(_) => "TransportFailure",
            Self::UpstreamStatus(_) | Self::Redirect { .. } => "UpstreamHTTPError",
            Self::Decode(_) => "DecodeFailure",
            Self::MissingFilename => "InvalidMetadata",
            Self::Io(_) => "IoError",
            Self::Client(_) => "ClientError",
            Self::AuthHeader(_) => "InvalidHeaderName",
            Self::Yaml(_) => "YamlError",
            Self::Other { kind, .. } => kind.as_str(),
        }
    }

    /// Text placed in an envelope's `error` field.
    pub fn describe(&self) -> String {
        format!("{}: {}", self.kind(), self)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use std::path::PathBuf;

    #[test]
    fn describe_prefixes_kind() {
        let err = Error::RelativePath(PathBuf::from("file.txt"));
        assert_eq!(
            err.describe(),
            "InvalidPath: path must be fully qualified, got: file.txt"
        );
    }

    #[test]
    fn other_keeps_its_label() {
        let err = Error::Other {
            kind: "EncodeFailure".into(),
            message: "boom".into(),
        };
        assert_eq!(err.describe(), "EncodeFailure: boom");
    }

    #[test]
    fn redirects_are_upstream_errors() {
        let err = Error::Redirect {
            status: reqwest::StatusCode::MOVED_PERMANENTLY,
            location: "https://other.example.com/".into(),
        };
        assert_eq!(
            err.describe(),
            "UpstreamHTTPError: redirect response '301 Moved Permanently' to \"https://other.example.com/\" was not followed"
        );
    }

    #[test]
    fn io_errors_are_labelled() {
        let err = Error::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.describe(), "IoError: denied");
    }
}
