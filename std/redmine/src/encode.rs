//! Text rendering of tool results.
//!
//! Output is block-style YAML by default (or pretty JSON), keeps mapping
//! keys in insertion order, never wraps long lines and writes non-ASCII
//! characters as-is.

use crate::{config::ResponseFormat, envelope::Envelope, error::Error};
use serde::Serialize;

impl ResponseFormat {
    /// Render `value` as text. Never fails: a serialization error is itself
    /// rendered as a failure envelope.
    pub fn encode<T: Serialize + ?Sized>(self, value: &T) -> String {
        match self.try_encode(value) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(error = %err, "failed to encode tool result");
                let envelope = Envelope::failure(&err);
                self.try_encode(&envelope).unwrap_or_else(|_| envelope.error)
            }
        }
    }

    fn try_encode<T: Serialize + ?Sized>(self, value: &T) -> Result<String, Error> {
        let encoded = match self {
            Self::Yaml => serde_yaml::to_string(value).map_err(|e| e.to_string()),
            Self::Json => serde_json::to_string_pretty(value).map_err(|e| e.to_string()),
        };
        encoded.map_err(|message| Error::Other {
            kind: "EncodeFailure".into(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ResponseFormat;
    use crate::envelope::{Body, Envelope};
    use serde_json::json;

    fn sample() -> Envelope {
        Envelope::success(
            200,
            Body::Json(json!({
                "issues": [
                    {"subject": "Zürich office printer", "id": 2},
                    {"subject": "Ärger mit dem Export", "id": 1}
                ],
                "total_count": 2
            })),
        )
    }

    #[test]
    fn yaml_keeps_insertion_order() {
        let text = ResponseFormat::Yaml.encode(&sample());
        let status = text.find("status_code").unwrap();
        let body = text.find("body").unwrap();
        let error = text.find("error").unwrap();
        assert!(status < body && body < error);
        let subject = text.find("subject: Zürich").unwrap();
        let id = text.find("id: 2").unwrap();
        assert!(subject < id);
    }

    #[test]
    fn yaml_is_block_style() {
        let text = ResponseFormat::Yaml.encode(&sample());
        assert!(text.starts_with("status_code: 200\n"));
        assert!(text.contains("\n  issues:\n"));
        assert!(!text.contains('{'));
    }

    #[test]
    fn yaml_writes_unicode_directly() {
        let text = ResponseFormat::Yaml.encode(&sample());
        assert!(text.contains("Ärger mit dem Export"));
        assert!(!text.contains("\\u"));
    }

    #[test]
    fn long_lines_are_not_wrapped() {
        let description = "word ".repeat(200).trim_end().to_string();
        let text = ResponseFormat::Yaml.encode(&json!({ "description": description }));
        assert_eq!(text.trim_end(), format!("description: {description}"));
    }

    #[test]
    fn yaml_round_trips_error_envelope() {
        let envelope = Envelope {
            status_code: 0,
            body: Body::Empty,
            error: "ConnectError: connection refused".into(),
        };
        let text = ResponseFormat::Yaml.encode(&envelope);
        let parsed: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
        assert_eq!(parsed["status_code"], serde_yaml::Value::from(0));
        assert!(parsed["body"].is_null());
        assert_eq!(
            parsed["error"].as_str(),
            Some("ConnectError: connection refused")
        );
    }

    #[test]
    fn json_format_is_pretty_and_ordered() {
        let text = ResponseFormat::Json.encode(&sample());
        assert!(text.starts_with("{\n  \"status_code\": 200,\n  \"body\""));
        assert!(text.contains("Zürich"));
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["body"]["total_count"], 2);
    }

    #[test]
    fn binary_bodies_are_tagged() {
        let envelope = Envelope::success(200, Body::Raw(vec![0xff, 0xfe, 0x00]));
        let text = ResponseFormat::Yaml.encode(&envelope);
        assert!(text.contains("body: !binary //4A"));
    }
}
