//! Pluggable body formats for the request engine.
//!
//! A [`FormatEncoder`] serializes an outgoing request body and names the
//! MIME type attached alongside it; a [`FormatDecoder`] turns response
//! bytes back into a typed value. Both are stateless and shared freely
//! across concurrent operations, which keeps the transfer logic in
//! [`crate::operation`] independent of any concrete wire format.

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Failure to serialize a caller-supplied request body.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// The body could not be serialized by the format encoder.
    #[error("body serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure to turn response bytes into a typed value.
#[derive(Debug, Error)]
pub enum DecodingError {
    /// Malformed bytes, a schema mismatch or a missing required field.
    #[error("response deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The response carried no body although one was expected.
    #[error("response carried no body")]
    EmptyBody,

    /// The decoded document declared neither primary data nor errors.
    #[error("document carries neither data nor errors")]
    InvalidContent,

    /// A primary resource was missing its required relationship pointer.
    /// Carries the id of the offending resource.
    #[error("resource {0} is missing its relationship pointer")]
    MissingRelationship(String),
}

/// A stateless request-body encoder bound to a MIME type.
pub trait FormatEncoder: Send + Sync {
    /// MIME type advertised in the `content-type` header when a body is
    /// attached to a request.
    fn mime_type(&self) -> &'static str;

    /// Serialize `value` into a byte payload.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError`] when the value cannot be serialized.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, EncodingError>;
}

/// A stateless response-body decoder bound to a MIME type.
pub trait FormatDecoder: Send + Sync {
    /// MIME type this decoder understands.
    fn mime_type(&self) -> &'static str;

    /// Deserialize `bytes` into a typed value.
    ///
    /// # Errors
    ///
    /// Returns [`DecodingError::Deserialization`] on malformed bytes or a
    /// schema mismatch.
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, DecodingError>;
}

/// JSON format backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json;

impl FormatEncoder for Json {
    fn mime_type(&self) -> &'static str {
        "application/json"
    }

    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, EncodingError> {
        Ok(serde_json::to_vec(value)?)
    }
}

impl FormatDecoder for Json {
    fn mime_type(&self) -> &'static str {
        "application/json"
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, DecodingError> {
        serde_json::from_slice(bytes).map_err(DecodingError::Deserialization)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        name: String,
        value: u32,
    }

    #[test]
    fn json_mime_types_match() {
        assert_eq!(FormatEncoder::mime_type(&Json), "application/json");
        assert_eq!(FormatDecoder::mime_type(&Json), "application/json");
    }

    #[test]
    fn json_encodes_and_decodes() {
        let sample = Sample {
            name: "ccs".to_string(),
            value: 50,
        };

        let bytes = Json.encode(&sample).unwrap();
        let back: Sample = Json.decode(&bytes).unwrap();
        assert_eq!(back, sample);
    }

    #[test]
    fn json_decode_rejects_malformed_bytes() {
        let result: Result<Sample, _> = Json.decode(b"{not json");
        assert!(matches!(result, Err(DecodingError::Deserialization(_))));
    }

    #[test]
    fn json_decode_rejects_missing_fields() {
        let result: Result<Sample, _> = Json.decode(br#"{"name":"ccs"}"#);
        assert!(matches!(result, Err(DecodingError::Deserialization(_))));
    }
}
