//! Public error taxonomy of the client.

use thiserror::Error;

use crate::codec::{DecodingError, EncodingError};
use crate::document::ErrorObject;

/// Errors surfaced to completion callbacks.
///
/// Every failure kind reaches the original caller exactly once; nothing
/// is retried or swallowed internally. Cancellation is not an error: a
/// cancelled operation never invokes its callback and is observable only
/// through [`crate::RequestHandle::state`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The caller-supplied request body could not be serialized.
    #[error("request body could not be encoded: {0}")]
    Encoding(#[from] EncodingError),

    /// Connection, TLS or timeout failure, or an endpoint description
    /// that did not yield a valid URL. Never retried internally.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The response bytes did not match the expected envelope or
    /// resource schema, including the malformed-envelope invariant.
    #[error("response could not be decoded: {0}")]
    Decoding(#[from] DecodingError),

    /// The server's envelope carried a non-empty `errors` array. The
    /// full list is preserved so callers can distinguish causes.
    #[error("API reported {} error(s)", .0.len())]
    Api(Vec<ErrorObject>),

    /// The envelope decoded successfully but declared no primary data
    /// where the call contract required a present (possibly empty) list.
    #[error("document carried no primary data")]
    EmptyData,

    /// A relationship-bearing call received primary data but no usable
    /// side-loaded resources.
    #[error("document carried no included resources")]
    EmptyIncluded,

    /// A relationship target was absent from the included set: the
    /// server returned a primary resource whose related resource was
    /// not side-loaded.
    #[error("related resource {id} was not side-loaded")]
    MissingRelatedResource {
        /// Identifier the primary resource pointed at.
        id: String,
    },
}
