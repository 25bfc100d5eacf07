//! Generic JSON:API document model shared by every endpoint.
//!
//! The wire shape is decoded once, generically over the primary attribute
//! type `P`, the relationship slot `R`, the included (side-loaded)
//! attribute type `I` and the metadata type `M`. Endpoint modules only
//! supply attribute bags and type names; the envelope logic and its
//! invariants live here.
//!
//! Invariant applied by [`Document::into_success`]: a document is a
//! failure iff `errors` is present and non-empty (errors take precedence
//! over `data`); a document with neither `data` nor `errors` is malformed
//! and rejected.

use std::fmt;
use std::marker::PhantomData;

use serde::Deserialize;
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};

use crate::codec::DecodingError;
use crate::error::ClientError;

/// Binds an attribute type to its JSON:API schema name.
///
/// The name is compile-time data: it selects the key a relationship is
/// nested under and is never read back from the wire.
pub trait ResourceAttributes {
    /// The schema name of the resource type, e.g. `"car"`.
    const TYPE_NAME: &'static str;
}

/// An error object returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorObject {
    /// HTTP-status-like code as reported by the server. Not necessarily
    /// the transport status of the response that carried it.
    pub status: String,
    /// Human-readable message.
    pub title: String,
}

impl fmt::Display for ErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status, self.title)
    }
}

/// Fills an unused attribute or metadata slot. Decodes from any value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoData;

impl<'de> Deserialize<'de> for NoData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_ignored_any(IgnoredAny)?;
        Ok(Self)
    }
}

impl ResourceAttributes for NoData {
    const TYPE_NAME: &'static str = "<none>";
}

/// Fills the relationship slot of resources that have none. Decodes from
/// any value so a server that still sends a `relationships` member does
/// not break the call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoRelationships;

impl<'de> Deserialize<'de> for NoRelationships {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_ignored_any(IgnoredAny)?;
        Ok(Self)
    }
}

/// A foreign-key-only pointer to a related resource.
///
/// Carries the referenced resource's id; the target type is known
/// statically through `A`. The pointer does not own the referenced object
/// and is resolved later against the included index, see
/// [`crate::resolve`].
pub struct RelationshipRef<A> {
    /// Identifier of the referenced resource.
    pub id: String,
    marker: PhantomData<fn() -> A>,
}

impl<A> RelationshipRef<A> {
    /// Build a reference from a raw id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            marker: PhantomData,
        }
    }
}

impl<A> Clone for RelationshipRef<A> {
    fn clone(&self) -> Self {
        Self::new(self.id.clone())
    }
}

impl<A> fmt::Debug for RelationshipRef<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationshipRef").field("id", &self.id).finish()
    }
}

impl<A> PartialEq for RelationshipRef<A> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<A> Eq for RelationshipRef<A> {}

/// Decodes the JSON:API relationship shape
/// `{ "<type name>": { "data": { "id": "..." } } }`.
///
/// The absence of any level is a deserialization error, never a silent
/// `None`; sibling keys for other relationship types are skipped.
impl<'de, A: ResourceAttributes> Deserialize<'de> for RelationshipRef<A> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Linkage {
            data: Identifier,
        }

        #[derive(Deserialize)]
        struct Identifier {
            id: String,
        }

        struct RefVisitor<A>(PhantomData<fn() -> A>);

        impl<'de, A: ResourceAttributes> Visitor<'de> for RefVisitor<A> {
            type Value = RelationshipRef<A>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a relationship map with a {:?} entry", A::TYPE_NAME)
            }

            fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<Self::Value, M::Error> {
                let mut linkage: Option<Linkage> = None;
                while let Some(key) = map.next_key::<String>()? {
                    if key == A::TYPE_NAME {
                        linkage = Some(map.next_value()?);
                    } else {
                        map.next_value::<IgnoredAny>()?;
                    }
                }

                let linkage = linkage.ok_or_else(|| de::Error::missing_field(A::TYPE_NAME))?;
                Ok(RelationshipRef::new(linkage.data.id))
            }
        }

        deserializer.deserialize_map(RefVisitor(PhantomData))
    }
}

/// One resource object as it appears in `data` or `included`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResourceObject<A, R> {
    /// Identifier of the resource.
    pub id: String,
    /// Resource-specific decoded payload.
    pub attributes: A,
    /// Optional pointer into the related resources.
    pub relationships: Option<R>,
}

/// The top-level decoded response for one HTTP call.
///
/// All four members are decoded independently; the absence of a field is
/// not an error by itself. [`Document::into_success`] applies the
/// success/failure/malformed invariant afterwards.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Document<P, R, I, M = NoData> {
    /// Resources directly answering the request.
    pub data: Option<Vec<ResourceObject<P, R>>>,
    /// Endpoint-specific metadata.
    pub meta: Option<M>,
    /// Error objects; non-empty means the whole call failed.
    pub errors: Option<Vec<ErrorObject>>,
    /// Side-loaded resources referenced by the primary data.
    pub included: Option<Vec<ResourceObject<I, NoRelationships>>>,
}

/// A document that passed the success invariant.
#[derive(Debug, Clone, PartialEq)]
pub struct SuccessDocument<P, R, I, M = NoData> {
    /// Resources directly answering the request.
    pub data: Option<Vec<ResourceObject<P, R>>>,
    /// Endpoint-specific metadata.
    pub meta: Option<M>,
    /// Side-loaded resources referenced by the primary data.
    pub included: Option<Vec<ResourceObject<I, NoRelationships>>>,
}

impl<P, R, I, M> Document<P, R, I, M> {
    /// Apply the success/failure/malformed invariant.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] when the server reported a non-empty `errors`
    /// array, regardless of whether `data` is also present;
    /// [`ClientError::Decoding`] with [`DecodingError::InvalidContent`]
    /// when both `data` and `errors` are absent.
    pub fn into_success(self) -> Result<SuccessDocument<P, R, I, M>, ClientError> {
        match self.errors {
            Some(errors) if !errors.is_empty() => Err(ClientError::Api(errors)),
            Some(_) => Ok(SuccessDocument {
                data: self.data,
                meta: self.meta,
                included: self.included,
            }),
            None if self.data.is_none() => {
                Err(ClientError::Decoding(DecodingError::InvalidContent))
            }
            None => Ok(SuccessDocument {
                data: self.data,
                meta: self.meta,
                included: self.included,
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Deserialize)]
    struct CarAttributes {
        name: String,
    }

    impl ResourceAttributes for CarAttributes {
        const TYPE_NAME: &'static str = "car";
    }

    struct Manufacturer;

    impl ResourceAttributes for Manufacturer {
        const TYPE_NAME: &'static str = "manufacturer";
    }

    type CarDocument = Document<CarAttributes, RelationshipRef<Manufacturer>, NoData>;

    #[test]
    fn relationship_ref_decodes_nested_id() {
        let json = r#"{"manufacturer": {"data": {"id": "m-1", "type": "manufacturer"}}}"#;
        let reference: RelationshipRef<Manufacturer> = serde_json::from_str(json).unwrap();
        assert_eq!(reference.id, "m-1");
    }

    #[test]
    fn relationship_ref_skips_unrelated_keys() {
        let json = r#"{"dealer": {"data": {"id": "d-9"}}, "manufacturer": {"data": {"id": "m-2"}}}"#;
        let reference: RelationshipRef<Manufacturer> = serde_json::from_str(json).unwrap();
        assert_eq!(reference.id, "m-2");
    }

    #[test]
    fn relationship_ref_rejects_missing_type_key() {
        let json = r#"{"dealer": {"data": {"id": "d-9"}}}"#;
        let result: Result<RelationshipRef<Manufacturer>, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn relationship_ref_rejects_missing_data_level() {
        let json = r#"{"manufacturer": {"id": "m-1"}}"#;
        let result: Result<RelationshipRef<Manufacturer>, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn relationship_ref_rejects_missing_id() {
        let json = r#"{"manufacturer": {"data": {"type": "manufacturer"}}}"#;
        let result: Result<RelationshipRef<Manufacturer>, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn document_decodes_data_and_relationship() {
        let json = r#"{
            "data": [{
                "id": "car-1",
                "type": "car",
                "attributes": {"name": "Model 3"},
                "relationships": {"manufacturer": {"data": {"id": "m-1"}}}
            }]
        }"#;

        let document: CarDocument = serde_json::from_str(json).unwrap();
        let success = document.into_success().unwrap();
        let data = success.data.unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].id, "car-1");
        assert_eq!(data[0].attributes.name, "Model 3");
        assert_eq!(data[0].relationships.as_ref().unwrap().id, "m-1");
    }

    #[test]
    fn errors_take_precedence_over_data() {
        let json = r#"{
            "data": [{"id": "car-1", "attributes": {"name": "Zoe"}}],
            "errors": [{"status": "429", "title": "rate limited"}]
        }"#;

        let document: CarDocument = serde_json::from_str(json).unwrap();
        match document.into_success() {
            Err(ClientError::Api(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].status, "429");
                assert_eq!(errors[0].title, "rate limited");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn document_without_data_and_errors_is_malformed() {
        let document: CarDocument = serde_json::from_str(r#"{"meta": null}"#).unwrap();
        assert!(matches!(
            document.into_success(),
            Err(ClientError::Decoding(DecodingError::InvalidContent))
        ));
    }

    #[test]
    fn empty_errors_array_is_a_success() {
        let json = r#"{"data": [], "errors": []}"#;
        let document: CarDocument = serde_json::from_str(json).unwrap();
        let success = document.into_success().unwrap();
        assert_eq!(success.data.unwrap().len(), 0);
    }

    #[test]
    fn no_data_slot_accepts_arbitrary_values() {
        let json = r#"{"data": [], "meta": {"anything": [1, 2, 3]}, "included": [
            {"id": "x", "attributes": {"k": "v"}, "relationships": {"deep": {"nested": true}}}
        ]}"#;
        let document: Document<NoData, NoRelationships, NoData> =
            serde_json::from_str(json).unwrap();
        assert!(document.errors.is_none());
        assert_eq!(document.included.unwrap().len(), 1);
    }

    #[test]
    fn error_object_displays_status_and_title() {
        let error = ErrorObject {
            status: "403".to_string(),
            title: "forbidden".to_string(),
        };
        assert_eq!(error.to_string(), "[403] forbidden");
    }
}
