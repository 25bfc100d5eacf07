//! Joins primary resources with their side-loaded relationship targets.
//!
//! Resolution is a pure function of the primary sequence and an index
//! derived from `included`: no I/O, no shared state. The original order
//! of the primary sequence is preserved, which matters to
//! pagination-sensitive callers.

use std::collections::HashMap;

use crate::codec::DecodingError;
use crate::document::{NoRelationships, RelationshipRef, ResourceObject};
use crate::error::ClientError;

/// Build an `id -> attributes` index over the side-loaded resources.
///
/// Duplicate ids are not expected from the server; if they occur, the
/// last occurrence wins.
pub(crate) fn included_index<I>(
    included: Vec<ResourceObject<I, NoRelationships>>,
) -> HashMap<String, I> {
    let mut index = HashMap::with_capacity(included.len());
    for resource in included {
        index.insert(resource.id, resource.attributes);
    }
    index
}

/// Map each primary resource plus its relationship target into an entity.
///
/// The builder receives the primary id, the primary attributes, the
/// related id and the related attributes, in the original primary order.
///
/// # Errors
///
/// [`DecodingError::MissingRelationship`] when a primary resource has no
/// relationship pointer, and [`ClientError::MissingRelatedResource`] when
/// the pointed-at id is absent from the index. Entities are never
/// silently dropped.
pub(crate) fn resolve_related<P, A, I, T, F>(
    primary: Vec<ResourceObject<P, RelationshipRef<A>>>,
    index: &HashMap<String, I>,
    mut build: F,
) -> Result<Vec<T>, ClientError>
where
    F: FnMut(String, P, &str, &I) -> T,
{
    let mut entities = Vec::with_capacity(primary.len());
    for resource in primary {
        let Some(relationship) = resource.relationships else {
            return Err(ClientError::Decoding(DecodingError::MissingRelationship(
                resource.id,
            )));
        };
        let Some(related) = index.get(&relationship.id) else {
            return Err(ClientError::MissingRelatedResource {
                id: relationship.id,
            });
        };
        entities.push(build(resource.id, resource.attributes, &relationship.id, related));
    }
    Ok(entities)
}
