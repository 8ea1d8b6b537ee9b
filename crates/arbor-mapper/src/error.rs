//! Error types for the mapping engine.

use arbor_store::StoreError;
use arbor_types::{NodeId, TypeError};
use thiserror::Error;

/// Errors that can occur while mapping objects to and from nodes.
#[derive(Debug, Error)]
pub enum MapError {
    /// A type's field descriptors are inconsistent.
    #[error("invalid mapping for {type_name}: {reason}")]
    Configuration { type_name: String, reason: String },

    /// The mapper configuration could not be loaded.
    #[error("invalid mapper configuration: {0}")]
    InvalidConfig(String),

    /// An operation needed a field role the type does not declare.
    #[error("{type_name} declares no {role} field")]
    MissingRole {
        type_name: String,
        role: &'static str,
    },

    /// A node names a type the mapper cannot resolve.
    #[error("unknown mapped type: {0:?}")]
    UnknownType(String),

    /// A concrete type is not among the targets a field accepts.
    #[error("type {type_name:?} is not accepted by field {field}")]
    DisallowedType { field: String, type_name: String },

    /// An object was asked for a field it does not have.
    #[error("{type_name} has no field {field:?}")]
    UnknownField { type_name: String, field: String },

    /// A value did not have the shape its field expects.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// A field setter rejected the value read from the store.
    #[error("cannot set {type_name}.{field}: {source}")]
    Field {
        type_name: String,
        field: String,
        #[source]
        source: Box<MapError>,
    },

    /// A strong pointer names a node that no longer exists.
    #[error("{field}: strong reference target {target} does not exist")]
    MissingReferenceTarget { field: String, target: NodeId },

    /// A reference target had to be persisted but the depth budget ran out.
    #[error("{field}: cannot persist referenced {type_name} beyond the depth limit")]
    UnresolvedReference { field: String, type_name: String },

    /// The node to read does not exist.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// An identifier field held an unusable value.
    #[error(transparent)]
    Identifier(#[from] TypeError),

    /// Error from the tree store, passed through unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// I/O error while moving content.
    #[error("content I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An object lock was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

impl MapError {
    /// Build an [`MapError::UnknownField`].
    pub fn unknown_field(type_name: &str, field: &str) -> Self {
        Self::UnknownField {
            type_name: type_name.to_string(),
            field: field.to_string(),
        }
    }

    /// Build a [`MapError::TypeMismatch`].
    pub fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Attach the field being set to an error raised by a setter.
    pub(crate) fn in_field(self, type_name: &str, field: &str) -> Self {
        Self::Field {
            type_name: type_name.to_string(),
            field: field.to_string(),
            source: Box::new(self),
        }
    }

    /// Returns `true` if the store refused a removal because of strong
    /// references.
    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_integrity_violation())
    }
}

/// Convenience type alias for mapping operations.
pub type MapResult<T> = std::result::Result<T, MapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_pass_through_unchanged() {
        let node = NodeId::parse("12345").unwrap();
        let err = MapError::from(StoreError::ReferentialIntegrity {
            node: node.clone(),
            referrers: vec![],
        });
        assert!(err.is_integrity_violation());
        assert_eq!(
            err.to_string(),
            StoreError::ReferentialIntegrity {
                node,
                referrers: vec![]
            }
            .to_string()
        );
    }

    #[test]
    fn field_context_wraps_source() {
        let err = MapError::mismatch("string", "long").in_field("Book", "title");
        assert_eq!(
            err.to_string(),
            "cannot set Book.title: type mismatch: expected string, found long"
        );
        assert!(!err.is_integrity_violation());
    }
}
