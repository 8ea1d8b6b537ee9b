use arbor_types::{BinaryId, NodeId};

/// Errors from tree store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No node with this identifier exists.
    #[error("node not found: {0}")]
    NotFound(NodeId),

    /// A sibling with the same name already exists.
    #[error("item already exists: {path}")]
    ItemExists { path: String },

    /// The node name is not usable as a path segment.
    #[error("invalid node name: {0:?}")]
    InvalidName(String),

    /// The requested identifier is already held by another node.
    #[error("identifier already in use: {0}")]
    IdentifierInUse(NodeId),

    /// A reference was set to a node lacking the referenceable mixin.
    #[error("node is not referenceable: {0}")]
    NotReferenceable(NodeId),

    /// Removal would leave strong references pointing at a missing node.
    #[error("referential integrity violation: {node} is still referenced by {referrers:?}")]
    ReferentialIntegrity {
        node: NodeId,
        referrers: Vec<NodeId>,
    },

    /// The root node cannot be removed.
    #[error("cannot remove the root node")]
    RootRemoval,

    /// No binary with this identifier exists.
    #[error("binary not found: {0}")]
    BinaryNotFound(BinaryId),

    /// I/O error while reading binary content.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal lock was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

impl StoreError {
    /// Returns `true` for strong-reference integrity violations.
    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, Self::ReferentialIntegrity { .. })
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
