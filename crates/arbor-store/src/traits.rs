use std::io::Read;
use std::sync::Arc;

use arbor_types::{BinaryHandle, BinaryId, NodeId, PropertyValue};

use crate::error::StoreResult;
use crate::node::{NodeInfo, NodeSpec, Referrer};

/// Hierarchical, attribute-bearing tree store.
///
/// All implementations must satisfy these invariants:
/// - Node identifiers are stable for the lifetime of the node.
/// - Children keep their insertion order; sibling names are unique.
/// - Setting a reference (strong or weak) requires an existing,
///   referenceable target.
/// - Removing a node that is strongly referenced from outside its own
///   subtree fails with `StoreError::ReferentialIntegrity` and changes
///   nothing. Weak references never block removal.
/// - Store failures are returned, never swallowed.
pub trait TreeStore: Send + Sync {
    /// Identifier of the root node.
    fn root(&self) -> NodeId;

    /// Create a node named `name` under `parent` and return its identifier.
    fn add_node(&self, parent: &NodeId, name: &str, spec: &NodeSpec) -> StoreResult<NodeId>;

    /// Describe a node. Returns `Ok(None)` if it does not exist.
    fn node(&self, id: &NodeId) -> StoreResult<Option<NodeInfo>>;

    /// Look up a direct child by name.
    fn child(&self, parent: &NodeId, name: &str) -> StoreResult<Option<NodeId>>;

    /// Direct children in insertion order.
    fn children(&self, parent: &NodeId) -> StoreResult<Vec<NodeId>>;

    /// Resolve an absolute path such as `/a/b`.
    fn node_at(&self, path: &str) -> StoreResult<Option<NodeId>>;

    /// Create or replace a property.
    fn set_property(&self, node: &NodeId, name: &str, value: PropertyValue) -> StoreResult<()>;

    /// Read a property. Returns `Ok(None)` if it is not set.
    fn property(&self, node: &NodeId, name: &str) -> StoreResult<Option<PropertyValue>>;

    /// All properties of a node, ordered by name.
    fn properties(&self, node: &NodeId) -> StoreResult<Vec<(String, PropertyValue)>>;

    /// Remove a property. Returns `true` if it existed.
    fn remove_property(&self, node: &NodeId, name: &str) -> StoreResult<bool>;

    /// Add a mixin type to an existing node.
    fn add_mixin(&self, node: &NodeId, mixin: &str) -> StoreResult<()>;

    /// Upload binary content and return its identifier.
    fn write_binary(&self, content: &mut dyn Read) -> StoreResult<BinaryId>;

    /// Open a handle onto stored binary content.
    fn binary(&self, id: &BinaryId) -> StoreResult<Arc<dyn BinaryHandle>>;

    /// Remove a node and its subtree.
    fn remove_node(&self, id: &NodeId) -> StoreResult<()>;

    /// Properties anywhere in the store that point at `id`.
    fn referrers(&self, id: &NodeId) -> StoreResult<Vec<Referrer>>;

    /// Check whether a node exists.
    fn exists(&self, id: &NodeId) -> StoreResult<bool> {
        Ok(self.node(id)?.is_some())
    }

    /// Remove a direct child by name if present. Returns `true` if removed.
    fn remove_child(&self, parent: &NodeId, name: &str) -> StoreResult<bool> {
        match self.child(parent, name)? {
            Some(id) => {
                self.remove_node(&id)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
