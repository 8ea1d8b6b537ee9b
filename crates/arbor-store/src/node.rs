use serde::{Deserialize, Serialize};

use arbor_types::{NodeId, RefStrength};

/// Mixin that allows a node to be the target of references.
pub const MIX_REFERENCEABLE: &str = "mix:referenceable";

/// Creation parameters for a new node.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Identifier the store should adopt instead of generating one.
    pub identifier: Option<NodeId>,
    /// Mixin types applied at creation.
    pub mixins: Vec<String>,
}

impl NodeSpec {
    /// A spec with no identifier request and no mixins.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a specific identifier.
    pub fn with_identifier(mut self, id: NodeId) -> Self {
        self.identifier = Some(id);
        self
    }

    /// Add a mixin type (duplicates are ignored).
    pub fn with_mixin(mut self, mixin: impl Into<String>) -> Self {
        let mixin = mixin.into();
        if !self.mixins.contains(&mixin) {
            self.mixins.push(mixin);
        }
        self
    }
}

/// Read-only description of a stored node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub id: NodeId,
    pub name: String,
    /// Absolute path, `/` for the root.
    pub path: String,
    pub parent: Option<NodeId>,
    pub mixins: Vec<String>,
}

impl NodeInfo {
    /// Returns `true` if the node carries the given mixin.
    pub fn has_mixin(&self, mixin: &str) -> bool {
        self.mixins.iter().any(|m| m == mixin)
    }

    /// Returns `true` if the node may be the target of references.
    pub fn is_referenceable(&self) -> bool {
        self.has_mixin(MIX_REFERENCEABLE)
    }
}

/// A property elsewhere in the store that points at a node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referrer {
    /// Node holding the pointer.
    pub node: NodeId,
    /// Name of the property holding the pointer.
    pub property: String,
    pub strength: RefStrength,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_mixins_are_deduplicated() {
        let spec = NodeSpec::new()
            .with_mixin(MIX_REFERENCEABLE)
            .with_mixin(MIX_REFERENCEABLE)
            .with_mixin("mix:created");
        assert_eq!(spec.mixins.len(), 2);
    }

    #[test]
    fn info_reports_referenceable() {
        let info = NodeInfo {
            id: NodeId::parse("n1").unwrap(),
            name: "n1".into(),
            path: "/n1".into(),
            parent: None,
            mixins: vec![MIX_REFERENCEABLE.into()],
        };
        assert!(info.is_referenceable());
        assert!(!info.has_mixin("mix:versionable"));
    }
}
