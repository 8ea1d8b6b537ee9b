use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::{self, Read};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use arbor_types::{BinaryHandle, BinaryId, NodeId, PropertyValue, RefStrength};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::node::{NodeInfo, NodeSpec, Referrer};
use crate::traits::TreeStore;

struct NodeRecord {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    properties: BTreeMap<String, PropertyValue>,
    mixins: Vec<String>,
}

impl NodeRecord {
    fn new(name: &str, parent: Option<NodeId>, mixins: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            parent,
            children: Vec::new(),
            properties: BTreeMap::new(),
            mixins,
        }
    }
}

#[derive(Default)]
struct State {
    nodes: HashMap<NodeId, NodeRecord>,
    binaries: HashMap<BinaryId, Arc<[u8]>>,
}

impl State {
    fn record(&self, id: &NodeId) -> StoreResult<&NodeRecord> {
        self.nodes
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    fn record_mut(&mut self, id: &NodeId) -> StoreResult<&mut NodeRecord> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    fn path_of(&self, id: &NodeId) -> StoreResult<String> {
        let mut segments = Vec::new();
        let mut current = self.record(id)?;
        while let Some(parent) = &current.parent {
            segments.push(current.name.as_str());
            current = self.record(parent)?;
        }
        segments.reverse();
        Ok(format!("/{}", segments.join("/")))
    }

    fn child_named(&self, parent: &NodeId, name: &str) -> StoreResult<Option<NodeId>> {
        let record = self.record(parent)?;
        Ok(record
            .children
            .iter()
            .find(|c| self.nodes.get(*c).is_some_and(|n| n.name == name))
            .cloned())
    }

    fn subtree(&self, id: &NodeId) -> HashSet<NodeId> {
        let mut seen = HashSet::new();
        let mut stack = vec![id.clone()];
        while let Some(next) = stack.pop() {
            if let Some(record) = self.nodes.get(&next) {
                stack.extend(record.children.iter().cloned());
            }
            seen.insert(next);
        }
        seen
    }
}

fn validate_name(name: &str) -> StoreResult<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Binary content held by an [`InMemoryTreeStore`].
#[derive(Clone, Debug)]
pub struct InMemoryBinary {
    id: BinaryId,
    data: Arc<[u8]>,
}

impl BinaryHandle for InMemoryBinary {
    fn id(&self) -> BinaryId {
        self.id
    }

    fn open(&self) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(io::Cursor::new(Arc::clone(&self.data))))
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.data.len() as u64)
    }
}

/// In-memory, HashMap-based tree store.
///
/// Intended for tests and embedding. The whole tree lives behind a single
/// `RwLock`; every trait method takes the lock once, so each call is atomic
/// with respect to the others.
pub struct InMemoryTreeStore {
    state: RwLock<State>,
    root: NodeId,
    config: StoreConfig,
}

impl InMemoryTreeStore {
    /// Create a store holding only a root node.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create a store with explicit behaviour switches.
    pub fn with_config(config: StoreConfig) -> Self {
        let root = NodeId::generate();
        let mut state = State::default();
        state
            .nodes
            .insert(root.clone(), NodeRecord::new("", None, Vec::new()));
        Self {
            state: RwLock::new(state),
            root,
            config,
        }
    }

    /// Number of nodes, including the root.
    pub fn len(&self) -> usize {
        self.read_state().map(|s| s.nodes.len()).unwrap_or(0)
    }

    /// Returns `true` if only the root node exists.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Number of distinct binaries uploaded.
    pub fn binary_count(&self) -> usize {
        self.read_state().map(|s| s.binaries.len()).unwrap_or(0)
    }

    /// The active configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn read_state(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn write_state(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

impl Default for InMemoryTreeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeStore for InMemoryTreeStore {
    fn root(&self) -> NodeId {
        self.root.clone()
    }

    fn add_node(&self, parent: &NodeId, name: &str, spec: &NodeSpec) -> StoreResult<NodeId> {
        validate_name(name)?;
        let mut state = self.write_state()?;
        if state.child_named(parent, name)?.is_some() {
            let parent_path = state.path_of(parent)?;
            return Err(StoreError::ItemExists {
                path: join_path(&parent_path, name),
            });
        }

        let id = match &spec.identifier {
            Some(requested) if state.nodes.contains_key(requested) => {
                return Err(StoreError::IdentifierInUse(requested.clone()));
            }
            Some(requested) => requested.clone(),
            None => NodeId::generate(),
        };

        let mut mixins = Vec::new();
        for mixin in &spec.mixins {
            if !mixins.contains(mixin) {
                mixins.push(mixin.clone());
            }
        }

        state
            .nodes
            .insert(id.clone(), NodeRecord::new(name, Some(parent.clone()), mixins));
        state.record_mut(parent)?.children.push(id.clone());
        debug!(node = %id.short_id(), name, "added node");
        Ok(id)
    }

    fn node(&self, id: &NodeId) -> StoreResult<Option<NodeInfo>> {
        let state = self.read_state()?;
        let Some(record) = state.nodes.get(id) else {
            return Ok(None);
        };
        Ok(Some(NodeInfo {
            id: id.clone(),
            name: record.name.clone(),
            path: state.path_of(id)?,
            parent: record.parent.clone(),
            mixins: record.mixins.clone(),
        }))
    }

    fn child(&self, parent: &NodeId, name: &str) -> StoreResult<Option<NodeId>> {
        self.read_state()?.child_named(parent, name)
    }

    fn children(&self, parent: &NodeId) -> StoreResult<Vec<NodeId>> {
        Ok(self.read_state()?.record(parent)?.children.clone())
    }

    fn node_at(&self, path: &str) -> StoreResult<Option<NodeId>> {
        let state = self.read_state()?;
        let mut current = self.root.clone();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            match state.child_named(&current, segment)? {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    fn set_property(&self, node: &NodeId, name: &str, value: PropertyValue) -> StoreResult<()> {
        validate_name(name)?;
        let mut state = self.write_state()?;
        for (target, strength) in value.pointers() {
            let Some(record) = state.nodes.get(target) else {
                // A weak pointer may outlive its target.
                if strength.is_weak() {
                    continue;
                }
                return Err(StoreError::NotFound(target.clone()));
            };
            if !record.mixins.iter().any(|m| m == crate::node::MIX_REFERENCEABLE) {
                return Err(StoreError::NotReferenceable(target.clone()));
            }
        }
        state
            .record_mut(node)?
            .properties
            .insert(name.to_string(), value);
        Ok(())
    }

    fn property(&self, node: &NodeId, name: &str) -> StoreResult<Option<PropertyValue>> {
        Ok(self.read_state()?.record(node)?.properties.get(name).cloned())
    }

    fn properties(&self, node: &NodeId) -> StoreResult<Vec<(String, PropertyValue)>> {
        Ok(self
            .read_state()?
            .record(node)?
            .properties
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn remove_property(&self, node: &NodeId, name: &str) -> StoreResult<bool> {
        let mut state = self.write_state()?;
        Ok(state.record_mut(node)?.properties.remove(name).is_some())
    }

    fn add_mixin(&self, node: &NodeId, mixin: &str) -> StoreResult<()> {
        let mut state = self.write_state()?;
        let record = state.record_mut(node)?;
        if !record.mixins.iter().any(|m| m == mixin) {
            record.mixins.push(mixin.to_string());
        }
        Ok(())
    }

    fn write_binary(&self, content: &mut dyn Read) -> StoreResult<BinaryId> {
        let mut buf = Vec::new();
        content.read_to_end(&mut buf)?;
        let id = BinaryId::from_content(&buf);
        let mut state = self.write_state()?;
        // Content-addressed: identical uploads share one entry.
        state.binaries.entry(id).or_insert_with(|| Arc::from(buf));
        Ok(id)
    }

    fn binary(&self, id: &BinaryId) -> StoreResult<Arc<dyn BinaryHandle>> {
        let state = self.read_state()?;
        let data = state
            .binaries
            .get(id)
            .ok_or(StoreError::BinaryNotFound(*id))?;
        Ok(Arc::new(InMemoryBinary {
            id: *id,
            data: Arc::clone(data),
        }))
    }

    fn remove_node(&self, id: &NodeId) -> StoreResult<()> {
        if *id == self.root {
            return Err(StoreError::RootRemoval);
        }
        let mut state = self.write_state()?;
        let parent = state.record(id)?.parent.clone();
        let subtree = state.subtree(id);

        if self.config.enforce_integrity {
            let mut referrers: Vec<NodeId> = state
                .nodes
                .iter()
                .filter(|(nid, _)| !subtree.contains(*nid))
                .filter(|(_, record)| {
                    record.properties.values().any(|prop| {
                        prop.pointers().any(|(target, strength)| {
                            strength == RefStrength::Strong && subtree.contains(target)
                        })
                    })
                })
                .map(|(nid, _)| nid.clone())
                .collect();
            if !referrers.is_empty() {
                referrers.sort();
                return Err(StoreError::ReferentialIntegrity {
                    node: id.clone(),
                    referrers,
                });
            }
        }

        if let Some(parent) = parent {
            state.record_mut(&parent)?.children.retain(|c| c != id);
        }
        for nid in &subtree {
            state.nodes.remove(nid);
        }
        debug!(node = %id.short_id(), removed = subtree.len(), "removed node");
        Ok(())
    }

    fn referrers(&self, id: &NodeId) -> StoreResult<Vec<Referrer>> {
        let state = self.read_state()?;
        let mut result: Vec<Referrer> = state
            .nodes
            .iter()
            .flat_map(|(nid, record)| {
                record.properties.iter().flat_map(move |(name, prop)| {
                    prop.pointers()
                        .filter(move |(target, _)| *target == id)
                        .map(move |(_, strength)| Referrer {
                            node: nid.clone(),
                            property: name.clone(),
                            strength,
                        })
                })
            })
            .collect();
        result.sort_by(|a, b| (&a.node, &a.property).cmp(&(&b.node, &b.property)));
        Ok(result)
    }
}

fn join_path(parent: &str, name: &str) -> String {
    if parent == "/" {
        format!("/{name}")
    } else {
        format!("{parent}/{name}")
    }
}

impl std::fmt::Debug for InMemoryTreeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTreeStore")
            .field("node_count", &self.len())
            .field("binary_count", &self.binary_count())
            .finish()
    }
}
