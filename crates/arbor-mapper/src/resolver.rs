//! Reference resolution.
//!
//! On write, every referenced object must already have a node. A target
//! with no identifier, or whose identifier is unknown to the store, is
//! persisted first (next to the node holding the reference, or under the
//! configured reference parent) and the pointer is written afterwards.
//!
//! On read, pointers are followed by identifier. A weak pointer whose target
//! is gone reads back as `None`; a strong pointer whose target is gone is an
//! error, since the store should never have allowed it.
//!
//! Every pointer moves through the [`EdgeState`] machine:
//!
//! ```text
//! Unresolved -> Pending(id) -> Written(id) -> Dangling(id)   (weak only)
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use arbor_types::{NodeId, PropertyValue, RefStrength, Value};
use tracing::debug;

use crate::descriptor::{Cardinality, FieldDescriptor, FieldRole, MappedType};
use crate::entity::{read_entity, EntityRef, FieldValue, LazyRef};
use crate::error::{MapError, MapResult};
use crate::graph::{
    check_target, mismatch, text, Expected, Mapper, Naming, Reader, StoreRef, Writer,
    CLASS_PROPERTY,
};

/// Lifecycle of one stored pointer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EdgeState {
    /// The target has no node yet.
    Unresolved,
    /// The target node is known; the pointer is not yet stored.
    Pending(NodeId),
    /// The pointer is stored and its target exists.
    Written(NodeId),
    /// A weak pointer whose target has been removed.
    Dangling(NodeId),
}

/// One pointer from a reference field to a target node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceEdge {
    field: String,
    key: Option<String>,
    strength: RefStrength,
    state: EdgeState,
}

impl ReferenceEdge {
    pub fn new(field: &str, key: Option<&str>, strength: RefStrength) -> Self {
        Self {
            field: field.to_string(),
            key: key.map(str::to_string),
            strength,
            state: EdgeState::Unresolved,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Map key, for edges stored by map-valued fields.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn strength(&self) -> RefStrength {
        self.strength
    }

    pub fn state(&self) -> &EdgeState {
        &self.state
    }

    /// The target identifier, once known.
    pub fn target(&self) -> Option<&NodeId> {
        match &self.state {
            EdgeState::Unresolved => None,
            EdgeState::Pending(id) | EdgeState::Written(id) | EdgeState::Dangling(id) => Some(id),
        }
    }

    /// The value to store for this edge, once the target is known.
    pub fn pointer(&self) -> Option<Value> {
        self.target()
            .map(|id| Value::pointer(id.clone(), self.strength))
    }

    /// `Unresolved -> Pending`.
    pub(crate) fn assign(&mut self, target: NodeId) {
        if self.state == EdgeState::Unresolved {
            self.state = EdgeState::Pending(target);
        }
    }

    /// `Pending -> Written`.
    pub(crate) fn commit(&mut self) {
        if let EdgeState::Pending(id) = &self.state {
            self.state = EdgeState::Written(id.clone());
        }
    }

    /// `Written -> Dangling`, for weak edges only. Returns `true` if the edge
    /// moved.
    pub(crate) fn orphan(&mut self) -> bool {
        match &self.state {
            EdgeState::Written(id) if self.strength.is_weak() => {
                self.state = EdgeState::Dangling(id.clone());
                true
            }
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Inspection
// ---------------------------------------------------------------------------

/// Reports the pointers a node holds and whether their targets still exist.
pub struct ReferenceResolver<'a> {
    mapper: &'a Mapper,
    store: &'a StoreRef,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(mapper: &'a Mapper, store: &'a StoreRef) -> Self {
        Self { mapper, store }
    }

    /// Edges stored on `node` by one reference field.
    ///
    /// Null map entries hold no pointer and produce no edge. A strong pointer
    /// to a missing node is reported as [`MapError::MissingReferenceTarget`].
    pub fn inspect(
        &self,
        node: &NodeId,
        field: &FieldDescriptor,
    ) -> MapResult<Vec<ReferenceEdge>> {
        let name = field.field_name();
        if field.strength().is_none() {
            return Err(MapError::mismatch("reference field", field.role().label()));
        }

        let stored: Vec<(Option<String>, PropertyValue)> = match field.cardinality() {
            Cardinality::Map => match self.store.child(node, name)? {
                Some(container) => self
                    .store
                    .properties(&container)?
                    .into_iter()
                    .map(|(key, p)| (Some(key), p))
                    .collect(),
                None => Vec::new(),
            },
            _ => self
                .store
                .property(node, name)?
                .map(|p| vec![(None, p)])
                .unwrap_or_default(),
        };

        let mut edges = Vec::new();
        for (key, property) in &stored {
            for (target, strength) in property.pointers() {
                let mut edge = ReferenceEdge::new(name, key.as_deref(), strength);
                edge.assign(target.clone());
                edge.commit();
                if !self.store.exists(target)? && !edge.orphan() {
                    return Err(MapError::MissingReferenceTarget {
                        field: name.to_string(),
                        target: target.clone(),
                    });
                }
                edges.push(edge);
            }
        }
        Ok(edges)
    }

    /// Edges stored on `node` by every reference field of its mapped type.
    pub fn edges(&self, node: &NodeId) -> MapResult<Vec<ReferenceEdge>> {
        let mapped = self.mapped_type_at(node)?;
        let mut edges = Vec::new();
        for field in mapped.fields() {
            if matches!(field.role(), FieldRole::Reference { .. }) {
                edges.extend(self.inspect(node, field)?);
            }
        }
        Ok(edges)
    }

    fn mapped_type_at(&self, node: &NodeId) -> MapResult<Arc<MappedType>> {
        match self.store.property(node, CLASS_PROPERTY)? {
            Some(PropertyValue::Single(Value::String(tag))) => {
                self.mapper.registry().require(&tag)
            }
            _ if self.store.exists(node)? => {
                Err(MapError::UnknownType(format!("<untagged {node}>")))
            }
            _ => Err(MapError::NodeNotFound(node.clone())),
        }
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

impl Writer<'_> {
    pub(crate) fn write_reference(
        &mut self,
        node: &NodeId,
        owner: &str,
        field: &FieldDescriptor,
        strength: RefStrength,
        value: FieldValue,
    ) -> MapResult<()> {
        let name = field.field_name();
        match (field.cardinality(), value) {
            (Cardinality::Map, FieldValue::Null) => {
                self.store.remove_child(node, name)?;
            }
            (_, FieldValue::Null) => {
                if self.dangling(node, name)?.is_empty() {
                    self.store.remove_property(node, name)?;
                } else {
                    debug!(field = name, "dangling weak reference kept as stored");
                }
            }
            (Cardinality::Scalar, FieldValue::Entity(target)) => {
                let mut edge = ReferenceEdge::new(name, None, strength);
                self.resolve(node, field, &target, &mut edge)?;
                self.link(node, name, &mut edge)?;
            }
            (Cardinality::Scalar, FieldValue::Lazy(lazy)) => {
                let mut edge = ReferenceEdge::new(name, None, strength);
                match lazy.loaded() {
                    Some(target) => self.resolve(node, field, &target, &mut edge)?,
                    None if strength.is_weak() || self.store.exists(lazy.target())? => {
                        edge.assign(lazy.target().clone())
                    }
                    None => {
                        return Err(MapError::MissingReferenceTarget {
                            field: name.to_string(),
                            target: lazy.target().clone(),
                        })
                    }
                }
                self.link(node, name, &mut edge)?;
            }
            (Cardinality::List, FieldValue::Entities(targets)) => {
                let mut edges = Vec::with_capacity(targets.len());
                for target in &targets {
                    let mut edge = ReferenceEdge::new(name, None, strength);
                    self.resolve(node, field, target, &mut edge)?;
                    edges.push(edge);
                }
                let mut values: Vec<Value> =
                    edges.iter().filter_map(ReferenceEdge::pointer).collect();
                for pointer in self.dangling(node, name)? {
                    if !values.contains(&pointer) {
                        values.push(pointer);
                    }
                }
                self.store
                    .set_property(node, name, PropertyValue::Multi(values))?;
                edges.iter_mut().for_each(ReferenceEdge::commit);
                debug!(field = name, count = edges.len(), %strength, "reference list written");
            }
            (Cardinality::Map, FieldValue::EntityMap(entries)) => {
                let mut kept = BTreeMap::new();
                if let Some(previous) = self.store.child(node, name)? {
                    for (key, _) in self.store.properties(&previous)? {
                        if let Some(pointer) = self.dangling(&previous, &key)?.pop() {
                            kept.insert(key, pointer);
                        }
                    }
                }
                let container = self.container(node, name)?;
                for (key, target) in &entries {
                    match target {
                        Some(target) => {
                            let mut edge = ReferenceEdge::new(name, Some(key.as_str()), strength);
                            self.resolve(node, field, target, &mut edge)?;
                            self.link(&container, key, &mut edge)?;
                        }
                        None => {
                            let stored = match kept.remove(key) {
                                Some(pointer) => PropertyValue::Single(pointer),
                                None => PropertyValue::Multi(Vec::new()),
                            };
                            self.store.set_property(&container, key, stored)?;
                        }
                    }
                }
            }
            (_, other) => return Err(mismatch(owner, field, &other)),
        }
        Ok(())
    }

    /// Weak pointers stored in `property` of `node` whose targets are gone.
    ///
    /// A dangling edge is terminal: an object read back from the store sees
    /// it as absent, so writing that object again must not drop it.
    fn dangling(&self, node: &NodeId, property: &str) -> MapResult<Vec<Value>> {
        let Some(stored) = self.store.property(node, property)? else {
            return Ok(Vec::new());
        };
        let mut pointers = Vec::new();
        for (target, strength) in stored.pointers() {
            if strength.is_weak() && !self.store.exists(target)? {
                pointers.push(Value::pointer(target.clone(), strength));
            }
        }
        Ok(pointers)
    }

    /// Store a pending edge as property `property` of `node`.
    fn link(&self, node: &NodeId, property: &str, edge: &mut ReferenceEdge) -> MapResult<()> {
        let Some(pointer) = edge.pointer() else {
            return Ok(());
        };
        self.store.set_property(node, property, pointer.into())?;
        edge.commit();
        debug!(
            field = edge.field(),
            key = edge.key(),
            target = ?edge.target(),
            strength = %edge.strength(),
            "reference written"
        );
        Ok(())
    }

    /// Find or create the target node and move the edge to `Pending`.
    ///
    /// Only targets without an identifier are persisted. A target whose
    /// identifier no longer exists keeps a weak pointer and fails a strong one.
    fn resolve(
        &mut self,
        source: &NodeId,
        field: &FieldDescriptor,
        target: &EntityRef,
        edge: &mut ReferenceEdge,
    ) -> MapResult<()> {
        check_target(field, target)?;
        let mapped = self.mapper.mapped_type_of(target)?;
        let id_field = mapped
            .identifier_field()
            .ok_or_else(|| mapped.missing(FieldRole::Identifier))?;
        let current = {
            let guard = read_entity(target)?;
            text(&guard.get_field(id_field.field_name())).map(str::to_string)
        };

        let id = match current {
            Some(id) => {
                let id = NodeId::parse(id)?;
                if !self.store.exists(&id)? {
                    if !edge.strength().is_weak() {
                        return Err(MapError::MissingReferenceTarget {
                            field: field.field_name().to_string(),
                            target: id,
                        });
                    }
                    debug!(field = field.field_name(), target = %id, "weak reference to removed target");
                }
                id
            }
            None => self.persist(source, field, target, &mapped)?,
        };
        edge.assign(id);
        Ok(())
    }

    /// Write an unsaved target so that it can be pointed at.
    fn persist(
        &mut self,
        source: &NodeId,
        field: &FieldDescriptor,
        target: &EntityRef,
        mapped: &MappedType,
    ) -> MapResult<NodeId> {
        if mapped.has_onward_fields() && self.traversal.depth() >= self.options.max_depth {
            return Err(MapError::UnresolvedReference {
                field: field.field_name().to_string(),
                type_name: mapped.type_name().to_string(),
            });
        }

        let parent = match &self.mapper.config().reference_parent {
            Some(path) => self.store.node_at(path)?.ok_or_else(|| {
                MapError::InvalidConfig(format!("reference parent {path} does not exist"))
            })?,
            None => self
                .store
                .node(source)?
                .and_then(|info| info.parent)
                .unwrap_or_else(|| self.store.root()),
        };
        debug!(
            field = field.field_name(),
            type_name = mapped.type_name(),
            "persisting unsaved reference target"
        );
        self.write_object(&parent, target, Naming::Required, &[])
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

impl Reader<'_> {
    pub(crate) fn read_reference(
        &mut self,
        node: &NodeId,
        owner: &str,
        field: &FieldDescriptor,
    ) -> MapResult<Option<FieldValue>> {
        let name = field.field_name();
        let cut = self.depth >= self.options.max_depth;

        match field.cardinality() {
            Cardinality::Scalar => {
                let Some(property) = self.store.property(node, name)? else {
                    return Ok(None);
                };
                let Some((target, strength)) = property.single().and_then(Value::as_pointer)
                else {
                    return Err(MapError::mismatch("reference", "non-reference property")
                        .in_field(owner, name));
                };
                if field.is_lazy() {
                    return Ok(Some(FieldValue::Lazy(self.lazy(field, target, strength))));
                }
                if cut {
                    debug!(field = name, depth = self.depth, "depth limit reached; reference skipped");
                    return Ok(None);
                }
                let object = self.follow(field, target, strength)?;
                Ok(Some(object.map_or(FieldValue::Null, FieldValue::Entity)))
            }
            Cardinality::List => {
                let Some(property) = self.store.property(node, name)? else {
                    return Ok(None);
                };
                if cut {
                    debug!(field = name, depth = self.depth, "depth limit reached; reference skipped");
                    return Ok(None);
                }
                let mut objects = Vec::new();
                for (target, strength) in property.pointers() {
                    if let Some(object) = self.follow(field, target, strength)? {
                        objects.push(object);
                    }
                }
                Ok(Some(FieldValue::Entities(objects)))
            }
            Cardinality::Map => {
                let Some(container) = self.store.child(node, name)? else {
                    return Ok(None);
                };
                if cut {
                    debug!(field = name, depth = self.depth, "depth limit reached; reference skipped");
                    return Ok(None);
                }
                let mut entries = BTreeMap::new();
                for (key, property) in self.store.properties(&container)? {
                    let object = match property.pointers().next() {
                        Some((target, strength)) => self.follow(field, target, strength)?,
                        None => None,
                    };
                    entries.insert(key, object);
                }
                Ok(Some(FieldValue::EntityMap(entries)))
            }
        }
    }

    /// Read the object a pointer names.
    pub(crate) fn follow(
        &mut self,
        field: &FieldDescriptor,
        target: &NodeId,
        strength: RefStrength,
    ) -> MapResult<Option<EntityRef>> {
        if !self.store.exists(target)? {
            if strength.is_weak() {
                debug!(field = field.field_name(), target = %target, "weak reference target missing");
                return Ok(None);
            }
            return Err(MapError::MissingReferenceTarget {
                field: field.field_name().to_string(),
                target: target.clone(),
            });
        }

        self.depth += 1;
        let result = self.read_object(target, Expected::Field(field));
        self.depth -= 1;
        result.map(Some)
    }

    fn lazy(&self, field: &FieldDescriptor, target: &NodeId, strength: RefStrength) -> LazyRef {
        let mapper = self.mapper.clone();
        let store = Arc::clone(self.store);
        let options = self.options.clone();
        let field = field.clone();
        LazyRef::new(target.clone(), strength, move |id| {
            mapper.follow_reference(&store, &field, id, strength, &options)
        })
    }
}
