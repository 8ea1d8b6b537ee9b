//! Object graph to node tree mapping.
//!
//! [`Mapper`] walks an object graph field by field, routing each field by
//! role: properties become node properties, content becomes a store binary,
//! child objects become nodes under a container named after the field, and
//! references go through the resolver. Reading walks the same layout back.
//!
//! # Store layout
//!
//! ```text
//! /parent/<name>                     arbor:className = "Folder"
//!     title = "Docs"                 property field
//!     tags = ["a", "b"]              property list
//!     data = <binary>                content field
//!     owner -> <id>                  scalar reference
//!     labels/                        property map container
//!         en = "Docs"
//!     children/                      child list container
//!         <child name>/ ...
//!     sections/                      child map container
//!         <key>/<child name>/ ...
//!     links/                         reference map container
//!         <key> -> <id>              empty multi-value for a null entry
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use arbor_content::ContentProvider;
use arbor_store::{NodeSpec, StoreError, TreeStore, MIX_REFERENCEABLE};
use arbor_types::{BinaryId, NodeId, PropertyValue, RefStrength, Value};
use tracing::debug;

use crate::config::{MapOptions, MapperConfig};
use crate::descriptor::{Cardinality, FieldDescriptor, FieldRole, MappedType};
use crate::entity::{identity, read_entity, write_entity, EntityRef, FieldValue, Mapped, TypeInfo};
use crate::error::{MapError, MapResult};
use crate::registry::Registry;
use crate::resolver::ReferenceResolver;

/// Property recording the concrete type of a mapped node.
pub const CLASS_PROPERTY: &str = "arbor:className";

/// Shared handle on a tree store.
pub type StoreRef = Arc<dyn TreeStore>;

/// Maps objects to nodes and back.
///
/// A mapper owns its [`Registry`]; clones share it.
#[derive(Clone, Debug, Default)]
pub struct Mapper {
    registry: Arc<Registry>,
    config: MapperConfig,
}

impl Mapper {
    pub fn new(config: MapperConfig) -> Self {
        Self::with_registry(config, Arc::new(Registry::new()))
    }

    /// A mapper that shares an existing registry.
    pub fn with_registry(config: MapperConfig, registry: Arc<Registry>) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Register `T` so that untyped reads can resolve its nodes.
    pub fn register<T: Mapped>(&self) -> MapResult<Arc<MappedType>> {
        self.registry.register::<T>()
    }

    /// Options derived from the configuration: configured depth, all fields.
    pub fn options(&self) -> MapOptions {
        MapOptions::default().with_max_depth(self.config.max_depth)
    }

    /// The validated table for an object's concrete type.
    pub fn mapped_type_of(&self, object: &EntityRef) -> MapResult<Arc<MappedType>> {
        let info = read_entity(object)?.type_info();
        self.registry.get_or_build(info)
    }

    /// Resolver bound to `store`, for inspecting stored references.
    pub fn resolver<'a>(&'a self, store: &'a StoreRef) -> ReferenceResolver<'a> {
        ReferenceResolver::new(self, store)
    }

    /// Write `object` as a new node under `parent` and return its identifier.
    ///
    /// The object's identifier and path fields are updated to match the new
    /// node. `mixins` are added to the root node only.
    pub fn to_node(
        &self,
        store: &StoreRef,
        parent: &NodeId,
        object: &EntityRef,
        mixins: &[&str],
        options: &MapOptions,
    ) -> MapResult<NodeId> {
        let mut writer = Writer::new(self, store, options);
        let node = writer.write_object(parent, object, Naming::Fallback(None), mixins)?;
        debug!(node = %node.short_id(), "object graph written");
        Ok(node)
    }

    /// Rewrite an existing node from `object`.
    ///
    /// Fields excluded by the filter are left untouched in the store. The node
    /// keeps its name and position.
    pub fn update_node(
        &self,
        store: &StoreRef,
        node: &NodeId,
        object: &EntityRef,
        options: &MapOptions,
    ) -> MapResult<NodeId> {
        let mut writer = Writer::new(self, store, options);
        writer.rewrite(node, object)?;
        debug!(node = %node.short_id(), "node updated");
        Ok(node.clone())
    }

    /// Read the object stored at `node`.
    ///
    /// The concrete type comes from the node's type tag and must already be
    /// known to the registry.
    pub fn to_object(
        &self,
        store: &StoreRef,
        node: &NodeId,
        options: &MapOptions,
    ) -> MapResult<EntityRef> {
        Reader::new(self, store, options).read_object(node, Expected::Any)
    }

    /// Read the object stored at `node` as a `T`.
    pub fn to_object_as<T: Mapped>(
        &self,
        store: &StoreRef,
        node: &NodeId,
        options: &MapOptions,
    ) -> MapResult<EntityRef> {
        Reader::new(self, store, options).read_object(node, Expected::Type(TypeInfo::of::<T>()))
    }

    /// Load a reference target on behalf of a [`LazyRef`](crate::LazyRef).
    pub(crate) fn follow_reference(
        &self,
        store: &StoreRef,
        field: &FieldDescriptor,
        target: &NodeId,
        strength: RefStrength,
        options: &MapOptions,
    ) -> MapResult<Option<EntityRef>> {
        Reader::new(self, store, options).follow(field, target, strength)
    }
}

/// String payload of an identity field, ignoring empty strings.
pub(crate) fn text(value: &FieldValue) -> Option<&str> {
    match value {
        FieldValue::Value(Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    }
}

pub(crate) fn mismatch(owner: &str, field: &FieldDescriptor, value: &FieldValue) -> MapError {
    let expected = match (field.role(), field.cardinality()) {
        (FieldRole::Content, _) => "content",
        (FieldRole::ChildNode | FieldRole::Reference { .. }, Cardinality::Scalar) => "object",
        (FieldRole::ChildNode | FieldRole::Reference { .. }, Cardinality::List) => "object list",
        (FieldRole::ChildNode | FieldRole::Reference { .. }, Cardinality::Map) => "object map",
        (_, Cardinality::Scalar) => "value",
        (_, Cardinality::List) => "value list",
        (_, Cardinality::Map) => "value map",
    };
    MapError::mismatch(expected, value.kind()).in_field(owner, field.field_name())
}

// ---------------------------------------------------------------------------
// Traversal
// ---------------------------------------------------------------------------

/// Per-call walk state: the objects on the current descent path and the
/// objects whose identity this call has already written.
#[derive(Debug, Default)]
pub(crate) struct Traversal {
    path: Vec<usize>,
    claimed: HashSet<usize>,
}

impl Traversal {
    /// Depth of the object currently being written; the root is 0.
    pub(crate) fn depth(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    fn on_path(&self, id: usize) -> bool {
        self.path.contains(&id)
    }

    fn enter(&mut self, id: usize) {
        self.path.push(id);
    }

    fn leave(&mut self) {
        self.path.pop();
    }

    fn claim(&mut self, id: usize) -> bool {
        self.claimed.insert(id)
    }

    fn is_claimed(&self, id: usize) -> bool {
        self.claimed.contains(&id)
    }
}

/// How a node gets its name when the object has no name field value.
pub(crate) enum Naming<'n> {
    /// Use the given name, or the type name when `None`.
    Fallback(Option<&'n str>),
    /// The object must name itself.
    Required,
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

pub(crate) struct Writer<'a> {
    pub(crate) mapper: &'a Mapper,
    pub(crate) store: &'a StoreRef,
    pub(crate) options: &'a MapOptions,
    pub(crate) traversal: Traversal,
}

impl<'a> Writer<'a> {
    fn new(mapper: &'a Mapper, store: &'a StoreRef, options: &'a MapOptions) -> Self {
        Self {
            mapper,
            store,
            options,
            traversal: Traversal::default(),
        }
    }

    /// Create a node for `object` under `parent` and write its fields.
    pub(crate) fn write_object(
        &mut self,
        parent: &NodeId,
        object: &EntityRef,
        naming: Naming<'_>,
        mixins: &[&str],
    ) -> MapResult<NodeId> {
        let mapped = self.mapper.mapped_type_of(object)?;
        let values = snapshot(object, &mapped)?;
        let key = identity(object);
        let leaf = self.traversal.on_path(key);
        let claimed = self.traversal.is_claimed(key);

        let value_of = |field: Option<&FieldDescriptor>| {
            field
                .and_then(|f| mapped.position(f.field_name()))
                .and_then(|i| text(&values[i]))
                .map(str::to_string)
        };
        let name = match (value_of(mapped.name_field()), naming) {
            (Some(name), _) => name,
            (None, Naming::Fallback(Some(name))) => name.to_string(),
            (None, Naming::Fallback(None)) => mapped.type_name().to_string(),
            (None, Naming::Required) => return Err(mapped.missing(FieldRole::Name)),
        };

        let mut spec = NodeSpec::new();
        for mixin in mixins {
            spec = spec.with_mixin(*mixin);
        }
        if mapped.is_referenceable() {
            spec = spec.with_mixin(MIX_REFERENCEABLE);
            if let Some(requested) = value_of(mapped.identifier_field()) {
                let requested = NodeId::parse(requested)?;
                if !claimed && !self.store.exists(&requested)? {
                    spec = spec.with_identifier(requested);
                }
            }
        }

        let node = self.store.add_node(parent, &name, &spec)?;
        self.store.set_property(
            &node,
            CLASS_PROPERTY,
            Value::from(mapped.type_name()).into(),
        )?;
        if self.traversal.claim(key) {
            write_identity(self.store, object, &mapped, &node)?;
        }
        if leaf {
            debug!(
                node = %node.short_id(),
                type_name = mapped.type_name(),
                "object already on the descent path; written as leaf"
            );
        }

        self.traversal.enter(key);
        let result = self.write_fields(&node, &mapped, values, leaf);
        self.traversal.leave();
        result?;
        Ok(node)
    }

    /// Write `object` over an existing node.
    fn rewrite(&mut self, node: &NodeId, object: &EntityRef) -> MapResult<()> {
        if !self.store.exists(node)? {
            return Err(MapError::NodeNotFound(node.clone()));
        }
        let mapped = self.mapper.mapped_type_of(object)?;
        let values = snapshot(object, &mapped)?;
        let key = identity(object);

        self.store.set_property(
            node,
            CLASS_PROPERTY,
            Value::from(mapped.type_name()).into(),
        )?;
        if mapped.is_referenceable() {
            self.store.add_mixin(node, MIX_REFERENCEABLE)?;
        }
        self.traversal.claim(key);
        write_identity(self.store, object, &mapped, node)?;

        self.traversal.enter(key);
        let result = self.write_fields(node, &mapped, values, false);
        self.traversal.leave();
        result
    }

    fn write_fields(
        &mut self,
        node: &NodeId,
        mapped: &MappedType,
        values: Vec<FieldValue>,
        leaf: bool,
    ) -> MapResult<()> {
        let owner = mapped.type_name();
        for (field, value) in mapped.fields().iter().zip(values) {
            let role = field.role();
            if role.is_identity() || !self.options.filter.allows(field.field_name()) {
                continue;
            }
            match role {
                FieldRole::Property => self.write_property(node, owner, field, value)?,
                FieldRole::Content => self.write_content(node, owner, field, value)?,
                FieldRole::Reference { strength, .. } if !leaf => {
                    self.write_reference(node, owner, field, strength, value)?
                }
                FieldRole::ChildNode if !leaf => self.write_children(node, owner, field, value)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn write_property(
        &mut self,
        node: &NodeId,
        owner: &str,
        field: &FieldDescriptor,
        value: FieldValue,
    ) -> MapResult<()> {
        let name = field.field_name();
        match (field.cardinality(), value) {
            (Cardinality::Map, FieldValue::Null) => {
                self.store.remove_child(node, name)?;
            }
            (_, FieldValue::Null) => {
                self.store.remove_property(node, name)?;
            }
            (Cardinality::Scalar, FieldValue::Value(v)) => {
                self.store.set_property(node, name, PropertyValue::Single(v))?;
            }
            (Cardinality::List, FieldValue::Values(vs)) => {
                self.store.set_property(node, name, PropertyValue::Multi(vs))?;
            }
            (Cardinality::Map, FieldValue::ValueMap(entries)) => {
                let container = self.container(node, name)?;
                for (key, v) in entries {
                    self.store
                        .set_property(&container, &key, PropertyValue::Single(v))?;
                }
            }
            (_, other) => return Err(mismatch(owner, field, &other)),
        }
        Ok(())
    }

    fn write_content(
        &mut self,
        node: &NodeId,
        owner: &str,
        field: &FieldDescriptor,
        value: FieldValue,
    ) -> MapResult<()> {
        let name = field.field_name();
        let provider = match value {
            FieldValue::Null => {
                self.store.remove_property(node, name)?;
                return Ok(());
            }
            FieldValue::Content(provider) => provider,
            other => return Err(mismatch(owner, field, &other)),
        };

        let binary = match provider.binary_id() {
            Some(id) if self.has_binary(&id)? => {
                debug!(field = name, binary = %id.short_hex(), "content already persisted");
                id
            }
            _ => self.upload(name, &provider)?,
        };
        self.store
            .set_property(node, name, Value::Binary(binary).into())?;
        Ok(())
    }

    fn upload(&self, field: &str, provider: &ContentProvider) -> MapResult<BinaryId> {
        let policy = self.mapper.config.content_policy;
        let length = provider.length_with(policy)?;
        let mut reader = provider.open_with(policy)?;
        let id = self.store.write_binary(&mut reader)?;
        debug!(field, length, binary = %id.short_hex(), "content uploaded");
        Ok(id)
    }

    fn has_binary(&self, id: &BinaryId) -> MapResult<bool> {
        match self.store.binary(id) {
            Ok(_) => Ok(true),
            Err(StoreError::BinaryNotFound(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn write_children(
        &mut self,
        node: &NodeId,
        owner: &str,
        field: &FieldDescriptor,
        value: FieldValue,
    ) -> MapResult<()> {
        let name = field.field_name();
        let depth = self.traversal.depth();
        if depth >= self.options.max_depth {
            debug!(field = name, depth, "depth limit reached; child field skipped");
            return Ok(());
        }

        match (field.cardinality(), value) {
            (_, FieldValue::Null) => {
                self.store.remove_child(node, name)?;
            }
            (Cardinality::Scalar, FieldValue::Entity(child)) => {
                let container = self.container(node, name)?;
                self.write_child(&container, field, &child, Naming::Fallback(Some(name)))?;
            }
            (Cardinality::List, FieldValue::Entities(children)) => {
                let container = self.container(node, name)?;
                for child in &children {
                    self.write_child(&container, field, child, Naming::Required)?;
                }
            }
            (Cardinality::Map, FieldValue::EntityMap(entries)) => {
                let container = self.container(node, name)?;
                for (key, child) in &entries {
                    let slot = self.store.add_node(&container, key, &NodeSpec::new())?;
                    if let Some(child) = child {
                        self.write_child(&slot, field, child, Naming::Fallback(Some(key.as_str())))?;
                    }
                }
            }
            (_, other) => return Err(mismatch(owner, field, &other)),
        }
        Ok(())
    }

    fn write_child(
        &mut self,
        parent: &NodeId,
        field: &FieldDescriptor,
        child: &EntityRef,
        naming: Naming<'_>,
    ) -> MapResult<NodeId> {
        check_target(field, child)?;
        self.write_object(parent, child, naming, &[])
    }

    /// Replace the container child named `name` with an empty one.
    pub(crate) fn container(&self, node: &NodeId, name: &str) -> MapResult<NodeId> {
        self.store.remove_child(node, name)?;
        Ok(self.store.add_node(node, name, &NodeSpec::new())?)
    }
}

/// Fail unless `object`'s concrete type is accepted by `field`.
pub(crate) fn check_target(field: &FieldDescriptor, object: &EntityRef) -> MapResult<()> {
    let type_name = read_entity(object)?.type_info().name();
    match field.target_named(type_name) {
        Some(_) => Ok(()),
        None => Err(MapError::DisallowedType {
            field: field.field_name().to_string(),
            type_name: type_name.to_string(),
        }),
    }
}

/// Copy every field value out under one short read lock.
fn snapshot(object: &EntityRef, mapped: &MappedType) -> MapResult<Vec<FieldValue>> {
    let guard = read_entity(object)?;
    Ok(mapped
        .fields()
        .iter()
        .map(|f| guard.get_field(f.field_name()))
        .collect())
}

/// Copy the node's identifier, name and path into the object.
fn write_identity(
    store: &StoreRef,
    object: &EntityRef,
    mapped: &MappedType,
    node: &NodeId,
) -> MapResult<()> {
    let info = store
        .node(node)?
        .ok_or_else(|| MapError::NodeNotFound(node.clone()))?;
    let updates = [
        (mapped.identifier_field(), info.id.to_string()),
        (mapped.name_field(), info.name),
        (mapped.path_field(), info.path),
    ];
    let mut guard = write_entity(object)?;
    for (field, value) in updates {
        if let Some(field) = field {
            guard
                .set_field(field.field_name(), FieldValue::Value(Value::String(value)))
                .map_err(|e| e.in_field(mapped.type_name(), field.field_name()))?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// What the caller expects to find at a node.
#[derive(Clone, Copy)]
pub(crate) enum Expected<'f> {
    /// Whatever registered type the tag names.
    Any,
    /// Exactly this type.
    Type(TypeInfo),
    /// One of the field's target types.
    Field(&'f FieldDescriptor),
}

pub(crate) struct Reader<'a> {
    pub(crate) mapper: &'a Mapper,
    pub(crate) store: &'a StoreRef,
    pub(crate) options: &'a MapOptions,
    pub(crate) depth: usize,
    loaded: HashMap<NodeId, EntityRef>,
}

impl<'a> Reader<'a> {
    fn new(mapper: &'a Mapper, store: &'a StoreRef, options: &'a MapOptions) -> Self {
        Self {
            mapper,
            store,
            options,
            depth: 0,
            loaded: HashMap::new(),
        }
    }

    /// Read the node as a new object. A node met twice in one call yields the
    /// same object.
    pub(crate) fn read_object(
        &mut self,
        node: &NodeId,
        expected: Expected<'_>,
    ) -> MapResult<EntityRef> {
        if let Some(object) = self.loaded.get(node) {
            return Ok(Arc::clone(object));
        }
        let info = self
            .store
            .node(node)?
            .ok_or_else(|| MapError::NodeNotFound(node.clone()))?;
        let tag = match self.store.property(node, CLASS_PROPERTY)? {
            Some(PropertyValue::Single(Value::String(tag))) => Some(tag),
            _ => None,
        };
        let mapped = self.resolve_type(node, tag, expected)?;
        let object = mapped.info().create();
        self.loaded.insert(node.clone(), Arc::clone(&object));

        let mut values = Vec::new();
        for field in mapped.fields() {
            let name = field.field_name();
            let value = match field.role() {
                FieldRole::Identifier => Some(FieldValue::Value(Value::String(info.id.to_string()))),
                FieldRole::Name => Some(FieldValue::Value(Value::String(info.name.clone()))),
                FieldRole::Path => Some(FieldValue::Value(Value::String(info.path.clone()))),
                _ if !self.options.filter.allows(name) => None,
                FieldRole::Property => self.read_property(node, mapped.type_name(), field)?,
                FieldRole::Content => self.read_content(node, mapped.type_name(), field)?,
                FieldRole::Reference { .. } => self.read_reference(node, mapped.type_name(), field)?,
                FieldRole::ChildNode => self.read_children(node, field)?,
            };
            if let Some(value) = value {
                values.push((name, value));
            }
        }

        {
            let mut guard = write_entity(&object)?;
            for (name, value) in values {
                guard
                    .set_field(name, value)
                    .map_err(|e| e.in_field(mapped.type_name(), name))?;
            }
        }
        Ok(object)
    }

    fn resolve_type(
        &self,
        node: &NodeId,
        tag: Option<String>,
        expected: Expected<'_>,
    ) -> MapResult<Arc<MappedType>> {
        let registry = &self.mapper.registry;
        match (expected, tag) {
            (Expected::Any, Some(tag)) => registry.require(&tag),
            (Expected::Any, None) => Err(MapError::UnknownType(format!("<untagged {node}>"))),
            (Expected::Type(info), Some(tag)) if tag != info.name() => {
                Err(MapError::mismatch(info.name(), tag))
            }
            (Expected::Type(info), _) => registry.get_or_build(info),
            (Expected::Field(field), Some(tag)) => match field.target_named(&tag) {
                Some(info) => registry.get_or_build(info),
                None => Err(MapError::DisallowedType {
                    field: field.field_name().to_string(),
                    type_name: tag,
                }),
            },
            (Expected::Field(field), None) => match field.targets() {
                [only] => registry.get_or_build(*only),
                _ => Err(MapError::UnknownType(format!("<untagged {node}>"))),
            },
        }
    }

    fn read_property(
        &mut self,
        node: &NodeId,
        owner: &str,
        field: &FieldDescriptor,
    ) -> MapResult<Option<FieldValue>> {
        let name = field.field_name();
        if field.cardinality() == Cardinality::Map {
            let Some(container) = self.store.child(node, name)? else {
                return Ok(None);
            };
            let entries: BTreeMap<String, Value> = self
                .store
                .properties(&container)?
                .into_iter()
                .filter_map(|(key, p)| match p {
                    PropertyValue::Single(v) => Some((key, v)),
                    PropertyValue::Multi(_) => None,
                })
                .collect();
            return Ok(Some(FieldValue::ValueMap(entries)));
        }

        let value = match (field.cardinality(), self.store.property(node, name)?) {
            (_, None) => return Ok(None),
            (Cardinality::List, Some(p)) => FieldValue::Values(p.values().to_vec()),
            (_, Some(PropertyValue::Single(v))) => FieldValue::Value(v),
            (_, Some(PropertyValue::Multi(_))) => {
                return Err(MapError::mismatch("single value", "multi-valued property")
                    .in_field(owner, name));
            }
        };
        Ok(Some(value))
    }

    fn read_content(
        &mut self,
        node: &NodeId,
        owner: &str,
        field: &FieldDescriptor,
    ) -> MapResult<Option<FieldValue>> {
        let name = field.field_name();
        match self.store.property(node, name)? {
            None => Ok(None),
            Some(PropertyValue::Single(Value::Binary(id))) => {
                let handle = self.store.binary(&id)?;
                Ok(Some(FieldValue::Content(ContentProvider::from_binary(handle))))
            }
            Some(other) => {
                let found = other
                    .values()
                    .first()
                    .map_or("empty property".to_string(), |v| v.kind().to_string());
                Err(MapError::mismatch("binary", found).in_field(owner, name))
            }
        }
    }

    fn read_children(
        &mut self,
        node: &NodeId,
        field: &FieldDescriptor,
    ) -> MapResult<Option<FieldValue>> {
        let name = field.field_name();
        if self.depth >= self.options.max_depth {
            debug!(field = name, depth = self.depth, "depth limit reached; child field skipped");
            return Ok(None);
        }
        let Some(container) = self.store.child(node, name)? else {
            return Ok(None);
        };

        self.depth += 1;
        let result = self.read_container(&container, field);
        self.depth -= 1;
        result.map(Some)
    }

    fn read_container(
        &mut self,
        container: &NodeId,
        field: &FieldDescriptor,
    ) -> MapResult<FieldValue> {
        let expected = Expected::Field(field);
        let children = self.store.children(container)?;
        match field.cardinality() {
            Cardinality::Scalar => match children.first() {
                Some(child) => Ok(FieldValue::Entity(self.read_object(child, expected)?)),
                None => Ok(FieldValue::Null),
            },
            Cardinality::List => {
                let mut objects = Vec::with_capacity(children.len());
                for child in &children {
                    objects.push(self.read_object(child, expected)?);
                }
                Ok(FieldValue::Entities(objects))
            }
            Cardinality::Map => {
                let mut entries = BTreeMap::new();
                for slot in &children {
                    let key = self
                        .store
                        .node(slot)?
                        .ok_or_else(|| MapError::NodeNotFound(slot.clone()))?
                        .name;
                    let object = match self.store.children(slot)?.first() {
                        Some(child) => Some(self.read_object(child, expected)?),
                        None => None,
                    };
                    entries.insert(key, object);
                }
                Ok(FieldValue::EntityMap(entries))
            }
        }
    }
}
