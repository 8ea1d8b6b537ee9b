//! Mapped objects and the values that flow through their fields.
//!
//! The engine does not reflect over types. A mapped type implements
//! [`Fields`] (get and set by field name) and [`Mapped`] (type name and
//! field descriptor table). The blanket [`Entity`] impl turns every mapped
//! type into an object-safe trait object so graphs can mix concrete types.
//!
//! Objects are shared as [`EntityRef`] (`Arc<RwLock<dyn Entity>>`). Two
//! fields holding the same `Arc` are the same object; the mapper uses that
//! pointer identity to detect cycles.

use std::any::{Any, TypeId};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use arbor_content::ContentProvider;
use arbor_types::{NodeId, RefStrength, Value};
use chrono::{DateTime, Utc};

use crate::descriptor::FieldDescriptor;
use crate::error::{MapError, MapResult};

/// A shared, lockable mapped object.
pub type EntityRef = Arc<RwLock<dyn Entity>>;

/// Wrap a mapped value into an [`EntityRef`].
pub fn entity<T: Mapped>(value: T) -> EntityRef {
    Arc::new(RwLock::new(value))
}

/// Pointer identity of an object, stable while any `Arc` to it is alive.
pub(crate) fn identity(object: &EntityRef) -> usize {
    Arc::as_ptr(object) as *const () as usize
}

pub(crate) fn read_entity(object: &EntityRef) -> MapResult<RwLockReadGuard<'_, dyn Entity>> {
    object
        .read()
        .map_err(|e| MapError::LockPoisoned(e.to_string()))
}

pub(crate) fn write_entity(object: &EntityRef) -> MapResult<RwLockWriteGuard<'_, dyn Entity>> {
    object
        .write()
        .map_err(|e| MapError::LockPoisoned(e.to_string()))
}

/// Borrow an object as its concrete type.
pub fn with_entity<T: Mapped, R>(object: &EntityRef, f: impl FnOnce(&T) -> R) -> MapResult<R> {
    let guard = read_entity(object)?;
    let found = guard.type_info().name();
    match guard.as_any().downcast_ref::<T>() {
        Some(value) => Ok(f(value)),
        None => Err(MapError::mismatch(T::TYPE_NAME, found)),
    }
}

/// Mutably borrow an object as its concrete type.
pub fn with_entity_mut<T: Mapped, R>(
    object: &EntityRef,
    f: impl FnOnce(&mut T) -> R,
) -> MapResult<R> {
    let mut guard = write_entity(object)?;
    let found = guard.type_info().name();
    match guard.as_any_mut().downcast_mut::<T>() {
        Some(value) => Ok(f(value)),
        None => Err(MapError::mismatch(T::TYPE_NAME, found)),
    }
}

// ---------------------------------------------------------------------------
// Field access
// ---------------------------------------------------------------------------

/// Name-based access to an object's mapped fields.
pub trait Fields {
    /// Current value of a field. Unknown names yield [`FieldValue::Null`].
    fn get_field(&self, field: &str) -> FieldValue;

    /// Replace the value of a field.
    fn set_field(&mut self, field: &str, value: FieldValue) -> MapResult<()>;
}

/// A type the mapper knows how to store.
pub trait Mapped: Fields + Default + fmt::Debug + Send + Sync + 'static {
    /// Unique type name, recorded on every node of this type.
    const TYPE_NAME: &'static str;

    /// Field descriptor table, in declaration order.
    fn describe() -> Vec<FieldDescriptor>;
}

/// Object-safe view of a [`Mapped`] type.
pub trait Entity: Fields + fmt::Debug + Send + Sync + 'static {
    fn type_info(&self) -> TypeInfo;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Mapped> Entity for T {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Runtime handle on a mapped type: its name plus how to describe and
/// instantiate it.
#[derive(Clone, Copy)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
    describe: fn() -> Vec<FieldDescriptor>,
    create: fn() -> EntityRef,
}

fn create_default<T: Mapped>() -> EntityRef {
    entity(T::default())
}

impl TypeInfo {
    pub fn of<T: Mapped>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: T::TYPE_NAME,
            describe: T::describe,
            create: create_default::<T>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn describe(&self) -> Vec<FieldDescriptor> {
        (self.describe)()
    }

    /// A fresh default instance.
    pub fn create(&self) -> EntityRef {
        (self.create)()
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeInfo({})", self.name)
    }
}

// ---------------------------------------------------------------------------
// Simple values
// ---------------------------------------------------------------------------

/// Rust types that map onto a single store [`Value`].
pub trait SimpleValue: Sized {
    const KIND: &'static str;
    fn into_value(self) -> Value;
    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! simple_value {
    ($ty:ty, $variant:ident, $kind:literal) => {
        impl SimpleValue for $ty {
            const KIND: &'static str = $kind;

            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

simple_value!(String, String, "string");
simple_value!(i64, Long, "long");
simple_value!(f64, Double, "double");
simple_value!(bool, Boolean, "boolean");
simple_value!(DateTime<Utc>, Date, "date");

// ---------------------------------------------------------------------------
// FieldValue
// ---------------------------------------------------------------------------

/// The value of one mapped field, as exchanged between an object and the
/// mapper.
#[derive(Clone, Debug)]
pub enum FieldValue {
    /// Unset scalar or absent collection.
    Null,
    Value(Value),
    Values(Vec<Value>),
    ValueMap(BTreeMap<String, Value>),
    Content(ContentProvider),
    Entity(EntityRef),
    Entities(Vec<EntityRef>),
    /// Keyed objects; a `None` entry is a present key with no object.
    EntityMap(BTreeMap<String, Option<EntityRef>>),
    Lazy(LazyRef),
}

impl FieldValue {
    /// Short name of the variant, used in mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Value(_) => "value",
            Self::Values(_) => "value list",
            Self::ValueMap(_) => "value map",
            Self::Content(_) => "content",
            Self::Entity(_) => "object",
            Self::Entities(_) => "object list",
            Self::EntityMap(_) => "object map",
            Self::Lazy(_) => "lazy reference",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    // -- building ----------------------------------------------------------

    pub fn scalar<T: SimpleValue + Clone>(value: &Option<T>) -> Self {
        match value {
            Some(v) => Self::Value(v.clone().into_value()),
            None => Self::Null,
        }
    }

    pub fn list<T: SimpleValue + Clone>(values: &[T]) -> Self {
        Self::Values(values.iter().cloned().map(T::into_value).collect())
    }

    pub fn value_map<T: SimpleValue + Clone>(values: &BTreeMap<String, T>) -> Self {
        Self::ValueMap(
            values
                .iter()
                .map(|(k, v)| (k.clone(), v.clone().into_value()))
                .collect(),
        )
    }

    pub fn content(value: &Option<ContentProvider>) -> Self {
        value.clone().map_or(Self::Null, Self::Content)
    }

    pub fn object(value: &Option<EntityRef>) -> Self {
        value.clone().map_or(Self::Null, Self::Entity)
    }

    pub fn objects(values: &[EntityRef]) -> Self {
        Self::Entities(values.to_vec())
    }

    pub fn object_map(values: &BTreeMap<String, Option<EntityRef>>) -> Self {
        Self::EntityMap(values.clone())
    }

    pub fn lazy(value: &Option<LazyRef>) -> Self {
        value.clone().map_or(Self::Null, Self::Lazy)
    }

    // -- taking apart ------------------------------------------------------

    pub fn into_scalar<T: SimpleValue>(self) -> MapResult<Option<T>> {
        match self {
            Self::Null => Ok(None),
            Self::Value(v) => {
                let found = v.kind().to_string();
                T::from_value(v)
                    .map(Some)
                    .ok_or_else(|| MapError::mismatch(T::KIND, found))
            }
            other => Err(MapError::mismatch(T::KIND, other.kind())),
        }
    }

    pub fn into_list<T: SimpleValue>(self) -> MapResult<Vec<T>> {
        match self {
            Self::Null => Ok(Vec::new()),
            Self::Values(vs) => vs
                .into_iter()
                .map(|v| {
                    let found = v.kind().to_string();
                    T::from_value(v).ok_or_else(|| MapError::mismatch(T::KIND, found))
                })
                .collect(),
            other => Err(MapError::mismatch("value list", other.kind())),
        }
    }

    pub fn into_value_map<T: SimpleValue>(self) -> MapResult<BTreeMap<String, T>> {
        match self {
            Self::Null => Ok(BTreeMap::new()),
            Self::ValueMap(m) => m
                .into_iter()
                .map(|(k, v)| {
                    let found = v.kind().to_string();
                    T::from_value(v)
                        .map(|v| (k, v))
                        .ok_or_else(|| MapError::mismatch(T::KIND, found))
                })
                .collect(),
            other => Err(MapError::mismatch("value map", other.kind())),
        }
    }

    pub fn into_content(self) -> MapResult<Option<ContentProvider>> {
        match self {
            Self::Null => Ok(None),
            Self::Content(c) => Ok(Some(c)),
            other => Err(MapError::mismatch("content", other.kind())),
        }
    }

    pub fn into_object(self) -> MapResult<Option<EntityRef>> {
        match self {
            Self::Null => Ok(None),
            Self::Entity(e) => Ok(Some(e)),
            other => Err(MapError::mismatch("object", other.kind())),
        }
    }

    pub fn into_objects(self) -> MapResult<Vec<EntityRef>> {
        match self {
            Self::Null => Ok(Vec::new()),
            Self::Entities(es) => Ok(es),
            other => Err(MapError::mismatch("object list", other.kind())),
        }
    }

    pub fn into_object_map(self) -> MapResult<BTreeMap<String, Option<EntityRef>>> {
        match self {
            Self::Null => Ok(BTreeMap::new()),
            Self::EntityMap(m) => Ok(m),
            other => Err(MapError::mismatch("object map", other.kind())),
        }
    }

    pub fn into_lazy(self) -> MapResult<Option<LazyRef>> {
        match self {
            Self::Null => Ok(None),
            Self::Lazy(l) => Ok(Some(l)),
            other => Err(MapError::mismatch("lazy reference", other.kind())),
        }
    }
}

// ---------------------------------------------------------------------------
// LazyRef
// ---------------------------------------------------------------------------

type Loader = dyn Fn(&NodeId) -> MapResult<Option<EntityRef>> + Send + Sync;

/// A reference whose target is read from the store on first access.
///
/// Clones share the loaded object. A failed load is not cached; the next
/// [`get`](LazyRef::get) tries again.
#[derive(Clone)]
pub struct LazyRef {
    target: NodeId,
    strength: RefStrength,
    loader: Arc<Loader>,
    cell: Arc<OnceLock<Option<EntityRef>>>,
}

impl LazyRef {
    pub(crate) fn new(
        target: NodeId,
        strength: RefStrength,
        loader: impl Fn(&NodeId) -> MapResult<Option<EntityRef>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            target,
            strength,
            loader: Arc::new(loader),
            cell: Arc::new(OnceLock::new()),
        }
    }

    /// Identifier of the referenced node.
    pub fn target(&self) -> &NodeId {
        &self.target
    }

    pub fn strength(&self) -> RefStrength {
        self.strength
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    /// The loaded object, if [`get`](LazyRef::get) already succeeded.
    pub fn loaded(&self) -> Option<EntityRef> {
        self.cell.get().cloned().flatten()
    }

    /// Load the target. A dangling weak pointer yields `None`.
    pub fn get(&self) -> MapResult<Option<EntityRef>> {
        if let Some(loaded) = self.cell.get() {
            return Ok(loaded.clone());
        }
        let loaded = (self.loader)(&self.target)?;
        Ok(self.cell.get_or_init(|| loaded).clone())
    }
}

impl fmt::Debug for LazyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyRef")
            .field("target", &self.target)
            .field("strength", &self.strength)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
