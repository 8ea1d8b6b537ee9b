//! Object graph mapping for Arbor tree stores.
//!
//! `arbor-mapper` converts graphs of typed objects into nodes of a
//! [`TreeStore`](arbor_store::TreeStore) and back, preserving object identity,
//! strong and weak references, and list and map semantics.
//!
//! # Key Types
//!
//! - [`Mapper`] -- Entry point: [`to_node`](Mapper::to_node),
//!   [`update_node`](Mapper::update_node), [`to_object`](Mapper::to_object)
//! - [`Mapped`] / [`Fields`] -- Implemented by every mapped type
//! - [`FieldDescriptor`] -- Declares the role of one field
//! - [`FieldValue`] -- A field's value in transit between object and store
//! - [`Registry`] -- Lazily built, validated per-type mapping tables
//! - [`ReferenceResolver`] / [`ReferenceEdge`] -- Stored pointer inspection
//! - [`LazyRef`] -- Reference loaded on first access
//! - [`MapperConfig`] / [`MapOptions`] -- Configuration and per-call options

pub mod config;
pub mod descriptor;
pub mod entity;
pub mod error;
pub mod graph;
pub mod registry;
pub mod resolver;

#[cfg(test)]
mod fixtures;

pub use config::{FieldFilter, MapOptions, MapperConfig, DEFAULT_MAX_DEPTH};
pub use descriptor::{Cardinality, Element, FieldDescriptor, FieldRole, MappedType};
pub use entity::{
    entity, with_entity, with_entity_mut, Entity, EntityRef, FieldValue, Fields, LazyRef, Mapped,
    SimpleValue, TypeInfo,
};
pub use error::{MapError, MapResult};
pub use graph::{Mapper, StoreRef, CLASS_PROPERTY};
pub use registry::Registry;
pub use resolver::{EdgeState, ReferenceEdge, ReferenceResolver};
