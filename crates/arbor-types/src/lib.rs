//! Foundation types for Arbor.
//!
//! This crate provides the identifiers and property values shared by the
//! tree store and the mapping engine. Every other Arbor crate depends on
//! `arbor-types`.
//!
//! # Key Types
//!
//! - [`NodeId`] — Opaque, stable node identifier assigned by the store
//! - [`BinaryId`] — Content-addressed identifier for store-managed binaries
//! - [`Value`] / [`PropertyValue`] — Single and multi-valued node properties
//! - [`RefStrength`] — Strong (integrity-enforced) or weak reference pointer
//! - [`BinaryHandle`] — Re-openable handle onto a store-managed binary

pub mod binary;
pub mod error;
pub mod identity;
pub mod value;

pub use binary::BinaryHandle;
pub use error::TypeError;
pub use identity::{BinaryId, NodeId};
pub use value::{PropertyValue, RefStrength, Value, ValueKind};
