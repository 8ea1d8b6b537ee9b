//! Hierarchical tree-store boundary for Arbor.
//!
//! The mapping engine never talks to a concrete repository directly. It
//! consumes the [`TreeStore`] trait: nodes with named properties, ordered
//! child nodes, stable identifiers, and store-managed binaries. Connection,
//! session and commit handling belong to the backend behind the trait.
//!
//! # Storage Backends
//!
//! - [`InMemoryTreeStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Every node has an identifier; only nodes carrying the
//!    [`MIX_REFERENCEABLE`] mixin may be the target of a reference.
//! 2. Sibling names are unique.
//! 3. Removing a node that is the target of a strong reference from outside
//!    the removed subtree fails with [`StoreError::ReferentialIntegrity`].
//! 4. Weak references never block removal and are left dangling.
//! 5. Binaries are content-addressed and re-openable.

pub mod config;
pub mod error;
pub mod memory;
pub mod node;
pub mod traits;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryBinary, InMemoryTreeStore};
pub use node::{NodeInfo, NodeSpec, Referrer, MIX_REFERENCEABLE};
pub use traits::TreeStore;
