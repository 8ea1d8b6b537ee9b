//! Binary content abstraction for Arbor.
//!
//! A [`ContentProvider`] lets a mapped field carry binary content without the
//! caller caring where the bytes live. Four representations are supported:
//!
//! - an in-memory byte buffer (copied on construction),
//! - a file on the local filesystem,
//! - an already-open, one-shot byte stream,
//! - a store-managed [`BinaryHandle`](arbor_types::BinaryHandle), which can be
//!   reopened any number of times and is already resident in the store.
//!
//! Content metadata (stream access, length) is best effort: failures are
//! logged and a safe default is returned. Callers that prefer to fail use the
//! `try_*` accessors, or select [`ContentPolicy::Strict`].

pub mod policy;
pub mod provider;

pub use policy::ContentPolicy;
pub use provider::{ContentKind, ContentProvider, FILE_CHUNK_SIZE, STREAM_CHUNK_SIZE};
