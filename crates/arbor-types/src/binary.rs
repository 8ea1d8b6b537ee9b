use std::fmt;
use std::io::{self, Read};

use crate::identity::BinaryId;

/// Handle onto a binary managed by the tree store.
///
/// Unlike an open stream, a handle can be opened any number of times: each
/// call to [`open`](BinaryHandle::open) returns a fresh reader positioned at
/// the start of the content.
pub trait BinaryHandle: Send + Sync + fmt::Debug {
    /// The store identifier of this binary.
    fn id(&self) -> BinaryId;

    /// Open a new reader over the content.
    fn open(&self) -> io::Result<Box<dyn Read + Send>>;

    /// Size of the content in bytes.
    fn size(&self) -> io::Result<u64>;
}
