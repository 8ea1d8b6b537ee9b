use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::warn;

use arbor_types::{BinaryHandle, BinaryId};

use crate::policy::ContentPolicy;

/// Chunk size used when copying from an open stream.
pub const STREAM_CHUNK_SIZE: usize = 8 * 1024;

/// Chunk size used when copying from a file.
pub const FILE_CHUNK_SIZE: usize = 32 * 1024;

type SharedStream = Arc<Mutex<Option<Box<dyn Read + Send>>>>;

/// Which of the three access shapes a provider exposes.
///
/// Store-managed binaries are exposed as streams.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentKind {
    Bytes,
    File,
    Stream,
}

#[derive(Clone)]
enum Source {
    Bytes(Arc<[u8]>),
    File(PathBuf),
    Stream(SharedStream),
    Binary(Arc<dyn BinaryHandle>),
}

/// Binary content backed by bytes, a file, a stream, or a store binary.
///
/// Cloning is cheap: clones share the underlying buffer, path, stream slot,
/// or binary handle. A one-shot stream can therefore be consumed only once
/// across all clones.
#[derive(Clone)]
pub struct ContentProvider {
    source: Source,
    content_length: i64,
}

impl ContentProvider {
    /// Content held in memory. The buffer is copied.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            source: Source::Bytes(Arc::from(bytes)),
            content_length: bytes.len() as i64,
        }
    }

    /// Content held in a file.
    ///
    /// The length is read from the file metadata now; it is -1 if the file
    /// cannot be inspected.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let content_length = match fs::metadata(&path) {
            Ok(meta) => meta.len() as i64,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read content file metadata");
                -1
            }
        };
        Self {
            source: Source::File(path),
            content_length,
        }
    }

    /// Content available from an open stream of unknown length.
    pub fn from_stream(stream: impl Read + Send + 'static) -> Self {
        Self::from_stream_with_length(stream, -1)
    }

    /// Content available from an open stream whose length is known.
    pub fn from_stream_with_length(stream: impl Read + Send + 'static, length: i64) -> Self {
        let stream: Box<dyn Read + Send> = Box::new(stream);
        Self {
            source: Source::Stream(Arc::new(Mutex::new(Some(stream)))),
            content_length: length,
        }
    }

    /// Content already held by the store.
    pub fn from_binary(handle: Arc<dyn BinaryHandle>) -> Self {
        Self {
            source: Source::Binary(handle),
            content_length: -1,
        }
    }

    /// The access shape of this provider.
    pub fn kind(&self) -> ContentKind {
        match self.source {
            Source::Bytes(_) => ContentKind::Bytes,
            Source::File(_) => ContentKind::File,
            Source::Stream(_) | Source::Binary(_) => ContentKind::Stream,
        }
    }

    pub fn is_bytes(&self) -> bool {
        self.kind() == ContentKind::Bytes
    }

    pub fn is_file(&self) -> bool {
        self.kind() == ContentKind::File
    }

    pub fn is_stream(&self) -> bool {
        self.kind() == ContentKind::Stream
    }

    /// Returns `true` only when backed by a store-managed binary.
    ///
    /// Persisted content is already resident in the store and must not be
    /// uploaded again when the owning object is written back.
    pub fn is_persisted(&self) -> bool {
        matches!(self.source, Source::Binary(_))
    }

    /// Store identifier of the binary, when persisted.
    pub fn binary_id(&self) -> Option<BinaryId> {
        match &self.source {
            Source::Binary(handle) => Some(handle.id()),
            _ => None,
        }
    }

    /// The backing bytes, for the bytes variant.
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.source {
            Source::Bytes(bytes) => Some(&bytes[..]),
            _ => None,
        }
    }

    /// The backing file, for the file variant.
    pub fn file(&self) -> Option<&Path> {
        match &self.source {
            Source::File(path) => Some(path.as_path()),
            _ => None,
        }
    }

    /// Open a reader over the content.
    ///
    /// Store binaries open a fresh reader on every call. An open stream is
    /// handed out once; later calls fail.
    pub fn try_input_stream(&self) -> io::Result<Box<dyn Read + Send>> {
        match &self.source {
            Source::Bytes(bytes) => Ok(Box::new(io::Cursor::new(Arc::clone(bytes)))),
            Source::File(path) => Ok(Box::new(File::open(path)?)),
            Source::Stream(slot) => {
                let mut slot = slot
                    .lock()
                    .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
                slot.take().ok_or_else(|| {
                    io::Error::new(io::ErrorKind::Other, "content stream already consumed")
                })
            }
            Source::Binary(handle) => handle.open(),
        }
    }

    /// Open a reader over the content, or an empty reader on failure.
    pub fn input_stream(&self) -> Box<dyn Read + Send> {
        match self.try_input_stream() {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, kind = ?self.kind(), "cannot open content stream");
                Box::new(io::empty())
            }
        }
    }

    /// Length in bytes, -1 when unknown.
    ///
    /// Store binaries are asked for their size on every call.
    pub fn try_content_length(&self) -> io::Result<i64> {
        match &self.source {
            Source::Binary(handle) => Ok(handle.size()? as i64),
            _ => Ok(self.content_length),
        }
    }

    /// Length in bytes, -1 when unknown or when the store cannot report it.
    pub fn content_length(&self) -> i64 {
        match self.try_content_length() {
            Ok(len) => len,
            Err(e) => {
                warn!(error = %e, "cannot query content length");
                -1
            }
        }
    }

    /// Open a reader according to `policy`.
    pub fn open_with(&self, policy: ContentPolicy) -> io::Result<Box<dyn Read + Send>> {
        match policy {
            ContentPolicy::Strict => self.try_input_stream(),
            ContentPolicy::BestEffort => Ok(self.input_stream()),
        }
    }

    /// Query the length according to `policy`.
    pub fn length_with(&self, policy: ContentPolicy) -> io::Result<i64> {
        match policy {
            ContentPolicy::Strict => self.try_content_length(),
            ContentPolicy::BestEffort => Ok(self.content_length()),
        }
    }

    /// Write the content to `destination`, creating or truncating it.
    ///
    /// Returns the number of bytes written. Source and destination handles
    /// are closed on every exit path. A failure part-way leaves whatever was
    /// already written in place.
    pub fn write_to_file(&self, destination: &Path) -> io::Result<u64> {
        match &self.source {
            Source::Bytes(bytes) => {
                fs::write(destination, bytes)?;
                Ok(bytes.len() as u64)
            }
            Source::File(path) => copy_chunked(File::open(path)?, destination, FILE_CHUNK_SIZE),
            Source::Stream(_) | Source::Binary(_) => {
                copy_chunked(self.try_input_stream()?, destination, STREAM_CHUNK_SIZE)
            }
        }
    }
}

fn copy_chunked(mut reader: impl Read, destination: &Path, chunk: usize) -> io::Result<u64> {
    let mut out = File::create(destination)?;
    let mut buf = vec![0u8; chunk];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        out.write_all(&buf[..n])?;
        total += n as u64;
    }
    out.flush()?;
    Ok(total)
}

impl fmt::Debug for ContentProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("ContentProvider");
        d.field("kind", &self.kind());
        match &self.source {
            Source::File(path) => d.field("file", path),
            Source::Binary(handle) => d.field("binary", &handle.id()),
            _ => d.field("content_length", &self.content_length),
        };
        d.finish()
    }
}
