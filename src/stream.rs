//! File-like access to a [`RangeSource`].

use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};
use std::num::NonZeroU64;
use std::path::Path;

use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use crate::cache::BlockCache;
use crate::cursor::{StreamCursor, seek_from_whence};
use crate::error::{Error, Result};
use crate::io::{HttpOptions, HttpRangeSource, LocalFileSource, RangeSource};
use crate::planner::ReadPlanner;

/// Map the numeric block size convention onto an optional block size:
/// anything below `1` disables caching.
pub fn block_size_from_raw(raw: i64) -> Option<NonZeroU64> {
    u64::try_from(raw).ok().and_then(NonZeroU64::new)
}

/// Open `url` as a read-only stream.
///
/// Sends a `HEAD` request; fails with [`Error::Configuration`] unless the server
/// reports a length and accepts byte ranges. With `block_size` set, reads go
/// through a block cache of that granularity.
pub fn open(
    url: &str,
    block_size: Option<NonZeroU64>,
    options: HttpOptions,
) -> Result<FileStream<HttpRangeSource>> {
    let runtime = blocking_runtime()?;
    let source = runtime.block_on(HttpRangeSource::connect(url, options))?;
    Ok(FileStream::with_runtime(runtime, source, block_size))
}

/// Open a local file through the same cached, read-only stream.
pub fn open_file(
    path: impl AsRef<Path>,
    block_size: Option<NonZeroU64>,
) -> Result<FileStream<LocalFileSource>> {
    FileStream::new(LocalFileSource::open(path.as_ref())?, block_size)
}

fn blocking_runtime() -> Result<Runtime> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Configuration(format!("failed to start I/O runtime: {e}")))
}

/// The open half of a stream; dropping it releases the transport.
struct Connection<S> {
    source: S,
    runtime: Runtime,
}

/// A read-only, seekable view of a remote resource.
///
/// Reads block on the underlying source, so a stream must not be driven from
/// inside an async runtime. The stream is closed when [`close`](Self::close)
/// is called or when it is dropped, whichever comes first.
///
/// ```no_run
/// use std::io::{BufRead, BufReader};
/// use std::num::NonZeroU64;
///
/// let mut stream = httpio::open(
///     "https://example.com/data.bin",
///     NonZeroU64::new(64 * 1024),
///     httpio::HttpOptions::default(),
/// )?;
/// stream.seek_whence(-1024, 2)?;
/// let tail = stream.read_bytes(None)?;
/// assert_eq!(tail.len(), 1024);
///
/// stream.seek(std::io::SeekFrom::Start(0))?;
/// let first_line = BufReader::new(&mut stream).lines().next();
/// # let _ = first_line;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct FileStream<S: RangeSource> {
    conn: Option<Connection<S>>,
    location: String,
    cache: BlockCache,
    cursor: StreamCursor,
}

impl<S: RangeSource> FileStream<S> {
    pub fn new(source: S, block_size: Option<NonZeroU64>) -> Result<Self> {
        Ok(Self::with_runtime(blocking_runtime()?, source, block_size))
    }

    fn with_runtime(runtime: Runtime, source: S, block_size: Option<NonZeroU64>) -> Self {
        Self {
            location: source.location().to_string(),
            cache: BlockCache::new(block_size),
            cursor: StreamCursor::new(source.len()),
            conn: Some(Connection { source, runtime }),
        }
    }

    /// Total size of the resource in bytes.
    pub fn len(&self) -> u64 {
        self.cursor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursor.is_empty()
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn block_size(&self) -> Option<NonZeroU64> {
        self.cache.block_size()
    }

    pub fn cache(&self) -> &BlockCache {
        &self.cache
    }

    pub fn source(&self) -> Result<&S> {
        Ok(&self.connection()?.source)
    }

    pub fn is_closed(&self) -> bool {
        self.conn.is_none()
    }

    pub fn readable(&self) -> bool {
        true
    }

    pub fn writable(&self) -> bool {
        false
    }

    pub fn seekable(&self) -> bool {
        true
    }

    pub fn tell(&self) -> Result<u64> {
        self.connection()?;
        Ok(self.cursor.tell())
    }

    /// Move the cursor. Targets outside `[0, len]` fail with
    /// [`Error::InvalidArgument`] and leave the position unchanged.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        self.connection()?;
        self.cursor.seek(pos)
    }

    /// [`seek`](Self::seek) with a numeric `whence`: `0` start, `1` current, `2` end.
    pub fn seek_whence(&mut self, offset: i64, whence: i32) -> Result<u64> {
        self.connection()?;
        self.cursor.seek(seek_from_whence(offset, whence)?)
    }

    /// Read up to `size` bytes, or everything up to the end when `size` is `None`.
    pub fn read_bytes(&mut self, size: Option<usize>) -> Result<Vec<u8>> {
        self.connection()?;
        let remaining = self.cursor.remaining();
        let len = size.map_or(remaining, |n| (n as u64).min(remaining));
        let len = usize::try_from(len)
            .map_err(|_| Error::InvalidArgument(format!("size={len}")))?;

        let mut buf = vec![0u8; len];
        let n = self.read_into(&mut buf)?;
        debug_assert_eq!(n, len);
        Ok(buf)
    }

    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        self.read_bytes(None)
    }

    /// Fill `buf` from the cursor, returning the number of bytes copied.
    ///
    /// Copies `min(buf.len(), len - position)` bytes. On error the cursor does
    /// not move; `buf` may have been partially overwritten.
    pub fn read_into(&mut self, buf: &mut [u8]) -> Result<usize> {
        let Connection { source, runtime } = self.conn.as_ref().ok_or(Error::Closed)?;

        let len = (buf.len() as u64).min(self.cursor.remaining()) as usize;
        if len == 0 {
            return Ok(0);
        }

        let position = self.cursor.tell();
        ReadPlanner::new(&mut self.cache, self.cursor.len(), |start, end| {
            runtime.block_on(source.fetch(start, end))
        })
        .fill(position, &mut buf[..len])?;

        self.cursor.advance(len as u64);
        Ok(len)
    }

    /// Drop every cached block. The position is kept.
    pub fn flush(&mut self) -> Result<()> {
        self.connection()?;
        self.cache.clear();
        Ok(())
    }

    /// Release the source and drop the cache. Calling it again does nothing.
    pub fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            debug!(location = %self.location, cached_blocks = self.cache.len(), "closing stream");
            self.cache.clear();
            drop(conn);
        }
    }

    pub fn write(&mut self, _buf: &[u8]) -> Result<usize> {
        Err(Error::Unsupported("writing"))
    }

    pub fn truncate(&mut self, _size: Option<u64>) -> Result<u64> {
        Err(Error::Unsupported("truncate"))
    }

    fn connection(&self) -> Result<&Connection<S>> {
        self.conn.as_ref().ok_or(Error::Closed)
    }
}

impl<S: RangeSource> Drop for FileStream<S> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<S: RangeSource> fmt::Debug for FileStream<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.is_closed() { "closed" } else { "open" };
        write!(f, "<{status} FileStream {:?}>", self.location)
    }
}

impl<S: RangeSource> Read for FileStream<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_into(buf)?)
    }
}

impl<S: RangeSource> Seek for FileStream<S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        Ok(FileStream::seek(self, pos)?)
    }
}
