mod http;
mod local;

pub use http::{HttpOptions, HttpRangeSource};
pub use local::LocalFileSource;

use async_trait::async_trait;

use crate::error::Result;

/// A read-only resource that can only be read by byte range.
#[async_trait]
pub trait RangeSource: Send + Sync {
    /// Fetch the half-open byte interval `[start, end)`.
    ///
    /// Callers guarantee `start < end <= self.len()`. Implementations return
    /// exactly `end - start` bytes or an [`Error::Network`](crate::Error::Network).
    async fn fetch(&self, start: u64, end: u64) -> Result<Vec<u8>>;

    /// Total size of the resource, resolved when the source was opened.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// URL or path, used when rendering the stream.
    fn location(&self) -> &str;
}
