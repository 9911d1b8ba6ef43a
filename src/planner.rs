//! Read planning over the block cache.
//!
//! A read of `[position, position + n)` is mapped onto block indices, the
//! blocks absent from the cache are grouped into maximal contiguous runs, each
//! run is fetched with a single range request, and the requested bytes are
//! then copied out of the cache with the partial first and last blocks trimmed.

use std::ops::Range;

use tracing::{debug, trace};

use crate::cache::BlockCache;
use crate::error::{Error, Result};

/// Block coordinates of a non-empty byte request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    /// Index of the first block touched.
    pub first: u64,
    /// One past the index of the last block touched.
    pub end: u64,
    /// Offset of the request's first byte within the first block.
    pub head: u64,
    /// Offset one past the request's last byte within the last block.
    pub tail: u64,
}

impl BlockSpan {
    /// `len` must be non-zero.
    pub fn new(position: u64, len: u64, block_size: u64) -> Self {
        debug_assert!(len > 0 && block_size > 0);
        let last_byte = position + len - 1;
        Self {
            first: position / block_size,
            end: last_byte / block_size + 1,
            head: position % block_size,
            tail: last_byte % block_size + 1,
        }
    }

    pub fn blocks(&self) -> Range<u64> {
        self.first..self.end
    }
}

/// Maximal runs of consecutive blocks in `blocks` that are not `cached`,
/// as `start..end_exclusive` index ranges in ascending order.
pub fn missing_runs(blocks: Range<u64>, mut cached: impl FnMut(u64) -> bool) -> Vec<Range<u64>> {
    let mut runs = Vec::new();
    let mut run_start = None;

    for index in blocks.clone() {
        match (cached(index), run_start) {
            (false, None) => run_start = Some(index),
            (true, Some(start)) => {
                runs.push(start..index);
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        runs.push(start..blocks.end);
    }

    runs
}

/// Serves reads of a resource of `length` bytes through a [`BlockCache`],
/// calling `fetch(start, end)` for the byte ranges it is missing.
pub struct ReadPlanner<'a, F> {
    cache: &'a mut BlockCache,
    length: u64,
    fetch: F,
}

impl<'a, F> ReadPlanner<'a, F>
where
    F: FnMut(u64, u64) -> Result<Vec<u8>>,
{
    pub fn new(cache: &'a mut BlockCache, length: u64, fetch: F) -> Self {
        Self {
            cache,
            length,
            fetch,
        }
    }

    /// Fill `out` with the bytes at `[position, position + out.len())`.
    ///
    /// The range must lie within the resource. On error `out` may hold a
    /// partial copy, and runs fetched before the failure stay cached.
    pub fn fill(&mut self, position: u64, out: &mut [u8]) -> Result<()> {
        let len = out.len() as u64;
        if len == 0 {
            return Ok(());
        }
        debug_assert!(position + len <= self.length);

        let Some(block_size) = self.cache.block_size() else {
            let data = self.fetch_exact(position, position + len)?;
            out.copy_from_slice(&data);
            return Ok(());
        };
        let block_size = block_size.get();

        let span = BlockSpan::new(position, len, block_size);
        let runs = missing_runs(span.blocks(), |index| self.cache.has(index));
        if runs.is_empty() {
            trace!(first = span.first, end = span.end, "read served from cache");
        }
        for run in runs {
            self.fetch_run(run, block_size)?;
        }

        self.assemble(&span, out)
    }

    fn fetch_run(&mut self, run: Range<u64>, block_size: u64) -> Result<()> {
        let start = run.start * block_size;
        let end = run.end.saturating_mul(block_size).min(self.length);
        debug!(start, end, blocks = run.end - run.start, "fetching missing blocks");

        let data = self.fetch_exact(start, end)?;
        for (index, block) in run.zip(data.chunks(block_size as usize)) {
            self.cache.put(index, block.to_vec());
        }
        Ok(())
    }

    fn fetch_exact(&mut self, start: u64, end: u64) -> Result<Vec<u8>> {
        let data = (self.fetch)(start, end)?;
        if data.len() as u64 != end - start {
            return Err(Error::Network(format!(
                "expected {} bytes for range {start}..{end}, got {}",
                end - start,
                data.len()
            )));
        }
        Ok(data)
    }

    fn assemble(&self, span: &BlockSpan, out: &mut [u8]) -> Result<()> {
        let last = span.end - 1;
        let mut written = 0;

        for index in span.blocks() {
            let block = self.cache.get(index);
            let start = if index == span.first { span.head as usize } else { 0 };
            let end = if index == last {
                span.tail as usize
            } else {
                block.len()
            };
            // The final block of the resource may be shorter than a full block.
            let piece = block.get(start..end).ok_or_else(|| {
                Error::Network(format!(
                    "block {index} holds {} bytes, read needs {start}..{end}",
                    block.len()
                ))
            })?;
            out[written..written + piece.len()].copy_from_slice(piece);
            written += piece.len();
        }

        debug_assert_eq!(written, out.len());
        Ok(())
    }
}
