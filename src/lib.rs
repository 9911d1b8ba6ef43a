//! # httpio
//!
//! Random-access, file-like reading of remote resources using HTTP Range requests.
//!
//! A [`FileStream`] lets callers `seek` and `read` a remote object as if it were a
//! local file. Nothing is downloaded up front: each read is turned into range
//! requests for just the bytes it needs.
//!
//! ## Block cache
//!
//! With a block size configured, the resource is split into fixed-size blocks and
//! fetched blocks are kept in memory. A read that needs several blocks that are not
//! cached yet issues one request per contiguous run of missing blocks, not one per
//! block. The cache never evicts: it grows until [`FileStream::flush`] or
//! [`FileStream::close`] drops it. Without a block size every read is fetched
//! directly and nothing is kept.
//!
//! ## Example
//!
//! ```no_run
//! use std::io::{BufRead, BufReader, SeekFrom};
//! use std::num::NonZeroU64;
//!
//! use httpio::HttpOptions;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = HttpOptions::default().header("Authorization", "Bearer token");
//!     let mut stream = httpio::open(
//!         "https://example.com/archive.bin",
//!         NonZeroU64::new(1024 * 1024),
//!         options,
//!     )?;
//!
//!     // Read the last kilobyte
//!     stream.seek(SeekFrom::End(-1024))?;
//!     let tail = stream.read_bytes(Some(1024))?;
//!     println!("{} bytes", tail.len());
//!
//!     // Line iteration goes through std's BufReader
//!     stream.seek(SeekFrom::Start(0))?;
//!     for line in BufReader::new(&mut stream).lines().take(3) {
//!         println!("{}", line?);
//!     }
//!
//!     stream.close();
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod cli;
pub mod cursor;
pub mod error;
pub mod io;
pub mod planner;
pub mod stream;

pub use cache::BlockCache;
pub use cli::Cli;
pub use cursor::{StreamCursor, seek_from_whence};
pub use error::{Error, Result};
pub use io::{HttpOptions, HttpRangeSource, LocalFileSource, RangeSource};
pub use planner::{BlockSpan, ReadPlanner, missing_runs};
pub use stream::{FileStream, block_size_from_raw, open, open_file};
