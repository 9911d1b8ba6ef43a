use std::io::SeekFrom;

use crate::error::{Error, Result};

/// Translate a numeric `(offset, whence)` pair into a [`SeekFrom`].
///
/// `0` seeks from the start, `1` from the current position and `2` from the
/// end. Negative offsets from the start are rejected here since `SeekFrom::Start`
/// cannot hold them.
pub fn seek_from_whence(offset: i64, whence: i32) -> Result<SeekFrom> {
    match whence {
        0 => u64::try_from(offset)
            .map(SeekFrom::Start)
            .map_err(|_| Error::InvalidArgument(format!("cursor={offset}"))),
        1 => Ok(SeekFrom::Current(offset)),
        2 => Ok(SeekFrom::End(offset)),
        _ => Err(Error::InvalidArgument(format!("whence={whence}"))),
    }
}

/// Logical read position within `[0, length]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamCursor {
    position: u64,
    length: u64,
}

impl StreamCursor {
    pub fn new(length: u64) -> Self {
        Self {
            position: 0,
            length,
        }
    }

    pub fn tell(&self) -> u64 {
        self.position
    }

    pub fn len(&self) -> u64 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Bytes between the position and the end.
    pub fn remaining(&self) -> u64 {
        self.length - self.position
    }

    /// Move the cursor; out-of-range targets leave it untouched.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        let candidate = match pos {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::Current(delta) => i128::from(self.position) + i128::from(delta),
            SeekFrom::End(delta) => i128::from(self.length) + i128::from(delta),
        };
        if !(0..=i128::from(self.length)).contains(&candidate) {
            return Err(Error::InvalidArgument(format!("cursor={candidate}")));
        }
        self.position = candidate as u64;
        Ok(self.position)
    }

    /// Move forward after a read delivered `n` bytes.
    pub fn advance(&mut self, n: u64) {
        debug_assert!(n <= self.remaining());
        self.position += n;
    }
}
