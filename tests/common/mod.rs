#![allow(dead_code)]

use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use httpio::{Error, RangeSource, Result};

/// Deterministic pseudo-random bytes.
pub fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 33) as u8
        })
        .collect()
}

/// Test double for a remote object: shared content, a log of every fetched
/// range, a switch that makes fetches fail, and a count of dropped sources.
#[derive(Clone, Default)]
pub struct Remote {
    data: Arc<Mutex<Vec<u8>>>,
    fetches: Arc<Mutex<Vec<Range<u64>>>>,
    failing: Arc<AtomicBool>,
    released: Arc<AtomicUsize>,
}

impl Remote {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data: Arc::new(Mutex::new(data)),
            ..Default::default()
        }
    }

    /// A source whose length is the content length at this moment.
    pub fn source(&self) -> MemorySource {
        MemorySource {
            remote: self.clone(),
            size: self.data.lock().unwrap().len() as u64,
        }
    }

    /// Swap the content, keeping the length the source reported.
    pub fn replace(&self, data: Vec<u8>) {
        *self.data.lock().unwrap() = data;
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn fetches(&self) -> Vec<Range<u64>> {
        self.fetches.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }

    pub fn reset_fetches(&self) {
        self.fetches.lock().unwrap().clear();
    }

    /// How many sources handed out by [`Remote::source`] have been dropped.
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

pub struct MemorySource {
    remote: Remote,
    size: u64,
}

impl Drop for MemorySource {
    fn drop(&mut self) {
        self.remote.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RangeSource for MemorySource {
    async fn fetch(&self, start: u64, end: u64) -> Result<Vec<u8>> {
        assert!(start < end && end <= self.size, "bad range {start}..{end}");
        if self.remote.failing.load(Ordering::SeqCst) {
            return Err(Error::Network("connection reset by peer".into()));
        }
        self.remote.fetches.lock().unwrap().push(start..end);
        Ok(self.remote.data.lock().unwrap()[start as usize..end as usize].to_vec())
    }

    fn len(&self) -> u64 {
        self.size
    }

    fn location(&self) -> &str {
        "memory://test"
    }
}
