//! Test overlap sources.

#![allow(dead_code)]

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use ovlpipe_lib::source::{OverlapSource, RawOverlap};

/// Yields a fixed list of overlaps and counts how many were pulled.
pub struct CountingSource {
    overlaps: std::vec::IntoIter<RawOverlap>,
    reads: Arc<AtomicU64>,
}

impl CountingSource {
    pub fn new(overlaps: Vec<RawOverlap>) -> Self {
        Self { overlaps: overlaps.into_iter(), reads: Arc::new(AtomicU64::new(0)) }
    }

    /// Shared counter of overlaps pulled so far.
    pub fn reads(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.reads)
    }
}

impl OverlapSource for CountingSource {
    fn next_overlap(&mut self) -> io::Result<Option<RawOverlap>> {
        let next = self.overlaps.next();
        if next.is_some() {
            self.reads.fetch_add(1, Ordering::Relaxed);
        }
        Ok(next)
    }
}

/// Yields `good` overlaps, then fails.
pub struct FailingSource {
    good: std::vec::IntoIter<RawOverlap>,
}

impl FailingSource {
    pub fn new(good: Vec<RawOverlap>) -> Self {
        Self { good: good.into_iter() }
    }
}

impl OverlapSource for FailingSource {
    fn next_overlap(&mut self) -> io::Result<Option<RawOverlap>> {
        match self.good.next() {
            Some(overlap) => Ok(Some(overlap)),
            None => Err(io::Error::new(io::ErrorKind::InvalidData, "truncated overlap store")),
        }
    }
}
