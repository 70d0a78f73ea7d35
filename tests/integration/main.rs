//! Integration tests for the ovlpipe library.
//!
//! These tests drive whole pipeline runs through the public API: ordering
//! under contention, backpressure, conservation of counts, cancellation and
//! error propagation.

mod helpers;
mod test_backpressure;
mod test_cancellation;
mod test_error_paths;
mod test_ordering;
mod test_overlap_pipeline;
