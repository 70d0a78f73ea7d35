//! Helper utilities for integration tests.

pub mod overlap_generator;
pub mod sinks;
pub mod sources;

pub use overlap_generator::*;
pub use sinks::*;
pub use sources::*;

/// Route `log` output through the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
