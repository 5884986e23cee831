//! Progress reporting while sources load.
//!
//! [`load_sources`](crate::load_sources) reports one unit per source
//! through [`ProgressCallback`]; the command line renders it as a bar,
//! library callers and tests pass [`null_progress`].

use std::sync::Arc;

/// Receives load progress, one unit per source.
pub trait ProgressCallback: Send + Sync {
    /// Number of sources about to be loaded.
    fn set_total(&self, total: u64);

    /// `delta` more sources finished.
    fn inc(&self, delta: u64);

    /// Source currently being read.
    fn set_message(&self, msg: String);

    /// All sources loaded.
    fn finish(&self, msg: String);
}

/// Discards every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// A shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
