//! Tracing and logging setup shared by the binaries.

/// Initialize process-wide tracing/logging.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init(options: &LogOptions) {
    tracing::init(options);
}

pub use crate::tracing::LogOptions;

/// Tracing configuration (filters, formatting).
pub mod tracing;
