use std::sync::atomic::{AtomicU64, Ordering};

// Single static counter for all surface revisions
static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

/// Process-unique stamp identifying one version of surface content.
pub fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}
