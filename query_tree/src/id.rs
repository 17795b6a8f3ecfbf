//! Query tree: Identity Generator
//!
//! Ids look like `qb-<millis>-<counter>`. The counter is process-wide and
//! never repeats, so ids stay unique even when the clock does not move.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Prefix shared by every generated id.
pub const ID_PREFIX: &str = "qb";

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Produce a new process-unique node id.
pub fn generate_id() -> String {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("{}-{}-{}", ID_PREFIX, millis, n)
}
