//! Shared slot types
//!
//! A worker keeps at most one job in flight. The slot holding it is shared
//! between the caller and the worker's own bookkeeping, so it lives behind
//! an `Arc` and a `parking_lot` mutex.

use parking_lot::Mutex;
use std::sync::Arc;

/// Optional value shared across threads, e.g. the job in flight
pub type ThreadSafeOption<T> = Arc<Mutex<Option<T>>>;

/// Empty shared slot
#[inline]
pub fn thread_safe_none<T>() -> ThreadSafeOption<T> {
    Arc::new(Mutex::new(None))
}
