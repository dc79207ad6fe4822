//! Shared-state helpers used by the job worker.

pub mod aliases;

pub use aliases::{thread_safe_none, ThreadSafeOption};
