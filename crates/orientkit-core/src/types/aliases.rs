//! Type aliases for commonly used complex types.
//!
//! Gives names to the lock and callback shapes that cross crate
//! boundaries, so the same pattern reads the same way everywhere.

use parking_lot::Mutex;
use std::sync::Arc;

/// A thread-safe, mutex-protected wrapper for cross-task sharing.
///
/// Uses `parking_lot::Mutex`; never hold the guard across an `.await`.
pub type ThreadSafe<T> = Arc<Mutex<T>>;

/// Progress callback receiving a percentage in `0.0..=100.0`.
pub type ProgressCallback = Arc<dyn Fn(f64) + Send + Sync>;

/// One-shot completion callback.
pub type CompletionCallback<T> = Box<dyn FnOnce(T) + Send>;

/// Create a new `ThreadSafe<T>` from a value.
pub fn thread_safe<T>(value: T) -> ThreadSafe<T> {
    Arc::new(Mutex::new(value))
}

