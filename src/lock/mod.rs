//! Per-key locks serializing critical sections the store cannot.
//!
//! The document store has no secondary-index uniqueness constraint, so the
//! invitation flow serializes its check-then-insert per (project, email)
//! key through a [`LockManager`]. The in-memory implementation is the
//! default; distributed deployments would back this with Redis, Postgres
//! advisory locks, etc.

mod in_memory;

use std::fmt;
use std::sync::Arc;

/// Error type for lock operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockError {
    /// The underlying lock primitive was poisoned (e.g. a thread panicked
    /// while holding it).
    Poisoned(String),
    /// Failed to acquire the lock.
    AcquireFailed(String),
    /// Failed to release the lock.
    ReleaseFailed(String),
    /// Any other lock error.
    Other(String),
}

impl fmt::Display for LockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockError::Poisoned(msg) => write!(f, "lock poisoned: {}", msg),
            LockError::AcquireFailed(msg) => write!(f, "lock acquire failed: {}", msg),
            LockError::ReleaseFailed(msg) => write!(f, "lock release failed: {}", msg),
            LockError::Other(msg) => write!(f, "lock error: {}", msg),
        }
    }
}

impl std::error::Error for LockError {}

/// A single mutual-exclusion lock.
pub trait Lock: Send + Sync {
    /// Block until the lock is acquired.
    fn lock(&self) -> Result<(), LockError>;

    /// Try to acquire without blocking. Returns whether it was acquired.
    fn try_lock(&self) -> Result<bool, LockError>;

    /// Release the lock. Releasing an unlocked lock is a no-op.
    fn unlock(&self) -> Result<(), LockError>;
}

/// Factory trait for obtaining per-key locks.
///
/// Repeated calls with the same `key` must return the same logical lock
/// (the same `Arc` for in-memory, or the same distributed key).
pub trait LockManager: Send + Sync {
    /// The concrete lock type returned by this manager.
    type Lock: Lock;

    /// Get (or create) the lock for the given key.
    fn get_lock(&self, key: &str) -> Result<Arc<Self::Lock>, LockError>;
}

pub use in_memory::{InMemoryLock, InMemoryLockManager};
