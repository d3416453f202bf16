//! Lock helpers
//!
//! Converts poisoned `Mutex`/`RwLock` results into the caller's error type
//! so that a panic inside one consumer or source never cascades into
//! `unwrap()` panics elsewhere.

use std::sync::{LockResult, MutexGuard, RwLockReadGuard, RwLockWriteGuard};

fn poisoned_message(kind: &str, detail: &dyn std::fmt::Debug) -> String {
    format!(
        "Internal synchronisation error ({} poisoned by a panic while the lock was held): {:?}",
        kind, detail
    )
}

/// Map a poisoned mutex lock into `E`
pub fn handle_mutex_poison<'a, T, E>(
    result: LockResult<MutexGuard<'a, T>>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<MutexGuard<'a, T>, E> {
    result.map_err(|poison| error_constructor(poisoned_message("mutex", &poison)))
}

/// Map a poisoned RwLock read into `E`
pub fn handle_rwlock_read<'a, T, E>(
    result: LockResult<RwLockReadGuard<'a, T>>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<RwLockReadGuard<'a, T>, E> {
    result.map_err(|poison| error_constructor(poisoned_message("RwLock read", &poison)))
}

/// Map a poisoned RwLock write into `E`
pub fn handle_rwlock_write<'a, T, E>(
    result: LockResult<RwLockWriteGuard<'a, T>>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<RwLockWriteGuard<'a, T>, E> {
    result.map_err(|poison| error_constructor(poisoned_message("RwLock write", &poison)))
}
