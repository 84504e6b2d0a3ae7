//! Virtual-user handles.
//!
//! The load runtime drives each virtual user as one long-lived worker task
//! that iterates the scenario function. Handles are assigned lazily per task
//! and remembered, so the same worker resolves the same handle (and therefore
//! the same pool token) on every iteration without re-authenticating.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{OnceLock, RwLock};
use tokio::task;

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(0);

fn registry() -> &'static RwLock<HashMap<task::Id, u64>> {
    static REGISTRY: OnceLock<RwLock<HashMap<task::Id, u64>>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Handle of the current execution context, stable for the lifetime of the
/// task. Outside a task context every call hands out a fresh handle.
pub fn current() -> u64 {
    let Some(id) = task::try_id() else {
        return NEXT_HANDLE.fetch_add(1, Ordering::Relaxed);
    };

    if let Some(handle) = registry().read().unwrap().get(&id) {
        return *handle;
    }

    let mut assigned = registry().write().unwrap();
    *assigned
        .entry(id)
        .or_insert_with(|| NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
}
