use std::sync::{Arc, RwLock};

struct Slot<T> {
    version: u64,
    value: Option<T>,
}

/// Single-slot cell that only ever holds the most recent value.
///
/// One task publishes with `set()`, any number of tasks read with `get()`.
/// There is no history and no queue: a slow reader simply misses the values
/// that were replaced before it looked. The lock is held for the duration of
/// one assignment or one clone, so values should be cheap to clone (`Bytes`,
/// `Arc`, small `Copy` structs).
///
/// Every `set()` bumps a version counter, which lets readers tell a fresh
/// value from one they have already seen. Clones share the same slot.
pub struct Latest<T> {
    slot: Arc<RwLock<Slot<T>>>,
}

impl<T> Clone for Latest<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Default for Latest<T> {
    fn default() -> Self {
        Self {
            slot: Arc::new(RwLock::new(Slot {
                version: 0,
                value: None,
            })),
        }
    }
}

impl<T> std::fmt::Debug for Latest<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        f.debug_struct("Latest")
            .field("version", &slot.version)
            .field("present", &slot.value.is_some())
            .finish()
    }
}

impl<T: Clone> Latest<T> {
    /// Create an empty cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current value. Returns the version assigned to it.
    pub fn set(&self, value: T) -> u64 {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        slot.version += 1;
        slot.value = Some(value);
        slot.version
    }

    /// Most recent value, or `None` if nothing was ever set.
    pub fn get(&self) -> Option<T> {
        self.slot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .value
            .clone()
    }

    /// Most recent value together with its version.
    pub fn get_versioned(&self) -> Option<(u64, T)> {
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        slot.value.clone().map(|value| (slot.version, value))
    }

    /// Version of the current value, 0 before the first `set()`.
    pub fn version(&self) -> u64 {
        self.slot.read().unwrap_or_else(|e| e.into_inner()).version
    }

    pub fn is_empty(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .value
            .is_none()
    }
}
