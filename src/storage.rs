use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::aoc::leaderboard::LeaderboardSnapshot;

type SharedSnapshot = Arc<Mutex<Option<Arc<LeaderboardSnapshot>>>>;

/// Single slot holding the last fetched leaderboard. Clones share the slot.
#[derive(Clone, Default)]
pub struct MemoryCache {
    data: SharedSnapshot,
}

impl MemoryCache {
    pub fn new() -> MemoryCache {
        MemoryCache::default()
    }

    // The lock only guards a pointer swap, a poisoned slot still holds a whole snapshot.
    fn slot(&self) -> MutexGuard<'_, Option<Arc<LeaderboardSnapshot>>> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set(&self, snapshot: LeaderboardSnapshot) {
        *self.slot() = Some(Arc::new(snapshot));
    }

    pub fn get(&self) -> Option<Arc<LeaderboardSnapshot>> {
        self.slot().clone()
    }

    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.data)
    }
}
