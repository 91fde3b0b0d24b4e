//! Single-city dataset cache.
//!
//! Holds the places of at most one city. Loads are tagged with a generation
//! ticket taken when they start; a load may only publish its result if no
//! newer load started and no clear happened while it was in flight. This keeps
//! the cached city id and place list paired even when loads for different
//! cities overlap.

use std::sync::{Arc, Mutex, MutexGuard};

use masterset_data::Place;
use tracing::{debug, warn};

/// Shared, immutable city dataset.
pub type Dataset = Arc<[Place]>;

/// Identifies one load attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Default)]
struct CacheState {
    generation: u64,
    entry: Option<(String, Dataset)>,
}

#[derive(Debug, Default)]
pub struct DatasetCache {
    state: Mutex<CacheState>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // The state is always left consistent, so a poisoned lock is still usable.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// The cached dataset, if it belongs to exactly `city`.
    pub fn get(&self, city: &str) -> Option<Dataset> {
        let state = self.lock();
        match &state.entry {
            Some((cached, places)) if cached == city => Some(Arc::clone(places)),
            _ => None,
        }
    }

    /// Replaces the cache contents unconditionally.
    pub fn put(&self, city: &str, places: Dataset) {
        let mut state = self.lock();
        state.entry = Some((city.to_string(), places));
    }

    /// Evicts the cached city. Loads already in flight will not publish.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.generation += 1;
        state.entry = None;
    }

    /// Id of the city currently cached.
    pub fn cached_city(&self) -> Option<String> {
        self.lock().entry.as_ref().map(|(city, _)| city.clone())
    }

    /// Starts a load, superseding every load started before it.
    pub fn begin_load(&self) -> LoadTicket {
        let mut state = self.lock();
        state.generation += 1;
        LoadTicket(state.generation)
    }

    /// Publishes a finished load if `ticket` is still the newest.
    ///
    /// Returns whether the cache was updated.
    pub fn complete_load(&self, ticket: LoadTicket, city: &str, places: Dataset) -> bool {
        let mut state = self.lock();
        if state.generation != ticket.0 {
            warn!(
                city,
                ticket = ticket.0,
                current = state.generation,
                "Discarding stale dataset load"
            );
            return false;
        }
        debug!(city, rows = places.len(), "Caching dataset");
        state.entry = Some((city.to_string(), places));
        true
    }
}
