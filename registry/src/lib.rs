#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative registry of the words currently visible on screen.
//!
//! This is the one shared mutable collection of the drill. The spawner
//! inserts, the retirer and the boundary path remove, and the movement
//! callbacks consult it, all from independent threads. A single mutex
//! guards the map; every operation holds the lock for the duration of
//! one map access and nothing more. Callers must never invoke surface
//! operations or sleep while the lock is held, which is easy to honour
//! because no method exposes the guard.

use std::collections::hash_map::{Entry, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use derdiedas_core::{LifecycleCell, VocabEntry, WordId};
use derdiedas_surface::SharedEntity;

/// One word currently visible on the display surface.
///
/// Exclusively owns its surface entity handle for as long as it lives
/// in the registry; the handle is never shared between two entries.
pub struct DisplayedWord {
    id: WordId,
    entry: VocabEntry,
    entity: SharedEntity,
    lifecycle: Arc<LifecycleCell>,
    hits: u32,
    misses: u32,
}

impl DisplayedWord {
    /// Creates a new visible-word record in the `Advancing` state.
    #[must_use]
    pub fn new(
        id: WordId,
        entry: VocabEntry,
        entity: SharedEntity,
        lifecycle: Arc<LifecycleCell>,
    ) -> Self {
        Self {
            id,
            entry,
            entity,
            lifecycle,
            hits: 0,
            misses: 0,
        }
    }

    /// Dictionary index this word displays.
    #[must_use]
    pub fn id(&self) -> WordId {
        self.id
    }

    /// Vocabulary entry behind the word.
    #[must_use]
    pub fn entry(&self) -> &VocabEntry {
        &self.entry
    }

    /// Surface entity handle owned by this word.
    #[must_use]
    pub fn entity(&self) -> &SharedEntity {
        &self.entity
    }

    /// Lifecycle cell shared with the word's callbacks.
    #[must_use]
    pub fn lifecycle(&self) -> &Arc<LifecycleCell> {
        &self.lifecycle
    }

    /// Times the player resolved this word correctly. Reserved for
    /// scoring; carried so the lifecycle paths can already record it.
    #[must_use]
    pub fn hits(&self) -> u32 {
        self.hits
    }

    /// Times this word crossed the screen unresolved.
    #[must_use]
    pub fn misses(&self) -> u32 {
        self.misses
    }

    /// Records a correct resolution.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Records an unresolved crossing.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }
}

/// Lock-guarded map from dictionary index to the word displaying it.
///
/// Invariants: at most one entry per [`WordId`]; an entry leaves the
/// map exactly once, yielded to exactly one caller of
/// [`Registry::remove_if_present`].
#[derive(Default)]
pub struct Registry {
    words: Mutex<HashMap<WordId, DisplayedWord>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `word` only if no entry exists for its id yet.
    ///
    /// Returns whether the insertion happened. Atomic with respect to
    /// concurrent inserts and removals.
    pub fn try_insert(&self, word: DisplayedWord) -> bool {
        let mut words = self.lock();
        match words.entry(word.id()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                let _ = slot.insert(word);
                true
            }
        }
    }

    /// Atomically removes and returns the entry for `id`, if present.
    ///
    /// Two concurrent calls for the same id yield the entry to exactly
    /// one of them; the other observes `None`.
    pub fn remove_if_present(&self, id: WordId) -> Option<DisplayedWord> {
        self.lock().remove(&id)
    }

    /// Some currently present key, or `None` when the registry is
    /// empty. Selection order is arbitrary; no fairness is promised.
    #[must_use]
    pub fn pick_arbitrary(&self) -> Option<WordId> {
        self.lock().keys().next().copied()
    }

    /// Whether an entry exists for `id`.
    #[must_use]
    pub fn contains(&self, id: WordId) -> bool {
        self.lock().contains_key(&id)
    }

    /// Current count of visible words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no words are visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A poisoned mutex only means another thread panicked mid-access;
    // the map itself is always structurally sound, so the poison flag
    // is absorbed instead of propagated.
    fn lock(&self) -> MutexGuard<'_, HashMap<WordId, DisplayedWord>> {
        self.words.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
