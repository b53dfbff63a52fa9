#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the vocabulary drill.
//!
//! This crate defines the vocabulary that connects the dictionary, the
//! registry of visible words, the periodic systems, and the display
//! adapters: dictionary indices, vocabulary entries, the per-word
//! lifecycle state machine, and the run-wide counters that feed the
//! status line. Everything here is either immutable or lock-free; the
//! single mutex guarding shared membership lives in the registry crate.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

/// Title shown in the status area of the running drill.
pub const GAME_TITLE: &str = "der / die / das";

/// Placeholder printed in place of the article while a word is advancing.
pub const ARTICLE_PLACEHOLDER: &str = "___";

/// Index into the dictionary identifying one vocabulary entry.
///
/// Doubles as the registry key: at most one word per `WordId` is visible
/// at any time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WordId(u32);

impl WordId {
    /// Creates a new word identifier with the provided dictionary index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric dictionary index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Immutable pair of a grammatical article and the word it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VocabEntry {
    article: String,
    word: String,
}

impl VocabEntry {
    /// Creates a new vocabulary entry.
    #[must_use]
    pub fn new<A, W>(article: A, word: W) -> Self
    where
        A: Into<String>,
        W: Into<String>,
    {
        Self {
            article: article.into(),
            word: word.into(),
        }
    }

    /// Article the player is asked to recall.
    #[must_use]
    pub fn article(&self) -> &str {
        &self.article
    }

    /// The bare word without its article.
    #[must_use]
    pub fn word(&self) -> &str {
        &self.word
    }

    /// Text shown while the word advances and the article is hidden.
    #[must_use]
    pub fn concealed_text(&self) -> String {
        format!("{ARTICLE_PLACEHOLDER} {}", self.word)
    }

    /// Text shown once the word is resolved and the article revealed.
    #[must_use]
    pub fn revealed_text(&self) -> String {
        format!("{} {}", self.article, self.word)
    }
}

/// Lifecycle of a word visible on the display surface.
///
/// Transitions are strictly `Advancing` to `Dying` to `Dead`; no
/// transition skips `Dying` and nothing leaves `Dead`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// The word scrolls across the screen, article concealed.
    Advancing,
    /// The word has been resolved (retired or missed) and lingers
    /// briefly with its article revealed.
    Dying,
    /// The word has been removed from the surface. Terminal.
    Dead,
}

const STATE_ADVANCING: u8 = 0;
const STATE_DYING: u8 = 1;
const STATE_DEAD: u8 = 2;

/// Atomic cell owning one word's lifecycle state.
///
/// The compare-and-swap transitions guarantee that concurrent attempts
/// to resolve the same word (timer retirement racing boundary
/// detection) succeed for exactly one caller, which makes every
/// downstream removal idempotent.
#[derive(Debug)]
pub struct LifecycleCell {
    state: AtomicU8,
}

impl LifecycleCell {
    /// Creates a cell in the initial `Advancing` state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(STATE_ADVANCING),
        }
    }

    /// Current state of the word.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        match self.state.load(Ordering::Acquire) {
            STATE_ADVANCING => LifecycleState::Advancing,
            STATE_DYING => LifecycleState::Dying,
            _ => LifecycleState::Dead,
        }
    }

    /// Attempts the `Advancing` to `Dying` transition.
    ///
    /// Returns `true` for exactly one caller under contention; all
    /// others observe `false` and must not perform the resolution's
    /// side effects.
    #[must_use]
    pub fn begin_dying(&self) -> bool {
        self.state
            .compare_exchange(
                STATE_ADVANCING,
                STATE_DYING,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Attempts the `Dying` to `Dead` transition.
    ///
    /// Returns `false` when the word never entered `Dying` or was
    /// already marked dead.
    #[must_use]
    pub fn mark_dead(&self) -> bool {
        self.state
            .compare_exchange(STATE_DYING, STATE_DEAD, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Reports whether the word reached the terminal state.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.state() == LifecycleState::Dead
    }
}

impl Default for LifecycleCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Run-wide counters shared by the spawner, the retirement paths, and
/// the status line.
#[derive(Debug)]
pub struct Stats {
    spawned: AtomicU64,
    revealed: AtomicU64,
    missed: AtomicU64,
}

impl Stats {
    /// Creates a zeroed set of counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            spawned: AtomicU64::new(0),
            revealed: AtomicU64::new(0),
            missed: AtomicU64::new(0),
        }
    }

    /// Records a word placed onto the surface.
    pub fn record_spawned(&self) {
        let _ = self.spawned.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a word retired with its article revealed.
    pub fn record_revealed(&self) {
        let _ = self.revealed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a word that crossed the screen unresolved.
    pub fn record_missed(&self) {
        let _ = self.missed.fetch_add(1, Ordering::Relaxed);
    }

    /// Captures a consistent-enough snapshot for presentation.
    ///
    /// The counters are read independently; the snapshot is for the
    /// status line, not for correctness decisions.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            spawned: self.spawned.load(Ordering::Relaxed),
            revealed: self.revealed.load(Ordering::Relaxed),
            missed: self.missed.load(Ordering::Relaxed),
        }
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the run counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Words placed onto the surface since startup.
    pub spawned: u64,
    /// Words retired with the article shown.
    pub revealed: u64,
    /// Words that reached the right edge unresolved.
    pub missed: u64,
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::{LifecycleCell, LifecycleState, Stats, VocabEntry, WordId};

    #[test]
    fn concealed_text_hides_the_article() {
        let entry = VocabEntry::new("der", "Hund");
        assert_eq!(entry.concealed_text(), "___ Hund");
        assert_eq!(entry.revealed_text(), "der Hund");
    }

    #[test]
    fn lifecycle_transitions_are_exactly_once() {
        let cell = LifecycleCell::new();
        assert_eq!(cell.state(), LifecycleState::Advancing);

        assert!(cell.begin_dying());
        assert!(!cell.begin_dying(), "second resolution must lose");
        assert_eq!(cell.state(), LifecycleState::Dying);

        assert!(cell.mark_dead());
        assert!(!cell.mark_dead(), "second termination must lose");
        assert!(cell.is_dead());
    }

    #[test]
    fn mark_dead_requires_dying() {
        let cell = LifecycleCell::new();
        assert!(!cell.mark_dead(), "Advancing must not skip to Dead");
        assert_eq!(cell.state(), LifecycleState::Advancing);
    }

    #[test]
    fn concurrent_resolution_has_a_single_winner() {
        let cell = Arc::new(LifecycleCell::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let cell = Arc::clone(&cell);
            handles.push(thread::spawn(move || cell.begin_dying()));
        }

        let winners = handles
            .into_iter()
            .map(|handle| handle.join())
            .filter(|result| matches!(result, Ok(true)))
            .count();
        assert_eq!(winners, 1);
        assert_eq!(cell.state(), LifecycleState::Dying);
    }

    #[test]
    fn stats_counters_accumulate() {
        let stats = Stats::new();
        stats.record_spawned();
        stats.record_spawned();
        stats.record_revealed();
        stats.record_missed();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.spawned, 2);
        assert_eq!(snapshot.revealed, 1);
        assert_eq!(snapshot.missed, 1);
    }

    #[test]
    fn vocabulary_round_trips_through_bincode() {
        let entry = VocabEntry::new("die", "Katze");
        let bytes = bincode::serialize(&(WordId::new(7), entry.clone())).expect("serialize");
        let (id, restored): (WordId, VocabEntry) =
            bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(id, WordId::new(7));
        assert_eq!(restored, entry);
    }
}
