#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Retiring visible words: both roads into the `Dying` state.
//!
//! Timer-driven retirement removes an arbitrary word from the registry,
//! reveals its article, and terminates the entity after a grace delay
//! so the player can read the answer. The missed path does the same
//! without the grace delay when a word reaches the right-hand boundary
//! unresolved. Both paths are idempotent: the registry removal and the
//! lifecycle compare-and-swap each admit exactly one winner, so a
//! boundary crossing racing a timer pick resolves a word exactly once.
//!
//! The grace delay runs on a detached timer thread. The retirer's own
//! loop never sleeps for it and no lock is held across it; a delay
//! still pending at process exit is simply abandoned.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use derdiedas_core::{LifecycleCell, Stats, WordId};
use derdiedas_registry::Registry;
use derdiedas_surface::{GlyphColor, Shape, SharedEntity};
use log::{debug, warn};

/// Grace delay applied when no explicit configuration is given.
pub const DEFAULT_GRACE: Duration = Duration::from_millis(250);

/// Configuration for the retirement system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    grace: Duration,
}

impl Config {
    /// Creates a configuration with the provided grace delay.
    #[must_use]
    pub const fn new(grace: Duration) -> Self {
        Self { grace }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_GRACE)
    }
}

/// Timer-driven retirement of visible words.
#[derive(Clone, Copy, Debug)]
pub struct Retirement {
    grace: Duration,
}

impl Retirement {
    /// Creates the retirement system from its configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self {
            grace: config.grace,
        }
    }

    /// Retires an arbitrarily chosen visible word, if any.
    ///
    /// An empty registry makes this tick a no-op.
    pub fn retire_random(&self, registry: &Registry, stats: &Stats) -> Option<WordId> {
        let id = registry.pick_arbitrary()?;
        self.retire(registry, id, stats).then_some(id)
    }

    /// Retires the word identified by `id`: removes it from the
    /// registry (the index is immediately reusable), reveals its
    /// article, and schedules termination after the grace delay.
    ///
    /// Returns `false` when the word is no longer present or already
    /// resolved; calling twice is safe.
    pub fn retire(&self, registry: &Registry, id: WordId, stats: &Stats) -> bool {
        let Some(word) = registry.remove_if_present(id) else {
            return false;
        };
        if !word.lifecycle().begin_dying() {
            return false;
        }

        let entity = Arc::clone(word.entity());
        entity.set_shape(Shape::from_line(word.entry().revealed_text()));
        entity.set_color(GlyphColor::Revealed);
        stats.record_revealed();
        debug!("retired {:?} ({})", id, word.entry().revealed_text());

        schedule_termination(entity, Arc::clone(word.lifecycle()), self.grace);
        true
    }
}

/// Resolves a word that reached the boundary unresolved.
///
/// Reveals the answer in the missed color and terminates the entity
/// without a grace delay; the word is already at the edge. Counted as
/// missed at most once no matter how many callers race here (movement
/// callback, offscreen expiry, a concurrent timer pick).
pub fn retire_missed(registry: &Registry, id: WordId, stats: &Stats) -> bool {
    let Some(mut word) = registry.remove_if_present(id) else {
        return false;
    };
    if !word.lifecycle().begin_dying() {
        return false;
    }

    word.record_miss();
    let entity = word.entity();
    entity.set_shape(Shape::from_line(word.entry().revealed_text()));
    entity.set_color(GlyphColor::Missed);
    stats.record_missed();
    entity.kill();
    let _ = word.lifecycle().mark_dead();
    debug!("missed {:?} ({})", id, word.entry().revealed_text());
    true
}

fn schedule_termination(entity: SharedEntity, lifecycle: Arc<LifecycleCell>, grace: Duration) {
    if grace.is_zero() {
        entity.kill();
        let _ = lifecycle.mark_dead();
        return;
    }

    let deferred_entity = Arc::clone(&entity);
    let deferred_lifecycle = Arc::clone(&lifecycle);
    let spawned = thread::Builder::new()
        .name("word-grace".to_owned())
        .spawn(move || {
            thread::sleep(grace);
            deferred_entity.kill();
            let _ = deferred_lifecycle.mark_dead();
        });

    match spawned {
        Ok(_handle) => {}
        Err(error) => {
            // No thread available; skip the grace period rather than
            // leave the entity alive forever.
            warn!("deferred termination unavailable ({error}); terminating immediately");
            entity.kill();
            let _ = lifecycle.mark_dead();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use derdiedas_core::{LifecycleCell, LifecycleState, Stats, VocabEntry, WordId};
    use derdiedas_registry::{DisplayedWord, Registry};
    use derdiedas_surface::stub::{StubEntity, StubSurface};
    use derdiedas_surface::{EntitySpec, GlyphColor, Position, Shape, Surface, SurfaceLayout};

    use super::{retire_missed, Config, Retirement};

    fn stub() -> StubSurface {
        StubSurface::new(SurfaceLayout::new(80, 24, 4))
    }

    fn insert_word(surface: &StubSurface, registry: &Registry, id: u32) -> Arc<LifecycleCell> {
        let entry = VocabEntry::new("die", "Katze");
        let entity = surface.create_entity(EntitySpec::new(
            Position::new(10, 2),
            Shape::from_line(entry.concealed_text()),
        ));
        let lifecycle = Arc::new(LifecycleCell::new());
        assert!(registry.try_insert(DisplayedWord::new(
            WordId::new(id),
            entry,
            entity,
            Arc::clone(&lifecycle),
        )));
        lifecycle
    }

    fn last_entity(surface: &StubSurface) -> Arc<StubEntity> {
        surface.last().expect("entity created")
    }

    #[test]
    fn retire_reveals_the_article_and_frees_the_index() {
        let surface = stub();
        let registry = Registry::new();
        let stats = Stats::new();
        let lifecycle = insert_word(&surface, &registry, 3);

        let retirement = Retirement::new(Config::new(Duration::ZERO));
        assert!(retirement.retire(&registry, WordId::new(3), &stats));

        let entity = last_entity(&surface);
        assert_eq!(entity.shape().lines(), ["die Katze"]);
        assert_eq!(entity.color(), GlyphColor::Revealed);
        assert!(entity.is_killed(), "zero grace terminates inline");
        assert_eq!(lifecycle.state(), LifecycleState::Dead);
        assert!(registry.is_empty(), "index reusable immediately");
        assert_eq!(stats.snapshot().revealed, 1);
    }

    #[test]
    fn retire_is_idempotent() {
        let surface = stub();
        let registry = Registry::new();
        let stats = Stats::new();
        let _lifecycle = insert_word(&surface, &registry, 3);

        let retirement = Retirement::new(Config::new(Duration::ZERO));
        assert!(retirement.retire(&registry, WordId::new(3), &stats));
        assert!(!retirement.retire(&registry, WordId::new(3), &stats));
        assert_eq!(stats.snapshot().revealed, 1);
    }

    #[test]
    fn grace_delay_defers_termination_without_blocking() {
        let surface = stub();
        let registry = Registry::new();
        let stats = Stats::new();
        let lifecycle = insert_word(&surface, &registry, 1);

        let retirement = Retirement::new(Config::new(Duration::from_millis(30)));
        assert!(retirement.retire(&registry, WordId::new(1), &stats));

        let entity = last_entity(&surface);
        assert!(
            !entity.is_killed(),
            "the revealed word lingers through the grace delay"
        );
        assert_eq!(lifecycle.state(), LifecycleState::Dying);

        thread::sleep(Duration::from_millis(200));
        assert!(entity.is_killed());
        assert_eq!(lifecycle.state(), LifecycleState::Dead);
    }

    #[test]
    fn retire_random_skips_an_empty_registry() {
        let registry = Registry::new();
        let stats = Stats::new();
        let retirement = Retirement::new(Config::default());
        assert_eq!(retirement.retire_random(&registry, &stats), None);
    }

    #[test]
    fn retire_random_picks_the_only_word() {
        let surface = stub();
        let registry = Registry::new();
        let stats = Stats::new();
        let _lifecycle = insert_word(&surface, &registry, 9);

        let retirement = Retirement::new(Config::new(Duration::ZERO));
        assert_eq!(
            retirement.retire_random(&registry, &stats),
            Some(WordId::new(9))
        );
    }

    #[test]
    fn missed_path_counts_once_and_skips_the_grace_delay() {
        let surface = stub();
        let registry = Registry::new();
        let stats = Stats::new();
        let lifecycle = insert_word(&surface, &registry, 4);

        assert!(retire_missed(&registry, WordId::new(4), &stats));
        assert!(!retire_missed(&registry, WordId::new(4), &stats));

        let entity = last_entity(&surface);
        assert_eq!(entity.color(), GlyphColor::Missed);
        assert_eq!(entity.shape().lines(), ["die Katze"]);
        assert!(entity.is_killed());
        assert_eq!(lifecycle.state(), LifecycleState::Dead);
        assert_eq!(stats.snapshot().missed, 1);
    }

    #[test]
    fn missed_path_loses_to_an_earlier_retirement() {
        let surface = stub();
        let registry = Registry::new();
        let stats = Stats::new();
        let _lifecycle = insert_word(&surface, &registry, 5);

        let retirement = Retirement::new(Config::new(Duration::from_millis(50)));
        assert!(retirement.retire(&registry, WordId::new(5), &stats));
        assert!(
            !retire_missed(&registry, WordId::new(5), &stats),
            "a retired word must not also count as missed"
        );
        assert_eq!(stats.snapshot().missed, 0);
    }
}
