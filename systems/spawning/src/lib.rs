#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Periodic placement of dictionary words onto the display surface.
//!
//! Each tick picks an unused dictionary index at random, creates a
//! surface entity fully off-screen to the left showing the concealed
//! word, wires the entity's movement callback and offscreen expiry to
//! the motion planner and the missed path, and registers the word. The
//! index search is bounded: when every sampled index is already
//! visible the tick is skipped instead of spinning, so a dictionary
//! smaller than the number of concurrently visible words costs idle
//! ticks, never a pegged core.

use std::sync::Arc;

use derdiedas_core::{LifecycleCell, Stats, WordId};
use derdiedas_dictionary::Dictionary;
use derdiedas_registry::{DisplayedWord, Registry};
use derdiedas_surface::{EntitySpec, Motion, Position, Shape, Surface};
use derdiedas_system_movement::{self as movement, Verdict};
use derdiedas_system_retirement::retire_missed;
use log::debug;
use rand::Rng;

/// Index-search budget applied when no explicit configuration is given.
pub const DEFAULT_MAX_ATTEMPTS: usize = 32;

/// Configuration for the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    max_attempts: usize,
}

impl Config {
    /// Creates a configuration with the provided index-search budget.
    #[must_use]
    pub const fn new(max_attempts: usize) -> Self {
        Self { max_attempts }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

/// Periodic spawner of visible words.
#[derive(Debug)]
pub struct Spawner<R> {
    rng: R,
    max_attempts: usize,
}

impl<R> Spawner<R>
where
    R: Rng,
{
    /// Creates a spawner drawing randomness from `rng`.
    pub fn new(rng: R, config: Config) -> Self {
        Self {
            rng,
            max_attempts: config.max_attempts,
        }
    }

    /// Attempts to place one word this tick.
    ///
    /// Returns the id of the placed word, or `None` when the tick was
    /// skipped (index budget exhausted, empty word area, or a lost
    /// insertion race). The surface entity is created with no lock
    /// held; a lost race terminates the fresh entity instead of
    /// leaking it.
    pub fn spawn_tick(
        &mut self,
        dictionary: &Dictionary,
        registry: &Arc<Registry>,
        surface: &dyn Surface,
        stats: &Arc<Stats>,
    ) -> Option<WordId> {
        let id = self.pick_unused_index(dictionary, registry)?;
        let entry = dictionary.entry(id)?.clone();
        let layout = surface.layout();
        if layout.word_rows() == 0 {
            return None;
        }

        let shape = Shape::from_line(entry.concealed_text());
        let word_columns = shape.columns();
        let right_bound = layout.right_bound();
        let row = self.rng.gen_range(0..layout.word_rows());
        let position = Position::new(-(word_columns as i32), row);
        let lifecycle = Arc::new(LifecycleCell::new());

        let movement_registry = Arc::clone(registry);
        let movement_stats = Arc::clone(stats);
        let movement_lifecycle = Arc::clone(&lifecycle);
        let expiry_registry = Arc::clone(registry);
        let expiry_stats = Arc::clone(stats);

        let spec = EntitySpec::new(position, shape)
            .die_offscreen()
            .with_movement(move |position| {
                match movement::plan(
                    position,
                    word_columns,
                    right_bound,
                    movement_lifecycle.state(),
                ) {
                    Verdict::Step(next) => Motion::Glide(next),
                    Verdict::Freeze => Motion::Hold,
                    Verdict::Boundary => {
                        let _ = retire_missed(&movement_registry, id, &movement_stats);
                        Motion::Expire
                    }
                }
            })
            .with_expiry(move || {
                let _ = retire_missed(&expiry_registry, id, &expiry_stats);
            });

        let entity = surface.create_entity(spec);
        let word = DisplayedWord::new(id, entry, Arc::clone(&entity), Arc::clone(&lifecycle));

        if !registry.try_insert(word) {
            // Lost a race for the index; the spawner is the only
            // inserter, so this is defensive. Discard, never leak.
            let _ = lifecycle.begin_dying();
            let _ = lifecycle.mark_dead();
            entity.kill();
            debug!("discarded duplicate spawn for {id:?}");
            return None;
        }

        stats.record_spawned();
        debug!("spawned {id:?} at row {row}");
        Some(id)
    }

    fn pick_unused_index(&mut self, dictionary: &Dictionary, registry: &Registry) -> Option<WordId> {
        if dictionary.is_empty() {
            return None;
        }

        let bound = dictionary.len() as u32;
        for _ in 0..self.max_attempts {
            let candidate = WordId::new(self.rng.gen_range(0..bound));
            if !registry.contains(candidate) {
                return Some(candidate);
            }
        }
        debug!("no unused index found in {} attempts", self.max_attempts);
        None
    }
}
