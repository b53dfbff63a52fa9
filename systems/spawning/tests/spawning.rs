//! Spawning behavior against the surface contract: placement, the
//! bounded index search, and the wired-up boundary path.

use std::sync::Arc;
use std::time::Duration;

use derdiedas_core::Stats;
use derdiedas_dictionary::Dictionary;
use derdiedas_registry::Registry;
use derdiedas_surface::stub::StubSurface;
use derdiedas_surface::{GlyphColor, Motion, SurfaceLayout, WordEntity};
use derdiedas_system_retirement::{Config as RetireConfig, Retirement};
use derdiedas_system_spawning::{Config, Spawner};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn spawner(seed: u64) -> Spawner<ChaCha8Rng> {
    Spawner::new(ChaCha8Rng::seed_from_u64(seed), Config::default())
}

fn surface() -> StubSurface {
    StubSurface::new(SurfaceLayout::new(80, 24, 4))
}

#[test]
fn places_the_word_fully_offscreen_left() {
    let dictionary = Dictionary::parse("der Hund").expect("valid dictionary");
    let registry = Arc::new(Registry::new());
    let stats = Arc::new(Stats::new());
    let surface = surface();

    let id = spawner(1)
        .spawn_tick(&dictionary, &registry, &surface, &stats)
        .expect("spawn succeeds");
    assert!(registry.contains(id));

    let entity = surface.last().expect("entity created");
    // "___ Hund" renders 8 columns; the word starts just off-screen.
    assert_eq!(entity.position().column(), -8);
    assert!(entity.position().row() < 19, "row within the word area");
    assert_eq!(entity.shape().lines(), ["___ Hund"]);
    assert_eq!(entity.color(), GlyphColor::Plain);
    assert!(entity.dies_offscreen());
    assert_eq!(stats.snapshot().spawned, 1);
}

#[test]
fn skips_the_tick_when_every_index_is_visible() {
    let dictionary = Dictionary::parse("der Hund").expect("valid dictionary");
    let registry = Arc::new(Registry::new());
    let stats = Arc::new(Stats::new());
    let surface = surface();
    let mut spawner = spawner(2);

    assert!(spawner
        .spawn_tick(&dictionary, &registry, &surface, &stats)
        .is_some());
    assert!(
        spawner
            .spawn_tick(&dictionary, &registry, &surface, &stats)
            .is_none(),
        "the only index is visible; the tick must be skipped, not spun"
    );
    assert_eq!(registry.len(), 1);
}

#[test]
fn spawns_again_once_the_retirer_frees_the_index() {
    let dictionary = Dictionary::parse("der Hund").expect("valid dictionary");
    let registry = Arc::new(Registry::new());
    let stats = Arc::new(Stats::new());
    let surface = surface();
    let mut spawner = spawner(3);

    let id = spawner
        .spawn_tick(&dictionary, &registry, &surface, &stats)
        .expect("first spawn succeeds");
    assert!(spawner
        .spawn_tick(&dictionary, &registry, &surface, &stats)
        .is_none());

    let retirement = Retirement::new(RetireConfig::new(Duration::ZERO));
    assert!(retirement.retire(&registry, id, &stats));

    assert_eq!(
        spawner.spawn_tick(&dictionary, &registry, &surface, &stats),
        Some(id),
        "the freed index must be spawnable on the next tick"
    );
}

#[test]
fn boundary_crossing_marks_the_word_missed_exactly_once() {
    let dictionary = Dictionary::parse("der Hund").expect("valid dictionary");
    let registry = Arc::new(Registry::new());
    let stats = Arc::new(Stats::new());
    let surface = surface();

    let _id = spawner(4)
        .spawn_tick(&dictionary, &registry, &surface, &stats)
        .expect("spawn succeeds");
    let entity = surface.last().expect("entity created");

    // Drive the frame callback until the word crosses the right edge.
    let mut frames = 0;
    loop {
        let motion = entity.drive().expect("movement callback attached");
        if motion == Motion::Expire {
            break;
        }
        frames += 1;
        assert!(frames < 200, "word never reached the boundary");
    }

    assert!(registry.is_empty());
    assert!(entity.is_killed());
    assert_eq!(entity.color(), GlyphColor::Missed);
    assert_eq!(entity.shape().lines(), ["der Hund"]);
    assert_eq!(stats.snapshot().missed, 1);

    // The offscreen expiry backstop races the same path; it must lose.
    entity.expire();
    assert_eq!(stats.snapshot().missed, 1);
}

#[test]
fn refuses_to_spawn_without_word_rows() {
    let dictionary = Dictionary::parse("der Hund").expect("valid dictionary");
    let registry = Arc::new(Registry::new());
    let stats = Arc::new(Stats::new());
    let surface = StubSurface::new(SurfaceLayout::new(80, 4, 4));

    assert!(spawner(5)
        .spawn_tick(&dictionary, &registry, &surface, &stats)
        .is_none());
    assert!(registry.is_empty());
}
