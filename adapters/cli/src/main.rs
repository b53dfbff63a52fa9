#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the article drill in a terminal.
//!
//! Wires the dictionary, the registry, and the periodic systems onto
//! the crossterm surface: the frame loop, the spawner, and the retirer
//! each run on their own named thread, while the main thread owns the
//! keyboard and the status area. A single stop flag shuts everything
//! down on `q`, `Esc`, or `Ctrl-C`.

mod status;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use derdiedas_core::Stats;
use derdiedas_dictionary::Dictionary;
use derdiedas_registry::Registry;
use derdiedas_surface::{EntitySpec, GlyphColor, Position, Surface};
use derdiedas_surface_term::{
    TermSurface, TermSurfaceConfig, DEFAULT_FRAMES_PER_SECOND, DEFAULT_STATUS_ROWS,
};
use derdiedas_system_retirement::{Config as RetireConfig, Retirement};
use derdiedas_system_spawning::{Config as SpawnConfig, Spawner};
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use self::status::Status;

/// Vocabulary drill: recall the article before the word leaves the screen.
#[derive(Debug, Parser)]
#[command(name = "derdiedas", version)]
struct Args {
    /// Dictionary file, one "article word" pair per line.
    #[arg(long, default_value = "A1Worteliste.txt")]
    dictionary: PathBuf,

    /// Frames rendered per second.
    #[arg(long, default_value_t = DEFAULT_FRAMES_PER_SECOND)]
    fps: u32,

    /// Milliseconds between spawn attempts.
    #[arg(long, default_value_t = 500)]
    spawn_interval_ms: u64,

    /// Milliseconds between timer retirements.
    #[arg(long, default_value_t = 800)]
    retire_interval_ms: u64,

    /// Milliseconds a revealed word lingers before it disappears.
    #[arg(long, default_value_t = 250)]
    grace_ms: u64,

    /// Milliseconds before the retirer starts picking words.
    #[arg(long, default_value_t = 5000)]
    warmup_ms: u64,

    /// Seed for the spawn order; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
}

/// Sleeps for `duration` in short slices so a stop request is honoured
/// promptly. Returns `true` when the stop flag was raised.
fn sleep_unless_stopped(stop: &AtomicBool, duration: Duration) -> bool {
    let deadline = Instant::now() + duration;
    while Instant::now() < deadline {
        if stop.load(Ordering::Relaxed) {
            return true;
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        thread::sleep(Duration::from_millis(50).min(remaining));
    }
    stop.load(Ordering::Relaxed)
}

/// Entry point for the terminal drill.
fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let dictionary = Arc::new(
        Dictionary::load(&args.dictionary)
            .with_context(|| format!("loading dictionary {}", args.dictionary.display()))?,
    );
    let registry = Arc::new(Registry::new());
    let stats = Arc::new(Stats::new());
    let stop = Arc::new(AtomicBool::new(false));
    let seed = args.seed.unwrap_or_else(rand::random);
    info!(
        "starting with {} dictionary entries, seed {seed}",
        dictionary.len()
    );

    let surface = TermSurface::new(TermSurfaceConfig::new(args.fps, DEFAULT_STATUS_ROWS))?;
    let layout = surface.layout();
    let status_row = layout.rows().saturating_sub(layout.status_rows());
    let started = Instant::now();
    let status_entity = surface.create_entity(
        EntitySpec::new(
            Position::new(0, status_row),
            Status::gather(0, dictionary.len(), stats.snapshot(), Duration::ZERO).render(),
        )
        .with_color(GlyphColor::Status),
    );

    let frame_surface = surface.clone();
    let frame_stop = Arc::clone(&stop);
    let frames = thread::Builder::new()
        .name("frames".to_owned())
        .spawn(move || frame_surface.run(&frame_stop))
        .context("spawning the frame thread")?;

    let spawn_surface = surface.clone();
    let spawn_dictionary = Arc::clone(&dictionary);
    let spawn_registry = Arc::clone(&registry);
    let spawn_stats = Arc::clone(&stats);
    let spawn_stop = Arc::clone(&stop);
    let spawn_interval = Duration::from_millis(args.spawn_interval_ms);
    let spawner = thread::Builder::new()
        .name("spawner".to_owned())
        .spawn(move || {
            let mut spawner =
                Spawner::new(ChaCha8Rng::seed_from_u64(seed), SpawnConfig::default());
            while !sleep_unless_stopped(&spawn_stop, spawn_interval) {
                let _ = spawner.spawn_tick(
                    &spawn_dictionary,
                    &spawn_registry,
                    &spawn_surface,
                    &spawn_stats,
                );
            }
        })
        .context("spawning the spawner thread")?;

    let retire_registry = Arc::clone(&registry);
    let retire_stats = Arc::clone(&stats);
    let retire_stop = Arc::clone(&stop);
    let retire_interval = Duration::from_millis(args.retire_interval_ms);
    let warmup = Duration::from_millis(args.warmup_ms);
    let grace = Duration::from_millis(args.grace_ms);
    let retirer = thread::Builder::new()
        .name("retirer".to_owned())
        .spawn(move || {
            // Let a few words build up before any of them resolve.
            if sleep_unless_stopped(&retire_stop, warmup) {
                return;
            }
            let retirement = Retirement::new(RetireConfig::new(grace));
            while !sleep_unless_stopped(&retire_stop, retire_interval) {
                let _ = retirement.retire_random(&retire_registry, &retire_stats);
            }
        })
        .context("spawning the retirer thread")?;

    while !stop.load(Ordering::Relaxed) {
        if event::poll(Duration::from_millis(100)).context("polling keyboard input")? {
            if let Event::Key(key) = event::read().context("reading keyboard input")? {
                if key.kind == KeyEventKind::Press && is_quit(key.code, key.modifiers) {
                    stop.store(true, Ordering::Relaxed);
                }
            }
        }
        status_entity.set_shape(
            Status::gather(
                registry.len(),
                dictionary.len(),
                stats.snapshot(),
                started.elapsed(),
            )
            .render(),
        );
    }

    spawner
        .join()
        .map_err(|_| anyhow!("spawner thread panicked"))?;
    retirer
        .join()
        .map_err(|_| anyhow!("retirer thread panicked"))?;
    frames
        .join()
        .map_err(|_| anyhow!("frame thread panicked"))??;

    let snapshot = stats.snapshot();
    println!(
        "spawned {}, revealed {}, missed {}",
        snapshot.spawned, snapshot.revealed, snapshot.missed
    );
    Ok(())
}

fn is_quit(code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Esc | KeyCode::Char('q') => true,
        KeyCode::Char('c') => modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}
