#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Crossterm-backed display surface.
//!
//! Owns the entity collection and the frame loop: once per frame every
//! live entity's movement callback is consulted, its motion directive
//! applied, the die-offscreen flag honoured, dead entities dropped, and
//! the scene redrawn. Callbacks are invoked with no surface collection
//! lock held, so a callback is free to call back into entity handles or
//! the word registry.
//!
//! The surface's collection lock and the registry lock are distinct;
//! the lock discipline across the program is that the registry lock is
//! never held while calling into this crate.

mod screen;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::terminal;
use derdiedas_surface::{
    EntitySpec, ExpiryFn, GlyphColor, Motion, MovementFn, Position, Shape, SharedEntity, Surface,
    SurfaceLayout, WordEntity,
};

use self::screen::Screen;

/// Frame rate applied when no explicit configuration is given.
pub const DEFAULT_FRAMES_PER_SECOND: u32 = 10;

/// Rows reserved for the status area by default.
pub const DEFAULT_STATUS_ROWS: u32 = 4;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Configuration for the terminal surface.
#[derive(Clone, Copy, Debug)]
pub struct TermSurfaceConfig {
    frames_per_second: u32,
    status_rows: u32,
}

impl TermSurfaceConfig {
    /// Creates a configuration with the provided frame rate and status
    /// area height.
    #[must_use]
    pub const fn new(frames_per_second: u32, status_rows: u32) -> Self {
        Self {
            frames_per_second,
            status_rows,
        }
    }

    /// Frames rendered per second by [`TermSurface::run`].
    #[must_use]
    pub const fn frames_per_second(&self) -> u32 {
        self.frames_per_second
    }

    /// Rows reserved at the bottom of the layout.
    #[must_use]
    pub const fn status_rows(&self) -> u32 {
        self.status_rows
    }

    /// Target duration of a single frame.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.frames_per_second.max(1)))
    }
}

impl Default for TermSurfaceConfig {
    fn default() -> Self {
        Self::new(DEFAULT_FRAMES_PER_SECOND, DEFAULT_STATUS_ROWS)
    }
}

struct EntityState {
    position: Position,
    shape: Shape,
    color: GlyphColor,
    alive: bool,
}

/// Entity handle backed by the terminal surface.
pub struct TermEntity {
    state: Mutex<EntityState>,
}

impl TermEntity {
    fn new(position: Position, shape: Shape, color: GlyphColor) -> Self {
        Self {
            state: Mutex::new(EntityState {
                position,
                shape,
                color,
                alive: true,
            }),
        }
    }

    fn is_alive(&self) -> bool {
        lock(&self.state).alive
    }

    fn set_position(&self, position: Position) {
        lock(&self.state).position = position;
    }

    fn snapshot(&self) -> (Position, Shape, GlyphColor) {
        let state = lock(&self.state);
        (state.position, state.shape.clone(), state.color)
    }
}

impl WordEntity for TermEntity {
    fn set_shape(&self, shape: Shape) {
        lock(&self.state).shape = shape;
    }

    fn set_color(&self, color: GlyphColor) {
        lock(&self.state).color = color;
    }

    fn kill(&self) {
        lock(&self.state).alive = false;
    }

    fn position(&self) -> Position {
        lock(&self.state).position
    }
}

struct EntityRecord {
    handle: Arc<TermEntity>,
    movement: Option<Mutex<MovementFn>>,
    on_expire: Mutex<Option<ExpiryFn>>,
    die_offscreen: bool,
}

struct Inner {
    entities: Mutex<Vec<Arc<EntityRecord>>>,
    layout: SurfaceLayout,
    config: TermSurfaceConfig,
}

/// Terminal display surface. Cheap to clone; clones share the entity
/// collection, so background threads can create entities while the
/// frame loop runs elsewhere.
#[derive(Clone)]
pub struct TermSurface {
    inner: Arc<Inner>,
}

impl TermSurface {
    /// Creates a surface sized to the current terminal.
    pub fn new(config: TermSurfaceConfig) -> Result<Self> {
        let (columns, rows) = terminal::size().context("querying terminal size")?;
        Ok(Self::with_layout(
            config,
            SurfaceLayout::new(u32::from(columns), u32::from(rows), config.status_rows()),
        ))
    }

    /// Creates a surface with an explicit layout. Used headless; no
    /// terminal is touched until [`TermSurface::run`].
    #[must_use]
    pub fn with_layout(config: TermSurfaceConfig, layout: SurfaceLayout) -> Self {
        Self {
            inner: Arc::new(Inner {
                entities: Mutex::new(Vec::new()),
                layout,
                config,
            }),
        }
    }

    /// Runs the frame loop on the calling thread until `stop` is set.
    ///
    /// Enters raw mode and the alternate screen for the duration of the
    /// run; both are restored on return, including the error path.
    pub fn run(&self, stop: &AtomicBool) -> Result<()> {
        let mut screen = Screen::enter()?;
        let interval = self.inner.config.frame_interval();

        while !stop.load(Ordering::Relaxed) {
            let frame_started = Instant::now();
            self.advance_frame();
            screen.draw(self.inner.layout, &self.visible_entities())?;
            if let Some(remaining) = interval.checked_sub(frame_started.elapsed()) {
                thread::sleep(remaining);
            }
        }
        Ok(())
    }

    /// Advances every live entity by one frame without drawing.
    ///
    /// Dead entities are dropped from the collection first, movement
    /// callbacks are invoked with no collection lock held, and the
    /// die-offscreen flag fires each entity's expiry hook at most once.
    pub fn advance_frame(&self) {
        let records: Vec<Arc<EntityRecord>> = {
            let mut entities = lock(&self.inner.entities);
            entities.retain(|record| record.handle.is_alive());
            entities.iter().map(Arc::clone).collect()
        };

        for record in records {
            if let Some(movement) = &record.movement {
                let position = record.handle.position();
                let motion = {
                    let mut callback = lock(movement);
                    callback(position)
                };
                match motion {
                    Motion::Glide(next) => record.handle.set_position(next),
                    Motion::Hold => {}
                    Motion::Expire => record.handle.kill(),
                }
            }

            if record.die_offscreen {
                let position = record.handle.position();
                if position.column() >= self.inner.layout.columns() as i32 {
                    if let Some(hook) = lock(&record.on_expire).take() {
                        hook();
                    }
                    record.handle.kill();
                }
            }
        }
    }

    /// Number of live entities, for diagnostics and tests.
    #[must_use]
    pub fn live_entities(&self) -> usize {
        lock(&self.inner.entities)
            .iter()
            .filter(|record| record.handle.is_alive())
            .count()
    }

    fn visible_entities(&self) -> Vec<(Position, Shape, GlyphColor)> {
        lock(&self.inner.entities)
            .iter()
            .filter(|record| record.handle.is_alive())
            .map(|record| record.handle.snapshot())
            .collect()
    }
}

impl Surface for TermSurface {
    fn create_entity(&self, spec: EntitySpec) -> SharedEntity {
        let handle = Arc::new(TermEntity::new(spec.position, spec.shape, spec.color));
        let record = Arc::new(EntityRecord {
            handle: Arc::clone(&handle),
            movement: spec.movement.map(Mutex::new),
            on_expire: Mutex::new(spec.on_expire),
            die_offscreen: spec.die_offscreen,
        });
        lock(&self.inner.entities).push(record);
        handle
    }

    fn layout(&self) -> SurfaceLayout {
        self.inner.layout
    }
}
