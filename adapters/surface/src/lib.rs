#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Display-surface contracts consumed by the drill's systems.
//!
//! The surface owns frame pacing and drawing; the systems own what each
//! entity means. An entity is created from an [`EntitySpec`], lives
//! behind a [`WordEntity`] handle shared between the surface's frame
//! loop and the background systems, and moves by answering its
//! per-frame movement callback with a [`Motion`] directive. Terminating
//! an entity twice is a no-op by contract.

use std::sync::Arc;

#[cfg(feature = "stub_surface")]
pub mod stub;

/// Location of an entity on the surface's character grid.
///
/// The column is signed so that a freshly spawned word can sit fully
/// off-screen to the left of column zero. The row never changes after
/// spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    column: i32,
    row: u32,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(column: i32, row: u32) -> Self {
        Self { column, row }
    }

    /// Signed column of the entity's leftmost character.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Row of the entity's first shape line.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// The position one column further to the right.
    #[must_use]
    pub const fn stepped_right(&self) -> Self {
        Self {
            column: self.column + 1,
            row: self.row,
        }
    }
}

/// Drawable text block of one or more lines.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Shape {
    lines: Vec<String>,
}

impl Shape {
    /// Creates a single-line shape.
    #[must_use]
    pub fn from_line<T>(line: T) -> Self
    where
        T: Into<String>,
    {
        Self {
            lines: vec![line.into()],
        }
    }

    /// Creates a multi-line shape, top line first.
    #[must_use]
    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Lines composing the shape.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Width of the widest line measured in character cells.
    #[must_use]
    pub fn columns(&self) -> u32 {
        self.lines
            .iter()
            .map(|line| line.chars().count() as u32)
            .max()
            .unwrap_or(0)
    }
}

/// Named color role applied to an entity's text.
///
/// The surface backend maps roles to concrete terminal colors; the
/// systems only state intent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GlyphColor {
    /// A word still advancing, article concealed.
    Plain,
    /// A resolved word shown with its article during the grace delay.
    Revealed,
    /// A word that reached the boundary unresolved.
    Missed,
    /// The status area.
    Status,
}

/// Directive returned by a movement callback for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Motion {
    /// Move to the provided position.
    Glide(Position),
    /// Keep the current position this frame.
    Hold,
    /// The entity's journey is over; the surface removes it.
    Expire,
}

/// Per-frame movement callback attached to an entity.
pub type MovementFn = Box<dyn FnMut(Position) -> Motion + Send>;

/// Hook invoked once when the surface itself expires an entity that
/// left the visible bounds with the die-offscreen flag set.
pub type ExpiryFn = Box<dyn FnOnce() + Send>;

/// Handle to one visual entity, shared between the surface's frame loop
/// and the background systems.
pub trait WordEntity: Send + Sync {
    /// Replaces the entity's drawable shape.
    fn set_shape(&self, shape: Shape);

    /// Changes the entity's color role.
    fn set_color(&self, color: GlyphColor);

    /// Terminates the entity. Idempotent; the surface drops its
    /// bookkeeping on the next frame.
    fn kill(&self);

    /// Current position of the entity.
    fn position(&self) -> Position;
}

/// Shared ownership of an entity handle.
pub type SharedEntity = Arc<dyn WordEntity>;

/// Everything the surface needs to create one entity.
pub struct EntitySpec {
    /// Initial position of the entity.
    pub position: Position,
    /// Initial drawable shape.
    pub shape: Shape,
    /// Initial color role.
    pub color: GlyphColor,
    /// Whether the surface should expire the entity once it leaves the
    /// visible bounds to the right.
    pub die_offscreen: bool,
    /// Movement callback invoked once per frame, if any.
    pub movement: Option<MovementFn>,
    /// Hook fired when the die-offscreen flag triggers, if any.
    pub on_expire: Option<ExpiryFn>,
}

impl EntitySpec {
    /// Creates a plain, static entity spec.
    #[must_use]
    pub fn new(position: Position, shape: Shape) -> Self {
        Self {
            position,
            shape,
            color: GlyphColor::Plain,
            die_offscreen: false,
            movement: None,
            on_expire: None,
        }
    }

    /// Sets the initial color role.
    #[must_use]
    pub fn with_color(mut self, color: GlyphColor) -> Self {
        self.color = color;
        self
    }

    /// Attaches a per-frame movement callback.
    #[must_use]
    pub fn with_movement<F>(mut self, movement: F) -> Self
    where
        F: FnMut(Position) -> Motion + Send + 'static,
    {
        self.movement = Some(Box::new(movement));
        self
    }

    /// Attaches the offscreen expiry hook.
    #[must_use]
    pub fn with_expiry<F>(mut self, on_expire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_expire = Some(Box::new(on_expire));
        self
    }

    /// Requests expiry once the entity leaves the visible bounds.
    #[must_use]
    pub fn die_offscreen(mut self) -> Self {
        self.die_offscreen = true;
        self
    }
}

/// Character-grid dimensions of the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceLayout {
    columns: u32,
    rows: u32,
    status_rows: u32,
}

impl SurfaceLayout {
    /// Creates a new layout descriptor.
    #[must_use]
    pub const fn new(columns: u32, rows: u32, status_rows: u32) -> Self {
        Self {
            columns,
            rows,
            status_rows,
        }
    }

    /// Total columns of the surface.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Total rows of the surface.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Rows reserved at the bottom for the status area.
    #[must_use]
    pub const fn status_rows(&self) -> u32 {
        self.status_rows
    }

    /// Rows available for scrolling words: everything above the status
    /// area, minus one spare row.
    #[must_use]
    pub const fn word_rows(&self) -> u32 {
        self.rows.saturating_sub(self.status_rows + 1)
    }

    /// Rightmost column budget available to a scrolling word.
    #[must_use]
    pub const fn right_bound(&self) -> u32 {
        self.columns
    }
}

/// Display surface capable of hosting word entities.
pub trait Surface {
    /// Creates a new entity and returns its shared handle.
    ///
    /// Implementations must not invoke the [`EntitySpec`] closures
    /// during creation, so callers may hold no particular locks.
    fn create_entity(&self, spec: EntitySpec) -> SharedEntity;

    /// Current character-grid layout of the surface.
    fn layout(&self) -> SurfaceLayout;
}
