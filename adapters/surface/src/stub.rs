//! Recording surface used by system tests.
//!
//! Behaves like a real surface minus the frame loop and drawing: tests
//! drive individual entities by hand and inspect what the systems did
//! to them.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    EntitySpec, ExpiryFn, GlyphColor, Motion, MovementFn, Position, Shape, SharedEntity, Surface,
    SurfaceLayout, WordEntity,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
struct StubState {
    position: Position,
    shape: Shape,
    color: GlyphColor,
    killed: bool,
}

/// Entity recorded by the [`StubSurface`].
pub struct StubEntity {
    state: Mutex<StubState>,
    movement: Mutex<Option<MovementFn>>,
    on_expire: Mutex<Option<ExpiryFn>>,
    die_offscreen: bool,
}

impl StubEntity {
    fn from_spec(spec: EntitySpec) -> Self {
        Self {
            state: Mutex::new(StubState {
                position: spec.position,
                shape: spec.shape,
                color: spec.color,
                killed: false,
            }),
            movement: Mutex::new(spec.movement),
            on_expire: Mutex::new(spec.on_expire),
            die_offscreen: spec.die_offscreen,
        }
    }

    /// Current shape of the entity.
    #[must_use]
    pub fn shape(&self) -> Shape {
        lock(&self.state).shape.clone()
    }

    /// Current color role of the entity.
    #[must_use]
    pub fn color(&self) -> GlyphColor {
        lock(&self.state).color
    }

    /// Whether the entity has been terminated.
    #[must_use]
    pub fn is_killed(&self) -> bool {
        lock(&self.state).killed
    }

    /// Whether the entity asked to die when leaving the visible bounds.
    #[must_use]
    pub fn dies_offscreen(&self) -> bool {
        self.die_offscreen
    }

    /// Invokes the movement callback once, applies the directive the
    /// way a frame loop would, and returns it for inspection.
    ///
    /// Returns `None` when the entity carries no movement callback.
    pub fn drive(&self) -> Option<Motion> {
        let position = self.position();
        let motion = {
            let mut movement = lock(&self.movement);
            let callback = movement.as_mut()?;
            callback(position)
        };
        match motion {
            Motion::Glide(next) => lock(&self.state).position = next,
            Motion::Hold => {}
            Motion::Expire => self.kill(),
        }
        Some(motion)
    }

    /// Fires the offscreen expiry hook, at most once.
    pub fn expire(&self) {
        if let Some(hook) = lock(&self.on_expire).take() {
            hook();
        }
        self.kill();
    }
}

impl WordEntity for StubEntity {
    fn set_shape(&self, shape: Shape) {
        lock(&self.state).shape = shape;
    }

    fn set_color(&self, color: GlyphColor) {
        lock(&self.state).color = color;
    }

    fn kill(&self) {
        lock(&self.state).killed = true;
    }

    fn position(&self) -> Position {
        lock(&self.state).position
    }
}

/// Surface that records every created entity for later inspection.
pub struct StubSurface {
    layout: SurfaceLayout,
    entities: Mutex<Vec<Arc<StubEntity>>>,
}

impl StubSurface {
    /// Creates a stub surface with the provided layout.
    #[must_use]
    pub fn new(layout: SurfaceLayout) -> Self {
        Self {
            layout,
            entities: Mutex::new(Vec::new()),
        }
    }

    /// Every entity created so far, oldest first.
    #[must_use]
    pub fn entities(&self) -> Vec<Arc<StubEntity>> {
        lock(&self.entities).clone()
    }

    /// The most recently created entity.
    #[must_use]
    pub fn last(&self) -> Option<Arc<StubEntity>> {
        lock(&self.entities).last().cloned()
    }
}

impl Surface for StubSurface {
    fn create_entity(&self, spec: EntitySpec) -> SharedEntity {
        let entity = Arc::new(StubEntity::from_spec(spec));
        lock(&self.entities).push(Arc::clone(&entity));
        entity
    }

    fn layout(&self) -> SurfaceLayout {
        self.layout
    }
}
