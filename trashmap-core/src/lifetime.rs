//! Liveness flag shared between a surface and its pending effects.

use std::cell::Cell;
use std::rc::Rc;

/// Cloneable flag cleared when the owning surface is torn down.
///
/// Asynchronous effects check [`Lifetime::is_alive`] after every suspension
/// point and drop their result once the surface is gone.
///
/// # Examples
/// ```
/// use trashmap_core::Lifetime;
///
/// let lifetime = Lifetime::new();
/// let effect = lifetime.clone();
/// lifetime.end();
/// assert!(!effect.is_alive());
/// ```
#[derive(Debug, Clone)]
pub struct Lifetime {
    alive: Rc<Cell<bool>>,
}

impl Lifetime {
    /// Start a new, live lifetime.
    pub fn new() -> Self {
        Self {
            alive: Rc::new(Cell::new(true)),
        }
    }

    /// Whether the surface is still mounted.
    pub fn is_alive(&self) -> bool {
        self.alive.get()
    }

    /// Mark the surface as disposed. Idempotent.
    pub fn end(&self) {
        self.alive.set(false);
    }
}

impl Default for Lifetime {
    fn default() -> Self {
        Self::new()
    }
}
