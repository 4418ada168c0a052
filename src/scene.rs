//! The contract between the render loop and an animation.

use rand::RngCore;

use crate::state::InputSnapshot;
use crate::surface::{DrawSurface, SurfaceSize};

/// A self-contained animation driven by the render loop.
///
/// The loop calls `layout` once at start and again after every resize,
/// then `update` followed by `render` once per frame.
pub trait Scene {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Replaces every entity with a fresh set sized to `size`.
    fn layout(&mut self, size: SurfaceSize, rng: &mut dyn RngCore);

    /// Advances the simulation by one frame.
    fn update(&mut self, input: &InputSnapshot);

    /// Draws the current state. The surface has already been cleared.
    fn render(&self, surface: &mut dyn DrawSurface);

    /// Number of live entities.
    fn entity_count(&self) -> usize;
}

impl<S: Scene + ?Sized> Scene for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn layout(&mut self, size: SurfaceSize, rng: &mut dyn RngCore) {
        (**self).layout(size, rng)
    }

    fn update(&mut self, input: &InputSnapshot) {
        (**self).update(input)
    }

    fn render(&self, surface: &mut dyn DrawSurface) {
        (**self).render(surface)
    }

    fn entity_count(&self) -> usize {
        (**self).entity_count()
    }
}
