use std::cell::Cell;

use crate::surface::SurfaceSize;

/// Most recent pointer sample, in logical surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pointer {
    pub x: f64,
    pub y: f64,
    /// `false` until the pointer enters the surface, and again after it leaves.
    pub active: bool,
}

impl Pointer {
    pub fn at(x: f64, y: f64) -> Self {
        Self { x, y, active: true }
    }

    pub fn position(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    /// Position relative to the surface centre, each axis in `[-0.5, 0.5]`
    /// while the pointer is over the surface.
    pub fn normalized(&self, size: SurfaceSize) -> [f64; 2] {
        if size.is_empty() {
            return [0.0, 0.0];
        }
        [self.x / size.width - 0.5, self.y / size.height - 0.5]
    }
}

/// Input written by host listeners and read once per tick.
///
/// Listeners and the tick run on the same thread, so plain `Cell`s suffice.
/// The pointer is replaced as a whole record on every write.
#[derive(Debug, Default)]
pub struct SharedInput {
    pointer: Cell<Pointer>,
    scroll: Cell<f64>,
    resize: Cell<Option<SurfaceSize>>,
}

impl SharedInput {
    pub fn set_pointer(&self, pointer: Pointer) {
        self.pointer.set(pointer);
    }

    /// Marks the pointer inactive, keeping its last position.
    pub fn pointer_left(&self) {
        let last = self.pointer.get();
        self.pointer.set(Pointer {
            active: false,
            ..last
        });
    }

    pub fn set_scroll(&self, offset: f64) {
        self.scroll.set(if offset.is_finite() { offset } else { 0.0 });
    }

    /// Records a resize; only the latest one before a tick is applied.
    pub fn request_resize(&self, size: SurfaceSize) {
        self.resize.set(Some(size));
    }

    pub fn take_resize(&self) -> Option<SurfaceSize> {
        self.resize.take()
    }

    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            pointer: self.pointer.get(),
            scroll: self.scroll.get(),
        }
    }
}

/// Per-frame copy of the shared input.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputSnapshot {
    pub pointer: Pointer,
    /// Vertical scroll offset of the host, in logical pixels.
    pub scroll: f64,
}

/// Current rotation angles, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rotation {
    /// Current rotation angle around the X-axis
    pub x: f64,
    /// Current rotation angle around the Y-axis
    pub y: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaving_keeps_last_position() {
        let input = SharedInput::default();
        input.set_pointer(Pointer::at(10.0, 20.0));
        input.pointer_left();
        let pointer = input.snapshot().pointer;
        assert!(!pointer.active);
        assert_eq!(pointer.position(), [10.0, 20.0]);
    }

    #[test]
    fn resize_is_consumed_once() {
        let input = SharedInput::default();
        input.request_resize(SurfaceSize::new(1.0, 1.0));
        input.request_resize(SurfaceSize::new(2.0, 2.0));
        assert_eq!(input.take_resize(), Some(SurfaceSize::new(2.0, 2.0)));
        assert_eq!(input.take_resize(), None);
    }

    #[test]
    fn normalized_pointer_is_centred() {
        let size = SurfaceSize::new(200.0, 100.0);
        assert_eq!(Pointer::at(100.0, 50.0).normalized(size), [0.0, 0.0]);
        assert_eq!(Pointer::at(0.0, 100.0).normalized(size), [-0.5, 0.5]);
        assert_eq!(Pointer::at(5.0, 5.0).normalized(SurfaceSize::new(0.0, 0.0)), [0.0, 0.0]);
    }
}
