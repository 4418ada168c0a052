//! The drawing surface every scene renders onto.
//!
//! Coordinates passed to a [`DrawSurface`] are logical pixels. Implementations
//! map them onto device pixels using [`SurfaceSize::pixel_ratio`].

use crate::sprite::Sprite;

/// Straight (non-premultiplied) colour with a fractional alpha, CSS style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0.0);
    /// The amber accent used by every scene.
    pub const AMBER: Rgba = Rgba::new(234, 179, 8, 1.0);

    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Same colour with its alpha replaced (clamped to `[0, 1]`).
    pub fn with_alpha(self, a: f64) -> Self {
        let a = if a.is_nan() { 0.0 } else { a.clamp(0.0, 1.0) };
        Self { a, ..self }
    }

    pub fn is_visible(&self) -> bool {
        self.a > 0.0
    }
}

/// Logical dimensions of a surface plus its device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
}

impl SurfaceSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_pixel_ratio(width, height, 1.0)
    }

    /// Negative or non-finite dimensions collapse to zero and a non-positive
    /// ratio falls back to 1.
    pub fn with_pixel_ratio(width: f64, height: f64, pixel_ratio: f64) -> Self {
        let sanitize = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        let pixel_ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio
        } else {
            1.0
        };
        Self {
            width: sanitize(width),
            height: sanitize(height),
            pixel_ratio,
        }
    }

    pub fn center(&self) -> [f64; 2] {
        [self.width / 2.0, self.height / 2.0]
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Device pixel dimensions, rounded up.
    pub fn device_pixels(&self) -> (usize, usize) {
        (
            (self.width * self.pixel_ratio).ceil() as usize,
            (self.height * self.pixel_ratio).ceil() as usize,
        )
    }
}

/// Immediate-mode 2D drawing target.
///
/// Every call must tolerate degenerate input (empty polygons, zero radius,
/// off-surface coordinates) by drawing nothing.
pub trait DrawSurface {
    fn size(&self) -> SurfaceSize;

    /// Adopts a new logical size, discarding the current contents.
    fn resize(&mut self, size: SurfaceSize);

    fn clear(&mut self);

    fn fill_circle(&mut self, center: [f64; 2], radius: f64, color: Rgba);

    fn stroke_line(&mut self, from: [f64; 2], to: [f64; 2], width: f64, color: Rgba);

    fn fill_polygon(&mut self, points: &[[f64; 2]], color: Rgba);

    /// Strokes the closed outline through `points`.
    fn stroke_polygon(&mut self, points: &[[f64; 2]], width: f64, color: Rgba) {
        if points.len() < 2 {
            return;
        }
        for (i, &from) in points.iter().enumerate() {
            let to = points[(i + 1) % points.len()];
            self.stroke_line(from, to, width, color);
        }
    }

    /// Blits `sprite` scaled into the box at `origin` with size `extent`.
    fn draw_sprite(&mut self, sprite: &Sprite, origin: [f64; 2], extent: [f64; 2]);
}

/// Outline of a rounded rectangle, corners approximated with short arcs.
pub fn rounded_rect(origin: [f64; 2], extent: [f64; 2], radius: f64) -> Vec<[f64; 2]> {
    const CORNER_STEPS: usize = 6;

    let [x, y] = origin;
    let [w, h] = extent;
    if w <= 0.0 || h <= 0.0 {
        return Vec::new();
    }
    let r = radius.max(0.0).min(w / 2.0).min(h / 2.0);
    if r == 0.0 {
        return vec![[x, y], [x + w, y], [x + w, y + h], [x, y + h]];
    }

    let corners = [
        ([x + w - r, y + r], -std::f64::consts::FRAC_PI_2),
        ([x + w - r, y + h - r], 0.0),
        ([x + r, y + h - r], std::f64::consts::FRAC_PI_2),
        ([x + r, y + r], std::f64::consts::PI),
    ];
    let mut points = Vec::with_capacity(corners.len() * (CORNER_STEPS + 1));
    for ([cx, cy], start) in corners {
        for step in 0..=CORNER_STEPS {
            let angle = start + std::f64::consts::FRAC_PI_2 * step as f64 / CORNER_STEPS as f64;
            points.push([cx + angle.cos() * r, cy + angle.sin() * r]);
        }
    }
    points
}

/// Applies the affine map `(x, y) -> (x + skew_x * y, y + skew_y * x) + offset`.
pub fn skew(points: &mut [[f64; 2]], skew_x: f64, skew_y: f64, offset: [f64; 2]) {
    for p in points.iter_mut() {
        let [x, y] = *p;
        *p = [x + skew_x * y + offset[0], skew_y * x + y + offset[1]];
    }
}

/// A single recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Circle {
        center: [f64; 2],
        radius: f64,
        color: Rgba,
    },
    Line {
        from: [f64; 2],
        to: [f64; 2],
        width: f64,
        color: Rgba,
    },
    Polygon {
        points: Vec<[f64; 2]>,
        color: Rgba,
    },
    Sprite {
        origin: [f64; 2],
        extent: [f64; 2],
    },
}

/// Surface that records draw calls instead of rasterising them.
#[derive(Debug, Clone)]
pub struct Recorder {
    size: SurfaceSize,
    commands: Vec<DrawCommand>,
}

impl Recorder {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drains the recorded commands.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn lines(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
    }

    pub fn circles(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
    }

    pub fn sprites(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Sprite { .. }))
    }
}

impl DrawSurface for Recorder {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
        self.commands.clear();
    }

    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn fill_circle(&mut self, center: [f64; 2], radius: f64, color: Rgba) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn stroke_line(&mut self, from: [f64; 2], to: [f64; 2], width: f64, color: Rgba) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
        });
    }

    fn fill_polygon(&mut self, points: &[[f64; 2]], color: Rgba) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            color,
        });
    }

    fn draw_sprite(&mut self, _sprite: &Sprite, origin: [f64; 2], extent: [f64; 2]) {
        self.commands.push(DrawCommand::Sprite { origin, extent });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounded_rect_stays_inside_its_box() {
        let outline = rounded_rect([10.0, 20.0], [100.0, 50.0], 12.0);
        assert!(!outline.is_empty());
        for [x, y] in outline {
            assert!((10.0 - 1e-9..=110.0 + 1e-9).contains(&x));
            assert!((20.0 - 1e-9..=70.0 + 1e-9).contains(&y));
        }
    }

    #[test]
    fn degenerate_rounded_rect_is_empty() {
        assert!(rounded_rect([0.0, 0.0], [0.0, 10.0], 4.0).is_empty());
    }

    #[test]
    fn skew_without_shear_only_translates() {
        let mut points = vec![[1.0, 2.0], [-3.0, 4.0]];
        skew(&mut points, 0.0, 0.0, [10.0, 10.0]);
        assert_eq!(points, vec![[11.0, 12.0], [7.0, 14.0]]);
    }

    #[test]
    fn size_sanitizes_garbage() {
        let size = SurfaceSize::with_pixel_ratio(-5.0, f64::NAN, 0.0);
        assert_eq!(size.width, 0.0);
        assert_eq!(size.height, 0.0);
        assert_eq!(size.pixel_ratio, 1.0);
        assert!(size.is_empty());
    }

    #[test]
    fn with_alpha_clamps() {
        assert_eq!(Rgba::AMBER.with_alpha(3.0).a, 1.0);
        assert_eq!(Rgba::AMBER.with_alpha(-1.0).a, 0.0);
        assert_eq!(Rgba::AMBER.with_alpha(f64::NAN).a, 0.0);
    }
}
