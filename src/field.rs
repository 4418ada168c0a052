//! Entity sets and the initializers that lay them out on a surface.
//!
//! Every initializer takes its randomness from the caller so layouts are
//! reproducible under a seeded generator. Anchors always lie inside
//! `[0, width] x [0, height]`.

use std::f64::consts::TAU;

use rand::{Rng, RngCore};

use crate::config::PhoneConfig;
use crate::physics::Body;
use crate::sprite::Sprite;
use crate::surface::{Rgba, SurfaceSize};

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub body: Body,
    pub size: f64,
    pub opacity: f64,
    /// Offset into the idle float cycle.
    pub phase: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dot {
    pub body: Body,
    pub size: f64,
    pub pulse_phase: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FloatingIcon {
    pub body: Body,
    pub size: f64,
    pub color: Rgba,
    pub phase: f64,
    /// Multiplier on the scene clock for this icon's float cycle.
    pub speed: f64,
    /// Catalog index, also the sprite loader slot.
    pub slot: usize,
    /// Filled in once the sprite load completes.
    pub sprite: Option<Sprite>,
}

impl FloatingIcon {
    pub fn is_ready(&self) -> bool {
        self.sprite.is_some()
    }
}

/// Places `count` particles uniformly over the surface.
pub fn scatter_particles(size: SurfaceSize, count: usize, rng: &mut dyn RngCore) -> Vec<Particle> {
    (0..count)
        .map(|_| {
            let x = rng.gen::<f64>() * size.width;
            let y = rng.gen::<f64>() * size.height;
            Particle {
                body: Body::at([x, y, 0.0]),
                size: rng.gen::<f64>() * 3.0 + 1.5,
                opacity: rng.gen::<f64>() * 0.5 + 0.3,
                phase: rng.gen::<f64>() * TAU,
            }
        })
        .collect()
}

/// One dot per grid node, each nudged by up to `jitter / 2` per axis.
///
/// The grid has `ceil(width / spacing) + 1` columns and the matching number
/// of rows, so the last column reaches the right edge. Jittered positions
/// are clamped back onto the surface.
pub fn jittered_grid(
    size: SurfaceSize,
    spacing: f64,
    jitter: f64,
    rng: &mut dyn RngCore,
) -> Vec<Dot> {
    if !(spacing.is_finite() && spacing > 0.0) {
        return Vec::new();
    }
    let cols = (size.width / spacing).ceil() as usize + 1;
    let rows = (size.height / spacing).ceil() as usize + 1;

    let mut dots = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        for col in 0..cols {
            let x = col as f64 * spacing + (rng.gen::<f64>() - 0.5) * jitter;
            let y = row as f64 * spacing + (rng.gen::<f64>() - 0.5) * jitter;
            let (x, y) = (x.clamp(0.0, size.width), y.clamp(0.0, size.height));
            dots.push(Dot {
                body: Body::at([x, y, 0.0]),
                pulse_phase: rng.gen::<f64>() * TAU,
                size: rng.gen::<f64>() * 2.0 + 2.0,
            });
        }
    }
    dots
}

/// One icon per catalog entry, spread over a flattened ring around the
/// surface centre with a little depth jitter.
pub fn icon_ring(
    size: SurfaceSize,
    config: &PhoneConfig,
    rng: &mut dyn RngCore,
) -> Vec<FloatingIcon> {
    let [cx, cy] = size.center();
    let scale = if size.width >= config.large_width {
        config.large_scale
    } else {
        1.0
    };
    let radius = (80.0 + rng.gen::<f64>() * 40.0) * scale;
    let icon_size = (40.0 + rng.gen::<f64>() * 12.0) * scale;
    let count = config.catalog.len();

    config
        .catalog
        .iter()
        .enumerate()
        .map(|(slot, spec)| {
            let angle = slot as f64 / count as f64 * TAU;
            let x = (cx + angle.cos() * radius).clamp(0.0, size.width);
            let y = (cy + angle.sin() * radius * 0.6 - 30.0).clamp(0.0, size.height);
            let z = rng.gen::<f64>() * 100.0 - 50.0;
            FloatingIcon {
                body: Body::at([x, y, z]),
                size: icon_size,
                color: spec.color,
                phase: rng.gen::<f64>() * TAU,
                speed: 0.5 + rng.gen::<f64>() * 0.5,
                slot,
                sprite: None,
            }
        })
        .collect()
}
