//! Tunable constants for each scene.
//!
//! Defaults give each animation its stock look.

use std::path::PathBuf;

use clap::ValueEnum;

use crate::physics::Motion;
use crate::surface::Rgba;

/// Which animation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SceneKind {
    /// Free-floating particles joined by faint lines.
    #[default]
    Particles,
    /// Jittered dot grid whose links fade in with scroll.
    Circuit,
    /// Handset mock surrounded by floating app icons.
    Phone,
    /// Rotating wireframe cube.
    Cube,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticleConfig {
    pub count: usize,
    pub motion: Motion,
    /// Added to the scene clock every tick.
    pub time_step: f64,
    /// Amplitude of the idle float around each anchor.
    pub drift: f64,
    pub link_distance: f64,
    /// Line alpha at zero distance.
    pub link_alpha: f64,
    pub color: Rgba,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 100,
            motion: Motion {
                repulsion_radius: 120.0,
                repulsion_strength: 2.0,
                spring: 0.02,
                friction: 0.95,
            },
            time_step: 0.005,
            drift: 0.3,
            link_distance: 120.0,
            link_alpha: 0.3,
            color: Rgba::AMBER,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CircuitConfig {
    /// Distance between grid nodes.
    pub spacing: f64,
    /// Total jitter span; each node moves by up to half of it per axis.
    pub jitter: f64,
    pub motion: Motion,
    pub time_step: f64,
    pub link_distance: f64,
    pub link_alpha: f64,
    /// Scroll offset at which links start to appear.
    pub fade_start: f64,
    /// Scroll distance over which links go from hidden to fully visible.
    pub fade_distance: f64,
    pub color: Rgba,
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self {
            spacing: 60.0,
            jitter: 15.0,
            motion: Motion {
                repulsion_radius: 120.0,
                repulsion_strength: 4.0,
                spring: 0.08,
                friction: 0.8,
            },
            time_step: 0.02,
            link_distance: 80.0,
            link_alpha: 0.15,
            fade_start: 0.0,
            fade_distance: 200.0,
            color: Rgba::AMBER,
        }
    }
}

/// One floating icon: its accent colour and an optional image file.
#[derive(Debug, Clone, PartialEq)]
pub struct IconSpec {
    pub color: Rgba,
    pub source: Option<PathBuf>,
}

impl IconSpec {
    pub fn new(color: Rgba) -> Self {
        Self {
            color,
            source: None,
        }
    }
}

/// Accent colours of the seven showcased apps.
pub const DEFAULT_ICON_COLORS: [Rgba; 7] = [
    Rgba::rgb(0xFF, 0x45, 0x00),
    Rgba::rgb(0x6B, 0x8E, 0x23),
    Rgba::rgb(0x1A, 0x1A, 0x1A),
    Rgba::rgb(0xF5, 0x9E, 0x0B),
    Rgba::rgb(0x8B, 0x45, 0x13),
    Rgba::rgb(0x00, 0xCE, 0xD1),
    Rgba::rgb(0xDC, 0x14, 0x3C),
];

#[derive(Debug, Clone, PartialEq)]
pub struct PhoneConfig {
    pub catalog: Vec<IconSpec>,
    pub motion: Motion,
    pub fov: f64,
    /// Icon depth is clamped to `±fov * depth_limit`.
    pub depth_limit: f64,
    pub time_step: f64,
    /// Easing factor of the tilt toward the pointer.
    pub tilt_ease: f64,
    /// Surfaces at least this wide get the enlarged layout.
    pub large_width: f64,
    pub large_scale: f64,
}

impl PhoneConfig {
    /// Assigns image files to catalog entries in order; extra files are
    /// ignored.
    pub fn with_sources(mut self, sources: impl IntoIterator<Item = PathBuf>) -> Self {
        for (spec, source) in self.catalog.iter_mut().zip(sources) {
            spec.source = Some(source);
        }
        self
    }
}

impl Default for PhoneConfig {
    fn default() -> Self {
        Self {
            catalog: DEFAULT_ICON_COLORS.iter().copied().map(IconSpec::new).collect(),
            motion: Motion {
                repulsion_radius: 100.0,
                repulsion_strength: 3.0,
                spring: 0.03,
                friction: 0.92,
            },
            fov: 400.0,
            depth_limit: 0.5,
            time_step: 0.02,
            tilt_ease: 0.05,
            large_width: 900.0,
            large_scale: 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CubeConfig {
    pub fov: f64,
    /// Cube half-extent as a fraction of the shorter surface side.
    pub size_fraction: f64,
    /// Idle rotation per tick around X and Y, in radians.
    pub idle_rate: [f64; 2],
    pub hover_ease: f64,
    /// Target angle per unit of normalised pointer offset.
    pub hover_gain: f64,
    pub edge_width: f64,
    pub vertex_radius: f64,
    pub edge_color: Rgba,
    pub vertex_color: Rgba,
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            fov: 4.0,
            size_fraction: 0.25,
            idle_rate: [0.005, 0.01],
            hover_ease: 0.1,
            hover_gain: 2.0,
            edge_width: 2.0,
            vertex_radius: 4.0,
            edge_color: Rgba::AMBER.with_alpha(0.8),
            vertex_color: Rgba::AMBER,
        }
    }
}
