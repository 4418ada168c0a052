use rand::RngCore;
use tracing::debug;

use crate::config::CircuitConfig;
use crate::field::{jittered_grid, Dot};
use crate::math::{distance, link_opacity};
use crate::scene::Scene;
use crate::state::InputSnapshot;
use crate::surface::{DrawSurface, SurfaceSize};

/// Pulsing dot grid. Dots shy away from the pointer and glow near it; the
/// links between neighbours fade in as the host scrolls.
pub struct CircuitGrid {
    config: CircuitConfig,
    dots: Vec<Dot>,
    time: f64,
    pointer: Option<[f64; 2]>,
    scroll: f64,
}

impl CircuitGrid {
    pub fn new(config: CircuitConfig) -> Self {
        Self {
            config,
            dots: Vec::new(),
            time: 0.0,
            pointer: None,
            scroll: 0.0,
        }
    }

    pub fn dots(&self) -> &[Dot] {
        &self.dots
    }

    pub fn dots_mut(&mut self) -> &mut Vec<Dot> {
        &mut self.dots
    }

    /// How visible the links are for the last seen scroll offset, in `[0, 1]`.
    pub fn link_visibility(&self) -> f64 {
        let past = self.scroll - self.config.fade_start;
        if self.config.fade_distance <= 0.0 {
            return if past >= 0.0 { 1.0 } else { 0.0 };
        }
        (past / self.config.fade_distance).clamp(0.0, 1.0)
    }

    /// Closeness of `point` to the pointer: 1 on top of it, 0 at the radius.
    fn proximity(&self, point: [f64; 2]) -> f64 {
        match self.pointer {
            Some(pointer) => {
                (1.0 - distance(pointer, point) / self.config.motion.repulsion_radius).max(0.0)
            }
            None => 0.0,
        }
    }
}

impl Scene for CircuitGrid {
    fn name(&self) -> &'static str {
        "circuit"
    }

    fn layout(&mut self, size: SurfaceSize, rng: &mut dyn RngCore) {
        self.dots = jittered_grid(size, self.config.spacing, self.config.jitter, rng);
        debug!(
            count = self.dots.len(),
            width = size.width,
            height = size.height,
            "dot grid laid out"
        );
    }

    fn update(&mut self, input: &InputSnapshot) {
        self.time += self.config.time_step;
        self.pointer = input.pointer.active.then(|| input.pointer.position());
        self.scroll = input.scroll;

        let motion = self.config.motion;
        for dot in &mut self.dots {
            let anchor = dot.body.anchor;
            motion.step(&mut dot.body, anchor, self.pointer);
        }
    }

    fn render(&self, surface: &mut dyn DrawSurface) {
        let color = self.config.color;

        let visibility = self.link_visibility();
        if visibility > 0.0 {
            for (i, a) in self.dots.iter().enumerate() {
                for b in &self.dots[i + 1..] {
                    let d = distance(a.body.xy(), b.body.xy());
                    if d == 0.0 || d >= self.config.link_distance {
                        continue;
                    }
                    let pulse =
                        (self.time * 3.0 + (a.pulse_phase + b.pulse_phase) / 2.0).sin() * 0.3 + 0.7;
                    let alpha = self.config.link_alpha
                        * pulse
                        * link_opacity(d, self.config.link_distance)
                        * visibility;
                    surface.stroke_line(a.body.xy(), b.body.xy(), 1.0, color.with_alpha(alpha));
                }
            }
        }

        for dot in &self.dots {
            let center = dot.body.xy();
            let proximity = self.proximity(center);
            let pulse = (self.time * 2.0 + dot.pulse_phase).sin() * 0.2 + 0.8;
            let size = dot.size + proximity * 4.0;

            if proximity > 0.2 {
                surface.fill_circle(center, size + 10.0, color.with_alpha(proximity * 0.1));
            }
            surface.fill_circle(center, size, color.with_alpha((0.25 + proximity * 0.75) * pulse));
        }
    }

    fn entity_count(&self) -> usize {
        self.dots.len()
    }
}
