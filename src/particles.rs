use rand::RngCore;
use tracing::debug;

use crate::config::ParticleConfig;
use crate::field::{scatter_particles, Particle};
use crate::math::{distance, link_opacity};
use crate::scene::Scene;
use crate::state::InputSnapshot;
use crate::surface::{DrawSurface, SurfaceSize};

/// Loose field of particles that drift around their anchors, scatter away
/// from the pointer and are joined by lines when close together.
pub struct ParticleField {
    config: ParticleConfig,
    particles: Vec<Particle>,
    time: f64,
}

impl ParticleField {
    pub fn new(config: ParticleConfig) -> Self {
        Self {
            config,
            particles: Vec::new(),
            time: 0.0,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable access for tests and hosts that seed a custom layout.
    pub fn particles_mut(&mut self) -> &mut Vec<Particle> {
        &mut self.particles
    }

    /// Idle float offset of a particle at the current clock.
    fn drift(&self, phase: f64) -> [f64; 2] {
        [
            (self.time + phase).sin() * self.config.drift,
            (self.time * 0.8 + phase).cos() * self.config.drift,
        ]
    }
}

impl Scene for ParticleField {
    fn name(&self) -> &'static str {
        "particles"
    }

    fn layout(&mut self, size: SurfaceSize, rng: &mut dyn RngCore) {
        self.particles = scatter_particles(size, self.config.count, rng);
        debug!(
            count = self.particles.len(),
            width = size.width,
            height = size.height,
            "particle field laid out"
        );
    }

    fn update(&mut self, input: &InputSnapshot) {
        self.time += self.config.time_step;
        let pointer = input.pointer.active.then(|| input.pointer.position());
        let motion = self.config.motion;

        for i in 0..self.particles.len() {
            let [float_x, float_y] = self.drift(self.particles[i].phase);
            let particle = &mut self.particles[i];
            let target = [
                particle.body.anchor[0] + float_x,
                particle.body.anchor[1] + float_y,
                0.0,
            ];
            motion.step(&mut particle.body, target, pointer);
        }
    }

    fn render(&self, surface: &mut dyn DrawSurface) {
        let color = self.config.color;
        for particle in &self.particles {
            let fill = color.with_alpha(particle.opacity);
            surface.fill_circle(particle.body.xy(), particle.size, fill);
        }

        for (i, a) in self.particles.iter().enumerate() {
            for b in &self.particles[i + 1..] {
                let d = distance(a.body.xy(), b.body.xy());
                if d == 0.0 {
                    continue;
                }
                let alpha = link_opacity(d, self.config.link_distance) * self.config.link_alpha;
                if alpha > 0.0 {
                    surface.stroke_line(a.body.xy(), b.body.xy(), 0.5, color.with_alpha(alpha));
                }
            }
        }
    }

    fn entity_count(&self) -> usize {
        self.particles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::Body;
    use crate::state::Pointer;
    use crate::surface::{DrawCommand, Recorder};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn particle_at(x: f64, y: f64) -> Particle {
        Particle {
            body: Body::at([x, y, 0.0]),
            size: 2.0,
            opacity: 0.5,
            phase: 0.0,
        }
    }

    #[test]
    fn empty_field_renders_nothing() {
        let field = ParticleField::new(ParticleConfig::default());
        let mut recorder = Recorder::new(SurfaceSize::new(100.0, 100.0));
        field.render(&mut recorder);
        assert!(recorder.commands().is_empty());
    }

    #[test]
    fn close_pairs_are_linked_and_far_pairs_are_not() {
        let mut field = ParticleField::new(ParticleConfig::default());
        *field.particles_mut() = vec![
            particle_at(0.0, 0.0),
            particle_at(60.0, 0.0),
            particle_at(500.0, 0.0),
        ];
        let mut recorder = Recorder::new(SurfaceSize::new(800.0, 600.0));
        field.render(&mut recorder);
        assert_eq!(recorder.circles().count(), 3);
        let lines: Vec<_> = recorder.lines().collect();
        assert_eq!(lines.len(), 1);
        if let DrawCommand::Line { color, .. } = lines[0] {
            assert!((color.a - 0.15).abs() < 1e-9);
        }
    }

    #[test]
    fn coincident_particles_draw_no_line() {
        let mut field = ParticleField::new(ParticleConfig::default());
        *field.particles_mut() = vec![particle_at(10.0, 10.0), particle_at(10.0, 10.0)];
        let mut recorder = Recorder::new(SurfaceSize::new(100.0, 100.0));
        field.render(&mut recorder);
        assert_eq!(recorder.lines().count(), 0);
    }

    #[test]
    fn pointer_pushes_nearby_particle_away() {
        let mut field = ParticleField::new(ParticleConfig::default());
        *field.particles_mut() = vec![particle_at(100.0, 100.0)];
        let input = InputSnapshot {
            pointer: Pointer::at(110.0, 100.0),
            scroll: 0.0,
        };
        field.update(&input);
        assert!(field.particles()[0].body.velocity[0] < 0.0);
    }

    #[test]
    fn layout_replaces_particles_in_bulk() {
        let mut field = ParticleField::new(ParticleConfig::default());
        let mut rng = StdRng::seed_from_u64(1);
        field.layout(SurfaceSize::new(800.0, 600.0), &mut rng);
        let first = field.particles().to_vec();
        field.layout(SurfaceSize::new(400.0, 300.0), &mut rng);
        assert_eq!(field.entity_count(), 100);
        assert_ne!(first, field.particles());
        assert!(field.particles().iter().all(|p| p.body.anchor[0] <= 400.0));
    }
}
