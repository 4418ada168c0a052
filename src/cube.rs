use rand::RngCore;
use tracing::debug;

use crate::config::CubeConfig;
use crate::math::{ease, multiply_matrix_vector, rotation_xy, Perspective};
use crate::scene::Scene;
use crate::state::{InputSnapshot, Rotation};
use crate::surface::{DrawSurface, SurfaceSize};

/// Unit cube corners
const VERTICES: [[f64; 3]; 8] = [
    [-1.0, -1.0, -1.0], // 0
    [1.0, -1.0, -1.0],  // 1
    [1.0, 1.0, -1.0],   // 2
    [-1.0, 1.0, -1.0],  // 3
    [-1.0, -1.0, 1.0],  // 4
    [1.0, -1.0, 1.0],   // 5
    [1.0, 1.0, 1.0],    // 6
    [-1.0, 1.0, 1.0],   // 7
];

/// Cube edges (pairs of vertex indices)
const EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0), // Front face
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4), // Back face
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7), // Connecting edges
];

/// Cube corner after rotation, with where it lands on the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: [f64; 3],
    pub screen_position: [f64; 2],
}

/// Wireframe cube that spins on its own and turns to face the pointer while
/// hovered.
pub struct CubeViewer {
    config: CubeConfig,
    perspective: Perspective,
    rotation: Rotation,
    size: SurfaceSize,
}

impl CubeViewer {
    pub fn new(config: CubeConfig) -> Self {
        let perspective = Perspective::new(config.fov);
        Self {
            config,
            perspective,
            rotation: Rotation::default(),
            size: SurfaceSize::new(0.0, 0.0),
        }
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Rotates and projects the cube corners for the current state.
    ///
    /// Empty if any corner would land behind the eye.
    pub fn compute_projected_vertices(&self) -> Vec<Vertex> {
        let center = self.size.center();
        let scale = self.size.width.min(self.size.height) * self.config.size_fraction;
        let rotation_matrix = rotation_xy(self.rotation.x, self.rotation.y);

        VERTICES
            .iter()
            .map(|corner| {
                let position = multiply_matrix_vector(&rotation_matrix, corner);
                let projected = self.perspective.project_model(&position, center, scale)?;
                Some(Vertex {
                    position,
                    screen_position: [projected.x, projected.y],
                })
            })
            .collect::<Option<Vec<_>>>()
            .unwrap_or_default()
    }
}

impl Scene for CubeViewer {
    fn name(&self) -> &'static str {
        "cube"
    }

    fn layout(&mut self, size: SurfaceSize, _rng: &mut dyn RngCore) {
        self.size = size;
        debug!(width = size.width, height = size.height, "cube viewer sized");
    }

    fn update(&mut self, input: &InputSnapshot) {
        if input.pointer.active {
            let [nx, ny] = input.pointer.normalized(self.size);
            let gain = self.config.hover_gain;
            self.rotation.x = ease(self.rotation.x, ny * gain, self.config.hover_ease);
            self.rotation.y = ease(self.rotation.y, nx * gain, self.config.hover_ease);
        } else {
            self.rotation.x += self.config.idle_rate[0];
            self.rotation.y += self.config.idle_rate[1];
        }
    }

    fn render(&self, surface: &mut dyn DrawSurface) {
        let vertices = self.compute_projected_vertices();
        if vertices.is_empty() || self.size.is_empty() {
            return;
        }

        for &(start, end) in &EDGES {
            surface.stroke_line(
                vertices[start].screen_position,
                vertices[end].screen_position,
                self.config.edge_width,
                self.config.edge_color,
            );
        }
        for vertex in &vertices {
            surface.fill_circle(
                vertex.screen_position,
                self.config.vertex_radius,
                self.config.vertex_color,
            );
        }
    }

    fn entity_count(&self) -> usize {
        VERTICES.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Pointer;
    use crate::surface::Recorder;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn viewer() -> CubeViewer {
        let mut viewer = CubeViewer::new(CubeConfig::default());
        viewer.layout(SurfaceSize::new(400.0, 400.0), &mut StdRng::seed_from_u64(0));
        viewer
    }

    #[test]
    fn idle_rotation_advances_at_fixed_rate() {
        let mut viewer = viewer();
        let mut previous = viewer.rotation();
        for frame in 1..=600 {
            viewer.update(&InputSnapshot::default());
            let now = viewer.rotation();
            assert!(now.x > previous.x && now.y > previous.y);
            assert!((now.x - 0.005 * frame as f64).abs() < 1e-9);
            assert!((now.y - 0.01 * frame as f64).abs() < 1e-9);
            previous = now;
        }
    }

    #[test]
    fn hover_eases_toward_pointer_target() {
        let mut viewer = viewer();
        let hover = InputSnapshot {
            pointer: Pointer::at(400.0, 0.0),
            scroll: 0.0,
        };
        for _ in 0..200 {
            viewer.update(&hover);
        }
        let rotation = viewer.rotation();
        assert!((rotation.y - 1.0).abs() < 1e-6);
        assert!((rotation.x + 1.0).abs() < 1e-6);
    }

    #[test]
    fn unrotated_front_face_is_centred() {
        let viewer = viewer();
        let vertices = viewer.compute_projected_vertices();
        assert_eq!(vertices.len(), 8);
        // Corners 0 and 2 share a depth and mirror each other through the centre.
        let a = vertices[0].screen_position;
        let b = vertices[2].screen_position;
        assert!((a[0] + b[0] - 400.0).abs() < 1e-9);
        assert!((a[1] + b[1] - 400.0).abs() < 1e-9);
        // Near face (z = -1) projects larger than the far face (z = 1).
        let near = (vertices[1].screen_position[0] - vertices[0].screen_position[0]).abs();
        let far = (vertices[5].screen_position[0] - vertices[4].screen_position[0]).abs();
        assert!(near > far);
    }

    #[test]
    fn draws_twelve_edges_and_eight_markers() {
        let viewer = viewer();
        let mut recorder = Recorder::new(SurfaceSize::new(400.0, 400.0));
        viewer.render(&mut recorder);
        assert_eq!(recorder.lines().count(), 12);
        assert_eq!(recorder.circles().count(), 8);
    }

    #[test]
    fn zero_sized_surface_draws_nothing() {
        let mut viewer = CubeViewer::new(CubeConfig::default());
        viewer.layout(SurfaceSize::new(0.0, 0.0), &mut StdRng::seed_from_u64(0));
        let mut recorder = Recorder::new(SurfaceSize::new(0.0, 0.0));
        viewer.render(&mut recorder);
        assert!(recorder.commands().is_empty());
    }
}
