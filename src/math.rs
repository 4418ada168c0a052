//! Vector, rotation and projection helpers shared by every scene.

/// Smallest `fov + z` denominator a projection accepts.
pub const DEPTH_EPSILON: f64 = 1e-6;

/// Multiplies a 3x3 matrix by a 3-dimensional vector
pub fn multiply_matrix_vector(matrix: &[[f64; 3]; 3], vector: &[f64; 3]) -> [f64; 3] {
    let mut result = [0.0; 3];
    for i in 0..3 {
        for j in 0..3 {
            result[i] += matrix[i][j] * vector[j];
        }
    }
    result
}

/// Multiplies two 3x3 matrices
pub fn multiply_matrices(a: &[[f64; 3]; 3], b: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    let mut result = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                result[i][j] += a[i][k] * b[k][j];
            }
        }
    }
    result
}

/// Rotation around the X axis
pub fn rotation_x(angle: f64) -> [[f64; 3]; 3] {
    let (sin, cos) = angle.sin_cos();
    [[1.0, 0.0, 0.0], [0.0, cos, -sin], [0.0, sin, cos]]
}

/// Rotation around the Y axis
pub fn rotation_y(angle: f64) -> [[f64; 3]; 3] {
    let (sin, cos) = angle.sin_cos();
    [[cos, 0.0, sin], [0.0, 1.0, 0.0], [-sin, 0.0, cos]]
}

/// Combined rotation that applies the X rotation first, then the Y rotation.
pub fn rotation_xy(angle_x: f64, angle_y: f64) -> [[f64; 3]; 3] {
    multiply_matrices(&rotation_y(angle_y), &rotation_x(angle_x))
}

/// Euclidean distance between two 2D points
pub fn distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    (a[0] - b[0]).hypot(a[1] - b[1])
}

/// Euclidean length of a 3D vector
pub fn length(v: &[f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// Moves `current` a `factor` fraction of the way toward `target`.
pub fn ease(current: f64, target: f64, factor: f64) -> f64 {
    current + (target - current) * factor
}

/// Opacity of a connection line between two entities `distance` apart.
///
/// Falls off linearly from 1 at zero distance to 0 at `threshold`, and stays
/// 0 beyond it.
pub fn link_opacity(distance: f64, threshold: f64) -> f64 {
    if threshold <= 0.0 || distance.is_nan() || distance >= threshold {
        return 0.0;
    }
    (1.0 - distance / threshold).clamp(0.0, 1.0)
}

/// A point mapped onto the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub x: f64,
    pub y: f64,
    /// Apparent size multiplier, `fov / (fov + z)`.
    pub scale: f64,
}

/// Simple perspective projection with a fixed field-of-view constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perspective {
    pub fov: f64,
}

impl Perspective {
    pub const fn new(fov: f64) -> Self {
        Self { fov }
    }

    /// Scale factor for depth `z`, or `None` when the point sits at or behind
    /// the eye.
    pub fn scale(&self, z: f64) -> Option<f64> {
        let denominator = self.fov + z;
        if !denominator.is_finite() || denominator <= DEPTH_EPSILON {
            return None;
        }
        Some(self.fov / denominator)
    }

    /// Projects a surface-space point toward `center`.
    pub fn project(&self, point: &[f64; 3], center: [f64; 2]) -> Option<Projection> {
        let scale = self.scale(point[2])?;
        Some(Projection {
            x: center[0] + (point[0] - center[0]) * scale,
            y: center[1] + (point[1] - center[1]) * scale,
            scale,
        })
    }

    /// Projects a point given in unit model space, scaled by `size` pixels and
    /// offset to `center`.
    pub fn project_model(
        &self,
        point: &[f64; 3],
        center: [f64; 2],
        size: f64,
    ) -> Option<Projection> {
        let scale = self.scale(point[2])? * size;
        Some(Projection {
            x: center[0] + point[0] * scale,
            y: center[1] + point[1] * scale,
            scale,
        })
    }

    /// Clamps a depth into `[-fov * fraction, fov * fraction]`.
    pub fn clamp_depth(&self, z: f64, fraction: f64) -> f64 {
        let limit = self.fov * fraction;
        z.clamp(-limit, limit)
    }
}
