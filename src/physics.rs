//! Per-frame motion shared by the particle, dot and icon scenes.
//!
//! A tick applies, in order: pointer repulsion, spring attraction toward a
//! target, uniform friction, then integrates position by velocity.

use tracing::warn;

use crate::math::length;

/// Position, resting anchor and velocity of one simulated entity.
///
/// Planar scenes leave `z` at zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Body {
    pub position: [f64; 3],
    pub anchor: [f64; 3],
    pub velocity: [f64; 3],
}

impl Body {
    /// A body at rest on its anchor.
    pub fn at(anchor: [f64; 3]) -> Self {
        Self {
            position: anchor,
            anchor,
            velocity: [0.0; 3],
        }
    }

    pub fn xy(&self) -> [f64; 2] {
        [self.position[0], self.position[1]]
    }

    pub fn speed(&self) -> f64 {
        length(&self.velocity)
    }

    pub fn is_finite(&self) -> bool {
        self.position
            .iter()
            .chain(self.velocity.iter())
            .all(|v| v.is_finite())
    }

    /// Puts the body back on its anchor at rest.
    pub fn reset(&mut self) {
        self.position = self.anchor;
        self.velocity = [0.0; 3];
    }
}

/// Tuning for the uniform motion step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    /// Pointer distance below which entities are pushed away.
    pub repulsion_radius: f64,
    /// Velocity added per tick at zero distance from the pointer.
    pub repulsion_strength: f64,
    /// Fraction of the distance to the target added to velocity per tick.
    pub spring: f64,
    /// Velocity multiplier per tick, in `(0, 1)`.
    pub friction: f64,
}

impl Motion {
    /// Scales velocity by the friction factor.
    pub fn apply_friction(&self, velocity: &mut [f64; 3]) {
        for v in velocity.iter_mut() {
            *v *= self.friction;
        }
    }

    /// Advances `body` one tick toward `target`, pushed away from `pointer`
    /// when it is within the repulsion radius.
    pub fn step(&self, body: &mut Body, target: [f64; 3], pointer: Option<[f64; 2]>) {
        if let Some(push) = pointer.and_then(|p| {
            repulsion(body.xy(), p, self.repulsion_radius, self.repulsion_strength)
        }) {
            body.velocity[0] += push[0];
            body.velocity[1] += push[1];
        }

        for axis in 0..3 {
            body.velocity[axis] += (target[axis] - body.position[axis]) * self.spring;
        }
        self.apply_friction(&mut body.velocity);
        for axis in 0..3 {
            body.position[axis] += body.velocity[axis];
        }

        if !body.is_finite() {
            warn!(anchor = ?body.anchor, "non-finite body state, resetting to anchor");
            body.reset();
        }
    }
}

/// Velocity change pushing `position` away from `pointer`.
///
/// The magnitude falls linearly from `strength` at the pointer to zero at
/// `radius`. Returns `None` outside the radius and when the two points
/// coincide, where the direction is undefined.
pub fn repulsion(
    position: [f64; 2],
    pointer: [f64; 2],
    radius: f64,
    strength: f64,
) -> Option<[f64; 2]> {
    let dx = pointer[0] - position[0];
    let dy = pointer[1] - position[1];
    let distance = dx.hypot(dy);
    if distance.is_nan() || distance <= 0.0 || distance >= radius {
        return None;
    }
    let force = (radius - distance) / radius * strength;
    Some([-dx / distance * force, -dy / distance * force])
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOTION: Motion = Motion {
        repulsion_radius: 120.0,
        repulsion_strength: 2.0,
        spring: 0.02,
        friction: 0.95,
    };

    #[test]
    fn repulsion_points_away_from_pointer() {
        let push = repulsion([100.0, 100.0], [110.0, 100.0], 120.0, 2.0).unwrap();
        assert!(push[0] < 0.0);
        assert_eq!(push[1], 0.0);
    }

    #[test]
    fn repulsion_skips_zero_distance_and_far_pointers() {
        assert!(repulsion([5.0, 5.0], [5.0, 5.0], 120.0, 2.0).is_none());
        assert!(repulsion([0.0, 0.0], [120.0, 0.0], 120.0, 2.0).is_none());
        assert!(repulsion([0.0, 0.0], [f64::NAN, 0.0], 120.0, 2.0).is_none());
    }

    #[test]
    fn repulsion_fades_toward_the_radius() {
        let near = repulsion([0.0, 0.0], [10.0, 0.0], 120.0, 2.0).unwrap();
        let far = repulsion([0.0, 0.0], [100.0, 0.0], 120.0, 2.0).unwrap();
        assert!(near[0].abs() > far[0].abs());
    }

    #[test]
    fn body_at_rest_on_target_stays_put() {
        let mut body = Body::at([50.0, 60.0, 0.0]);
        let anchor = body.anchor;
        MOTION.step(&mut body, anchor, None);
        assert_eq!(body, Body::at([50.0, 60.0, 0.0]));
    }

    #[test]
    fn pointer_on_top_of_body_still_springs() {
        let mut body = Body::at([50.0, 60.0, 0.0]);
        MOTION.step(&mut body, [51.0, 60.0, 0.0], Some([50.0, 60.0]));
        assert!(body.is_finite());
        assert!(body.velocity[0] > 0.0);
        assert!(body.position[0] > 50.0);
    }

    #[test]
    fn non_finite_state_is_reset() {
        let mut body = Body::at([1.0, 2.0, 3.0]);
        body.velocity = [f64::NAN, 0.0, 0.0];
        let anchor = body.anchor;
        MOTION.step(&mut body, anchor, None);
        assert_eq!(body, Body::at([1.0, 2.0, 3.0]));
    }

    #[test]
    fn damped_body_converges_on_target() {
        let mut body = Body::at([0.0, 0.0, 0.0]);
        body.position = [40.0, -30.0, 10.0];
        let anchor = body.anchor;
        for _ in 0..2_000 {
            MOTION.step(&mut body, anchor, None);
        }
        assert!(body.position.iter().all(|v| v.abs() < 1e-3));
    }
}
