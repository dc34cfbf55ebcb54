//! Field -> rigid body coupling.
//!
//! Rings are owned by the caller's physics engine. The field only answers
//! point queries; [`RingCoupling`] turns those answers into forces and hands
//! them back through [`CouplingTarget::apply_force_at`].

use crate::field::FieldState;
use crate::sample::FieldSample;
use glam::Vec3;

/// Body that samples the field at one or more contact points.
pub trait CouplingTarget {
    /// World-space contact points for this tick.
    fn contact_points(&self) -> Vec<Vec3>;

    /// Receive a force applied at `point`.
    fn apply_force_at(&mut self, force: Vec3, point: Vec3);
}

/// Converts field samples into forces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingCoupling {
    /// Total strength per ring, split evenly across its contact points
    pub strength: f32,
    /// World gravity; pressure pushes against it
    pub gravity: Vec3,
}

impl Default for RingCoupling {
    fn default() -> Self {
        Self {
            strength: 1.0,
            gravity: Vec3::new(0.0, -9.81, 0.0),
        }
    }
}

impl RingCoupling {
    pub fn new(strength: f32, gravity: Vec3) -> Self {
        Self { strength, gravity }
    }

    /// Gravity may change between ticks (tilting the toy).
    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    /// Per-contact scale, so the total does not depend on the contact count.
    #[inline]
    pub fn coefficient(&self, contact_count: usize) -> f32 {
        if contact_count == 0 {
            0.0
        } else {
            self.strength / contact_count as f32
        }
    }

    /// Unit vector opposite to gravity, +Y without gravity.
    pub fn up(&self) -> Vec3 {
        let up = -self.gravity.normalize_or_zero();
        if up == Vec3::ZERO {
            Vec3::Y
        } else {
            up
        }
    }

    /// Forces for each contact point, without applying them.
    pub fn forces<S: FieldSample>(
        &self,
        field: &FieldState<S>,
        points: &[Vec3],
    ) -> Vec<(Vec3, Vec3)> {
        let coeff = self.coefficient(points.len());
        let up = self.up();
        points
            .iter()
            .map(|&point| (point, field.effector_at(point).to_force(up) * coeff))
            .collect()
    }

    /// Sample the field at every contact point of `target` and apply the
    /// resulting forces. Returns the total force applied.
    pub fn apply<S, T>(&self, field: &FieldState<S>, target: &mut T) -> Vec3
    where
        S: FieldSample,
        T: CouplingTarget + ?Sized,
    {
        let points = target.contact_points();
        let mut total = Vec3::ZERO;
        for (point, force) in self.forces(field, &points) {
            target.apply_force_at(force, point);
            total += force;
        }
        total
    }

    /// Apply to every ring in turn.
    pub fn apply_all<S, T>(&self, field: &FieldState<S>, targets: &mut [T]) -> Vec3
    where
        S: FieldSample,
        T: CouplingTarget,
    {
        targets.iter_mut().map(|t| self.apply(field, t)).sum()
    }
}

/// Minimal ring body: a position plus contact offsets, accumulating the
/// force and torque it receives during a tick.
#[derive(Clone, Debug, Default)]
pub struct Ring {
    pub position: Vec3,
    /// Contact points relative to `position`
    pub contact_offsets: Vec<Vec3>,
    pub force: Vec3,
    /// Torque about `position`
    pub torque: Vec3,
}

impl Ring {
    pub fn new(position: Vec3, contact_offsets: Vec<Vec3>) -> Self {
        Self {
            position,
            contact_offsets,
            ..Default::default()
        }
    }

    /// Ring with `count` contacts evenly spaced on a horizontal circle.
    pub fn circle(position: Vec3, radius: f32, count: usize) -> Self {
        let offsets = (0..count)
            .map(|i| {
                let angle = i as f32 / count as f32 * std::f32::consts::TAU;
                Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius)
            })
            .collect();
        Self::new(position, offsets)
    }

    /// Clear accumulated force and torque.
    pub fn clear_forces(&mut self) {
        self.force = Vec3::ZERO;
        self.torque = Vec3::ZERO;
    }
}

impl CouplingTarget for Ring {
    fn contact_points(&self) -> Vec<Vec3> {
        self.contact_offsets.iter().map(|&o| self.position + o).collect()
    }

    fn apply_force_at(&mut self, force: Vec3, point: Vec3) {
        self.force += force;
        self.torque += (point - self.position).cross(force);
    }
}
