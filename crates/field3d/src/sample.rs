//! Per-cell sample types.
//!
//! A field holds either `Vec3` (directional flow) or `f32` (pressure).
//! The stencil kernel, jets and coupling are generic over [`FieldSample`].

use crate::config::FieldKind;
use crate::grid::GridLayout;
use crate::seed::{self, SeedPolicy};
use glam::{Quat, Vec3};
use std::fmt::Debug;

/// Below this length a vector has no usable direction.
const DIRECTION_EPSILON: f32 = 1e-6;

pub trait FieldSample: Copy + Send + Sync + Debug + PartialEq + 'static {
    const KIND: FieldKind;
    /// Neutral sample returned by out-of-range queries.
    const ZERO: Self;

    fn add(self, other: Self) -> Self;
    fn scale(self, factor: f32) -> Self;

    /// Linear blend, `t = 0` gives `self`.
    fn lerp_to(self, target: Self, t: f32) -> Self;

    /// Spherical blend. Scalars have no direction and blend linearly.
    fn slerp_to(self, target: Self, t: f32) -> Self {
        self.lerp_to(target, t)
    }

    /// Absolute value or vector length.
    fn magnitude(self) -> f32;

    fn is_finite(self) -> bool;

    /// Initial value of `cell` under `policy`, `None` if the policy does not apply.
    fn seeded(policy: &SeedPolicy, layout: &GridLayout, cell: [usize; 3]) -> Option<Self>;

    /// Force this sample exerts on a contact point. `up` is the unit vector
    /// opposite to gravity.
    fn to_force(self, up: Vec3) -> Vec3;
}

impl FieldSample for f32 {
    const KIND: FieldKind = FieldKind::Pressure;
    const ZERO: Self = 0.0;

    #[inline]
    fn add(self, other: Self) -> Self {
        self + other
    }

    #[inline]
    fn scale(self, factor: f32) -> Self {
        self * factor
    }

    #[inline]
    fn lerp_to(self, target: Self, t: f32) -> Self {
        self + (target - self) * t
    }

    #[inline]
    fn magnitude(self) -> f32 {
        self.abs()
    }

    #[inline]
    fn is_finite(self) -> bool {
        f32::is_finite(self)
    }

    fn seeded(policy: &SeedPolicy, layout: &GridLayout, cell: [usize; 3]) -> Option<Self> {
        match *policy {
            SeedPolicy::Zero => Some(0.0),
            SeedPolicy::Constant(value) => Some(value),
            SeedPolicy::HeightGradient { step } => Some(seed::height_value(layout, cell, step)),
            SeedPolicy::Swirl { .. } => None,
        }
    }

    /// Pressure pushes along `up` (buoyancy).
    #[inline]
    fn to_force(self, up: Vec3) -> Vec3 {
        up * self
    }
}

impl FieldSample for Vec3 {
    const KIND: FieldKind = FieldKind::Vector;
    const ZERO: Self = Vec3::ZERO;

    #[inline]
    fn add(self, other: Self) -> Self {
        self + other
    }

    #[inline]
    fn scale(self, factor: f32) -> Self {
        self * factor
    }

    #[inline]
    fn lerp_to(self, target: Self, t: f32) -> Self {
        self.lerp(target, t)
    }

    /// Rotates direction by `t` of the angle between the two vectors and
    /// lerps the length. Degenerate pairs (zero length, parallel, opposite)
    /// fall back to a linear blend.
    fn slerp_to(self, target: Self, t: f32) -> Self {
        let len_a = self.length();
        let len_b = target.length();
        if len_a < DIRECTION_EPSILON || len_b < DIRECTION_EPSILON {
            return self.lerp(target, t);
        }

        let dir_a = self / len_a;
        let dir_b = target / len_b;
        let axis = dir_a.cross(dir_b);
        if axis.length_squared() < DIRECTION_EPSILON * DIRECTION_EPSILON {
            return self.lerp(target, t);
        }

        let angle = dir_a.dot(dir_b).clamp(-1.0, 1.0).acos();
        let dir = Quat::from_axis_angle(axis.normalize(), angle * t) * dir_a;
        dir * (len_a + (len_b - len_a) * t)
    }

    #[inline]
    fn magnitude(self) -> f32 {
        self.length()
    }

    #[inline]
    fn is_finite(self) -> bool {
        Vec3::is_finite(self)
    }

    fn seeded(policy: &SeedPolicy, layout: &GridLayout, cell: [usize; 3]) -> Option<Self> {
        match *policy {
            SeedPolicy::Zero => Some(Vec3::ZERO),
            SeedPolicy::Constant(value) => Some(Vec3::splat(value)),
            SeedPolicy::HeightGradient { step } => {
                Some(Vec3::Y * seed::height_value(layout, cell, step))
            }
            SeedPolicy::Swirl { tilt_degrees } => {
                Some(seed::swirl_vector(layout, cell, tilt_degrees))
            }
        }
    }

    #[inline]
    fn to_force(self, _up: Vec3) -> Vec3 {
        self
    }
}
