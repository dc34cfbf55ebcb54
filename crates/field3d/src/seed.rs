//! Deterministic initial field values.

use crate::grid::GridLayout;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Tilt applied to the swirl seed around +Z.
pub const DEFAULT_SWIRL_TILT_DEGREES: f32 = -40.0;

/// How cells are populated at creation. Values depend only on cell coordinates.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub enum SeedPolicy {
    /// Every cell zero.
    Zero,
    /// Scalar `v`; vector cells get `(v, v, v)`.
    Constant(f32),
    /// Unit vectors circling the grid's z axis, tilted around +Z.
    /// Vector fields only.
    Swirl { tilt_degrees: f32 },
    /// `(ny - 1 - iy) * step`: highest at the floor, zero at the top layer.
    /// Vector fields get it along +Y.
    HeightGradient { step: f32 },
}

impl Default for SeedPolicy {
    fn default() -> Self {
        SeedPolicy::Swirl {
            tilt_degrees: DEFAULT_SWIRL_TILT_DEGREES,
        }
    }
}

impl SeedPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            SeedPolicy::Zero => "zero",
            SeedPolicy::Constant(_) => "constant",
            SeedPolicy::Swirl { .. } => "swirl",
            SeedPolicy::HeightGradient { .. } => "height_gradient",
        }
    }
}

/// Swirl direction for `cell`: `rot_z(tilt) * normalize(p x +Z)` where `p` is the
/// cell position relative to the grid middle, in cell units. Cells on the
/// swirl axis get zero.
pub fn swirl_vector(layout: &GridLayout, cell: [usize; 3], tilt_degrees: f32) -> Vec3 {
    let dims = layout.dims();
    let from_middle = Vec3::new(
        cell[0] as f32 - dims[0] as f32 * 0.5,
        cell[1] as f32 - dims[1] as f32 * 0.5,
        cell[2] as f32 - dims[2] as f32 * 0.5,
    );
    let tilt = Quat::from_axis_angle(Vec3::Z, tilt_degrees.to_radians());
    tilt * from_middle.cross(Vec3::Z).normalize_or_zero()
}

/// Linear gradient by layer height.
pub fn height_value(layout: &GridLayout, cell: [usize; 3], step: f32) -> f32 {
    let top = layout.dims()[1] - 1;
    (top - cell[1]) as f32 * step
}
