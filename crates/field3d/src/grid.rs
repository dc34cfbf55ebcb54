//! Grid layout: world <-> cell mapping for a box-shaped cell grid.
//!
//! Cells are flattened row-major with z varying fastest:
//! `index = ix * (ny * nz) + iy * nz + iz`.
//!
//! The sample point of cell `(ix, iy, iz)` sits at `origin + (ix, iy, iz) * cell_size`.
//! World queries add half a cell before flooring, so every point maps to the
//! nearest sample point.

use crate::error::FieldError;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Largest cell count a layout accepts, so every per-cell buffer
/// (at most 16 bytes per cell) stays within one allocation.
pub const MAX_CELLS: usize = isize::MAX as usize / 16;

/// Axis-aligned cell grid in world space. Immutable once built.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    #[serde(with = "crate::serde_utils::vec3")]
    origin: Vec3,
    #[serde(with = "crate::serde_utils::vec3")]
    size: Vec3,
    dims: [usize; 3],
    /// `size / dims`, per axis
    #[serde(with = "crate::serde_utils::vec3")]
    cell_size: Vec3,
}

impl GridLayout {
    /// Build a layout. Every axis needs at least one cell and a positive extent,
    /// and the total cell count must not exceed [`MAX_CELLS`].
    pub fn new(origin: Vec3, size: Vec3, dims: [usize; 3]) -> Result<Self, FieldError> {
        if dims.iter().any(|&d| d == 0) {
            return Err(FieldError::InvalidDimensions(dims));
        }
        let count = dims[0]
            .checked_mul(dims[1])
            .and_then(|n| n.checked_mul(dims[2]));
        if !matches!(count, Some(n) if n <= MAX_CELLS) {
            return Err(FieldError::InvalidDimensions(dims));
        }
        if !size.is_finite() || size.min_element() <= 0.0 {
            return Err(FieldError::InvalidSize(size));
        }

        let cell_size = size / Vec3::new(dims[0] as f32, dims[1] as f32, dims[2] as f32);

        Ok(Self {
            origin,
            size,
            dims,
            cell_size,
        })
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn size(&self) -> Vec3 {
        self.size
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn cell_size(&self) -> Vec3 {
        self.cell_size
    }

    /// Total number of cells (`nx * ny * nz`). Cannot overflow, see [`GridLayout::new`].
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    // ========== Index functions ==========

    /// Flat index of an in-range cell.
    #[inline]
    pub fn cell_index(&self, ix: usize, iy: usize, iz: usize) -> usize {
        debug_assert!(
            ix < self.dims[0] && iy < self.dims[1] && iz < self.dims[2],
            "cell ({}, {}, {}) outside {:?}",
            ix,
            iy,
            iz,
            self.dims
        );
        let [_, ny, nz] = self.dims;
        ix * (ny * nz) + iy * nz + iz
    }

    /// Flat index for signed coordinates, `None` if any axis is outside `[0, dim)`.
    #[inline]
    pub fn checked_index(&self, ix: i64, iy: i64, iz: i64) -> Option<usize> {
        if self.cell_in_bounds(ix, iy, iz) {
            Some(self.cell_index(ix as usize, iy as usize, iz as usize))
        } else {
            None
        }
    }

    /// Inverse of [`cell_index`](Self::cell_index).
    #[inline]
    pub fn cell_coords(&self, index: usize) -> [usize; 3] {
        let [_, ny, nz] = self.dims;
        let plane = ny * nz;
        [index / plane, (index % plane) / nz, index % nz]
    }

    /// Strict bounds check, no clamping.
    #[inline]
    pub fn cell_in_bounds(&self, ix: i64, iy: i64, iz: i64) -> bool {
        ix >= 0
            && ix < self.dims[0] as i64
            && iy >= 0
            && iy < self.dims[1] as i64
            && iz >= 0
            && iz < self.dims[2] as i64
    }

    // ========== World position helpers ==========

    /// World position of the sample point of cell `(ix, iy, iz)`.
    #[inline]
    pub fn cell_center(&self, ix: usize, iy: usize, iz: usize) -> Vec3 {
        self.origin + Vec3::new(ix as f32, iy as f32, iz as f32) * self.cell_size
    }

    /// Nearest cell to a world point, unclamped. NaN components map to `i64::MIN`.
    #[inline]
    pub fn world_to_cell_unclamped(&self, point: Vec3) -> [i64; 3] {
        let local = (point - self.origin) / self.cell_size + Vec3::splat(0.5);
        let floor = |v: f32| {
            if v.is_nan() {
                i64::MIN
            } else {
                // `as` saturates, so huge values stay out of range instead of wrapping.
                v.floor() as i64
            }
        };
        [floor(local.x), floor(local.y), floor(local.z)]
    }

    /// Nearest cell to a world point, clamped into the grid on every axis.
    #[inline]
    pub fn world_to_cell(&self, point: Vec3) -> [usize; 3] {
        let cell = self.world_to_cell_unclamped(point);
        let clamp = |v: i64, dim: usize| v.clamp(0, dim as i64 - 1) as usize;
        [
            clamp(cell[0], self.dims[0]),
            clamp(cell[1], self.dims[1]),
            clamp(cell[2], self.dims[2]),
        ]
    }

    /// Iterate `(index, [ix, iy, iz])` in flat order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, [usize; 3])> + '_ {
        (0..self.cell_count()).map(move |idx| (idx, self.cell_coords(idx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(dims: [usize; 3]) -> GridLayout {
        GridLayout::new(
            Vec3::ZERO,
            Vec3::new(dims[0] as f32, dims[1] as f32, dims[2] as f32),
            dims,
        )
        .unwrap()
    }

    #[test]
    fn test_layout_rejects_zero_dims() {
        assert_eq!(
            GridLayout::new(Vec3::ZERO, Vec3::ONE, [1, 0, 1]),
            Err(FieldError::InvalidDimensions([1, 0, 1]))
        );
    }

    #[test]
    fn test_layout_rejects_overflowing_dims() {
        let dims = [usize::MAX / 2, 4, 1];
        assert_eq!(
            GridLayout::new(Vec3::ZERO, Vec3::ONE, dims),
            Err(FieldError::InvalidDimensions(dims))
        );

        let dims = [MAX_CELLS, 2, 1];
        assert_eq!(
            GridLayout::new(Vec3::ZERO, Vec3::ONE, dims),
            Err(FieldError::InvalidDimensions(dims))
        );
        assert!(GridLayout::new(Vec3::ZERO, Vec3::ONE, [MAX_CELLS, 1, 1]).is_ok());
    }

    #[test]
    fn test_cell_size_is_per_axis() {
        let grid = GridLayout::new(Vec3::ZERO, Vec3::new(4.0, 1.0, 3.0), [8, 2, 3]).unwrap();
        assert_eq!(grid.cell_size(), Vec3::new(0.5, 0.5, 1.0));
        assert_eq!(grid.cell_count(), 48);
    }

    #[test]
    fn test_cell_index_z_fastest() {
        let grid = layout([2, 3, 4]);
        assert_eq!(grid.cell_index(0, 0, 1), 1);
        assert_eq!(grid.cell_index(0, 1, 0), 4);
        assert_eq!(grid.cell_index(1, 0, 0), 12);
        assert_eq!(grid.cell_index(1, 2, 3), 23);
    }

    #[test]
    fn test_index_round_trip_every_cell() {
        let grid = layout([3, 4, 5]);
        let mut seen = vec![false; grid.cell_count()];
        for ix in 0..3 {
            for iy in 0..4 {
                for iz in 0..5 {
                    let idx = grid.cell_index(ix, iy, iz);
                    assert!(!seen[idx], "index {} produced twice", idx);
                    seen[idx] = true;
                    assert_eq!(grid.cell_coords(idx), [ix, iy, iz]);
                }
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_checked_index_is_strict() {
        let grid = layout([2, 2, 2]);
        assert_eq!(grid.checked_index(1, 1, 1), Some(7));
        assert_eq!(grid.checked_index(2, 0, 0), None);
        assert_eq!(grid.checked_index(0, -1, 0), None);
        assert_eq!(grid.checked_index(0, 0, 2), None);
    }

    #[test]
    fn test_world_to_cell_rounds_to_nearest_sample_point() {
        let grid = GridLayout::new(Vec3::X, Vec3::splat(4.0), [4, 4, 4]).unwrap();
        assert_eq!(grid.world_to_cell(Vec3::new(1.0, 0.0, 0.0)), [0, 0, 0]);
        assert_eq!(grid.world_to_cell(Vec3::new(1.49, 0.51, 2.0)), [0, 1, 2]);
        assert_eq!(grid.world_to_cell(Vec3::new(3.6, 2.4, 3.0)), [3, 2, 3]);
    }

    #[test]
    fn test_world_to_cell_clamps_outside_points() {
        let grid = layout([3, 3, 3]);
        assert_eq!(grid.world_to_cell(Vec3::new(-50.0, 1.0, 99.0)), [0, 1, 2]);
        assert_eq!(grid.world_to_cell_unclamped(Vec3::new(-50.0, 1.0, 99.0)), [-50, 1, 99]);
        assert_eq!(grid.world_to_cell(Vec3::splat(f32::NAN)), [0, 0, 0]);
    }

    #[test]
    fn test_center_round_trip() {
        let origin = Vec3::new(-2.0, 3.0, 0.5);
        let grid = GridLayout::new(origin, Vec3::new(3.0, 1.0, 7.0), [6, 3, 5]).unwrap();
        for (idx, [ix, iy, iz]) in grid.cells() {
            let center = grid.cell_center(ix, iy, iz);
            assert_eq!(grid.world_to_cell(center), [ix, iy, iz], "cell {} center {}", idx, center);
        }
    }
}
