//! 26-neighbor smoothing stencil with jet source injection.
//!
//! One pass per tick:
//! next[c] = jet value, if an active jet covers c
//!         = blend(prev[c], mean(prev[n] for valid neighbours n), 0.5) otherwise
//!
//! Neighbours outside the grid are left out of the mean (open boundary), so
//! edge cells average over fewer cells. A cell with no neighbours keeps its
//! value. Every cell reads only `prev` and writes only its own slot in
//! `next`, which makes the pass a plain parallel map.

use crate::grid::GridLayout;
use crate::jet::JetOverlay;
use crate::sample::FieldSample;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// How far each cell moves toward its neighbour mean per tick.
pub const BLEND_FACTOR: f32 = 0.5;

/// Face, edge and corner offsets: every `{-1, 0, 1}^3` except `(0, 0, 0)`.
pub const NEIGHBOR_OFFSETS: [[i64; 3]; 26] = neighbor_offsets();

const fn neighbor_offsets() -> [[i64; 3]; 26] {
    let mut out = [[0i64; 3]; 26];
    let mut n = 0;
    let mut i = 0i64;
    while i < 27 {
        if i != 13 {
            out[n] = [i / 9 - 1, (i / 3) % 3 - 1, i % 3 - 1];
            n += 1;
        }
        i += 1;
    }
    out
}

/// Blend used to pull a cell toward its neighbour mean.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum BlendMode {
    #[default]
    Linear,
    /// Rotate vectors toward the mean instead of cutting across.
    /// Same as `Linear` for pressure fields.
    Spherical,
}

/// Executor for the per-cell map.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum Dispatch {
    Serial,
    /// Rayon thread pool
    #[default]
    Parallel,
}

/// Smoothed value of cell `idx` read from `prev`. Ignores jets.
#[inline]
pub fn diffuse_cell<S: FieldSample>(
    layout: &GridLayout,
    prev: &[S],
    idx: usize,
    blend: BlendMode,
) -> S {
    let [ix, iy, iz] = layout.cell_coords(idx);
    let (ix, iy, iz) = (ix as i64, iy as i64, iz as i64);

    let mut sum = S::ZERO;
    let mut count = 0u32;
    for [dx, dy, dz] in NEIGHBOR_OFFSETS {
        if let Some(nidx) = layout.checked_index(ix + dx, iy + dy, iz + dz) {
            sum = sum.add(prev[nidx]);
            count += 1;
        }
    }

    let current = prev[idx];
    if count == 0 {
        return current;
    }

    let mean = sum.scale(1.0 / count as f32);
    match blend {
        BlendMode::Linear => current.lerp_to(mean, BLEND_FACTOR),
        BlendMode::Spherical => current.slerp_to(mean, BLEND_FACTOR),
    }
}

/// Compute the whole next buffer from `prev`.
///
/// `prev` and `next` must both hold `layout.cell_count()` samples.
pub fn stencil_update<S: FieldSample>(
    layout: &GridLayout,
    prev: &[S],
    next: &mut [S],
    overlay: &JetOverlay<S>,
    blend: BlendMode,
    dispatch: Dispatch,
) {
    assert_eq!(prev.len(), layout.cell_count(), "prev buffer size mismatch");
    assert_eq!(next.len(), prev.len(), "next buffer size mismatch");

    let kernel = |(idx, out): (usize, &mut S)| {
        *out = match overlay.get(idx) {
            Some(source) => source,
            None => diffuse_cell(layout, prev, idx, blend),
        };
    };

    match dispatch {
        Dispatch::Serial => next.iter_mut().enumerate().for_each(kernel),
        Dispatch::Parallel => next.par_iter_mut().enumerate().for_each(kernel),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jet::Jet;
    use glam::Vec3;

    fn layout(dims: [usize; 3]) -> GridLayout {
        let size = Vec3::new(dims[0] as f32, dims[1] as f32, dims[2] as f32);
        GridLayout::new(Vec3::ZERO, size, dims).unwrap()
    }

    #[test]
    fn test_neighbor_offsets_are_unique_and_exclude_center() {
        let mut offsets = NEIGHBOR_OFFSETS.to_vec();
        assert!(!offsets.contains(&[0, 0, 0]));
        offsets.sort();
        offsets.dedup();
        assert_eq!(offsets.len(), 26);
        assert!(offsets.iter().flatten().all(|&d| (-1..=1).contains(&d)));
    }

    #[test]
    fn test_neighbor_counts() {
        let grid = layout([3, 3, 3]);
        let count = |cell: [usize; 3]| {
            NEIGHBOR_OFFSETS
                .iter()
                .filter(|d| {
                    grid.cell_in_bounds(
                        cell[0] as i64 + d[0],
                        cell[1] as i64 + d[1],
                        cell[2] as i64 + d[2],
                    )
                })
                .count()
        };
        assert_eq!(count([1, 1, 1]), 26);
        assert_eq!(count([0, 0, 0]), 7);
        assert_eq!(count([0, 1, 1]), 17);
        assert_eq!(count([0, 0, 1]), 11);
    }

    #[test]
    fn test_corner_cell_averages_valid_neighbours_only() {
        let grid = layout([2, 2, 2]);
        let mut prev = vec![0.0f32; 8];
        // Corner (0,0,0) sees the other 7 cells; give them mean 7
        for (i, value) in prev.iter_mut().enumerate().skip(1) {
            *value = if i == 7 { 13.0 } else { 6.0 };
        }
        let next = diffuse_cell(&grid, &prev, 0, BlendMode::Linear);
        assert!((next - 3.5).abs() < 1e-6, "got {}", next);
    }

    #[test]
    fn test_single_cell_grid_keeps_value() {
        let grid = layout([1, 1, 1]);
        let prev = [Vec3::new(1.0, -2.0, 3.0)];
        let mut next = [Vec3::ZERO];
        let overlay = JetOverlay::new(1);
        stencil_update(&grid, &prev, &mut next, &overlay, BlendMode::Spherical, Dispatch::Serial);
        assert_eq!(next[0], prev[0]);
    }

    #[test]
    fn test_reads_only_previous_buffer() {
        // A spike diffuses symmetrically; an in-place update would bias
        // cells visited later.
        let grid = layout([5, 1, 1]);
        let prev = vec![0.0, 0.0, 8.0, 0.0, 0.0];
        let mut next = vec![0.0f32; 5];
        let overlay = JetOverlay::new(5);
        stencil_update(&grid, &prev, &mut next, &overlay, BlendMode::Linear, Dispatch::Serial);
        assert_eq!(next, vec![0.0, 2.0, 4.0, 2.0, 0.0]);
    }

    #[test]
    fn test_jet_overrides_diffusion() {
        let grid = layout([5, 1, 1]);
        let prev = vec![1.0f32; 5];
        let mut next = vec![0.0f32; 5];
        let mut overlay = JetOverlay::new(5);
        overlay.rebuild(&grid, &[Jet::new(Vec3::new(4.0, 0.0, 0.0), 0.0, -3.0)]);

        stencil_update(&grid, &prev, &mut next, &overlay, BlendMode::Linear, Dispatch::Parallel);
        assert_eq!(next, vec![1.0, 1.0, 1.0, 1.0, -3.0]);
    }
}
