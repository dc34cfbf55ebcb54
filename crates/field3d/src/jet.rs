//! Jets: point sources that override field values inside a radius.
//!
//! Jets are external inputs. Each tick the engine rasterizes the active ones
//! into a [`JetOverlay`] before the stencil pass, so the kernel only does a
//! per-cell lookup and never touches the caller's jet list mid-update.

use crate::grid::GridLayout;
use crate::sample::FieldSample;
use glam::Vec3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Jet<S: FieldSample> {
    /// World-space center
    pub position: Vec3,
    /// Cells whose sample point lies within this distance are overridden
    pub radius: f32,
    /// Inactive jets are ignored
    pub active: bool,
    /// Pressure (scalar field) or force vector (vector field) imposed on covered cells
    pub value: S,
}

impl<S: FieldSample> Jet<S> {
    pub fn new(position: Vec3, radius: f32, value: S) -> Self {
        Self {
            position,
            radius,
            active: true,
            value,
        }
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Whether `point` is inside the jet's sphere (boundary included).
    #[inline]
    pub fn covers(&self, point: Vec3) -> bool {
        point.distance_squared(self.position) <= self.radius * self.radius
    }
}

/// Per-cell source override for one tick. `None` means "diffuse normally".
#[derive(Clone, Debug)]
pub struct JetOverlay<S: FieldSample> {
    cells: Vec<Option<S>>,
    covered: usize,
}

impl<S: FieldSample> JetOverlay<S> {
    pub fn new(cell_count: usize) -> Self {
        Self {
            cells: vec![None; cell_count],
            covered: 0,
        }
    }

    /// Rasterize every active jet. Where jets overlap, the later one wins.
    pub fn rebuild(&mut self, layout: &GridLayout, jets: &[Jet<S>]) {
        debug_assert_eq!(self.cells.len(), layout.cell_count());
        if self.covered > 0 {
            self.cells.fill(None);
            self.covered = 0;
        }

        for jet in jets.iter().filter(|j| j.active) {
            if !(jet.radius >= 0.0 && jet.radius.is_finite() && jet.position.is_finite()) {
                log::warn!(
                    "Ignoring jet at {} with unusable radius {}",
                    jet.position,
                    jet.radius
                );
                continue;
            }
            self.stamp(layout, jet);
        }
    }

    fn stamp(&mut self, layout: &GridLayout, jet: &Jet<S>) {
        let origin = layout.origin();
        let cell_size = layout.cell_size();
        let dims = layout.dims();

        // Candidate box: sample points lie at origin + i * cell_size. Padded by
        // one cell per side for rounding; `covers` makes the final call.
        let lo = ((jet.position - Vec3::splat(jet.radius) - origin) / cell_size).floor() - 1.0;
        let hi = ((jet.position + Vec3::splat(jet.radius) - origin) / cell_size).ceil() + 1.0;
        let range = |lo: f32, hi: f32, dim: usize| {
            let start = (lo.max(0.0) as usize).min(dim);
            let end = if hi < 0.0 { 0 } else { (hi as usize).saturating_add(1).min(dim) };
            start..end.max(start)
        };

        for ix in range(lo.x, hi.x, dims[0]) {
            for iy in range(lo.y, hi.y, dims[1]) {
                for iz in range(lo.z, hi.z, dims[2]) {
                    if !jet.covers(layout.cell_center(ix, iy, iz)) {
                        continue;
                    }
                    let slot = &mut self.cells[layout.cell_index(ix, iy, iz)];
                    if slot.is_none() {
                        self.covered += 1;
                    }
                    *slot = Some(jet.value);
                }
            }
        }
    }

    /// Override for cell `idx`, if any jet covers it.
    #[inline]
    pub fn get(&self, idx: usize) -> Option<S> {
        self.cells[idx]
    }

    /// Number of cells overridden this tick.
    pub fn covered(&self) -> usize {
        self.covered
    }

    pub fn is_empty(&self) -> bool {
        self.covered == 0
    }
}
