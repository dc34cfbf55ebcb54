//! Authoritative cell storage and point queries.

use crate::diagnostics::FieldStats;
use crate::error::FieldError;
use crate::grid::GridLayout;
use crate::sample::FieldSample;
use crate::seed::SeedPolicy;
use glam::Vec3;
use std::sync::atomic::{AtomicU64, Ordering};

/// Current cell samples of one field plus its layout.
///
/// Out-of-range reads and writes are boundary anomalies: they are logged,
/// counted, and answered with the zero sample. They never panic.
#[derive(Debug)]
pub struct FieldState<S: FieldSample> {
    layout: GridLayout,
    cells: Vec<S>,
    anomalies: AtomicU64,
}

impl<S: FieldSample> Clone for FieldState<S> {
    fn clone(&self) -> Self {
        Self {
            layout: self.layout,
            cells: self.cells.clone(),
            anomalies: AtomicU64::new(self.anomaly_count()),
        }
    }
}

impl<S: FieldSample> FieldState<S> {
    /// All-zero field.
    pub fn new(layout: GridLayout) -> Self {
        Self {
            cells: vec![S::ZERO; layout.cell_count()],
            layout,
            anomalies: AtomicU64::new(0),
        }
    }

    /// Field populated by `policy`.
    pub fn seeded(layout: GridLayout, policy: &SeedPolicy) -> Result<Self, FieldError> {
        let mut state = Self::new(layout);
        state.seed(policy)?;
        Ok(state)
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn cells(&self) -> &[S] {
        &self.cells
    }

    /// Number of out-of-range queries seen so far.
    pub fn anomaly_count(&self) -> u64 {
        self.anomalies.load(Ordering::Relaxed)
    }

    fn report_anomaly(&self, what: &str, cell: [i64; 3]) {
        self.anomalies.fetch_add(1, Ordering::Relaxed);
        log::warn!(
            "Boundary anomaly: {} at cell {:?} outside grid {:?}",
            what,
            cell,
            self.layout.dims()
        );
    }

    // ========== Cell accessors ==========

    /// Sample at `(ix, iy, iz)`, or zero with a diagnostic when out of range.
    pub fn get(&self, ix: i64, iy: i64, iz: i64) -> S {
        match self.layout.checked_index(ix, iy, iz) {
            Some(idx) => self.cells[idx],
            None => {
                self.report_anomaly("read", [ix, iy, iz]);
                S::ZERO
            }
        }
    }

    /// Write one cell. Out-of-range writes are dropped and reported; returns
    /// whether the write happened.
    pub fn set(&mut self, ix: i64, iy: i64, iz: i64, value: S) -> bool {
        match self.layout.checked_index(ix, iy, iz) {
            Some(idx) => {
                self.cells[idx] = value;
                true
            }
            None => {
                self.report_anomaly("write", [ix, iy, iz]);
                false
            }
        }
    }

    /// Sample of the cell nearest to `point`. Points further than half a cell
    /// outside the grid are boundary anomalies and read as zero.
    pub fn sample_at_point(&self, point: Vec3) -> S {
        let [ix, iy, iz] = self.layout.world_to_cell_unclamped(point);
        self.get(ix, iy, iz)
    }

    /// Like [`sample_at_point`](Self::sample_at_point) but outside points read
    /// the nearest edge cell.
    pub fn sample_at_point_clamped(&self, point: Vec3) -> S {
        let [ix, iy, iz] = self.layout.world_to_cell(point);
        self.cells[self.layout.cell_index(ix, iy, iz)]
    }

    /// Force/pressure sample for a ring contact point.
    #[inline]
    pub fn effector_at(&self, point: Vec3) -> S {
        self.sample_at_point(point)
    }

    // ========== Whole-field operations ==========

    /// Zero every cell.
    pub fn reset(&mut self) {
        self.cells.fill(S::ZERO);
    }

    /// Repopulate every cell from `policy`.
    pub fn seed(&mut self, policy: &SeedPolicy) -> Result<(), FieldError> {
        // Probe once so unsupported policies fail before any cell is touched.
        if S::seeded(policy, &self.layout, [0, 0, 0]).is_none() {
            return Err(FieldError::UnsupportedSeed {
                kind: S::KIND,
                seed: policy.name(),
            });
        }
        let layout = self.layout;
        self.seed_with(|_, cell| S::seeded(policy, &layout, cell).unwrap_or(S::ZERO));
        Ok(())
    }

    /// Repopulate every cell from a custom function of the cell coordinates.
    pub fn seed_with<F>(&mut self, mut f: F)
    where
        F: FnMut(&GridLayout, [usize; 3]) -> S,
    {
        for (idx, cell) in self.layout.cells() {
            self.cells[idx] = f(&self.layout, cell);
        }
    }

    /// Summary statistics over every cell.
    pub fn stats(&self) -> FieldStats {
        FieldStats::from_samples(&self.cells)
    }

    /// Swap in a freshly computed buffer, handing back the previous one.
    pub(crate) fn swap_cells(&mut self, next: &mut Vec<S>) {
        debug_assert_eq!(next.len(), self.cells.len());
        std::mem::swap(&mut self.cells, next);
    }
}
