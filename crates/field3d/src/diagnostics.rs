//! Periodic, read-only inspection of a running field.

use crate::field::FieldState;
use crate::sample::FieldSample;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Summary over every cell. Magnitudes are `|v|` for pressure, length for vectors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldStats {
    pub min_magnitude: f32,
    pub max_magnitude: f32,
    pub mean_magnitude: f32,
    /// Cells holding NaN or infinity; excluded from the magnitudes.
    pub non_finite: usize,
}

impl FieldStats {
    pub fn from_samples<S: FieldSample>(samples: &[S]) -> Self {
        let mut min = f32::INFINITY;
        let mut max = 0.0f32;
        let mut sum = 0.0f64;
        let mut finite = 0usize;
        let mut non_finite = 0usize;

        for sample in samples {
            if !sample.is_finite() {
                non_finite += 1;
                continue;
            }
            let m = sample.magnitude();
            min = min.min(m);
            max = max.max(m);
            sum += m as f64;
            finite += 1;
        }

        if finite == 0 {
            min = 0.0;
        }

        Self {
            min_magnitude: min,
            max_magnitude: max,
            mean_magnitude: if finite > 0 { (sum / finite as f64) as f32 } else { 0.0 },
            non_finite,
        }
    }
}

/// Debug sampling settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DebugConfig {
    pub enabled: bool,
    /// Simulated seconds between reports
    pub interval: f32,
    /// Cells printed in each report
    pub probes: Vec<[usize; 3]>,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: 1.0,
            probes: vec![[0, 0, 0], [0, 1, 1]],
        }
    }
}

/// One periodic snapshot.
#[derive(Clone, Debug)]
pub struct DebugReport<S: FieldSample> {
    pub frame: u64,
    /// Probe cell and its value; probes outside the grid are skipped.
    pub samples: Vec<([usize; 3], S)>,
    pub stats: FieldStats,
}

impl<S: FieldSample> fmt::Display for DebugReport<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame {}:", self.frame)?;
        for (cell, value) in &self.samples {
            write!(f, " {:?}={:?}", cell, value)?;
        }
        write!(
            f,
            " | |v| min {:.4} max {:.4} mean {:.4}",
            self.stats.min_magnitude, self.stats.max_magnitude, self.stats.mean_magnitude
        )?;
        if self.stats.non_finite > 0 {
            write!(f, " | {} non-finite cells", self.stats.non_finite)?;
        }
        Ok(())
    }
}

/// Emits a [`DebugReport`] once every `interval` simulated seconds.
#[derive(Clone, Debug)]
pub struct DebugSampler {
    interval: f32,
    remaining: f32,
    probes: Vec<[usize; 3]>,
}

impl DebugSampler {
    pub fn new(interval: f32, probes: Vec<[usize; 3]>) -> Self {
        Self {
            interval,
            remaining: interval,
            probes,
        }
    }

    /// `None` when debug output is disabled.
    pub fn from_config(config: &DebugConfig) -> Option<Self> {
        config
            .enabled
            .then(|| Self::new(config.interval, config.probes.clone()))
    }

    /// Advance the clock by `dt`; reports and logs when the interval elapses.
    pub fn tick<S: FieldSample>(
        &mut self,
        dt: f32,
        state: &FieldState<S>,
        frame: u64,
    ) -> Option<DebugReport<S>> {
        self.remaining -= dt;
        if self.remaining > 0.0 {
            return None;
        }
        self.remaining = self.interval;

        let report = self.sample(state, frame);
        log::info!("Field debug {}", report);
        if report.stats.non_finite > 0 {
            log::warn!("{} non-finite cells in field", report.stats.non_finite);
        }
        Some(report)
    }

    /// Read the probes now, without touching the clock.
    pub fn sample<S: FieldSample>(&self, state: &FieldState<S>, frame: u64) -> DebugReport<S> {
        let layout = state.layout();
        let samples = self
            .probes
            .iter()
            .filter_map(|&[ix, iy, iz]| {
                layout
                    .checked_index(ix as i64, iy as i64, iz as i64)
                    .map(|idx| ([ix, iy, iz], state.cells()[idx]))
            })
            .collect();

        DebugReport {
            frame,
            samples,
            stats: state.stats(),
        }
    }
}
