//! Field configuration, fixed at creation time.

use crate::diagnostics::DebugConfig;
use crate::error::FieldError;
use crate::grid::GridLayout;
use crate::seed::SeedPolicy;
use crate::stencil::{BlendMode, Dispatch};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Which sample type the grid holds. One engine never mixes the two.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum FieldKind {
    /// Directional flow, one `Vec3` per cell.
    Vector,
    /// Scalar pressure, one `f32` per cell.
    Pressure,
}

/// How the grid resolution is specified.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub enum Resolution {
    /// Explicit cell counts along x, y, z.
    Dimensions([usize; 3]),
    /// Target cell edge length; counts are derived from the grid size.
    CellSize(f32),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldConfig {
    /// World-space minimum corner of the grid box.
    #[serde(with = "crate::serde_utils::vec3")]
    pub origin: Vec3,
    /// World-space extent of the grid box.
    #[serde(with = "crate::serde_utils::vec3")]
    pub size: Vec3,
    pub resolution: Resolution,
    pub kind: FieldKind,

    #[serde(default)]
    pub seed: SeedPolicy,

    /// Source strength coefficient handed to the coupling layer.
    /// Each ring receives `strength / contact_count * effector` per contact.
    #[serde(default = "default_strength")]
    pub strength: f32,

    #[serde(default)]
    pub blend: BlendMode,
    #[serde(default)]
    pub dispatch: Dispatch,

    /// Refuse to update when no jets are supplied.
    #[serde(default)]
    pub require_source: bool,

    #[serde(default)]
    pub debug: DebugConfig,
}

fn default_strength() -> f32 {
    1.0
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            size: Vec3::new(10.0, 4.0, 10.0),
            resolution: Resolution::Dimensions([10, 4, 10]),
            kind: FieldKind::Vector,
            seed: SeedPolicy::default(),
            strength: default_strength(),
            blend: BlendMode::default(),
            dispatch: Dispatch::default(),
            require_source: false,
            debug: DebugConfig::default(),
        }
    }
}

impl FieldConfig {
    /// Vector field over `origin..origin + size` with explicit cell counts.
    pub fn vector(origin: Vec3, size: Vec3, dims: [usize; 3]) -> Self {
        Self {
            origin,
            size,
            resolution: Resolution::Dimensions(dims),
            kind: FieldKind::Vector,
            seed: SeedPolicy::Zero,
            ..Default::default()
        }
    }

    /// Pressure field over `origin..origin + size` with explicit cell counts.
    pub fn pressure(origin: Vec3, size: Vec3, dims: [usize; 3]) -> Self {
        Self {
            origin,
            size,
            resolution: Resolution::Dimensions(dims),
            kind: FieldKind::Pressure,
            seed: SeedPolicy::Zero,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: SeedPolicy) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength;
        self
    }

    pub fn with_require_source(mut self, require_source: bool) -> Self {
        self.require_source = require_source;
        self
    }

    /// Cell counts implied by the resolution setting.
    pub fn dimensions(&self) -> Result<[usize; 3], FieldError> {
        match self.resolution {
            Resolution::Dimensions(dims) => Ok(dims),
            Resolution::CellSize(cell) => {
                if !(cell.is_finite() && cell > 0.0) {
                    return Err(FieldError::InvalidCellSize(cell));
                }
                // Slack keeps 10.0 / 0.1 from rounding up to 101 cells.
                let count = |extent: f32| ((extent / cell - 1e-4).ceil().max(1.0)) as usize;
                Ok([count(self.size.x), count(self.size.y), count(self.size.z)])
            }
        }
    }

    /// Validate everything and derive the grid layout.
    pub fn layout(&self) -> Result<GridLayout, FieldError> {
        if !(self.strength.is_finite() && self.strength >= 0.0) {
            return Err(FieldError::InvalidStrength(self.strength));
        }
        if !self.size.is_finite() || self.size.min_element() <= 0.0 {
            return Err(FieldError::InvalidSize(self.size));
        }
        if self.debug.enabled && !(self.debug.interval.is_finite() && self.debug.interval > 0.0) {
            return Err(FieldError::InvalidDebugInterval(self.debug.interval));
        }
        let dims = self.dimensions()?;
        GridLayout::new(self.origin, self.size, dims)
    }

    /// Fail fast on any configuration anomaly.
    pub fn validate(&self) -> Result<(), FieldError> {
        self.layout().map(|_| ())
    }

    /// Save configuration to JSON file
    pub fn save_json(&self, path: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load configuration from JSON file
    pub fn load_json(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let json = std::fs::read_to_string(path)?;
        let config: FieldConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}
