//! 3D Field Grid Engine
//!
//! A box of cells holding either a flow vector or a pressure value per cell.
//! Every tick the whole grid is smoothed with a 26-neighbour stencil, jets
//! (point sources) stamp their value into the cells they cover, and rings
//! (external rigid bodies) read the field back at their contact points to
//! get the force applied to them.
//!
//! # Example
//!
//! ```
//! use field3d::{FieldConfig, Jet, Ring, SeedPolicy, Vec3, VectorField};
//!
//! let config = FieldConfig::vector(Vec3::ZERO, Vec3::splat(8.0), [8, 8, 8])
//!     .with_seed(SeedPolicy::Swirl { tilt_degrees: -40.0 });
//! let mut field = VectorField::new(&config).unwrap();
//!
//! // One jet blowing upward from the floor
//! let jets = [Jet::new(Vec3::new(4.0, 0.0, 4.0), 1.5, Vec3::Y * 3.0)];
//!
//! let mut ring = Ring::circle(Vec3::new(4.0, 2.0, 4.0), 1.0, 6);
//! for _ in 0..10 {
//!     ring.clear_forces();
//!     field.apply_ring_forces(std::slice::from_mut(&mut ring));
//!     field.step(1.0 / 50.0, &jets).unwrap();
//! }
//! ```

pub mod config;
pub mod coupling;
pub mod diagnostics;
pub mod error;
pub mod field;
pub mod grid;
pub mod jet;
pub mod sample;
pub mod seed;
pub mod serde_utils;
pub mod stencil;

pub use config::{FieldConfig, FieldKind, Resolution};
pub use coupling::{CouplingTarget, Ring, RingCoupling};
pub use diagnostics::{DebugConfig, DebugReport, DebugSampler, FieldStats};
pub use error::FieldError;
pub use field::FieldState;
pub use glam::Vec3;
pub use grid::GridLayout;
pub use jet::{Jet, JetOverlay};
pub use sample::FieldSample;
pub use seed::SeedPolicy;
pub use stencil::{BlendMode, Dispatch};

/// Field of flow vectors.
pub type VectorField = FieldEngine<Vec3>;
/// Field of scalar pressures.
pub type PressureField = FieldEngine<f32>;

/// Double-buffered field simulation.
pub struct FieldEngine<S: FieldSample> {
    /// Current (authoritative) samples
    state: FieldState<S>,
    /// Scratch buffer the stencil writes into; swapped with `state` each tick
    next: Vec<S>,
    /// Jet influence for the tick in progress
    overlay: JetOverlay<S>,

    pub blend: BlendMode,
    pub dispatch: Dispatch,
    /// Refuse to update without at least one jet
    pub require_source: bool,
    /// Force conversion for rings
    pub coupling: RingCoupling,

    sampler: Option<DebugSampler>,
    frame: u64,
}

impl<S: FieldSample> FieldEngine<S> {
    /// Allocate and seed a field. Fails on any configuration anomaly or if
    /// `config.kind` does not match `S`.
    pub fn new(config: &FieldConfig) -> Result<Self, FieldError> {
        if config.kind != S::KIND {
            return Err(FieldError::KindMismatch {
                expected: S::KIND,
                found: config.kind,
            });
        }

        let layout = config.layout()?;
        let state = FieldState::seeded(layout, &config.seed)?;
        let cell_count = layout.cell_count();

        log::info!(
            "Field {:?} {} {} {} allocated, {} cells, cell size {}, seed {}",
            S::KIND,
            layout.dims()[0],
            layout.dims()[1],
            layout.dims()[2],
            cell_count,
            layout.cell_size(),
            config.seed.name()
        );

        Ok(Self {
            next: state.cells().to_vec(),
            state,
            overlay: JetOverlay::new(cell_count),
            blend: config.blend,
            dispatch: config.dispatch,
            require_source: config.require_source,
            coupling: RingCoupling {
                strength: config.strength,
                ..Default::default()
            },
            sampler: DebugSampler::from_config(&config.debug),
            frame: 0,
        })
    }

    /// Advance the field by one tick.
    ///
    /// The jet list is rasterized first, then every cell is recomputed from
    /// the previous buffer and the result is swapped in as a whole.
    pub fn update(&mut self, jets: &[Jet<S>]) -> Result<(), FieldError> {
        if self.require_source && jets.is_empty() {
            log::error!("Field update refused at frame {}: no jets supplied", self.frame);
            return Err(FieldError::MissingSource);
        }

        let layout = *self.state.layout();
        self.overlay.rebuild(&layout, jets);

        stencil::stencil_update(
            &layout,
            self.state.cells(),
            &mut self.next,
            &self.overlay,
            self.blend,
            self.dispatch,
        );
        self.state.swap_cells(&mut self.next);

        self.frame += 1;
        Ok(())
    }

    /// [`update`](Self::update), then advance the debug clock by `dt`.
    /// Returns the debug report when one is due.
    pub fn step(&mut self, dt: f32, jets: &[Jet<S>]) -> Result<Option<DebugReport<S>>, FieldError> {
        self.update(jets)?;
        Ok(self
            .sampler
            .as_mut()
            .and_then(|sampler| sampler.tick(dt, &self.state, self.frame)))
    }

    /// Sample for a contact point; zero plus a diagnostic outside the grid.
    pub fn effector_at(&self, point: Vec3) -> S {
        self.state.effector_at(point)
    }

    pub fn sample_at_point(&self, point: Vec3) -> S {
        self.state.sample_at_point(point)
    }

    /// Push the current field onto every ring. Returns the summed force.
    pub fn apply_ring_forces<T: CouplingTarget>(&self, rings: &mut [T]) -> Vec3 {
        self.coupling.apply_all(&self.state, rings)
    }

    /// Zero every cell ("clear simulation"). The frame counter keeps running.
    pub fn reset(&mut self) {
        self.state.reset();
        log::info!("Field cleared at frame {}", self.frame);
    }

    pub fn state(&self) -> &FieldState<S> {
        &self.state
    }

    /// Direct cell access between ticks.
    pub fn state_mut(&mut self) -> &mut FieldState<S> {
        &mut self.state
    }

    pub fn layout(&self) -> &GridLayout {
        self.state.layout()
    }

    /// Number of completed updates.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn debug_sampler(&self) -> Option<&DebugSampler> {
        self.sampler.as_ref()
    }
}

/// Field whose kind is picked at runtime from a config.
pub enum AnyFieldEngine {
    Vector(VectorField),
    Pressure(PressureField),
}

impl AnyFieldEngine {
    pub fn from_config(config: &FieldConfig) -> Result<Self, FieldError> {
        Ok(match config.kind {
            FieldKind::Vector => AnyFieldEngine::Vector(FieldEngine::new(config)?),
            FieldKind::Pressure => AnyFieldEngine::Pressure(FieldEngine::new(config)?),
        })
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            AnyFieldEngine::Vector(_) => FieldKind::Vector,
            AnyFieldEngine::Pressure(_) => FieldKind::Pressure,
        }
    }

    pub fn frame(&self) -> u64 {
        match self {
            AnyFieldEngine::Vector(f) => f.frame(),
            AnyFieldEngine::Pressure(f) => f.frame(),
        }
    }

    pub fn layout(&self) -> &GridLayout {
        match self {
            AnyFieldEngine::Vector(f) => f.layout(),
            AnyFieldEngine::Pressure(f) => f.layout(),
        }
    }

    pub fn stats(&self) -> FieldStats {
        match self {
            AnyFieldEngine::Vector(f) => f.state().stats(),
            AnyFieldEngine::Pressure(f) => f.state().stats(),
        }
    }

    pub fn reset(&mut self) {
        match self {
            AnyFieldEngine::Vector(f) => f.reset(),
            AnyFieldEngine::Pressure(f) => f.reset(),
        }
    }

    pub fn apply_ring_forces<T: CouplingTarget>(&self, rings: &mut [T]) -> Vec3 {
        match self {
            AnyFieldEngine::Vector(f) => f.apply_ring_forces(rings),
            AnyFieldEngine::Pressure(f) => f.apply_ring_forces(rings),
        }
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        match self {
            AnyFieldEngine::Vector(f) => f.coupling.set_gravity(gravity),
            AnyFieldEngine::Pressure(f) => f.coupling.set_gravity(gravity),
        }
    }
}
