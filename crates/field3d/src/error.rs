//! Errors raised while building or stepping a field.
//!
//! Only configuration problems and a missing jet source are errors.
//! Out-of-range queries are boundary anomalies: they return the zero sample
//! and are logged, see [`crate::field::FieldState::get`].

use crate::config::FieldKind;
use glam::Vec3;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldError {
    /// At least one axis has zero cells, or the cell count is too large to allocate.
    InvalidDimensions([usize; 3]),
    /// Grid extent is not positive and finite on every axis.
    InvalidSize(Vec3),
    /// Requested cell size is not positive and finite.
    InvalidCellSize(f32),
    /// Coupling strength is negative or not finite.
    InvalidStrength(f32),
    /// Debug report interval is not positive and finite.
    InvalidDebugInterval(f32),
    /// Config asks for one field kind, engine was instantiated for another.
    KindMismatch { expected: FieldKind, found: FieldKind },
    /// Seed policy cannot produce samples of this kind.
    UnsupportedSeed { kind: FieldKind, seed: &'static str },
    /// Source injection requires at least one jet but none were supplied.
    MissingSource,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldError::InvalidDimensions(dims) => {
                write!(f, "grid needs >= 1 cell per axis and an allocatable total, got {:?}", dims)
            }
            FieldError::InvalidSize(size) => {
                write!(f, "grid size must be positive on every axis, got {}", size)
            }
            FieldError::InvalidCellSize(cell) => {
                write!(f, "cell size must be positive, got {}", cell)
            }
            FieldError::InvalidStrength(strength) => {
                write!(f, "coupling strength must be finite and >= 0, got {}", strength)
            }
            FieldError::InvalidDebugInterval(interval) => {
                write!(f, "debug interval must be finite and > 0, got {}", interval)
            }
            FieldError::KindMismatch { expected, found } => {
                write!(
                    f,
                    "field kind mismatch: engine holds {:?}, config asks for {:?}",
                    expected, found
                )
            }
            FieldError::UnsupportedSeed { kind, seed } => {
                write!(f, "seed policy {} cannot seed a {:?} field", seed, kind)
            }
            FieldError::MissingSource => {
                write!(f, "source injection requires at least one jet, none supplied")
            }
        }
    }
}

impl std::error::Error for FieldError {}
