//! A Finite Difference-based steady-state conduction module
//!
//! It estimates the temperature distribution of a 2D solid made of several
//! rectangular materials (e.g., a microprocessor, its ceramic case and a
//! heat-sink) that generate heat and lose it to the air around them. The Poisson
//! equation is solved through Jacobi relaxation with flux (i.e., Neumann)
//! boundary conditions that depend on the surface temperature.

#[cfg(not(feature = "float"))]
/// The kind of Floating point number used in the
/// library... the `"float"` feature means it becomes `f32`
/// and `f64` is used otherwise.
pub type Float = f64;

#[cfg(feature = "float")]
/// The kind of Floating point number used in the
/// library... the `"float"` feature means it becomes `f32`
/// and `f64` is used otherwise.
pub type Float = f32;

pub mod analysis;
pub mod convection;
pub mod error;
pub mod geometry;
pub mod masks;
pub mod operation;
pub mod solver;
pub mod stencil;
pub mod system;

pub use convection::{Convection, ConvectionRegime, FaceFlux, HeatFlux};
pub use error::ThermalError;
pub use masks::ThermalMasks;
pub use operation::{Face, Operation};
pub use solver::{solve, ConvergenceRegion, ConvergenceStatus, Solution, SolverOptions};
