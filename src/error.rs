/*
MIT License
Copyright (c) 2021 Germán Molina
Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:
The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.
THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

use crate::operation::Operation;
use crate::Float;
use thiserror::Error;

/// Result type used throughout the crate
pub type ThermalResult<T> = Result<T, ThermalError>;

/// The things that can go wrong before (or while) building
/// and solving a thermal problem.
///
/// Note that reaching the maximum number of iterations is not
/// here: that is reported through [`crate::ConvergenceStatus`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThermalError {
    /// An array does not have the shape of the temperature grid
    #[error("'{array}' has shape {found:?}... expecting {expected:?}")]
    ShapeMismatch {
        array: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// The grid has no points at all
    #[error("Cannot solve an empty grid of shape {0:?}")]
    EmptyGrid((usize, usize)),

    #[error("Step size must be positive and finite... found {0}")]
    InvalidStepSize(Float),

    #[error("Stopping tolerance must be positive and finite... found {0}")]
    InvalidTolerance(Float),

    #[error("Relaxation weight must be within (0, 1]... found {0}")]
    InvalidRelaxation(Float),

    /// The convergence region is empty or does not fit in the grid
    #[error("Convergence region x={x:?}, y={y:?} does not fit in a grid of shape {shape:?}")]
    InvalidRegion {
        x: std::ops::Range<usize>,
        y: std::ops::Range<usize>,
        shape: (usize, usize),
    },

    /// A solid cell cannot conduct heat
    #[error("Cell ({i},{j}) is solid but has a thermal conductivity of {conductivity} W/m.K")]
    InvalidConductivity {
        i: usize,
        j: usize,
        conductivity: Float,
    },

    /// The operation of a cell needs a neighbour that is outside of
    /// the grid (i.e., the operation mask is malformed)
    #[error("Cell ({i},{j}) is marked as {operation:?}, which reads a neighbour outside of the grid")]
    StencilOutOfBounds {
        i: usize,
        j: usize,
        operation: Operation,
    },

    /// The operation mask holds a value that is not an operation code
    #[error("Found unknown operation code {code} at cell ({i},{j})")]
    UnknownOperation { i: usize, j: usize, code: u8 },

    #[error("Cannot build a grid without objects")]
    NoObjects,

    /// An object does not span, at least, two grid points on each axis
    #[error("Object '{name}' is too small to be represented with a step size of {step} m")]
    DegenerateObject { name: String, step: Float },

    /// A point is exposed to the air on two opposite sides, so
    /// no operation can represent it
    #[error("Point ({i},{j}) is exposed on two opposite faces... refine the step size")]
    UnresolvableCell { i: usize, j: usize },

    /// Two objects of different conductivity meet somewhere other than
    /// a horizontal interface
    #[error("Objects '{first}' and '{second}' overlap or meet side by side at point ({i},{j})")]
    UnsupportedContact {
        first: String,
        second: String,
        i: usize,
        j: usize,
    },

    /// Averages need at least one solid point
    #[error("There are no solid points in region x={x:?}, y={y:?}")]
    NoSolidPoints {
        x: std::ops::Range<usize>,
        y: std::ops::Range<usize>,
    },

    #[error("Invalid heat sink: {0}")]
    InvalidHeatSink(String),
}
