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

use crate::convection::HeatFlux;
use crate::error::{ThermalError, ThermalResult};
use crate::masks::ThermalMasks;
use crate::stencil;
use crate::Float;
use ndarray::{s, Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// How often (in iterations) the progress is traced
const TRACE_EVERY: usize = 1000;

/// A rectangle of grid indices (half-open on both axes) whose
/// temperatures decide whether the solution has converged.
///
/// This allows, e.g., converging on the temperature of the processor
/// while ignoring what happens at the tip of the heat-sink fins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvergenceRegion {
    /// Range of indices along $`x`$
    pub x: Range<usize>,
    /// Range of indices along $`y`$
    pub y: Range<usize>,
}

impl ConvergenceRegion {
    pub fn new(x: Range<usize>, y: Range<usize>) -> Self {
        Self { x, y }
    }

    /// The region covering a whole grid of shape `(width, height)`
    pub fn whole((width, height): (usize, usize)) -> Self {
        Self {
            x: 0..width,
            y: 0..height,
        }
    }

    /// Checks that the region is not empty and fits in a grid of shape `shape`
    pub fn validate(&self, shape: (usize, usize)) -> ThermalResult<()> {
        let fits = |range: &Range<usize>, n: usize| range.start < range.end && range.end <= n;
        if !fits(&self.x, shape.0) || !fits(&self.y, shape.1) {
            return Err(ThermalError::InvalidRegion {
                x: self.x.clone(),
                y: self.y.clone(),
                shape,
            });
        }
        Ok(())
    }

    /// Whether point `(i,j)` is within the region
    pub fn contains(&self, i: usize, j: usize) -> bool {
        self.x.contains(&i) && self.y.contains(&j)
    }

    /// The number of points in the region
    pub fn len(&self) -> usize {
        self.x.len() * self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The options of the solver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    /// The solution is considered converged when the fractional change
    /// between two iterations is smaller than this
    pub tolerance: Float,

    /// The iteration counter is allowed to reach this value. The next
    /// iteration is returned with [`ConvergenceStatus::MaxIterationsReached`].
    pub max_iterations: usize,

    /// The region that decides convergence. `None` means the whole grid.
    pub region: Option<ConvergenceRegion>,

    /// The weight $`\omega`$ given to the Jacobi update, so that every solid
    /// point takes the value $`(1-\omega) T_{old} + \omega T_{jacobi}`$.
    ///
    /// One (the default) is the plain Jacobi method. Values below one do
    /// not change the solution but damp the odd-even oscillations that
    /// temperature-dependent boundary fluxes tend to amplify.
    pub relaxation: Float,
}

impl std::default::Default for SolverOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-7,
            max_iterations: 100_000,
            region: None,
            relaxation: 1.,
        }
    }
}

impl SolverOptions {
    /// Checks the options against a grid of shape `shape`
    pub fn validate(&self, shape: (usize, usize)) -> ThermalResult<()> {
        if !(self.tolerance > 0. && self.tolerance.is_finite()) {
            return Err(ThermalError::InvalidTolerance(self.tolerance));
        }
        if self.tolerance < Float::EPSILON {
            log::warn!(
                "Tolerance {:e} is below the machine epsilon ({:e}), so it may never be met",
                self.tolerance,
                Float::EPSILON
            );
        }
        if !(self.relaxation > 0. && self.relaxation <= 1.) {
            return Err(ThermalError::InvalidRelaxation(self.relaxation));
        }
        if let Some(region) = &self.region {
            region.validate(shape)?;
        }
        Ok(())
    }
}

/// How the solver stopped. All cases carry the
/// number of iterations performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConvergenceStatus {
    /// The fractional change fell below the tolerance
    Converged { iterations: usize },

    /// The iteration counter went beyond the maximum. The temperatures are
    /// still the best available estimate.
    MaxIterationsReached { iterations: usize },

    /// The temperatures within the convergence region stopped being finite
    /// numbers, so they are not an estimate of anything. Relaxing the
    /// iterations (see [`SolverOptions::relaxation`]) usually fixes this.
    Diverged { iterations: usize },
}

impl ConvergenceStatus {
    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged { .. })
    }

    pub fn iterations(&self) -> usize {
        match self {
            Self::Converged { iterations }
            | Self::MaxIterationsReached { iterations }
            | Self::Diverged { iterations } => *iterations,
        }
    }
}

/// The temperatures found by the solver, and how it got there
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// The temperature of each grid point, in $`C`$
    pub temperatures: Array2<Float>,

    pub status: ConvergenceStatus,
}

impl Solution {
    pub fn is_converged(&self) -> bool {
        self.status.is_converged()
    }
}

/// The Euclidean norm of the values of `field` within `region`
pub fn region_norm(field: &ArrayView2<Float>, region: &ConvergenceRegion) -> Float {
    field
        .slice(s![region.x.clone(), region.y.clone()])
        .iter()
        .map(|v| v * v)
        .sum::<Float>()
        .sqrt()
}

/// Relative change between two norms. `None` if it is undefined.
fn relative_change(current_norm: Float, previous_norm: Float) -> Option<Float> {
    let change = (current_norm - previous_norm).abs();
    if previous_norm == 0. {
        // 0/0 means nothing changed; x/0 means we cannot tell
        if change == 0. {
            Some(0.)
        } else {
            None
        }
    } else {
        Some(change / previous_norm)
    }
}

/// Determines the fractional change between two iterations, comparing
/// their norms within a region:
///
/// ```math
/// \frac{\left| \|T_{current}\| - \|T_{previous}\| \right|}{\|T_{previous}\|}
/// ```
///
/// Returns `None` if the previous norm is zero but the current one is not.
pub fn fractional_change(
    current: &ArrayView2<Float>,
    previous: &ArrayView2<Float>,
    region: &ConvergenceRegion,
) -> Option<Float> {
    relative_change(region_norm(current, region), region_norm(previous, region))
}

fn check_inputs(
    temperatures: (usize, usize),
    masks: &ThermalMasks,
    step: Float,
) -> ThermalResult<()> {
    masks.validate()?;
    let expected = masks.shape();
    if temperatures != expected {
        return Err(ThermalError::ShapeMismatch {
            array: "temperatures",
            expected,
            found: temperatures,
        });
    }
    if !(step > 0. && step.is_finite()) {
        return Err(ThermalError::InvalidStepSize(step));
    }
    Ok(())
}

/// Writes into `new` the (relaxed) Jacobi update of every point of `old`.
///
/// Both arrays are expected to be checked already.
fn sweep<B: HeatFlux + ?Sized>(
    old: &ArrayView2<Float>,
    new: &mut Array2<Float>,
    masks: &ThermalMasks,
    step: Float,
    boundary: &B,
    relaxation: Float,
) {
    let update = |i: usize, j: usize| -> Float {
        if !masks.operations[[i, j]].is_solid() {
            return old[[i, j]];
        }
        let jacobi = stencil::next_temperature(old, masks, step, boundary, i, j);
        stencil::relax(old[[i, j]], jacobi, relaxation)
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        let height = new.ncols();
        // Standard layout means that each chunk of `height` values is a column at fixed x
        if let Some(values) = new.as_slice_mut() {
            values
                .par_chunks_mut(height)
                .enumerate()
                .for_each(|(i, column)| {
                    for (j, v) in column.iter_mut().enumerate() {
                        *v = update(i, j);
                    }
                });
            return;
        }
    }

    new.indexed_iter_mut()
        .for_each(|((i, j), v)| *v = update(i, j));
}

/// Performs a single Jacobi iteration over the temperatures `old`,
/// returning the new ones.
pub fn iterate<B: HeatFlux + ?Sized>(
    old: &Array2<Float>,
    masks: &ThermalMasks,
    step: Float,
    boundary: &B,
) -> ThermalResult<Array2<Float>> {
    check_inputs(old.dim(), masks, step)?;
    let old = old.as_standard_layout();
    let mut new = old.to_owned();
    sweep(&old.view(), &mut new, masks, step, boundary, 1.);
    Ok(new)
}

/// Solves the steady-state temperature of a solid by Jacobi relaxation.
///
/// Starting from `initial`, every iteration updates all solid points
/// based on the previous iteration, evaluating the `boundary` flux at the
/// previous surface temperatures. After each iteration, the counter is
/// increased and:
///
/// 1. If the temperatures within `options.region` are no longer finite, they
///    are returned as [`ConvergenceStatus::Diverged`]
/// 2. If the counter is beyond `options.max_iterations`, the current
///    temperatures are returned as [`ConvergenceStatus::MaxIterationsReached`]
///    (so a maximum of zero still performs one iteration)
/// 3. If the [`fractional_change`] within `options.region` is below
///    `options.tolerance`, they are returned as [`ConvergenceStatus::Converged`]
///
/// An undefined fractional change (i.e., the previous norm was zero) means
/// that the solution has not converged yet.
///
/// Errors are returned only for invalid inputs, before iterating.
pub fn solve<B: HeatFlux + ?Sized>(
    initial: Array2<Float>,
    masks: &ThermalMasks,
    step: Float,
    boundary: &B,
    options: &SolverOptions,
) -> ThermalResult<Solution> {
    let shape = initial.dim();
    check_inputs(shape, masks, step)?;
    options.validate(shape)?;

    let region = options
        .region
        .clone()
        .unwrap_or_else(|| ConvergenceRegion::whole(shape));

    let mut current = if initial.is_standard_layout() {
        initial
    } else {
        initial.as_standard_layout().into_owned()
    };
    let mut next = current.clone();
    let mut previous_norm = region_norm(&current.view(), &region);

    log::debug!(
        "Solving a {}x{} grid ({} solid points) with step {} m, tolerance {:e} and relaxation {}",
        shape.0,
        shape.1,
        masks.n_solid(),
        step,
        options.tolerance,
        options.relaxation
    );

    let mut iterations: usize = 0;
    loop {
        sweep(
            &current.view(),
            &mut next,
            masks,
            step,
            boundary,
            options.relaxation,
        );
        std::mem::swap(&mut current, &mut next);
        iterations += 1;

        let current_norm = region_norm(&current.view(), &region);
        if !current_norm.is_finite() {
            log::warn!(
                "Temperatures diverged after {} iterations (relaxation = {})",
                iterations,
                options.relaxation
            );
            return Ok(Solution {
                temperatures: current,
                status: ConvergenceStatus::Diverged { iterations },
            });
        }

        if iterations > options.max_iterations {
            log::warn!(
                "Maximum number of iterations ({}) reached before converging",
                options.max_iterations
            );
            return Ok(Solution {
                temperatures: current,
                status: ConvergenceStatus::MaxIterationsReached { iterations },
            });
        }

        let change = relative_change(current_norm, previous_norm);
        previous_norm = current_norm;

        if iterations % TRACE_EVERY == 0 {
            log::trace!("Iteration {}: fractional change = {:?}", iterations, change);
        }

        if let Some(change) = change {
            if change < options.tolerance {
                log::info!(
                    "Converged after {} iterations (fractional change = {:e})",
                    iterations,
                    change
                );
                return Ok(Solution {
                    temperatures: current,
                    status: ConvergenceStatus::Converged { iterations },
                });
            }
        }
    }
}

/***********/
/* TESTING */
/***********/
