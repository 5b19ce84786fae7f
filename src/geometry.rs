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

//! Turns a set of rectangular blocks of material into the masks used
//! by the solver.
//!
//! Every block is snapped onto the grid, covering the closed rectangle of
//! points between its corners. Blocks of the same material can touch or
//! overlap freely (the shared points are merged). Blocks of different
//! materials can only be stacked, so that the top line of the lower one
//! lies on the bottom line of the upper one. Those shared points become
//! [`Operation::Interface`].

use crate::error::{ThermalError, ThermalResult};
use crate::masks::{neighbour, ThermalMasks};
use crate::operation::{Face, Operation};
use crate::solver::ConvergenceRegion;
use crate::Float;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// A rectangular block of a homogeneous material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialObject {
    /// Used for reporting errors
    pub name: String,

    /// The $`x`$ coordinate of the bottom-left corner, in $`m`$
    pub x: Float,

    /// The $`y`$ coordinate of the bottom-left corner, in $`m`$
    pub y: Float,

    /// The size along $`x`$, in $`m`$
    pub width: Float,

    /// The size along $`y`$, in $`m`$
    pub height: Float,

    /// In $`W/m.K`$
    pub thermal_conductivity: Float,

    /// Heat generated per unit volume, in $`W/m^3`$
    pub power_density: Float,
}

impl MaterialObject {
    /// Creates a block that does not generate heat
    pub fn new(
        name: &str,
        (x, y): (Float, Float),
        (width, height): (Float, Float),
        thermal_conductivity: Float,
    ) -> Self {
        Self {
            name: name.to_string(),
            x,
            y,
            width,
            height,
            thermal_conductivity,
            power_density: 0.,
        }
    }

    /// Sets the heat generated per unit volume
    pub fn with_power_density(mut self, power_density: Float) -> Self {
        self.power_density = power_density;
        self
    }
}

/// The closed range of grid indices covered by an object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    i0: usize,
    i1: usize,
    j0: usize,
    j1: usize,
}

impl Span {
    fn contains(&self, i: usize, j: usize) -> bool {
        (self.i0..=self.i1).contains(&i) && (self.j0..=self.j1).contains(&j)
    }
}

fn grid_index(distance: Float, step: Float) -> usize {
    (distance / step).round().max(0.) as usize
}

fn span_of(object: &MaterialObject, origin: (Float, Float), step: Float) -> ThermalResult<Span> {
    let span = Span {
        i0: grid_index(object.x - origin.0, step),
        i1: grid_index(object.x + object.width - origin.0, step),
        j0: grid_index(object.y - origin.1, step),
        j1: grid_index(object.y + object.height - origin.1, step),
    };
    // At least two points on each axis
    if span.i1 <= span.i0 || span.j1 <= span.j0 {
        return Err(ThermalError::DegenerateObject {
            name: object.name.clone(),
            step,
        });
    }
    Ok(span)
}

/// The result of compiling a set of [`MaterialObject`]
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledGeometry {
    pub masks: ThermalMasks,

    /// The coordinates of point `(0,0)`, in $`m`$
    pub origin: (Float, Float),

    /// The distance between grid points, in $`m`$
    pub step: Float,
}

impl CompiledGeometry {
    /// The shape of the grid
    pub fn shape(&self) -> (usize, usize) {
        self.masks.shape()
    }

    /// The coordinates (in $`m`$) of point `(i,j)`
    pub fn coordinates(&self, i: usize, j: usize) -> (Float, Float) {
        (
            self.origin.0 + i as Float * self.step,
            self.origin.1 + j as Float * self.step,
        )
    }

    /// The region of the grid covered by an object
    pub fn region_of(&self, object: &MaterialObject) -> ThermalResult<ConvergenceRegion> {
        let span = span_of(object, self.origin, self.step)?;
        let region = ConvergenceRegion::new(span.i0..span.i1 + 1, span.j0..span.j1 + 1);
        region.validate(self.shape())?;
        Ok(region)
    }

    /// A temperature field with the same value everywhere, to be used as
    /// initial guess
    pub fn uniform_temperature(&self, temperature: Float) -> Array2<Float> {
        Array2::from_elem(self.shape(), temperature)
    }
}

fn mean(values: impl Iterator<Item = Float>) -> Float {
    let (sum, n) = values.fold((0., 0), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.
    } else {
        sum / n as Float
    }
}

/// Checks that the different materials meeting at point `(i,j)` are
/// stacked on top of each other.
fn check_interface(
    owners: &[usize],
    objects: &[MaterialObject],
    spans: &[Span],
    (i, j): (usize, usize),
) -> ThermalResult<()> {
    let k = |n: usize| objects[n].thermal_conductivity;
    let unsupported = |first: usize, second: usize| ThermalError::UnsupportedContact {
        first: objects[first].name.clone(),
        second: objects[second].name.clone(),
        i,
        j,
    };

    // The point must be on the top line of the objects below...
    let below: Vec<usize> = owners
        .iter()
        .copied()
        .filter(|n| spans[*n].j1 == j)
        .collect();
    // ... and on the bottom line of the objects above
    let above: Vec<usize> = owners
        .iter()
        .copied()
        .filter(|n| spans[*n].j0 == j)
        .collect();

    let first = owners[0];
    if let Some(n) = owners
        .iter()
        .copied()
        .find(|n| !below.contains(n) && !above.contains(n))
    {
        // Overlapping, or touching side by side
        let other = if n == first { owners[1] } else { first };
        return Err(unsupported(other, n));
    }
    for group in [&below, &above] {
        if let Some(n) = group.iter().copied().find(|n| k(*n) != k(group[0])) {
            return Err(unsupported(group[0], n));
        }
    }
    match (below.first(), above.first()) {
        (Some(_), Some(_)) => Ok(()),
        // Same line, different materials
        _ => Err(unsupported(first, owners[1])),
    }
}

/// Builds the masks of a set of objects, on a grid with a distance
/// of `step` between points.
///
/// The grid covers the bounding box of all objects, and its point
/// `(0,0)` is on the bottom-left corner of that box. Each point is
/// classified as follows:
///
/// * If no object covers it, it is air
/// * If the objects covering it have different conductivities, it is an
///   interface (and they must be stacked)
/// * Otherwise, it is an interior, edge or corner point depending on
///   which of its neighbours are not covered by any object
///
/// The conductivity and power density of a point covered by
/// several objects is the average of theirs.
pub fn compile(objects: &[MaterialObject], step: Float) -> ThermalResult<CompiledGeometry> {
    if !(step > 0. && step.is_finite()) {
        return Err(ThermalError::InvalidStepSize(step));
    }
    if objects.is_empty() {
        return Err(ThermalError::NoObjects);
    }
    for object in objects {
        if !(object.width > 0. && object.height > 0.) {
            return Err(ThermalError::DegenerateObject {
                name: object.name.clone(),
                step,
            });
        }
    }

    let x_min = objects.iter().map(|o| o.x).fold(Float::INFINITY, Float::min);
    let y_min = objects.iter().map(|o| o.y).fold(Float::INFINITY, Float::min);
    let x_max = objects
        .iter()
        .map(|o| o.x + o.width)
        .fold(Float::NEG_INFINITY, Float::max);
    let y_max = objects
        .iter()
        .map(|o| o.y + o.height)
        .fold(Float::NEG_INFINITY, Float::max);
    let origin = (x_min, y_min);
    let shape = (
        grid_index(x_max - x_min, step) + 1,
        grid_index(y_max - y_min, step) + 1,
    );

    let spans = objects
        .iter()
        .map(|o| span_of(o, origin, step))
        .collect::<ThermalResult<Vec<Span>>>()?;

    let owners: Array2<Vec<usize>> = Array2::from_shape_fn(shape, |(i, j)| {
        spans
            .iter()
            .enumerate()
            .filter(|(_, span)| span.contains(i, j))
            .map(|(n, _)| n)
            .collect()
    });

    let conductivity = owners.map(|o| mean(o.iter().map(|n| objects[*n].thermal_conductivity)));
    let power = owners.map(|o| mean(o.iter().map(|n| objects[*n].power_density)));

    let is_air = |(i, j): (usize, usize)| owners[[i, j]].is_empty();
    let mut operations = Array2::from_elem(shape, Operation::Air);
    for ((i, j), own) in owners.indexed_iter() {
        let first = match own.first() {
            Some(n) => *n,
            None => continue,
        };

        // Different materials can only meet on a shared point
        for side in [Face::Right, Face::Top] {
            if let Some((ni, nj)) = neighbour(i, j, side, shape) {
                let other = &owners[[ni, nj]];
                if let Some(second) = other.first() {
                    if !other.iter().any(|n| own.contains(n))
                        && conductivity[[i, j]] != conductivity[[ni, nj]]
                    {
                        return Err(ThermalError::UnsupportedContact {
                            first: objects[first].name.clone(),
                            second: objects[*second].name.clone(),
                            i,
                            j,
                        });
                    }
                }
            }
        }

        let k = objects[first].thermal_conductivity;
        operations[[i, j]] = if own.iter().any(|n| objects[*n].thermal_conductivity != k) {
            check_interface(own, objects, &spans, (i, j))?;
            Operation::Interface
        } else {
            let exposed =
                |side: Face| neighbour(i, j, side, shape).map_or(true, |n| is_air(n));
            Operation::from_exposure(
                exposed(Face::Left),
                exposed(Face::Right),
                exposed(Face::Bottom),
                exposed(Face::Top),
            )
            .ok_or(ThermalError::UnresolvableCell { i, j })?
        };
    }

    let masks = ThermalMasks::new(operations, power, conductivity)?;
    masks.validate()?;
    log::debug!(
        "Compiled {} objects into a {}x{} grid ({} solid points)",
        objects.len(),
        shape.0,
        shape.1,
        masks.n_solid()
    );
    Ok(CompiledGeometry {
        masks,
        origin,
        step,
    })
}

/***********/
/* TESTING */
/***********/
