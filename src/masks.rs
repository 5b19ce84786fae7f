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

use crate::error::{ThermalError, ThermalResult};
use crate::operation::{Face, Operation};
use crate::Float;
use ndarray::Array2;

/// The three per-point arrays that describe a heterogeneous solid: what
/// to do on each point, how much heat it generates and how well it conducts.
///
/// All of them have the shape of the temperature grid, with axis 0 being
/// $`x`$ and axis 1 being $`y`$. They are built once (e.g., by
/// [`crate::geometry::compile`]) and never modified by the solver.
#[derive(Debug, Clone, PartialEq)]
pub struct ThermalMasks {
    /// The update rule of each point
    pub operations: Array2<Operation>,

    /// The volumetric heat generation, in $`W/m^3`$
    pub power: Array2<Float>,

    /// The thermal conductivity, in $`W/m.K`$
    pub conductivity: Array2<Float>,
}

/// Gets the index of the neighbour of `(i,j)` on a certain side,
/// if it is inside a grid of shape `(width, height)`
pub(crate) fn neighbour(
    i: usize,
    j: usize,
    side: Face,
    (width, height): (usize, usize),
) -> Option<(usize, usize)> {
    match side {
        Face::Left => i.checked_sub(1).map(|i| (i, j)),
        Face::Right => (i + 1 < width).then_some((i + 1, j)),
        Face::Bottom => j.checked_sub(1).map(|j| (i, j)),
        Face::Top => (j + 1 < height).then_some((i, j + 1)),
    }
}

fn check_shape(
    array: &'static str,
    expected: (usize, usize),
    found: (usize, usize),
) -> ThermalResult<()> {
    if expected != found {
        return Err(ThermalError::ShapeMismatch {
            array,
            expected,
            found,
        });
    }
    Ok(())
}

impl ThermalMasks {
    /// Creates a new set of masks, checking that they all have the same shape.
    pub fn new(
        operations: Array2<Operation>,
        power: Array2<Float>,
        conductivity: Array2<Float>,
    ) -> ThermalResult<Self> {
        let shape = operations.dim();
        check_shape("power", shape, power.dim())?;
        check_shape("conductivity", shape, conductivity.dim())?;
        Ok(Self {
            operations,
            power,
            conductivity,
        })
    }

    /// Creates a new set of masks from an operation mask made of integer
    /// codes (see [`Operation::code`]).
    pub fn from_codes(
        codes: &Array2<u8>,
        power: Array2<Float>,
        conductivity: Array2<Float>,
    ) -> ThermalResult<Self> {
        if let Some(((i, j), code)) = codes
            .indexed_iter()
            .find(|(_, code)| Operation::from_code(**code).is_none())
        {
            return Err(ThermalError::UnknownOperation { i, j, code: *code });
        }
        let operations = codes.mapv(|c| Operation::from_code(c).unwrap_or_default());
        Self::new(operations, power, conductivity)
    }

    /// Builds the masks of a single rectangular block of a homogeneous
    /// material that fills the whole grid.
    pub fn rectangle(
        width: usize,
        height: usize,
        power: Float,
        conductivity: Float,
    ) -> ThermalResult<Self> {
        if width < 2 || height < 2 {
            return Err(ThermalError::EmptyGrid((width, height)));
        }
        let operations = Array2::from_shape_fn((width, height), |(i, j)| {
            let op = Operation::from_exposure(i == 0, i == width - 1, j == 0, j == height - 1);
            // width and height are at least 2, so no point is exposed on opposite sides
            op.unwrap_or(Operation::Interior)
        });
        Self::new(
            operations,
            Array2::from_elem((width, height), power),
            Array2::from_elem((width, height), conductivity),
        )
    }

    /// The shape of the grid
    pub fn shape(&self) -> (usize, usize) {
        self.operations.dim()
    }

    /// Counts the points that belong to a solid
    pub fn n_solid(&self) -> usize {
        self.operations.iter().filter(|op| op.is_solid()).count()
    }

    /// Checks that the masks can be used for solving.
    ///
    /// This means that all arrays have the same shape, that every solid
    /// point conducts heat, and that no operation reads a neighbour that is
    /// outside of the grid.
    pub fn validate(&self) -> ThermalResult<()> {
        let shape = self.shape();
        if shape.0 == 0 || shape.1 == 0 {
            return Err(ThermalError::EmptyGrid(shape));
        }
        check_shape("power", shape, self.power.dim())?;
        check_shape("conductivity", shape, self.conductivity.dim())?;

        const SIDES: [Face; 4] = [Face::Left, Face::Right, Face::Bottom, Face::Top];
        for ((i, j), op) in self.operations.indexed_iter() {
            if !op.is_solid() {
                continue;
            }
            let conductivity = self.conductivity[[i, j]];
            if !(conductivity > 0.0 && conductivity.is_finite()) {
                return Err(ThermalError::InvalidConductivity { i, j, conductivity });
            }
            for side in SIDES {
                if !op.reads(side) {
                    continue;
                }
                let (ni, nj) = neighbour(i, j, side, shape).ok_or(
                    ThermalError::StencilOutOfBounds {
                        i,
                        j,
                        operation: *op,
                    },
                )?;
                // The interface rule weights by the conductivity of its neighbours
                if *op == Operation::Interface {
                    let conductivity = self.conductivity[[ni, nj]];
                    if !(conductivity > 0.0 && conductivity.is_finite()) {
                        return Err(ThermalError::InvalidConductivity {
                            i: ni,
                            j: nj,
                            conductivity,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/***********/
/* TESTING */
/***********/
