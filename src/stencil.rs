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

//! The finite difference stencils used for updating a single point.
//!
//! # The math
//!
//! In steady state, the temperature of a solid with conductivity $`k`$ that
//! generates $`q`$ $`W/m^3`$ follows Poisson's equation
//!
//! ```math
//! \nabla^2 T = -\frac{q}{k}
//! ```
//!
//! Discretizing with central differences on a grid of step $`h`$ gives the
//! Jacobi update of an interior point
//!
//! ```math
//! T_{i,j} = \frac{T_{i-1,j} + T_{i+1,j} + T_{i,j-1} + T_{i,j+1} + h^2 q/k}{4}
//! ```
//!
//! On the surface, the missing neighbour is replaced by a ghost point
//! reflected from the opposite one so that the central difference matches
//! the flux $`\phi`$ leaving the solid. For a point on the left edge
//! (outward normal $`-x`$) this is $`T_{i-1,j} = T_{i+1,j} - 2h\phi/k`$, so
//!
//! ```math
//! T_{i,j} = \frac{2T_{i+1,j} + T_{i,j-1} + T_{i,j+1} + h^2 q/k - 2h\phi/k}{4}
//! ```
//!
//! Corners reflect along both axes. Where two materials meet (one below,
//! one above) the flux continuity condition
//! $`k_b (T - T_b) = k_t (T_t - T)`$ gives the weighted average
//!
//! ```math
//! T = \frac{k_b T_b + k_t T_t}{k_b + k_t}
//! ```

use crate::convection::HeatFlux;
use crate::masks::ThermalMasks;
use crate::operation::{Face, Operation};
use crate::Float;
use ndarray::ArrayView2;

/// Update of an interior point. `source` is $`h^2 q/k`$
pub fn interior(left: Float, right: Float, bottom: Float, top: Float, source: Float) -> Float {
    (left + right + bottom + top + source) / 4.
}

/// Update of an edge point.
///
/// `inner` is the neighbour opposite to the exposed face (i.e., the one the
/// ghost point is reflected from), `side_a` and `side_b` are the ones along
/// the edge, `source` is $`h^2 q/k`$ and `flux_term` is $`h\phi/k`$.
pub fn edge(inner: Float, side_a: Float, side_b: Float, source: Float, flux_term: Float) -> Float {
    (2. * inner + side_a + side_b + source - 2. * flux_term) / 4.
}

/// Update of a corner point, which is exposed along both axes.
///
/// `inner_x` and `inner_y` are the neighbours opposite to the exposed faces;
/// `flux_term_x` and `flux_term_y` are the $`h\phi/k`$ of each face.
pub fn corner(
    inner_x: Float,
    inner_y: Float,
    source: Float,
    flux_term_x: Float,
    flux_term_y: Float,
) -> Float {
    (2. * inner_x + 2. * inner_y + source - 2. * (flux_term_x + flux_term_y)) / 4.
}

/// Update of a point between two materials. Power and step size
/// play no role here.
pub fn interface(bottom: Float, top: Float, k_bottom: Float, k_top: Float) -> Float {
    (k_bottom * bottom + k_top * top) / (k_bottom + k_top)
}

/// Weighted relaxation between the previous value and the Jacobi update.
///
/// A `weight` of one is plain Jacobi.
pub fn relax(old: Float, jacobi: Float, weight: Float) -> Float {
    if weight == 1. {
        jacobi
    } else {
        (1. - weight) * old + weight * jacobi
    }
}

/// Calculates the Jacobi update of point `(i,j)` based on the temperatures of the
/// previous iteration `old`.
///
/// The `boundary` flux of exposed faces is evaluated at the previous temperature
/// of the point itself. Air points are returned unchanged.
///
/// # Panics
///
/// Panics if the operation of the point reads a neighbour outside of the grid,
/// which does not happen for masks that pass [`ThermalMasks::validate`].
pub fn next_temperature<B: HeatFlux + ?Sized>(
    old: &ArrayView2<Float>,
    masks: &ThermalMasks,
    step: Float,
    boundary: &B,
    i: usize,
    j: usize,
) -> Float {
    let centre = old[[i, j]];
    let k = masks.conductivity[[i, j]];
    let source = step * step * masks.power[[i, j]] / k;
    let flux = |face: Face| step * boundary.flux(face, centre) / k;

    match masks.operations[[i, j]] {
        Operation::Air => centre,
        Operation::Interior => interior(
            old[[i - 1, j]],
            old[[i + 1, j]],
            old[[i, j - 1]],
            old[[i, j + 1]],
            source,
        ),
        Operation::LeftEdge => edge(
            old[[i + 1, j]],
            old[[i, j - 1]],
            old[[i, j + 1]],
            source,
            flux(Face::Left),
        ),
        Operation::RightEdge => edge(
            old[[i - 1, j]],
            old[[i, j - 1]],
            old[[i, j + 1]],
            source,
            flux(Face::Right),
        ),
        Operation::BottomEdge => edge(
            old[[i, j + 1]],
            old[[i - 1, j]],
            old[[i + 1, j]],
            source,
            flux(Face::Bottom),
        ),
        Operation::TopEdge => edge(
            old[[i, j - 1]],
            old[[i - 1, j]],
            old[[i + 1, j]],
            source,
            flux(Face::Top),
        ),
        Operation::BottomLeftCorner => corner(
            old[[i + 1, j]],
            old[[i, j + 1]],
            source,
            flux(Face::Left),
            flux(Face::Bottom),
        ),
        Operation::BottomRightCorner => corner(
            old[[i - 1, j]],
            old[[i, j + 1]],
            source,
            flux(Face::Right),
            flux(Face::Bottom),
        ),
        Operation::TopLeftCorner => corner(
            old[[i + 1, j]],
            old[[i, j - 1]],
            source,
            flux(Face::Left),
            flux(Face::Top),
        ),
        Operation::TopRightCorner => corner(
            old[[i - 1, j]],
            old[[i, j - 1]],
            source,
            flux(Face::Right),
            flux(Face::Top),
        ),
        Operation::Interface => interface(
            old[[i, j - 1]],
            old[[i, j + 1]],
            masks.conductivity[[i, j - 1]],
            masks.conductivity[[i, j + 1]],
        ),
    }
}

/***********/
/* TESTING */
/***********/

#[cfg(test)]
mod testing {
    use super::*;
    use crate::convection::FaceFlux;
    use ndarray::Array2;

    /// A 3x3 grid with a different value on each point
    fn get_grid() -> Array2<Float> {
        Array2::from_shape_fn((3, 3), |(i, j)| 10. + 3. * i as Float + 7. * j as Float + (i * j) as Float)
    }

    #[test]
    fn test_rules() {
        assert_eq!(interior(1., 2., 3., 4., 10.), 5.);
        assert_eq!(edge(1., 2., 3., 4., 0.5), (2. + 2. + 3. + 4. - 1.) / 4.);
        assert_eq!(corner(1., 2., 3., 0.25, 0.5), (2. + 4. + 3. - 1.5) / 4.);
        assert_eq!(interface(10., 20., 1., 3.), 17.5);
        assert_eq!(relax(10., 20., 1.), 20.);
        assert_eq!(relax(10., 20., 0.5), 15.);
    }

    #[test]
    fn test_interface_equal_conductivity() {
        // Same material on both sides means arithmetic mean
        for k in [0.1, 1., 150., 230.] {
            let found = interface(12., 30., k, k);
            assert!(
                (found - 21.).abs() < Float::EPSILON.sqrt(),
                "found {found} for k = {k}"
            );
        }
    }

    #[test]
    fn test_corner_uniform_flux() {
        // With the same flux on both faces, a corner loses 4h*phi/k
        let (h, phi, k) = (0.1, 7., 2.);
        let found = corner(10., 20., 0., h * phi / k, h * phi / k);
        let exp = (2. * 10. + 2. * 20. - 4. * h * phi / k) / 4.;
        assert!(
            (found - exp).abs() < Float::EPSILON.sqrt(),
            "found {found}, expected {exp}"
        );
    }

    #[test]
    fn test_next_temperature() {
        let old = get_grid();
        let mut masks = ThermalMasks::rectangle(3, 3, 4., 2.).unwrap();
        let step = 0.5;
        let source = step * step * 4. / 2.;
        let bc = FaceFlux {
            left: 1.,
            right: 2.,
            bottom: 3.,
            top: 4.,
        };
        let ft = |phi: Float| step * phi / 2.;
        let t = |i: usize, j: usize| old[[i, j]];
        let next = |masks: &ThermalMasks, i, j| next_temperature(&old.view(), masks, step, &bc, i, j);

        assert_eq!(
            next(&masks, 1, 1),
            interior(t(0, 1), t(2, 1), t(1, 0), t(1, 2), source)
        );
        assert_eq!(
            next(&masks, 0, 1),
            edge(t(1, 1), t(0, 0), t(0, 2), source, ft(1.))
        );
        assert_eq!(
            next(&masks, 2, 1),
            edge(t(1, 1), t(2, 0), t(2, 2), source, ft(2.))
        );
        assert_eq!(
            next(&masks, 1, 0),
            edge(t(1, 1), t(0, 0), t(2, 0), source, ft(3.))
        );
        assert_eq!(
            next(&masks, 1, 2),
            edge(t(1, 1), t(0, 2), t(2, 2), source, ft(4.))
        );
        assert_eq!(
            next(&masks, 0, 0),
            corner(t(1, 0), t(0, 1), source, ft(1.), ft(3.))
        );
        assert_eq!(
            next(&masks, 2, 0),
            corner(t(1, 0), t(2, 1), source, ft(2.), ft(3.))
        );
        assert_eq!(
            next(&masks, 0, 2),
            corner(t(1, 2), t(0, 1), source, ft(1.), ft(4.))
        );
        assert_eq!(
            next(&masks, 2, 2),
            corner(t(1, 2), t(2, 1), source, ft(2.), ft(4.))
        );

        // Air does not change
        masks.operations[[1, 1]] = Operation::Air;
        assert_eq!(next(&masks, 1, 1), t(1, 1));

        // Interfaces weight by the neighbours' conductivity
        masks.operations[[1, 1]] = Operation::Interface;
        masks.conductivity[[1, 0]] = 1.;
        masks.conductivity[[1, 2]] = 3.;
        assert_eq!(
            next(&masks, 1, 1),
            (1. * t(1, 0) + 3. * t(1, 2)) / 4.
        );
    }

    #[test]
    fn test_insulated_boundaries_reflect() {
        // With no flux, edges and corners behave like interior points
        // whose missing neighbours mirror the opposite ones, on both axes
        // at the same time for corners.
        let old = get_grid();
        let masks = ThermalMasks::rectangle(3, 3, 1., 1.).unwrap();
        let step = 1.;
        let bc = |_t: Float| 0.;
        let t = |i: usize, j: usize| old[[i, j]];
        let next = |i, j| next_temperature(&old.view(), &masks, step, &bc, i, j);

        // Left edge: ghost at i=-1 mirrors i=1
        assert_eq!(next(0, 1), interior(t(1, 1), t(1, 1), t(0, 0), t(0, 2), 1.));
        // Top edge: ghost at j=3 mirrors j=1
        assert_eq!(next(1, 2), interior(t(0, 2), t(2, 2), t(1, 1), t(1, 1), 1.));
        // Bottom-left: mirrored on x and y
        assert_eq!(next(0, 0), interior(t(1, 0), t(1, 0), t(0, 1), t(0, 1), 1.));
        // Top-right: mirrored on x and y
        assert_eq!(next(2, 2), interior(t(1, 2), t(1, 2), t(2, 1), t(2, 1), 1.));

        // Reflecting twice: an edge update on a grid already mirrored
        // along x gives the corner update.
        let corner_value = next(0, 0);
        let edge_value = edge(t(0, 1), t(1, 0), t(1, 0), 1., 0.);
        assert!((corner_value - edge_value).abs() < Float::EPSILON.sqrt());
    }

    #[test]
    fn test_flux_sign() {
        // Heat leaving the solid cools the surface down
        let old = Array2::from_elem((3, 3), 50.);
        let masks = ThermalMasks::rectangle(3, 3, 0., 1.).unwrap();
        let cooling = |_t: Float| 10.;
        let heating = |_t: Float| -10.;
        for (i, j) in [(0, 1), (2, 1), (1, 0), (1, 2), (0, 0), (2, 2)] {
            assert!(next_temperature(&old.view(), &masks, 0.1, &cooling, i, j) < 50.);
            assert!(next_temperature(&old.view(), &masks, 0.1, &heating, i, j) > 50.);
        }
        // The interior does not know about it
        assert_eq!(next_temperature(&old.view(), &masks, 0.1, &cooling, 1, 1), 50.);
    }

    #[test]
    fn test_interface_ignores_power() {
        // Heat generated on an interface line never enters the balance
        let mut masks = ThermalMasks::rectangle(3, 3, 0., 1.).unwrap();
        masks.operations[[1, 1]] = Operation::Interface;
        masks.conductivity[[1, 2]] = 3.;
        let mut old = Array2::from_elem((3, 3), 50.);
        old[[1, 0]] = 10.;
        old[[1, 2]] = 20.;
        let insulated = |_t: Float| 0.;
        assert_eq!(next_temperature(&old.view(), &masks, 0.1, &insulated, 1, 1), 17.5);

        masks.power[[1, 1]] = 5e8;
        assert_eq!(next_temperature(&old.view(), &masks, 0.1, &insulated, 1, 1), 17.5);
    }
}
