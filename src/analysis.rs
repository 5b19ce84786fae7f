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
use crate::masks::ThermalMasks;
use crate::solver::ConvergenceRegion;
use crate::Float;
use ndarray::Array2;

fn check_field(field: &Array2<Float>, masks: &ThermalMasks) -> ThermalResult<()> {
    let expected = masks.shape();
    if field.dim() != expected {
        return Err(ThermalError::ShapeMismatch {
            array: "temperatures",
            expected,
            found: field.dim(),
        });
    }
    Ok(())
}

/// Averages the values of `field` on the points of `region` that pass `filter`
fn mean_where<F>(
    field: &Array2<Float>,
    masks: &ThermalMasks,
    region: &ConvergenceRegion,
    filter: F,
) -> ThermalResult<Float>
where
    F: Fn(usize, usize) -> bool,
{
    check_field(field, masks)?;
    region.validate(masks.shape())?;

    let mut sum = 0.;
    let mut n = 0;
    for i in region.x.clone() {
        for j in region.y.clone() {
            if filter(i, j) {
                sum += field[[i, j]];
                n += 1;
            }
        }
    }
    if n == 0 {
        return Err(ThermalError::NoSolidPoints {
            x: region.x.clone(),
            y: region.y.clone(),
        });
    }
    Ok(sum / n as Float)
}

/// The mean temperature of the solid points within a region (air is ignored)
pub fn mean_temperature(
    field: &Array2<Float>,
    masks: &ThermalMasks,
    region: &ConvergenceRegion,
) -> ThermalResult<Float> {
    mean_where(field, masks, region, |i, j| {
        masks.operations[[i, j]].is_solid()
    })
}

/// The mean temperature of the points that are exposed to the air
/// (i.e., edges and corners)
pub fn average_surface_temperature(
    field: &Array2<Float>,
    masks: &ThermalMasks,
) -> ThermalResult<Float> {
    let region = ConvergenceRegion::whole(masks.shape());
    mean_where(field, masks, &region, |i, j| {
        masks.operations[[i, j]].is_boundary()
    })
}

/// Estimates the exact value of a quantity from its values at a step size
/// $`h`$ (`coarse`) and $`h/2`$ (`fine`).
///
/// The finite difference scheme is second-order, so the error shrinks
/// fourfold when halving the step:
///
/// ```math
/// T \approx \frac{4 T_{h/2} - T_h}{3}
/// ```
pub fn richardson_extrapolate(coarse: Float, fine: Float) -> Float {
    (4. * fine - coarse) / 3.
}

/***********/
/* TESTING */
/***********/

#[cfg(test)]
mod testing {
    use super::*;
    use crate::operation::Operation;

    #[test]
    fn test_means() {
        let mut masks = ThermalMasks::rectangle(4, 3, 0., 1.).unwrap();
        masks.operations[[3, 2]] = Operation::Air;
        let field = Array2::from_shape_fn((4, 3), |(i, j)| (i + 10 * j) as Float);

        // The air point is not counted
        let whole = ConvergenceRegion::whole((4, 3));
        let sum: Float = field.iter().sum::<Float>() - field[[3, 2]];
        assert_eq!(mean_temperature(&field, &masks, &whole).unwrap(), sum / 11.);

        let region = ConvergenceRegion::new(1..3, 1..2);
        assert_eq!(mean_temperature(&field, &masks, &region).unwrap(), 11.5);

        // Only the interior points, (1,1) and (2,1), are not on the surface
        let surface = (sum - 11. - 12.) / 9.;
        assert_eq!(
            average_surface_temperature(&field, &masks).unwrap(),
            surface
        );
    }

    #[test]
    fn test_errors() {
        let mut masks = ThermalMasks::rectangle(3, 3, 0., 1.).unwrap();
        let field = Array2::zeros((3, 3));
        assert!(matches!(
            mean_temperature(&Array2::zeros((2, 3)), &masks, &ConvergenceRegion::whole((3, 3))),
            Err(ThermalError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            mean_temperature(&field, &masks, &ConvergenceRegion::new(0..4, 0..1)),
            Err(ThermalError::InvalidRegion { .. })
        ));
        masks.operations[[0, 0]] = Operation::Air;
        assert_eq!(
            mean_temperature(&field, &masks, &ConvergenceRegion::new(0..1, 0..1)),
            Err(ThermalError::NoSolidPoints { x: 0..1, y: 0..1 })
        );
    }

    #[test]
    fn test_richardson() {
        // A quantity converging as T = 100 + c h^2
        let exact = 100.;
        let coarse = exact + 0.8;
        let fine = exact + 0.2;
        let found = richardson_extrapolate(coarse, fine);
        assert!((found - exact).abs() < exact * Float::EPSILON.sqrt());
        assert_eq!(richardson_extrapolate(5., 5.), 5.);
    }
}
