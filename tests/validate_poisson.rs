#![cfg_attr(feature = "float", allow(unused))]

use heat2d::analysis::mean_temperature;
use heat2d::solver::{fractional_change, iterate, region_norm};
use heat2d::*;
use ndarray::Array2;

/// A square of 10x10 points with no heat sources and fluxes that hold
/// $`T = 2x + 3y + C`$ (with $`k=1`$ and $`h=1`$).
fn linear_problem() -> (ThermalMasks, FaceFlux) {
    let masks = ThermalMasks::rectangle(10, 10, 0., 1.).unwrap();
    let bc = FaceFlux::from_gradient(1., 2., 3.);
    (masks, bc)
}

/// Largest difference between two fields
fn max_diff(a: &Array2<Float>, b: &Array2<Float>) -> Float {
    (a - b).iter().fold(0., |m, v| Float::max(m, v.abs()))
}

// Needs double precision to reach the tolerance
#[cfg(not(feature = "float"))]
#[test]
fn test_linear_solution() {
    let (masks, bc) = linear_problem();
    let options = SolverOptions {
        tolerance: 1e-15,
        max_iterations: 100_000,
        ..SolverOptions::default()
    };
    let sol = solve(Array2::from_elem((10, 10), 25.), &masks, 1., &bc, &options).unwrap();
    assert!(sol.is_converged(), "{:?}", sol.status);

    // Pure Neumann problems are known up to a constant
    let offset = 5. - sol.temperatures[[0, 0]];
    let exact = Array2::from_shape_fn((10, 10), |(i, j)| 2. * i as Float + 3. * j as Float + 5.);
    let found = sol.temperatures.mapv(|t| t + offset);
    let err = max_diff(&exact, &found);
    assert!(err < 1e-8, "err = {}", err);
}

// Needs double precision to reach the tolerance
#[cfg(not(feature = "float"))]
#[test]
fn test_converged_is_stable() {
    // Iterating once more after converging barely changes anything
    let (masks, bc) = linear_problem();
    let options = SolverOptions {
        tolerance: 1e-10,
        ..SolverOptions::default()
    };
    let sol = solve(Array2::from_elem((10, 10), 25.), &masks, 1., &bc, &options).unwrap();
    assert!(sol.is_converged());

    let next = iterate(&sol.temperatures, &masks, 1., &bc).unwrap();
    let region = ConvergenceRegion::whole((10, 10));
    let norm = region_norm(&sol.temperatures.view(), &region);
    let change = max_diff(&next, &sol.temperatures);
    assert!(change <= options.tolerance * norm, "{} vs {}", change, norm);
    assert!(fractional_change(&next.view(), &sol.temperatures.view(), &region).unwrap() < 1e-10);
}

#[test]
fn test_max_iterations() {
    let (masks, bc) = linear_problem();
    let options = SolverOptions {
        tolerance: 1e-15,
        max_iterations: 0,
        ..SolverOptions::default()
    };
    let sol = solve(Array2::from_elem((10, 10), 25.), &masks, 1., &bc, &options).unwrap();
    assert_eq!(
        sol.status,
        ConvergenceStatus::MaxIterationsReached { iterations: 1 }
    );
    // (2*25 + 2*25 - 2*(2 + 3))/4
    assert_eq!(sol.temperatures[[0, 0]], 22.5);
    assert_eq!(sol.temperatures[[5, 5]], 25.);

    let options = SolverOptions {
        tolerance: 1e-15,
        max_iterations: 10,
        ..SolverOptions::default()
    };
    let sol = solve(Array2::from_elem((10, 10), 25.), &masks, 1., &bc, &options).unwrap();
    assert_eq!(sol.status.iterations(), 11);
    assert!(!sol.is_converged());
}

#[test]
fn test_convergence_region() {
    // A block with a heat source, insulated. It never reaches a steady
    // state, except for a region where nothing changes.
    let mut masks = ThermalMasks::rectangle(6, 6, 0., 1.).unwrap();
    masks.power[[5, 5]] = 1.;

    // With the whole grid deciding, the temperatures keep rising
    let options = SolverOptions {
        max_iterations: 200,
        ..SolverOptions::default()
    };
    let insulated = |_t: Float| 0.;
    let sol = solve(Array2::from_elem((6, 6), 10.), &masks, 1., &insulated, &options).unwrap();
    assert_eq!(
        sol.status,
        ConvergenceStatus::MaxIterationsReached { iterations: 201 }
    );

    // Far from the source, nothing happens during the first iteration
    let options = SolverOptions {
        region: Some(ConvergenceRegion::new(0..2, 0..2)),
        ..options
    };
    let sol = solve(Array2::from_elem((6, 6), 10.), &masks, 1., &insulated, &options).unwrap();
    assert_eq!(sol.status, ConvergenceStatus::Converged { iterations: 1 });
    assert!(sol.temperatures[[5, 5]] > 10.);
}

// Needs double precision to reach the tolerance
#[cfg(not(feature = "float"))]
#[test]
fn test_from_codes() {
    // Two materials stacked, defined by hand
    #[rustfmt::skip]
    let codes = Array2::from_shape_vec((3, 5), vec![
        6, 2, 10, 2, 8,
        4, 1, 10, 1, 5,
        7, 3, 10, 3, 9,
    ]).unwrap();
    let conductivity = Array2::from_shape_fn((3, 5), |(_, j)| match j {
        0 | 1 => 1.,
        2 => 1.5,
        _ => 2.,
    });
    let masks = ThermalMasks::from_codes(&codes, Array2::zeros((3, 5)), conductivity).unwrap();
    assert_eq!(masks.operations[[1, 2]], Operation::Interface);
    assert_eq!(masks.operations[[0, 4]], Operation::TopLeftCorner);

    // Heat enters from below and leaves through the top
    let bc = FaceFlux {
        bottom: -1.,
        top: 1.,
        ..FaceFlux::default()
    };
    let options = SolverOptions {
        tolerance: 1e-14,
        max_iterations: 1_000_000,
        ..SolverOptions::default()
    };
    let sol = solve(Array2::from_elem((3, 5), 50.), &masks, 1., &bc, &options).unwrap();
    assert!(sol.is_converged());
    let t = &sol.temperatures;

    // The temperature drops twice as fast in the material that conducts half as well
    let lower = t[[1, 0]] - t[[1, 2]];
    let upper = t[[1, 2]] - t[[1, 4]];
    assert!(lower > 0.);
    assert!((lower - 2. * upper).abs() < 1e-6, "{} vs {}", lower, upper);

    // No heat flows along x
    for j in 0..5 {
        assert!((t[[0, j]] - t[[2, j]]).abs() < 1e-9);
    }
    let whole = ConvergenceRegion::whole((3, 5));
    assert!(mean_temperature(t, &masks, &whole).unwrap().is_finite());
}

// Needs double precision to reach the tolerance
#[cfg(not(feature = "float"))]
#[test]
fn test_closure_boundary() {
    // Linear convection written as a closure. Temperature-dependent fluxes
    // make plain Jacobi iterations oscillate, so they are relaxed.
    let masks = ThermalMasks::rectangle(5, 5, 1e4, 10.).unwrap();
    let h_c = 12.;
    let bc = move |t: Float| h_c * (t - 20.);
    let options = SolverOptions {
        tolerance: 1e-12,
        max_iterations: 1_000_000,
        relaxation: 0.5,
        ..SolverOptions::default()
    };
    let step = 0.01;
    let sol = solve(Array2::from_elem((5, 5), 20.), &masks, step, &bc, &options).unwrap();
    assert!(sol.is_converged());

    // The solid is hotter than the air, and hottest in the middle
    let t = &sol.temperatures;
    assert!(t.iter().all(|v| *v > 20.));
    assert!(t.iter().all(|v| *v <= t[[2, 2]]));

    // Symmetric
    for i in 0..5 {
        for j in 0..5 {
            assert!((t[[i, j]] - t[[4 - i, j]]).abs() < 1e-9);
            assert!((t[[i, j]] - t[[j, i]]).abs() < 1e-9);
        }
    }
}
