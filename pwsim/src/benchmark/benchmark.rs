//! Timing of the guiding field and the trajectory integrators, printed to stdout

use std::time::Instant;

use crate::configuration::config::IntegratorConfig;
use crate::error::SimResult;
use crate::simulation::field::{GuidingField, VelocityField};
use crate::simulation::integrator::integrate_ensemble;
use crate::simulation::params::{Parameters, Solver};
use crate::simulation::states::Grid;

/// Helper to build the squeezed test state used by every benchmark
fn make_params() -> Parameters {
    Parameters::new(1.0, 1.0, 1.0, 0.5, 4.0, 0.0)
}

/// Helper to spread `n` initial positions around x0
fn make_initial(params: &Parameters, n: usize) -> SimResult<Vec<f64>> {
    let a = params.x0 - params.sigma;
    let b = params.x0 + params.sigma;
    Ok(Grid::linspace(a, b, n)?.points().to_vec())
}

fn make_solver(method: IntegratorConfig) -> Solver {
    Solver {
        method,
        ..Solver::default()
    }
}

pub fn bench_field() -> SimResult<()> {
    // Different grid sizes to test
    let ns = [1_000, 10_000, 100_000, 1_000_000];
    let field = GuidingField::new(make_params());

    for n in ns {
        let grid = Grid::linspace(-10.0, 10.0, n)?;
        let mut out = vec![0.0; n];

        // Warm up
        field.velocities(0.3, grid.points(), &mut out);

        // general branch
        let t0 = Instant::now();
        field.velocities(0.3, grid.points(), &mut out);
        let dt_general = t0.elapsed().as_secs_f64();

        // whole-period branch, every point gets p0/m
        let t1 = Instant::now();
        field.velocities(0.0, grid.points(), &mut out);
        let dt_period = t1.elapsed().as_secs_f64();

        println!("N = {n:8}, general = {:8.6} s, period = {:8.6} s", dt_general, dt_period);
    }

    Ok(())
}

pub fn bench_integrators() -> SimResult<()> {
    let params = make_params();
    let field = GuidingField::new(params);
    let times = Grid::time_grid(40.0, 1000)?;

    for n in [10, 100, 1000] {
        let initial = make_initial(&params, n)?;

        for method in [IntegratorConfig::Rk4, IntegratorConfig::Dopri5] {
            let solver = make_solver(method);

            let t0 = Instant::now();
            integrate_ensemble(&field, &initial, &times, &solver, false)?;
            let dt_serial = t0.elapsed().as_secs_f64();

            let t1 = Instant::now();
            integrate_ensemble(&field, &initial, &times, &solver, true)?;
            let dt_parallel = t1.elapsed().as_secs_f64();

            println!(
                "N = {:5}, {:?}: serial = {:8.6} s, parallel = {:8.6} s",
                n, method, dt_serial, dt_parallel
            );
        }
    }

    Ok(())
}

/// Benchmark both integrators (rayon enabled) over a range of trajectory counts
/// Paste output directly into excel to graph
pub fn bench_integrators_curve() -> SimResult<()> {
    println!("N,rk4_ms,dopri5_ms");

    let params = make_params();
    let field = GuidingField::new(params);
    let times = Grid::time_grid(40.0, 1000)?;
    let rk4 = make_solver(IntegratorConfig::Rk4);
    let dopri5 = make_solver(IntegratorConfig::Dopri5);

    // Steps of 50 to give smoother graph
    for n in (50..=1000).step_by(50) {
        let initial = make_initial(&params, n)?;

        let t0 = Instant::now();
        integrate_ensemble(&field, &initial, &times, &rk4, true)?;
        let ms_rk4 = t0.elapsed().as_secs_f64() * 1000.0;

        let t1 = Instant::now();
        integrate_ensemble(&field, &initial, &times, &dopri5, true)?;
        let ms_dopri5 = t1.elapsed().as_secs_f64() * 1000.0;

        println!("{},{:.6},{:.6}", n, ms_rk4, ms_dopri5);
    }

    Ok(())
}
