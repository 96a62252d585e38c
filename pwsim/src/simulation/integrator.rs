//! Time integrators for independent guided particles
//!
//! Provides a fixed-step classical RK4 step and an adaptive Dormand–Prince 5(4)
//! step, both driven by a `VelocityField`, plus the drivers that sample one
//! particle (`integrate_trajectory`) or a whole ensemble
//! (`integrate_ensemble`) at every time of a `Grid`

use rayon::prelude::*;

use super::field::VelocityField;
use super::params::Solver;
use super::states::{Grid, Particle, TrajectorySet};
use crate::configuration::config::IntegratorConfig;
use crate::error::{SimError, SimResult};

// Dormand–Prince 5(4) tableau
const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// fifth-order weights (also the last row of the tableau)
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// fifth minus fourth order weights
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

// step-size controller
const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;

/// Evaluate the field and fail loudly on NaN/Inf
fn eval<F: VelocityField + ?Sized>(field: &F, t: f64, x: f64) -> SimResult<f64> {
    let v = field.velocity(t, x);
    if v.is_finite() {
        Ok(v)
    } else {
        Err(SimError::NonFinite { t, x })
    }
}

/// Advance one particle by a single classical RK4 step of size `h`
/// Updates `p.x` and `p.t` in-place
pub fn rk4_step<F: VelocityField + ?Sized>(p: &mut Particle, field: &F, h: f64) -> SimResult<()> {
    let half_h = 0.5 * h;

    let k1 = eval(field, p.t, p.x)?;
    let k2 = eval(field, p.t + half_h, p.x + half_h * k1)?;
    let k3 = eval(field, p.t + half_h, p.x + half_h * k2)?;
    let k4 = eval(field, p.t + h, p.x + h * k3)?;

    p.x += h / 6.0 * (k1 + 2.0 * k2 + 2.0 * k3 + k4);
    p.t += h;

    if p.x.is_finite() {
        Ok(())
    } else {
        Err(SimError::NonFinite { t: p.t, x: p.x })
    }
}

/// Result of one attempted adaptive step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub accepted: bool,
    /// suggested size for the next attempt
    pub h_next: f64,
}

/// Attempt one Dormand–Prince 5(4) step of size `h`
/// On acceptance `p` is advanced to `t + h`; on rejection it is left untouched
pub fn dopri5_step<F: VelocityField + ?Sized>(
    p: &mut Particle,
    field: &F,
    h: f64,
    solver: &Solver,
) -> SimResult<StepOutcome> {
    let (t, x) = (p.t, p.x);

    let k1 = eval(field, t, x)?;
    let k2 = eval(field, t + C2 * h, x + h * A21 * k1)?;
    let k3 = eval(field, t + C3 * h, x + h * (A31 * k1 + A32 * k2))?;
    let k4 = eval(field, t + C4 * h, x + h * (A41 * k1 + A42 * k2 + A43 * k3))?;
    let k5 = eval(field, t + C5 * h, x + h * (A51 * k1 + A52 * k2 + A53 * k3 + A54 * k4))?;
    let k6 = eval(
        field,
        t + h,
        x + h * (A61 * k1 + A62 * k2 + A63 * k3 + A64 * k4 + A65 * k5),
    )?;

    // fifth-order solution
    let x_new = x + h * (B1 * k1 + B3 * k3 + B4 * k4 + B5 * k5 + B6 * k6);
    let k7 = eval(field, t + h, x_new)?;

    // embedded error estimate, scaled by the mixed tolerance
    let err = h * (E1 * k1 + E3 * k3 + E4 * k4 + E5 * k5 + E6 * k6 + E7 * k7);
    let scale = solver.atol + solver.rtol * x.abs().max(x_new.abs());
    let err_norm = (err / scale).abs();

    if err_norm <= 1.0 {
        let factor = if err_norm == 0.0 {
            MAX_FACTOR
        } else {
            (SAFETY * err_norm.powf(-0.2)).clamp(MIN_FACTOR, MAX_FACTOR)
        };
        p.x = x_new;
        p.t = t + h;
        Ok(StepOutcome {
            accepted: true,
            h_next: h * factor,
        })
    } else {
        let factor = (SAFETY * err_norm.powf(-0.2)).clamp(MIN_FACTOR, 1.0);
        Ok(StepOutcome {
            accepted: false,
            h_next: h * factor,
        })
    }
}

/// Integrate one particle from `times[0]` and record its position at every grid time
pub fn integrate_trajectory<F: VelocityField + ?Sized>(
    field: &F,
    x_start: f64,
    times: &Grid,
    solver: &Solver,
) -> SimResult<Vec<f64>> {
    let pts = times.points();
    if pts.is_empty() {
        return Err(SimError::InvalidTimeGrid {
            reason: "no sample times".to_string(),
        });
    }
    if !x_start.is_finite() {
        return Err(SimError::NonFinite { t: pts[0], x: x_start });
    }

    let mut p = Particle { x: x_start, t: pts[0] };
    let mut out = Vec::with_capacity(pts.len());
    out.push(p.x);

    let mut h = solver.h0; // carried across sample intervals by the adaptive controller
    let mut steps = 0usize;

    for &target in &pts[1..] {
        if target <= p.t || target.is_nan() {
            return Err(SimError::InvalidTimeGrid {
                reason: format!("times must strictly increase ({} then {})", p.t, target),
            });
        }

        match solver.method {
            IntegratorConfig::Rk4 => {
                // sub-step so the last step lands exactly on `target`
                let span = target - p.t;
                let n = (span / solver.h0).ceil().max(1.0);
                // refuse the interval before stepping if it would overrun the cap
                if n > (solver.max_steps - steps) as f64 {
                    return Err(SimError::TooManySteps { t: p.t, max_steps: solver.max_steps });
                }
                let n = n as usize;
                let dt = span / n as f64;
                for _ in 0..n {
                    rk4_step(&mut p, field, dt)?;
                    steps += 1;
                }
                p.t = target;
            }
            IntegratorConfig::Dopri5 => {
                while p.t < target {
                    let min_step = 16.0 * f64::EPSILON * p.t.abs().max(1.0);
                    if h < min_step {
                        return Err(SimError::StepSizeUnderflow { t: p.t, h });
                    }

                    let remaining = target - p.t;
                    let clipped = h >= remaining;
                    let h_try = if clipped { remaining } else { h };

                    if steps >= solver.max_steps {
                        return Err(SimError::TooManySteps { t: p.t, max_steps: solver.max_steps });
                    }
                    let outcome = dopri5_step(&mut p, field, h_try, solver)?;
                    steps += 1;

                    if outcome.accepted && clipped {
                        // a shortened final step says nothing about the natural step size
                        p.t = target;
                        h = h.max(outcome.h_next);
                    } else {
                        h = outcome.h_next;
                    }
                }
            }
        }

        out.push(p.x);
    }

    Ok(out)
}

/// Integrate every initial position over `times`; trajectories never interact,
/// so `parallel` only changes how the work is scheduled, not the result
pub fn integrate_ensemble<F: VelocityField + Sync + ?Sized>(
    field: &F,
    initial: &[f64],
    times: &Grid,
    solver: &Solver,
    parallel: bool,
) -> SimResult<TrajectorySet> {
    let rows: Vec<Vec<f64>> = if parallel {
        initial
            .par_iter()
            .map(|&x| integrate_trajectory(field, x, times, solver))
            .collect::<SimResult<Vec<_>>>()?
    } else {
        initial
            .iter()
            .map(|&x| integrate_trajectory(field, x, times, solver))
            .collect::<SimResult<Vec<_>>>()?
    };

    Ok(TrajectorySet::from_rows(initial.to_vec(), times.clone(), &rows))
}
