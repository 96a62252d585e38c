//! Propagator exponent and the relations read back out of it.
//!
//! Integrating the initial Gaussian against the oscillator propagator gives
//! `exp(E(x, t))` up to a constant, with `E` quadratic in `x`:
//!
//! ```text
//! b = x0/(2 sigma^2) + i p0/hbar - i m w x / (hbar sin wt)
//! a = 1/(4 sigma^2) - i m w / (2 hbar tan wt)
//! E = b^2/(4a) + i m w x^2 / (2 hbar tan wt) - x0^2/(4 sigma^2)
//! ```
//!
//! `Re E` carries the envelope and `Im E` is the phase. Because `E` is a
//! quadratic polynomial in `x`, central differences with unit spacing are
//! exact, which lets us recover centroid, width and guiding velocity from `E`
//! and check them against the closed forms used everywhere else.

use num_complex::Complex64;

use crate::error::{SimError, SimResult};
use crate::simulation::envelope::{Envelope, PeriodBranch};
use crate::simulation::params::Parameters;

/// Exponent `E(x, t)`; singular when `sin(omega*t) == 0`
pub fn exponent(params: &Parameters, x: f64, t: f64) -> Complex64 {
    let i = Complex64::i();
    let (m, w, hbar, sigma) = (params.mass, params.omega, params.hbar, params.sigma);
    let sigma2 = sigma * sigma;
    let (s, c) = (w * t).sin_cos();
    let tan = s / c;

    let b = params.x0 / (2.0 * sigma2) + i * params.p0 / hbar - i * m * w * x / (hbar * s);
    let a = 1.0 / (4.0 * sigma2) - i * m * w / (2.0 * hbar * tan);
    b * b / (4.0 * a) + i * m * w * x * x / (2.0 * hbar * tan)
        - params.x0 * params.x0 / (4.0 * sigma2)
}

/// Centroid, width, phase and velocity recovered from the propagator exponent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedRelations {
    pub t: f64,
    pub centroid: f64,
    pub width: f64,
    /// phase at x = 0
    pub phase_at_origin: f64,
    /// `(hbar/m) d(Im E)/dx` at x = 0
    pub velocity_at_origin: f64,
    /// `d(velocity)/dx`, the rate at which the packet stretches
    pub stretch_rate: f64,
}

impl DerivedRelations {
    pub fn at(params: &Parameters, t: f64) -> SimResult<Self> {
        let omega_t = params.omega * t;
        if Envelope::new(*params).branch(t) != PeriodBranch::General || omega_t.sin() == 0.0 {
            return Err(SimError::SingularTime { omega_t });
        }

        let e_minus = exponent(params, -1.0, t);
        let e_zero = exponent(params, 0.0, t);
        let e_plus = exponent(params, 1.0, t);

        // Re E = -(x - centroid)^2 / (4 width^2) + const = -A x^2 + B x + const
        let curvature = -(e_plus.re - 2.0 * e_zero.re + e_minus.re) / 2.0;
        let slope = (e_plus.re - e_minus.re) / 2.0;
        let phase_slope = (e_plus.im - e_minus.im) / 2.0;
        let phase_curvature = e_plus.im - 2.0 * e_zero.im + e_minus.im;

        let derived = Self {
            t,
            centroid: slope / (2.0 * curvature),
            width: 1.0 / (4.0 * curvature).sqrt(),
            phase_at_origin: e_zero.im,
            velocity_at_origin: params.hbar * phase_slope / params.mass,
            stretch_rate: params.hbar * phase_curvature / params.mass,
        };

        let values = [
            derived.centroid,
            derived.width,
            derived.phase_at_origin,
            derived.velocity_at_origin,
            derived.stretch_rate,
        ];
        if values.iter().all(|v| v.is_finite()) {
            Ok(derived)
        } else {
            Err(SimError::NonFinite { t, x: 0.0 })
        }
    }
}
