//! Velocity fields that drive the trajectory integrators
//!
//! `VelocityField` is the seam between the physics and the integrators:
//! every trajectory obeys `dx/dt = v(x, t)` on its own, so a field only ever
//! sees one position (or an independent batch of them) at a time.

use crate::simulation::envelope::{Envelope, PeriodBranch};
use crate::simulation::params::Parameters;

/// Right-hand side of `dx/dt = v(x, t)` for independent particles
pub trait VelocityField {
    fn velocity(&self, t: f64, x: f64) -> f64;

    /// Evaluate the field for every position in `xs` at the same time `t`
    fn velocities(&self, t: f64, xs: &[f64], out: &mut [f64]) {
        for (v, &x) in out.iter_mut().zip(xs) {
            *v = self.velocity(t, x);
        }
    }
}

/// de Broglie–Bohm guiding equation `v = (hbar/m) d(phase)/dx` of the squeezed state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuidingField {
    envelope: Envelope,
}

impl GuidingField {
    pub fn new(params: Parameters) -> Self {
        Self {
            envelope: Envelope::new(params),
        }
    }

    pub fn params(&self) -> &Parameters {
        &self.envelope.params
    }
}

impl VelocityField for GuidingField {
    fn velocity(&self, t: f64, x: f64) -> f64 {
        let p = &self.envelope.params;
        match self.envelope.branch(t) {
            PeriodBranch::WholePeriod => return p.p0 / p.mass,
            PeriodBranch::HalfPeriod => return -p.p0 / p.mass,
            PeriodBranch::General => {}
        }

        let (s, c) = (p.omega * t).sin_cos();
        let (m, w, hbar) = (p.mass, p.omega, p.hbar);
        let hbar2 = hbar * hbar;
        let sigma4 = p.sigma.powi(4);
        let squeeze = hbar2 - 4.0 * m * m * w * w * sigma4; // zero for a coherent state

        // common factor m*sin(wt) cancelled from numerator and denominator
        let denominator = 4.0 * c * c * m * m * w * w * sigma4 + hbar2 * s * s;
        (4.0 * c * m * w * w * p.p0 * sigma4 - hbar2 * w * s * p.x0 + x * c * w * s * squeeze)
            / denominator
    }

    fn velocities(&self, t: f64, xs: &[f64], out: &mut [f64]) {
        let p = &self.envelope.params;
        let uniform = match self.envelope.branch(t) {
            PeriodBranch::WholePeriod => Some(p.p0 / p.mass),
            PeriodBranch::HalfPeriod => Some(-p.p0 / p.mass),
            PeriodBranch::General => None,
        };
        match uniform {
            // broadcast the limiting momentum over the batch
            Some(v) => out.iter_mut().for_each(|o| *o = v),
            None => {
                for (o, &x) in out.iter_mut().zip(xs) {
                    *o = self.velocity(t, x);
                }
            }
        }
    }
}
