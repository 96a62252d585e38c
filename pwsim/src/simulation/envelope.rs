//! Centroid, width and phase of the squeezed state at a given time
//!
//! The general phase has `sin(omega*t)` in its denominator. At whole and half
//! periods that is a removable singularity; `PeriodBranch` picks the limiting
//! form there instead of evaluating `0/0`.

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use num_complex::Complex64;

use crate::simulation::params::Parameters;

/// Constant prefactor `(1 - i)/sqrt(2)` carried by every phase factor
pub const PHASE_PREFACTOR: Complex64 = Complex64::new(FRAC_1_SQRT_2, -FRAC_1_SQRT_2);

/// Where `omega*t` sits relative to the multiples of pi
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodBranch {
    /// `omega*t` is an even multiple of pi (whole period)
    WholePeriod,
    /// `omega*t` is an odd multiple of pi (half period)
    HalfPeriod,
    General,
}

impl PeriodBranch {
    /// Classify by the distance from `omega_t` to the nearest multiple of pi
    pub fn classify(omega_t: f64, tol: f64) -> Self {
        let k = (omega_t / PI).round();
        if (omega_t - k * PI).abs() < tol {
            if k.rem_euclid(2.0) == 0.0 {
                PeriodBranch::WholePeriod
            } else {
                PeriodBranch::HalfPeriod
            }
        } else {
            PeriodBranch::General
        }
    }
}

/// Closed-form envelope and phase for one parameter set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub params: Parameters,
}

impl Envelope {
    pub fn new(params: Parameters) -> Self {
        Self { params }
    }

    pub fn branch(&self, t: f64) -> PeriodBranch {
        PeriodBranch::classify(self.params.omega * t, self.params.singularity_tol)
    }

    /// Instantaneous centroid `x0 cos(wt) + p0 sin(wt)/(m w)`
    pub fn centroid(&self, t: f64) -> f64 {
        let p = &self.params;
        let (s, c) = (p.omega * t).sin_cos();
        p.x0 * c + p.p0 * s / (p.mass * p.omega)
    }

    /// Instantaneous standard deviation of `|psi|^2`
    pub fn width(&self, t: f64) -> f64 {
        let p = &self.params;
        let (s, c) = (p.omega * t).sin_cos();
        let m_omega = p.mass * p.omega;
        let sigma2 = p.sigma * p.sigma;
        (p.hbar * p.hbar * s * s + 4.0 * m_omega * m_omega * sigma2 * sigma2 * c * c).sqrt()
            / (2.0 * m_omega * p.sigma)
    }

    /// Real phase angle of the general branch; only meaningful off the singular times
    pub fn phase(&self, x: f64, t: f64) -> f64 {
        let p = &self.params;
        let (s, c) = (p.omega * t).sin_cos();
        let (m, w, hbar, x0, p0) = (p.mass, p.omega, p.hbar, p.x0, p.p0);
        let (c2, s2) = (c * c, s * s);
        let hbar2 = hbar * hbar;
        let sigma4 = p.sigma.powi(4);
        let (m2, w2) = (m * m, w * w);

        let numerator = 2.0 * c2 * c * m2 * m * w2 * w * sigma4 * x * x
            + c * m * w
                * (hbar2 * s2 * x * x + hbar2 * s2 * x0 * x0 - 4.0 * m2 * w2 * sigma4 * x * x
                    + 8.0 * m * w * p0 * s * sigma4 * x
                    - 4.0 * p0 * p0 * s2 * sigma4)
                / 2.0
            + hbar2 * s2 * x0 * (-m * w * x + p0 * s);
        let denominator = hbar * s * (4.0 * c2 * m2 * w2 * sigma4 + hbar2 * s2);
        numerator / denominator
    }

    /// Unit-modulus phase rotation times `(1 - i)/sqrt(2)`
    pub fn phase_factor(&self, x: f64, t: f64) -> Complex64 {
        let p = &self.params;
        let angle = match self.branch(t) {
            PeriodBranch::WholePeriod => p.p0 * x / p.hbar,
            PeriodBranch::HalfPeriod => -p.p0 * x / p.hbar,
            PeriodBranch::General => self.phase(x, t),
        };
        Complex64::from_polar(1.0, angle) * PHASE_PREFACTOR
    }
}
