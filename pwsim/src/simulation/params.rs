//! Physical and numerical parameters for the simulation
//!
//! `Parameters` holds the oscillator and initial wave packet:
//! - mass, angular frequency and reduced Planck constant (`mass`, `omega`, `hbar`),
//! - initial Gaussian width and phase-space mean (`sigma`, `x0`, `p0`),
//! - tolerance used to detect whole/half periods (`singularity_tol`)
//!
//! `Solver` holds the integrator settings: method, initial/fixed step size,
//! error tolerances and a step cap

use crate::configuration::config::IntegratorConfig;
use crate::error::{SimError, SimResult};

/// Default tolerance for detecting `omega*t` on a multiple of pi
pub const DEFAULT_SINGULARITY_TOL: f64 = 1e-60;

/// Default cap on accepted + rejected integrator steps per trajectory
pub const DEFAULT_MAX_STEPS: usize = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameters {
    pub mass: f64, // particle mass
    pub omega: f64, // oscillator angular frequency
    pub hbar: f64, // reduced Planck constant
    pub sigma: f64, // initial Gaussian width
    pub x0: f64, // initial position mean
    pub p0: f64, // initial momentum mean
    pub singularity_tol: f64, // distance to a multiple of pi treated as exact
}

impl Parameters {
    /// Parameters with the default singularity tolerance
    pub fn new(mass: f64, omega: f64, hbar: f64, sigma: f64, x0: f64, p0: f64) -> Self {
        Self {
            mass,
            omega,
            hbar,
            sigma,
            x0,
            p0,
            singularity_tol: DEFAULT_SINGULARITY_TOL,
        }
    }

    /// Reject anything that would make the closed forms produce NaN/Inf
    pub fn validate(&self) -> SimResult<()> {
        positive("mass", self.mass)?;
        positive("omega", self.omega)?;
        positive("hbar", self.hbar)?;
        positive("sigma", self.sigma)?;
        finite("x0", self.x0)?;
        finite("p0", self.p0)?;
        if !(self.singularity_tol.is_finite() && self.singularity_tol >= 0.0) {
            return Err(SimError::InvalidParameter {
                name: "singularity_tol",
                value: self.singularity_tol,
                reason: "must be finite and non-negative",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Solver {
    pub method: IntegratorConfig, // dopri5 or rk4
    pub h0: f64, // initial step (dopri5) or fixed step (rk4)
    pub atol: f64, // absolute error tolerance
    pub rtol: f64, // relative error tolerance
    pub max_steps: usize, // per trajectory
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            method: IntegratorConfig::Dopri5,
            h0: 1e-2,
            atol: 1e-9,
            rtol: 1e-9,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl Solver {
    pub fn validate(&self) -> SimResult<()> {
        positive("h0", self.h0)?;
        positive("atol", self.atol)?;
        positive("rtol", self.rtol)?;
        if self.max_steps == 0 {
            return Err(SimError::InvalidParameter {
                name: "max_steps",
                value: 0.0,
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

pub(crate) fn positive(name: &'static str, value: f64) -> SimResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SimError::InvalidParameter {
            name,
            value,
            reason: "must be finite and strictly positive",
        })
    }
}

pub(crate) fn finite(name: &'static str, value: f64) -> SimResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimError::InvalidParameter {
            name,
            value,
            reason: "must be finite",
        })
    }
}
