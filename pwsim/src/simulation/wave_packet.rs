//! Analytic squeezed-state wave packet in a harmonic oscillator.
//!
//! A Gaussian prepared at t = 0 with width `sigma` around `(x0, p0)` stays
//! Gaussian under the oscillator propagator; its centroid follows the
//! classical orbit and its width breathes between `sigma` and
//! `hbar / (2 m omega sigma)`.

use std::f64::consts::PI;

use nalgebra::DMatrix;
use num_complex::Complex64;

use crate::simulation::envelope::Envelope;
use crate::simulation::params::Parameters;
use crate::simulation::states::{Grid, PacketSamples};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavePacket {
    envelope: Envelope,
}

impl WavePacket {
    pub fn new(params: Parameters) -> Self {
        Self {
            envelope: Envelope::new(params),
        }
    }

    pub fn params(&self) -> &Parameters {
        &self.envelope.params
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Complex amplitude `psi(x, t)`
    pub fn amplitude(&self, x: f64, t: f64) -> Complex64 {
        let x_t = self.envelope.centroid(t);
        let s_t = self.envelope.width(t);
        let gauss = (-(x - x_t).powi(2) / (4.0 * s_t * s_t)).exp() / (s_t * (2.0 * PI).sqrt()).sqrt();
        self.envelope.phase_factor(x, t) * gauss
    }

    /// Amplitudes over a whole spatial grid at one time
    pub fn sample(&self, grid: &Grid, t: f64) -> Vec<Complex64> {
        grid.points().iter().map(|&x| self.amplitude(x, t)).collect()
    }

    /// Positions × times matrix of amplitudes
    pub fn sample_frames(&self, grid: &Grid, times: &[f64]) -> PacketSamples {
        let values = DMatrix::from_fn(grid.len(), times.len(), |i, j| {
            self.amplitude(grid.points()[i], times[j])
        });
        PacketSamples {
            positions: grid.clone(),
            times: times.to_vec(),
            values,
        }
    }

    /// Trapezoidal integral of `|psi|^2` over `grid`
    pub fn probability(&self, grid: &Grid, t: f64) -> f64 {
        let xs = grid.points();
        xs.windows(2)
            .map(|w| {
                let a = self.amplitude(w[0], t).norm_sqr();
                let b = self.amplitude(w[1], t).norm_sqr();
                0.5 * (a + b) * (w[1] - w[0])
            })
            .sum()
    }
}
