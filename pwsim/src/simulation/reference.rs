//! Closed-form trajectories used as the comparison curves.
//!
//! The guiding field is linear in `x`, so every trajectory is the centroid
//! plus its initial offset stretched by the breathing width:
//! `x(t) = centroid(t) + (xi - x0) * width(t) / sigma`.

use crate::simulation::envelope::Envelope;
use crate::simulation::params::Parameters;
use crate::simulation::states::{Grid, TrajectorySet};

/// Lower edge, centroid and upper edge of the one-width band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub lower: f64,
    pub centroid: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reference {
    envelope: Envelope,
}

impl Reference {
    pub fn new(params: Parameters) -> Self {
        Self {
            envelope: Envelope::new(params),
        }
    }

    pub fn trajectory(&self, xi: f64, t: f64) -> f64 {
        let p = &self.envelope.params;
        self.envelope.centroid(t) + (xi - p.x0) * self.envelope.width(t) / p.sigma
    }

    pub fn band(&self, t: f64) -> Band {
        let centroid = self.envelope.centroid(t);
        let width = self.envelope.width(t);
        Band {
            lower: centroid - width,
            centroid,
            upper: centroid + width,
        }
    }

    pub fn set(&self, initial: &[f64], times: &Grid) -> TrajectorySet {
        let rows: Vec<Vec<f64>> = initial
            .iter()
            .map(|&xi| times.points().iter().map(|&t| self.trajectory(xi, t)).collect())
            .collect();
        TrajectorySet::from_rows(initial.to_vec(), times.clone(), &rows)
    }
}
