//! Sample grids and the raw numeric outputs of a run.
//!
//! - `Particle`       position and time of one guided particle
//! - `Grid`           evenly spaced positions or times, fixed at construction
//! - `PacketSamples`  positions × times matrix of complex amplitudes
//! - `TrajectorySet`  initial-condition × time matrix of positions
//!
//! Both output types are plain arrays so they can be exported or compared
//! against golden data without going through the viewer.

use nalgebra::DMatrix;
use num_complex::Complex64;

use crate::error::{SimError, SimResult};
use crate::simulation::params::finite;

/// One guided particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f64, // position
    pub t: f64, // time
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    points: Vec<f64>,
}

impl Grid {
    /// `n` evenly spaced points from `start` to `end`, both ends included
    pub fn linspace(start: f64, end: f64, n: usize) -> SimResult<Self> {
        finite("grid_start", start)?;
        finite("grid_end", end)?;
        if n == 0 {
            return Err(SimError::InvalidParameter {
                name: "grid_points",
                value: 0.0,
                reason: "must be at least 1",
            });
        }
        if n > 1 && end <= start {
            return Err(SimError::InvalidParameter {
                name: "grid_end",
                value: end,
                reason: "must be greater than grid_start",
            });
        }
        if n == 1 {
            return Ok(Self { points: vec![start] });
        }

        let step = (end - start) / (n - 1) as f64;
        let mut points: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
        // pin the last point so rounding never drifts past `end`
        points[n - 1] = end;
        Ok(Self { points })
    }

    /// Time grid starting at 0, strictly increasing up to `t_end`
    pub fn time_grid(t_end: f64, n: usize) -> SimResult<Self> {
        if n == 0 {
            return Err(SimError::InvalidTimeGrid {
                reason: "total_time_steps must be at least 1".to_string(),
            });
        }
        if n > 1 && !(t_end > 0.0 && t_end.is_finite()) {
            return Err(SimError::InvalidTimeGrid {
                reason: format!("t_end must be finite and positive, got {t_end}"),
            });
        }
        Self::linspace(0.0, t_end, n)
    }

    /// Wrap explicit sample times; they must start at 0 and strictly increase
    pub fn from_times(times: Vec<f64>) -> SimResult<Self> {
        match times.first() {
            None => {
                return Err(SimError::InvalidTimeGrid {
                    reason: "no sample times".to_string(),
                })
            }
            Some(&t) if t != 0.0 => {
                return Err(SimError::InvalidTimeGrid {
                    reason: format!("first sample time must be 0, got {t}"),
                })
            }
            _ => {}
        }
        if let Some(w) = times.windows(2).find(|w| w[1] <= w[0] || !w[1].is_finite()) {
            return Err(SimError::InvalidTimeGrid {
                reason: format!("times must strictly increase ({} then {})", w[0], w[1]),
            });
        }
        Ok(Self { points: times })
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> f64 {
        self.points[0]
    }

    pub fn last(&self) -> f64 {
        self.points[self.points.len() - 1]
    }

    /// Uniform spacing, `None` for a single point
    pub fn spacing(&self) -> Option<f64> {
        if self.points.len() < 2 {
            None
        } else {
            Some(self.points[1] - self.points[0])
        }
    }
}

/// Complex amplitudes; row `i` is position `positions[i]`, column `j` is time `times[j]`
#[derive(Debug, Clone)]
pub struct PacketSamples {
    pub positions: Grid,
    pub times: Vec<f64>,
    pub values: DMatrix<Complex64>,
}

impl PacketSamples {
    /// Amplitudes over all positions at frame `j`
    pub fn frame(&self, j: usize) -> Vec<Complex64> {
        self.values.column(j).iter().copied().collect()
    }
}

/// Positions; row `i` is the trajectory started at `initial[i]`, column `j` is `times[j]`
#[derive(Debug, Clone)]
pub struct TrajectorySet {
    pub initial: Vec<f64>,
    pub times: Grid,
    pub positions: DMatrix<f64>,
}

impl TrajectorySet {
    pub fn from_rows(initial: Vec<f64>, times: Grid, rows: &[Vec<f64>]) -> Self {
        let positions = DMatrix::from_fn(rows.len(), times.len(), |i, j| rows[i][j]);
        Self {
            initial,
            times,
            positions,
        }
    }

    pub fn count(&self) -> usize {
        self.positions.nrows()
    }

    pub fn trajectory(&self, i: usize) -> Vec<f64> {
        self.positions.row(i).iter().copied().collect()
    }

    /// Largest pointwise distance to another set; `None` when the shapes differ
    pub fn max_abs_deviation(&self, other: &TrajectorySet) -> Option<f64> {
        if self.positions.shape() != other.positions.shape() {
            return None;
        }
        Some((&self.positions - &other.positions).amax())
    }
}
