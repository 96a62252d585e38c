//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – which view to run, which integrator, parallelism
//! - [`ParametersConfig`] – oscillator and initial wave packet
//! - [`GridConfig`]       – spatial grid the wave packet is sampled on
//! - [`TrajectoryConfig`] – initial positions and time grid for trajectories
//! - [`SolverConfig`]     – step size and error tolerances
//! - [`AnimationConfig`]  – time step and frame count of the packet animation
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! An example trajectory scenario matching these types:
//!
//! ```yaml
//! engine:
//!   view: "trajectories"    # or "packet"
//!   integrator: "dopri5"    # or "rk4"
//!   parallel: true
//!
//! parameters:
//!   mass: 1.0
//!   omega: 1.0
//!   hbar: 1.0
//!   sigma: 1.0              # initial Gaussian width
//!   x0: 4.0                 # initial position mean
//!   p0: 0.0                 # initial momentum mean
//!   singularity_tol: 1.0e-60
//!
//! grid:
//!   grid_start: -10.0
//!   grid_end: 10.0
//!   grid_points: 1000
//!
//! trajectories:
//!   total_trajectories: 10
//!   total_time_steps: 1000
//!   t_end: 40.0
//!   spread: 0.5             # initial positions span x0 .. x0 + spread*sigma
//!
//! solver:
//!   h0: 0.01
//!   atol: 1.0e-9
//!   rtol: 1.0e-9
//!
//! animation:
//!   dt: 0.01
//!   frames: 200
//! ```
//!
//! Sections other than `parameters` may be omitted and fall back to the
//! defaults above. The scenario builder validates everything before use.

use serde::Deserialize;

use crate::simulation::params::{DEFAULT_MAX_STEPS, DEFAULT_SINGULARITY_TOL};

/// Which integrator the engine uses for trajectories
/// `integrator: "dopri5"` or `integrator: "rk4"`
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegratorConfig {
    #[serde(rename = "dopri5")] // Adaptive Dormand–Prince 5(4), step controlled by atol/rtol
    #[default]
    Dopri5,

    #[serde(rename = "rk4")] // Classical 4th-order Runge–Kutta with fixed step h0
    Rk4,
}

/// Which pipeline the binary runs
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewConfig {
    #[serde(rename = "packet")] // Animated real/imaginary/modulus of the wave packet
    #[default]
    Packet,

    #[serde(rename = "trajectories")] // Guided trajectories against the analytic band
    Trajectories,
}

/// High-level engine configuration
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub view: ViewConfig, // packet or trajectories
    pub integrator: IntegratorConfig, // time integrator for trajectories
    pub parallel: bool, // integrate trajectories on the rayon pool
}

/// Oscillator and initial wave packet
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub mass: f64,
    pub omega: f64,
    pub hbar: f64,
    pub sigma: f64, // initial Gaussian width
    pub x0: f64, // initial position mean
    pub p0: f64, // initial momentum mean
    #[serde(default = "default_singularity_tol")]
    pub singularity_tol: f64, // distance to a multiple of pi treated as exact
}

/// Spatial sampling grid
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GridConfig {
    pub grid_start: f64,
    pub grid_end: f64,
    pub grid_points: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            grid_start: -10.0,
            grid_end: 10.0,
            grid_points: 1000,
        }
    }
}

/// Initial conditions and time grid for the guided trajectories
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TrajectoryConfig {
    pub total_trajectories: usize,
    pub total_time_steps: usize,
    pub t_end: f64,
    pub spread: f64, // in units of sigma
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            total_trajectories: 10,
            total_time_steps: 1000,
            t_end: 40.0,
            spread: 0.5,
        }
    }
}

/// Integrator step size and tolerances
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SolverConfig {
    pub h0: f64, // initial (dopri5) or fixed (rk4) step
    pub atol: f64, // absolute error tolerance
    pub rtol: f64, // relative error tolerance
    pub max_steps: usize, // per trajectory
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            h0: 1e-2,
            atol: 1e-9,
            rtol: 1e-9,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// Packet animation clock
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AnimationConfig {
    pub dt: f64, // simulation time advanced per frame
    pub frames: usize, // frames written by a headless run
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self { dt: 0.01, frames: 200 }
    }
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    pub parameters: ParametersConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub trajectories: TrajectoryConfig,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
}

fn default_singularity_tol() -> f64 {
    DEFAULT_SINGULARITY_TOL
}
