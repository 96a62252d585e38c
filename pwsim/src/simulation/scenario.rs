//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing), validates it, and produces the
//! runtime bundle `Scenario` containing:
//! - engine settings (`Engine`)
//! - physical parameters (`Parameters`) and solver settings (`Solver`)
//! - the spatial grid, the trajectory time grid and initial positions
//! - the wave packet, its guiding field and the analytic reference
//!
//! The scenario is inserted into Bevy as a `Resource` and read by the
//! viewers; headless runs call its methods directly

use bevy::prelude::Resource;
use log::{debug, info};

use crate::configuration::config::ScenarioConfig;
use crate::error::{SimError, SimResult};
use crate::simulation::engine::Engine;
use crate::simulation::field::GuidingField;
use crate::simulation::integrator::integrate_ensemble;
use crate::simulation::params::{finite, positive, Parameters, Solver};
use crate::simulation::reference::Reference;
use crate::simulation::states::{Grid, PacketSamples, TrajectorySet};
use crate::simulation::wave_packet::WavePacket;

/// Bevy resource representing a fully-initialized, validated scenario
#[derive(Resource, Debug, Clone)]
pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub solver: Solver,
    pub grid: Grid, // spatial grid for the packet
    pub times: Grid, // sample times for trajectories
    pub initial_positions: Vec<f64>,
    pub packet: WavePacket,
    pub field: GuidingField,
    pub reference: Reference,
    pub animation_dt: f64,
    pub animation_frames: usize,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> SimResult<Self> {
        // Parameters (runtime) from ParametersConfig
        let p_cfg = &cfg.parameters;
        let parameters = Parameters {
            mass: p_cfg.mass,
            omega: p_cfg.omega,
            hbar: p_cfg.hbar,
            sigma: p_cfg.sigma,
            x0: p_cfg.x0,
            p0: p_cfg.p0,
            singularity_tol: p_cfg.singularity_tol,
        };
        parameters.validate()?;

        // Solver (runtime) from SolverConfig, method chosen by the engine
        let engine = Engine::from(&cfg.engine);
        let solver = Solver {
            method: engine.integrator,
            h0: cfg.solver.h0,
            atol: cfg.solver.atol,
            rtol: cfg.solver.rtol,
            max_steps: cfg.solver.max_steps,
        };
        solver.validate()?;

        // Grids
        let grid = Grid::linspace(cfg.grid.grid_start, cfg.grid.grid_end, cfg.grid.grid_points)?;
        let t_cfg = &cfg.trajectories;
        let times = Grid::time_grid(t_cfg.t_end, t_cfg.total_time_steps)?;

        // Initial positions: x0 .. x0 + spread*sigma
        finite("spread", t_cfg.spread)?;
        let n = t_cfg.total_trajectories;
        if n == 0 {
            return Err(SimError::InvalidParameter {
                name: "total_trajectories",
                value: 0.0,
                reason: "must be at least 1",
            });
        }
        let initial_positions = if n == 1 || t_cfg.spread == 0.0 {
            vec![parameters.x0; n]
        } else {
            let a = parameters.x0;
            let b = parameters.x0 + t_cfg.spread * parameters.sigma;
            Grid::linspace(a.min(b), a.max(b), n)?.points().to_vec()
        };

        positive("animation.dt", cfg.animation.dt)?;

        info!(
            "scenario: view={:?} integrator={:?} trajectories={} samples={} grid={}",
            engine.view,
            engine.integrator,
            initial_positions.len(),
            times.len(),
            grid.len()
        );
        debug!("parameters: {:?}", parameters);

        Ok(Self {
            engine,
            parameters,
            solver,
            grid,
            times,
            initial_positions,
            packet: WavePacket::new(parameters),
            field: GuidingField::new(parameters),
            reference: Reference::new(parameters),
            animation_dt: cfg.animation.dt,
            animation_frames: cfg.animation.frames,
        })
    }

    /// Integrate every initial position through the guiding field
    pub fn integrate(&self) -> SimResult<TrajectorySet> {
        integrate_ensemble(
            &self.field,
            &self.initial_positions,
            &self.times,
            &self.solver,
            self.engine.parallel,
        )
    }

    /// Closed-form counterpart of [`Scenario::integrate`]
    pub fn reference_set(&self) -> TrajectorySet {
        self.reference.set(&self.initial_positions, &self.times)
    }

    /// Times of the packet animation frames, `k * dt`
    pub fn frame_times(&self) -> Vec<f64> {
        (0..self.animation_frames)
            .map(|k| k as f64 * self.animation_dt)
            .collect()
    }

    /// Packet amplitudes at every animation frame
    pub fn packet_frames(&self) -> PacketSamples {
        self.packet.sample_frames(&self.grid, &self.frame_times())
    }
}
