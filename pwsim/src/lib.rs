pub mod error;
pub mod simulation;
pub mod configuration;
pub mod visualization;
pub mod benchmark;

pub use error::{SimError, SimResult};

pub use simulation::params::{Parameters, Solver};
pub use simulation::states::{Grid, Particle, PacketSamples, TrajectorySet};
pub use simulation::envelope::{Envelope, PeriodBranch, PHASE_PREFACTOR};
pub use simulation::wave_packet::WavePacket;
pub use simulation::field::{VelocityField, GuidingField};
pub use simulation::integrator::{rk4_step, dopri5_step, integrate_trajectory, integrate_ensemble};
pub use simulation::reference::{Reference, Band};
pub use simulation::propagator::DerivedRelations;
pub use simulation::scenario::Scenario;

pub use configuration::config::{IntegratorConfig, ViewConfig, EngineConfig, ParametersConfig, GridConfig, TrajectoryConfig, SolverConfig, AnimationConfig, ScenarioConfig};

pub use visualization::{packet_view::run_packet_view, trajectory_view::run_trajectory_view};
pub use visualization::export::{write_packet, write_trajectories};

pub use benchmark::benchmark::{bench_field, bench_integrators, bench_integrators_curve};
