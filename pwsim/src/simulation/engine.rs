//! High-level runtime engine settings
//!
//! Selects the pipeline (packet animation or trajectories), the integrator,
//! and whether trajectories are integrated on the rayon pool

use crate::configuration::config::{EngineConfig, IntegratorConfig, ViewConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Engine {
    pub view: ViewConfig, // packet or trajectories
    pub integrator: IntegratorConfig, // dopri5 or rk4
    pub parallel: bool, // false = serial, true = rayon
}

impl From<&EngineConfig> for Engine {
    fn from(cfg: &EngineConfig) -> Self {
        Self {
            view: cfg.view,
            integrator: cfg.integrator,
            parallel: cfg.parallel,
        }
    }
}
