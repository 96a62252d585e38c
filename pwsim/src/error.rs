//! Error types for scenario validation and trajectory integration

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("invalid time grid: {reason}")]
    InvalidTimeGrid { reason: String },

    #[error("a NaN or Inf value was produced at t = {t}, x = {x}")]
    NonFinite { t: f64, x: f64 },

    #[error("step size underflow at t = {t} (h = {h:e})")]
    StepSizeUnderflow { t: f64, h: f64 },

    #[error("exceeded {max_steps} integrator steps before reaching t = {t}")]
    TooManySteps { t: f64, max_steps: usize },

    #[error("propagator exponent is singular at omega*t = {omega_t}")]
    SingularTime { omega_t: f64 },
}

pub type SimResult<T> = Result<T, SimError>;
