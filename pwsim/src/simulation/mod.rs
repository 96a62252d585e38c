pub mod params;
pub mod states;
pub mod envelope;
pub mod wave_packet;
pub mod field;
pub mod integrator;
pub mod reference;
pub mod propagator;
pub mod engine;
pub mod scenario;
