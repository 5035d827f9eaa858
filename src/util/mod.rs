//! Shared utilities.

pub mod sampler;
pub mod telemetry;

pub use sampler::ArrivalSampler;
pub use telemetry::init_tracing;
