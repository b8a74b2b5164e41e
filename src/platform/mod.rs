// Platform-specific code module

pub mod gpu;

pub use gpu::{default_telemetry, PowerReadings, PowerTelemetry};
