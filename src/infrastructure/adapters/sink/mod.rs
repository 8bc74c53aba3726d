//! Audio Sink Adapters

mod simulated_sink;

pub use simulated_sink::{SimulatedSink, SimulatedSinkConfig};
