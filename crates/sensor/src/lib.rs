//! Temperature/humidity sampling.
//!
//! A `Sampler` polls a `Sensor` on a fixed cadence and keeps the newest
//! complete reading in a shared `Latest<SensorReading>` cell. `ReadingLog`
//! persists readings as CSV.

pub mod dht22;
pub mod error;
pub mod reading;
pub mod readinglog;
pub mod sampler;

pub use dht22::Dht22;
pub use error::SensorError;
pub use reading::SensorReading;
pub use readinglog::ReadingLog;
pub use sampler::{Sample, Sampler};

/// A polled temperature/humidity source.
///
/// `Ok(None)` means the sensor answered without a usable pair of values.
/// `Err(SensorError::Transient(_))` is part of normal operation for cheap
/// one-wire sensors and is expected every few reads.
pub trait Sensor: Send {
    fn read(&mut self) -> Result<Option<(f32, f32)>, SensorError>;
}

impl<F> Sensor for F
where
    F: FnMut() -> Result<Option<(f32, f32)>, SensorError> + Send,
{
    fn read(&mut self) -> Result<Option<(f32, f32)>, SensorError> {
        self()
    }
}
