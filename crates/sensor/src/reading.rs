use std::time::SystemTime;

/// One complete temperature/humidity sample.
///
/// Partial samples are not representable; a missing reading is `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    /// Degrees Celsius.
    pub temperature: f32,
    /// Relative humidity in percent.
    pub humidity: f32,
    pub sampled_at: SystemTime,
}

impl SensorReading {
    pub fn new(temperature: f32, humidity: f32) -> Self {
        Self::at(temperature, humidity, SystemTime::now())
    }

    pub fn at(temperature: f32, humidity: f32, sampled_at: SystemTime) -> Self {
        Self {
            temperature,
            humidity,
            sampled_at,
        }
    }

    /// Build a reading only if both values are present.
    pub fn from_pair(temperature: Option<f32>, humidity: Option<f32>) -> Option<Self> {
        match (temperature, humidity) {
            (Some(temperature), Some(humidity)) => Some(Self::new(temperature, humidity)),
            _ => None,
        }
    }
}
