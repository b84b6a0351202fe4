//! Camera telemetry server: live MJPEG stream, sensor status and periodic
//! snapshot uploads.

pub mod config;
pub mod mjpeg;
pub mod routes;
pub mod upload;

pub use config::{Config, ConfigError};
pub use mjpeg::{MJPEG_CONTENT_TYPE, ViewerGuard, Viewers, mjpeg_stream};
pub use routes::{StatusReport, router};
pub use upload::{CycleOutcome, Schedule, UploadState, Uploader};

use {
    base::{Latest, Shutdown},
    sensor::SensorReading,
    std::time::Duration,
    video::Frame,
};

/// State shared by the HTTP handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub frames: Latest<Frame>,
    pub readings: Latest<SensorReading>,
    pub viewers: Viewers,
    pub stream_interval: Duration,
    /// Ends open streams when triggered.
    pub shutdown: Shutdown,
}

impl AppState {
    pub fn new(frames: Latest<Frame>, readings: Latest<SensorReading>) -> Self {
        Self {
            frames,
            readings,
            viewers: Viewers::new(),
            stream_interval: Duration::from_millis(50),
            shutdown: Shutdown::new(),
        }
    }

    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn with_stream_interval(mut self, interval: Duration) -> Self {
        self.stream_interval = interval;
        self
    }
}
