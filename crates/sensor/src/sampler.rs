use {
    crate::*,
    base::{Latest, Shutdown},
    std::{
        panic::{AssertUnwindSafe, catch_unwind},
        time::{Duration, Instant},
    },
    tokio::task::{JoinHandle, spawn_blocking},
};

// the sensor protocol is unreliable when polled faster than this
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(3);

// granularity of the shutdown check while sleeping
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Result of one sampling attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Published(SensorReading),
    /// Transient fault or incomplete values; try again next cycle.
    Skipped,
    Failed,
}

/// Polls a sensor and publishes complete readings.
pub struct Sampler<S> {
    sensor: S,
    readings: Latest<SensorReading>,
    interval: Duration,
}

impl<S: Sensor + 'static> Sampler<S> {
    pub fn new(sensor: S, readings: Latest<SensorReading>) -> Self {
        Self {
            sensor,
            readings,
            interval: DEFAULT_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Make one read attempt and publish the result if it is complete.
    pub fn sample_once(&mut self) -> Sample {
        // a panicking driver must not end the sampling loop
        let result = match catch_unwind(AssertUnwindSafe(|| self.sensor.read())) {
            Ok(result) => result,
            Err(_) => {
                log::error!("sampler: sensor driver panicked");
                return Sample::Failed;
            }
        };

        match result {
            Ok(Some((temperature, humidity))) => {
                let reading = SensorReading::new(temperature, humidity);
                self.readings.set(reading);
                log::debug!("sampler: {temperature:.1} C, {humidity:.1} %");
                Sample::Published(reading)
            }
            Ok(None) => Sample::Skipped,
            Err(error) if error.is_transient() => {
                log::debug!("sampler: {error}");
                Sample::Skipped
            }
            Err(error) => {
                log::warn!("sampler: {error}");
                Sample::Failed
            }
        }
    }

    /// Sample forever on the current thread until shutdown is requested.
    pub fn run(mut self, shutdown: Shutdown) {
        log::info!("sampler: polling every {:?}", self.interval);
        while !shutdown.is_triggered() {
            self.sample_once();

            let deadline = Instant::now() + self.interval;
            while !shutdown.is_triggered() {
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                std::thread::sleep(SLEEP_SLICE.min(deadline - now));
            }
        }
        log::info!("sampler: stopped");
    }

    /// Run the sampling loop on tokio's blocking thread pool.
    pub fn spawn(self, shutdown: Shutdown) -> JoinHandle<()> {
        spawn_blocking(move || self.run(shutdown))
    }
}
