use {
    crate::*,
    std::{
        fs,
        path::{Path, PathBuf},
    },
};

/// Directory where the kernel lists IIO devices.
pub const IIO_DEVICES: &str = "/sys/bus/iio/devices";

// name the kernel `dht11` driver reports; it also handles the DHT22
const DRIVER_NAME: &str = "dht11";

// DHT22 datasheet range
const TEMPERATURE_RANGE: std::ops::RangeInclusive<f32> = -40.0..=80.0;
const HUMIDITY_RANGE: std::ops::RangeInclusive<f32> = 0.0..=100.0;

/// DHT22 read through the Linux IIO interface (`dtoverlay=dht11,gpiopin=N`).
///
/// The driver performs the single-wire transfer on every read of a channel
/// file and fails with `EIO` or `ETIMEDOUT` when the sensor does not answer
/// cleanly. Those failures are reported as transient.
#[derive(Debug, Clone)]
pub struct Dht22 {
    dir: PathBuf,
}

impl Dht22 {
    /// Use the IIO device in `dir` (e.g. `/sys/bus/iio/devices/iio:device0`).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Find the first `dht11` IIO device below `root`.
    pub fn discover(root: impl AsRef<Path>) -> Result<Self, SensorError> {
        let root = root.as_ref();
        let entries = fs::read_dir(root)
            .map_err(|e| SensorError::Device(format!("cannot list {root:?}: {e}")))?;

        let mut candidates: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|dir| {
                fs::read_to_string(dir.join("name"))
                    .map(|name| name.trim() == DRIVER_NAME)
                    .unwrap_or(false)
            })
            .collect();
        candidates.sort();

        candidates
            .into_iter()
            .next()
            .map(Self::new)
            .ok_or_else(|| SensorError::Device(format!("no {DRIVER_NAME} device below {root:?}")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_channel(&self, channel: &str) -> Result<f32, SensorError> {
        let path = self.dir.join(channel);
        let text = fs::read_to_string(&path)?;
        let milli: i64 = text
            .trim()
            .parse()
            .map_err(|e| SensorError::Parse(format!("{path:?}: {e} ({:?})", text.trim())))?;
        Ok(milli as f32 / 1000.0)
    }
}

impl Sensor for Dht22 {
    fn read(&mut self) -> Result<Option<(f32, f32)>, SensorError> {
        let temperature = self.read_channel("in_temp_input")?;
        let humidity = self.read_channel("in_humidityrelative_input")?;

        if TEMPERATURE_RANGE.contains(&temperature) && HUMIDITY_RANGE.contains(&humidity) {
            Ok(Some((temperature, humidity)))
        } else {
            log::debug!("dht22: discarding out of range sample {temperature} C / {humidity} %");
            Ok(None)
        }
    }
}
