use std::fmt;

#[derive(Debug)]
pub enum SensorError {
    /// The read failed but the next one may succeed.
    Transient(String),
    Device(String),
    Parse(String),
}

impl SensorError {
    pub fn is_transient(&self) -> bool {
        matches!(self, SensorError::Transient(_))
    }
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorError::Transient(msg) => write!(f, "transient read error: {msg}"),
            SensorError::Device(msg) => write!(f, "device error: {msg}"),
            SensorError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for SensorError {}

impl From<std::io::Error> for SensorError {
    fn from(err: std::io::Error) -> Self {
        match err.raw_os_error() {
            Some(libc::EIO | libc::ETIMEDOUT | libc::EAGAIN) => SensorError::Transient(err.to_string()),
            _ => SensorError::Device(err.to_string()),
        }
    }
}
