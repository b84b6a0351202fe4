use {
    crate::*,
    std::{
        fs::{self, OpenOptions},
        io::{self, Write},
        path::{Path, PathBuf},
        time::SystemTime,
    },
};

/// First line of every reading log.
pub const HEADER: &str = "timestamp,temperature,humidity";

/// Append-only CSV log of sensor readings.
///
/// Each row is `<epoch seconds>,<temperature>,<humidity>` with two decimals.
/// The file is opened and closed for every row so the log survives a crash
/// with at most the row in flight lost.
#[derive(Debug, Clone)]
pub struct ReadingLog {
    path: PathBuf,
    backup: PathBuf,
}

impl ReadingLog {
    /// Log at `path`, backed up to `<path>.old` on rotation.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut backup = path.clone().into_os_string();
        backup.push(".old");
        Self {
            path,
            backup: PathBuf::from(backup),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup
    }

    /// Start a fresh log, moving the current one to the backup path.
    ///
    /// A previous backup is discarded.
    pub fn rotate(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        match fs::remove_file(&self.backup) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e),
            _ => {}
        }
        if self.path.exists() {
            fs::rename(&self.path, &self.backup)?;
        }
        fs::write(&self.path, format!("{HEADER}\n"))
    }

    /// Append one row. I/O failures are logged and dropped.
    pub fn append(&self, reading: &SensorReading) -> bool {
        match self.try_append(reading) {
            Ok(()) => true,
            Err(error) => {
                log::debug!("reading log: dropped row for {:?}: {error}", self.path);
                false
            }
        }
    }

    fn try_append(&self, reading: &SensorReading) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(
            file,
            "{},{:.2},{:.2}",
            base::unix_seconds(SystemTime::now()),
            reading.temperature,
            reading.humidity
        )
    }
}
