use {
    base::log::LevelFilter,
    com::ClientConfig,
    std::{fmt, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration},
    video::CaptureConfig,
};

/// Prefix of every environment variable read by `Config::from_env()`.
pub const ENV_PREFIX: &str = "PICAM_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid { key, value, reason } => {
                write!(f, "invalid {key}={value:?}: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Settings for the whole service.
#[derive(Debug, Clone)]
pub struct Config {
    listen: SocketAddr,
    capture: CaptureConfig,
    sensor_dir: Option<PathBuf>,
    sensor_interval: Duration,
    reading_log: PathBuf,
    upload: ClientConfig,
    upload_delay: Duration,
    upload_backoff: Duration,
    font_path: PathBuf,
    font_size: f32,
    stream_interval: Duration,
    log_level: LevelFilter,
    log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 8081)),
            capture: CaptureConfig::default(),
            sensor_dir: None,
            sensor_interval: sensor::sampler::DEFAULT_INTERVAL,
            reading_log: PathBuf::from("sensorData.csv"),
            upload: ClientConfig::default(),
            upload_delay: Duration::from_secs(10),
            upload_backoff: Duration::from_secs(60),
            font_path: PathBuf::from(image::font::DEFAULT_FONT_PATH),
            font_size: image::font::DEFAULT_FONT_SIZE,
            stream_interval: Duration::from_millis(50),
            log_level: LevelFilter::Info,
            log_dir: None,
        }
    }
}

impl Config {
    pub fn with_listen(mut self, listen: SocketAddr) -> Self {
        self.listen = listen;
        self
    }

    pub fn with_capture(mut self, capture: CaptureConfig) -> Self {
        self.capture = capture;
        self
    }

    /// Use a fixed IIO device directory instead of searching for one.
    pub fn with_sensor_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.sensor_dir = Some(dir.into());
        self
    }

    pub fn with_sensor_interval(mut self, interval: Duration) -> Self {
        self.sensor_interval = interval;
        self
    }

    pub fn with_reading_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.reading_log = path.into();
        self
    }

    pub fn with_upload(mut self, upload: ClientConfig) -> Self {
        self.upload = upload;
        self
    }

    pub fn with_upload_delays(mut self, normal: Duration, backed_off: Duration) -> Self {
        self.upload_delay = normal;
        self.upload_backoff = backed_off;
        self
    }

    pub fn with_font(mut self, path: impl Into<PathBuf>, size: f32) -> Self {
        self.font_path = path.into();
        self.font_size = size;
        self
    }

    pub fn with_stream_interval(mut self, interval: Duration) -> Self {
        self.stream_interval = interval;
        self
    }

    pub fn with_log_level(mut self, level: LevelFilter) -> Self {
        self.log_level = level;
        self
    }

    /// Log to daily files in `dir` instead of stdout.
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    pub fn listen(&self) -> SocketAddr {
        self.listen
    }

    pub fn capture(&self) -> &CaptureConfig {
        &self.capture
    }

    pub fn sensor_dir(&self) -> Option<&PathBuf> {
        self.sensor_dir.as_ref()
    }

    pub fn sensor_interval(&self) -> Duration {
        self.sensor_interval
    }

    pub fn reading_log(&self) -> &PathBuf {
        &self.reading_log
    }

    pub fn upload(&self) -> &ClientConfig {
        &self.upload
    }

    /// Uploading needs a camera token.
    pub fn upload_enabled(&self) -> bool {
        !self.upload.token().is_empty()
    }

    pub fn upload_delay(&self) -> Duration {
        self.upload_delay
    }

    pub fn upload_backoff(&self) -> Duration {
        self.upload_backoff
    }

    pub fn font_path(&self) -> &PathBuf {
        &self.font_path
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn stream_interval(&self) -> Duration {
        self.stream_interval
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn log_dir(&self) -> Option<&PathBuf> {
        self.log_dir.as_ref()
    }

    /// Defaults overridden by `PICAM_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the `PICAM_*`
    /// keys. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env { lookup };
        let mut config = Self::default();

        if let Some(listen) = env.parse("LISTEN")? {
            config.listen = listen;
        }

        let mut capture = config.capture;
        if let Some(program) = env.get("CAPTURE_PROGRAM") {
            capture = capture.with_program(program);
        }
        if let Some(width) = env.parse("WIDTH")? {
            capture = capture.with_width(width);
        }
        if let Some(height) = env.parse("HEIGHT")? {
            capture = capture.with_height(height);
        }
        if let Some(framerate) = env.parse("FRAMERATE")? {
            capture = capture.with_framerate(framerate);
        }
        if let Some(quality) = env.parse::<u32>("QUALITY")? {
            if !(1..=100).contains(&quality) {
                return Err(env.invalid("QUALITY", &quality.to_string(), "expected 1-100"));
            }
            capture = capture.with_quality(quality);
        }
        if let Some(args) = env.get("CAPTURE_ARGS") {
            capture = capture.with_args(args.split_whitespace().map(str::to_string).collect());
        }
        config.capture = capture;

        if let Some(dir) = env.get("SENSOR_DIR") {
            config.sensor_dir = Some(PathBuf::from(dir));
        }
        if let Some(interval) = env.millis("SENSOR_INTERVAL_MS")? {
            config.sensor_interval = interval;
        }
        if let Some(path) = env.get("CSV_PATH") {
            config.reading_log = PathBuf::from(path);
        }

        let mut upload = config.upload;
        if let Some(endpoint) = env.get("UPLOAD_URL") {
            upload = upload.with_endpoint(endpoint);
        }
        if let Some(fingerprint) = env.get("FINGERPRINT") {
            upload = upload.with_fingerprint(fingerprint);
        }
        if let Some(token) = env.get("TOKEN") {
            upload = upload.with_token(token);
        }
        if let Some(timeout) = env.millis("UPLOAD_TIMEOUT_MS")? {
            upload = upload.with_timeout(timeout);
        }
        if let Some(insecure) = env.parse("UPLOAD_INSECURE")? {
            upload = upload.with_accept_invalid_certs(insecure);
        }
        config.upload = upload;
        if let Some(delay) = env.millis("UPLOAD_DELAY_MS")? {
            config.upload_delay = delay;
        }
        if let Some(delay) = env.millis("UPLOAD_BACKOFF_MS")? {
            config.upload_backoff = delay;
        }

        if let Some(path) = env.get("FONT") {
            config.font_path = PathBuf::from(path);
        }
        if let Some(size) = env.parse::<f32>("FONT_SIZE")? {
            if !size.is_finite() || size <= 0.0 {
                return Err(env.invalid("FONT_SIZE", &size.to_string(), "expected a positive size"));
            }
            config.font_size = size;
        }
        if let Some(interval) = env.millis("STREAM_INTERVAL_MS")? {
            config.stream_interval = interval;
        }

        if let Some(level) = env.get("LOG") {
            config.log_level = base::logging::parse_level(&level)
                .ok_or_else(|| env.invalid("LOG", &level, "unknown log level"))?;
        }
        if let Some(dir) = env.get("LOG_DIR") {
            config.log_dir = Some(PathBuf::from(dir));
        }

        Ok(config)
    }
}

struct Env<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(&format!("{ENV_PREFIX}{name}")).filter(|value| !value.trim().is_empty())
    }

    fn parse<T>(&self, name: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        match self.get(name) {
            Some(value) => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|e: T::Err| self.invalid(name, &value, &e.to_string())),
            None => Ok(None),
        }
    }

    fn millis(&self, name: &str) -> Result<Option<Duration>, ConfigError> {
        match self.parse::<u64>(name)? {
            Some(0) => Err(self.invalid(name, "0", "must be greater than zero")),
            Some(ms) => Ok(Some(Duration::from_millis(ms))),
            None => Ok(None),
        }
    }

    fn invalid(&self, name: &str, value: &str, reason: &str) -> ConfigError {
        ConfigError::Invalid {
            key: format!("{ENV_PREFIX}{name}"),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}
