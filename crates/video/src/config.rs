use std::time::Duration;

/// Configuration for the capture subprocess.
#[derive(Clone, Debug)]
pub struct CaptureConfig {
    program: String,
    width: u32,
    height: u32,
    framerate: u32,
    quality: u32,
    args: Option<Vec<String>>,
    restart_delay: Duration,
    stop_timeout: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            program: "rpicam-vid".to_string(),
            width: 1920,
            height: 1080,
            framerate: 15,
            quality: 80,
            args: None,
            restart_delay: Duration::from_secs(2),
            stop_timeout: Duration::from_secs(5),
        }
    }
}

impl CaptureConfig {
    /// Set the capture program (looked up in `PATH`).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    pub fn with_height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    pub fn with_framerate(mut self, framerate: u32) -> Self {
        self.framerate = framerate;
        self
    }

    /// Set the MJPEG quality (1-100) requested from the camera.
    pub fn with_quality(mut self, quality: u32) -> Self {
        self.quality = quality;
        self
    }

    /// Replace the generated `rpicam-vid` arguments verbatim.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = Some(args);
        self
    }

    /// Set the pause between a capture run ending and the next spawn.
    pub fn with_restart_delay(mut self, delay: Duration) -> Self {
        self.restart_delay = delay;
        self
    }

    /// Set how long to wait for the process to exit after SIGINT.
    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn framerate(&self) -> u32 {
        self.framerate
    }

    pub fn quality(&self) -> u32 {
        self.quality
    }

    pub fn restart_delay(&self) -> Duration {
        self.restart_delay
    }

    pub fn stop_timeout(&self) -> Duration {
        self.stop_timeout
    }

    /// Command line arguments passed to the capture program.
    ///
    /// Unless overridden with `with_args()`, asks `rpicam-vid` for an endless
    /// MJPEG stream on stdout, flushed after every frame.
    pub fn args(&self) -> Vec<String> {
        if let Some(args) = &self.args {
            return args.clone();
        }
        vec![
            "-t".to_string(),
            "0".to_string(),
            "--width".to_string(),
            self.width.to_string(),
            "--height".to_string(),
            self.height.to_string(),
            "--framerate".to_string(),
            self.framerate.to_string(),
            "--codec".to_string(),
            "mjpeg".to_string(),
            "--quality".to_string(),
            self.quality.to_string(),
            "--flush".to_string(),
            "-o".to_string(),
            "-".to_string(),
        ]
    }
}
