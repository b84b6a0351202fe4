use {
    crate::*,
    base::{Latest, Shutdown},
    std::{process::Stdio, time::Duration},
    tokio::{
        io::{AsyncRead, AsyncReadExt},
        process::{Child, Command},
    },
};

// size of a single read from the capture pipe
const READ_CHUNK: usize = 8192;

/// How a capture run finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureEnd {
    /// The subprocess closed its stdout after publishing `frames` frames.
    StreamEnded { frames: u64 },
    /// Shutdown was requested while the stream was still running.
    Shutdown,
}

/// Read an MJPEG stream until EOF, publishing the newest frame of every read.
///
/// Returns the number of frames published. When several frames complete in
/// one read only the newest is stored; readers would never see the others.
pub async fn pump<R: AsyncRead + Unpin>(
    mut reader: R,
    frames: &Latest<Frame>,
) -> Result<u64, VideoError> {
    let mut demuxer = FrameDemuxer::new();
    let mut chunk = vec![0u8; READ_CHUNK];
    let mut published = 0;

    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Ok(published);
        }

        let mut completed = demuxer.push(&chunk[..n]);
        if completed.len() > 1 {
            log::debug!("capture: {} frames in one read, keeping newest", completed.len());
        }
        if let Some(frame) = completed.pop() {
            frames.set(frame);
            published += 1;
        }
    }
}

/// Runs the camera program and feeds its output into the frame cell.
#[derive(Debug, Clone)]
pub struct Capture {
    config: CaptureConfig,
}

impl Capture {
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    fn spawn(&self) -> Result<Child, VideoError> {
        Command::new(self.config.program())
            .args(self.config.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            // backstop for the paths where release() never runs (task aborted)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| VideoError::Spawn(format!("{}: {e}", self.config.program())))
    }

    /// Spawn the camera program once and pump its stream until it ends.
    ///
    /// The process is interrupted and reaped on every exit path.
    pub async fn run_once(
        &self,
        frames: &Latest<Frame>,
        shutdown: &Shutdown,
    ) -> Result<CaptureEnd, VideoError> {
        let mut child = self.spawn()?;
        log::info!(
            "capture: started {} (pid {:?})",
            self.config.program(),
            child.id()
        );

        let result = match child.stdout.take() {
            Some(stdout) => tokio::select! {
                result = pump(stdout, frames) => result.map(|frames| CaptureEnd::StreamEnded { frames }),
                _ = shutdown.wait() => Ok(CaptureEnd::Shutdown),
            },
            None => Err(VideoError::Stream("capture stdout is not piped".to_string())),
        };

        release(&mut child, self.config.stop_timeout()).await;
        result
    }

    /// Keep the camera running until shutdown, restarting it whenever the
    /// stream ends or the program fails to start.
    pub async fn supervise(self, frames: Latest<Frame>, shutdown: Shutdown) {
        while !shutdown.is_triggered() {
            match self.run_once(&frames, &shutdown).await {
                Ok(CaptureEnd::Shutdown) => break,
                Ok(CaptureEnd::StreamEnded { frames }) => {
                    log::warn!("capture: stream ended after {frames} frames");
                }
                Err(error) => log::error!("capture: {error}"),
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.restart_delay()) => {}
                _ = shutdown.wait() => break,
            }
            log::info!("capture: restarting");
        }
        log::info!("capture: stopped");
    }
}

async fn release(child: &mut Child, grace: Duration) {
    if let Some(pid) = child.id() {
        // SAFETY: the pid belongs to our own child, which has not been reaped yet
        unsafe {
            libc::kill(pid as libc::pid_t, libc::SIGINT);
        }
    }

    match tokio::time::timeout(grace, child.wait()).await {
        Ok(Ok(status)) => log::info!("capture: process exited ({status})"),
        Ok(Err(error)) => log::warn!("capture: waiting for process failed: {error}"),
        Err(_) => {
            log::warn!("capture: process ignored SIGINT for {grace:?}, killing");
            if let Err(error) = child.kill().await {
                log::warn!("capture: kill failed: {error}");
            }
        }
    }
}
