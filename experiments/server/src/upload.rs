use {
    base::{Latest, Shutdown},
    com::SnapshotSink,
    image::Overlay,
    sensor::{ReadingLog, SensorReading},
    std::{sync::Arc, time::Duration},
    video::Frame,
};

/// Upload cadence state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadState {
    #[default]
    Normal,
    /// The last cycle had no frame or the upload did not succeed.
    BackedOff,
}

/// What happened in one upload cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No frame has been captured yet.
    NoFrame,
    /// The endpoint answered with this status code.
    Status(u16),
    /// Timeout, refused connection or other transport fault.
    Failed,
}

impl UploadState {
    /// State for the next cycle. Only a 2xx answer keeps the normal cadence.
    pub fn after(outcome: CycleOutcome) -> Self {
        match outcome {
            CycleOutcome::Status(status) if (200..300).contains(&status) => UploadState::Normal,
            _ => UploadState::BackedOff,
        }
    }
}

/// Delay before the next cycle for each state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub normal: Duration,
    pub backed_off: Duration,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            normal: Duration::from_secs(10),
            backed_off: Duration::from_secs(60),
        }
    }
}

impl Schedule {
    pub fn new(normal: Duration, backed_off: Duration) -> Self {
        Self { normal, backed_off }
    }

    pub fn delay(&self, state: UploadState) -> Duration {
        match state {
            UploadState::Normal => self.normal,
            UploadState::BackedOff => self.backed_off,
        }
    }
}

/// Periodically composites the newest frame and uploads it.
pub struct Uploader<S> {
    sink: S,
    frames: Latest<Frame>,
    readings: Latest<SensorReading>,
    overlay: Arc<Overlay>,
    reading_log: Option<ReadingLog>,
    schedule: Schedule,
    state: UploadState,
}

impl<S: SnapshotSink> Uploader<S> {
    pub fn new(
        sink: S,
        frames: Latest<Frame>,
        readings: Latest<SensorReading>,
        overlay: Overlay,
    ) -> Self {
        Self {
            sink,
            frames,
            readings,
            overlay: Arc::new(overlay),
            reading_log: None,
            schedule: Schedule::default(),
            state: UploadState::Normal,
        }
    }

    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Append the reading used for every upload to `log`.
    pub fn with_reading_log(mut self, log: ReadingLog) -> Self {
        self.reading_log = Some(log);
        self
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    pub fn schedule(&self) -> Schedule {
        self.schedule
    }

    /// Run one cycle without waiting and move to the resulting state.
    pub async fn cycle(&mut self) -> CycleOutcome {
        let outcome = self.attempt().await;
        let next = UploadState::after(outcome);
        if next != self.state {
            log::info!("upload: {:?} -> {next:?} after {outcome:?}", self.state);
        }
        self.state = next;
        outcome
    }

    async fn attempt(&self) -> CycleOutcome {
        let Some(frame) = self.frames.get() else {
            log::debug!("upload: no frame yet");
            return CycleOutcome::NoFrame;
        };
        let reading = self.readings.get();
        let at = base::local_now();

        let overlay = self.overlay.clone();
        let captured = frame.clone();
        let composited = match tokio::task::spawn_blocking(move || {
            overlay.render(&captured, reading.as_ref(), at)
        })
        .await
        {
            Ok(composited) => composited,
            Err(error) => {
                log::warn!("upload: overlay task failed: {error}");
                frame
            }
        };

        if let (Some(csv), Some(reading)) = (&self.reading_log, &reading) {
            csv.append(reading);
        }

        match self.sink.put(composited.bytes()).await {
            Ok(status) => {
                if (200..300).contains(&status) {
                    log::debug!("upload: {status}");
                } else {
                    log::warn!("upload: endpoint answered {status}");
                }
                CycleOutcome::Status(status)
            }
            Err(error) => {
                log::warn!("upload: {error}");
                CycleOutcome::Failed
            }
        }
    }

    /// Upload forever until shutdown: wait the delay of the current state,
    /// then run a cycle.
    pub async fn run(mut self, shutdown: Shutdown) {
        log::info!(
            "upload: every {:?}, {:?} when backed off",
            self.schedule.normal,
            self.schedule.backed_off
        );
        loop {
            let delay = self.schedule.delay(self.state);
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.wait() => break,
            }
            tokio::select! {
                _ = self.cycle() => {}
                _ = shutdown.wait() => break,
            }
        }
        log::info!("upload: stopped");
    }
}
