use {
    axum::{Router, http::StatusCode, routing::put},
    base::{Latest, Shutdown},
    bytes::Bytes,
    com::{Client, ClientConfig, ComError, SnapshotSink},
    crates_image::{Rgb, RgbImage},
    image::{Font, Overlay},
    sensor::{ReadingLog, SensorReading},
    server::{CycleOutcome, Schedule, UploadState, Uploader},
    std::{
        collections::VecDeque,
        path::PathBuf,
        sync::{Arc, Mutex},
        time::Duration,
    },
    tokio::net::TcpListener,
    video::Frame,
};

/// Sink that answers from a script and records every body.
#[derive(Clone, Default)]
struct FakeSink {
    answers: Arc<Mutex<VecDeque<Result<u16, ComError>>>>,
    bodies: Arc<Mutex<Vec<Bytes>>>,
}

impl FakeSink {
    fn answering(answers: impl IntoIterator<Item = Result<u16, ComError>>) -> Self {
        let sink = Self::default();
        sink.answers.lock().unwrap().extend(answers);
        sink
    }

    fn uploads(&self) -> Vec<Bytes> {
        self.bodies.lock().unwrap().clone()
    }
}

impl SnapshotSink for FakeSink {
    fn put(&self, body: Bytes) -> impl Future<Output = Result<u16, ComError>> + Send {
        self.bodies.lock().unwrap().push(body);
        let answer = self.answers.lock().unwrap().pop_front().unwrap_or(Ok(200));
        async move { answer }
    }
}

fn gray_frame() -> Frame {
    let canvas = RgbImage::from_pixel(320, 240, Rgb([128, 128, 128]));
    Frame::from(image::encode_rgb(&canvas, 90).unwrap())
}

fn uploader(sink: FakeSink) -> (Uploader<FakeSink>, Latest<Frame>, Latest<SensorReading>) {
    let frames = Latest::new();
    let readings = Latest::new();
    let uploader = Uploader::new(
        sink,
        frames.clone(),
        readings.clone(),
        Overlay::new(Font::builtin(2)),
    );
    (uploader, frames, readings)
}

fn temp_log(name: &str) -> ReadingLog {
    let dir = std::env::temp_dir().join(format!("upload-tests-{}-{name}", std::process::id()));
    std::fs::remove_dir_all(&dir).ok();
    ReadingLog::new(PathBuf::from(&dir).join("sensorData.csv"))
}

fn rows(log: &ReadingLog) -> Vec<String> {
    std::fs::read_to_string(log.path())
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_only_success_keeps_normal_cadence() {
    assert_eq!(UploadState::after(CycleOutcome::Status(200)), UploadState::Normal);
    assert_eq!(UploadState::after(CycleOutcome::Status(201)), UploadState::Normal);
    assert_eq!(UploadState::after(CycleOutcome::Status(204)), UploadState::Normal);
    assert_eq!(UploadState::after(CycleOutcome::Status(299)), UploadState::Normal);
    assert_eq!(UploadState::after(CycleOutcome::Status(301)), UploadState::BackedOff);
    assert_eq!(UploadState::after(CycleOutcome::Status(401)), UploadState::BackedOff);
    assert_eq!(UploadState::after(CycleOutcome::Status(503)), UploadState::BackedOff);
    assert_eq!(UploadState::after(CycleOutcome::Failed), UploadState::BackedOff);
    assert_eq!(UploadState::after(CycleOutcome::NoFrame), UploadState::BackedOff);
}

#[test]
fn test_schedule_delays() {
    let schedule = Schedule::default();
    assert_eq!(schedule.delay(UploadState::Normal), Duration::from_secs(10));
    assert_eq!(schedule.delay(UploadState::BackedOff), Duration::from_secs(60));
    assert_eq!(UploadState::default(), UploadState::Normal);
}

#[tokio::test]
async fn test_no_frame_backs_off_without_upload() {
    let sink = FakeSink::default();
    let (mut uploader, _frames, _readings) = uploader(sink.clone());

    assert_eq!(uploader.cycle().await, CycleOutcome::NoFrame);
    assert_eq!(uploader.state(), UploadState::BackedOff);
    assert!(sink.uploads().is_empty());
}

#[tokio::test]
async fn test_state_follows_answers() {
    let sink = FakeSink::answering([
        Ok(503),
        Ok(201),
        Err(ComError::Timeout),
        Err(ComError::Connection("refused".to_string())),
        Ok(200),
    ]);
    let (mut uploader, frames, _readings) = uploader(sink.clone());
    frames.set(gray_frame());

    assert_eq!(uploader.cycle().await, CycleOutcome::Status(503));
    assert_eq!(uploader.state(), UploadState::BackedOff);
    assert_eq!(uploader.cycle().await, CycleOutcome::Status(201));
    assert_eq!(uploader.state(), UploadState::Normal);
    assert_eq!(uploader.cycle().await, CycleOutcome::Failed);
    assert_eq!(uploader.state(), UploadState::BackedOff);
    assert_eq!(uploader.cycle().await, CycleOutcome::Failed);
    assert_eq!(uploader.cycle().await, CycleOutcome::Status(200));
    assert_eq!(uploader.state(), UploadState::Normal);
    assert_eq!(sink.uploads().len(), 5);
}

#[tokio::test]
async fn test_uploads_composited_frame() {
    let sink = FakeSink::default();
    let (mut uploader, frames, readings) = uploader(sink.clone());
    let frame = gray_frame();
    frames.set(frame.clone());
    readings.set(SensorReading::new(21.3, 47.8));

    uploader.cycle().await;

    let uploads = sink.uploads();
    assert_eq!(uploads.len(), 1);
    let uploaded = Frame::new(uploads[0].clone());
    assert!(uploaded.is_delimited());
    assert_ne!(uploaded, frame);
    let decoded = image::decode_rgb(uploaded.as_bytes()).unwrap();
    assert_eq!(decoded.dimensions(), (320, 240));
}

#[tokio::test]
async fn test_undecodable_frame_is_uploaded_as_captured() {
    let sink = FakeSink::default();
    let (mut uploader, frames, _readings) = uploader(sink.clone());
    let frame = Frame::from(vec![0xFF, 0xD8, 0x00, 0xFF, 0xD9]);
    frames.set(frame.clone());

    assert_eq!(uploader.cycle().await, CycleOutcome::Status(200));
    assert_eq!(sink.uploads(), vec![frame.bytes()]);
}

#[tokio::test]
async fn test_valid_readings_are_logged() {
    let log = temp_log("logged");
    log.rotate().unwrap();
    let sink = FakeSink::answering([Ok(200), Err(ComError::Timeout), Ok(200)]);
    let (uploader, frames, readings) = uploader(sink);
    let mut uploader = uploader.with_reading_log(log.clone());
    frames.set(gray_frame());

    // no reading yet: nothing logged
    uploader.cycle().await;
    assert_eq!(rows(&log).len(), 1);

    readings.set(SensorReading::new(22.0, 50.0));
    uploader.cycle().await;
    readings.set(SensorReading::new(22.5, 51.25));
    uploader.cycle().await;

    let rows = rows(&log);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], "timestamp,temperature,humidity");
    assert!(rows[1].ends_with(",22.00,50.00"), "{}", rows[1]);
    assert!(rows[2].ends_with(",22.50,51.25"), "{}", rows[2]);
}

#[tokio::test]
async fn test_log_failure_does_not_stop_upload() {
    // parent directory never created, so every append fails
    let log = temp_log("missing");
    let sink = FakeSink::default();
    let (uploader, frames, readings) = uploader(sink.clone());
    let mut uploader = uploader.with_reading_log(log);
    frames.set(gray_frame());
    readings.set(SensorReading::new(22.0, 50.0));

    assert_eq!(uploader.cycle().await, CycleOutcome::Status(200));
    assert_eq!(sink.uploads().len(), 1);
}

#[tokio::test]
async fn test_run_uploads_until_shutdown() {
    let sink = FakeSink::default();
    let (uploader, frames, _readings) = uploader(sink.clone());
    let uploader = uploader.with_schedule(Schedule::new(
        Duration::from_millis(20),
        Duration::from_millis(40),
    ));
    frames.set(gray_frame());

    let shutdown = Shutdown::new();
    let task = tokio::spawn(uploader.run(shutdown.clone()));
    tokio::time::sleep(Duration::from_millis(300)).await;
    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("uploader did not stop")
        .unwrap();

    assert!(sink.uploads().len() >= 2, "{} uploads", sink.uploads().len());
}

#[tokio::test]
async fn test_run_backs_off_without_frames() {
    let sink = FakeSink::default();
    let (uploader, frames, _readings) = uploader(sink.clone());
    let uploader = uploader.with_schedule(Schedule::new(
        Duration::from_millis(10),
        Duration::from_millis(200),
    ));

    let shutdown = Shutdown::new();
    let task = tokio::spawn(uploader.run(shutdown.clone()));
    // first cycle finds no frame, the next one comes only after the long delay
    tokio::time::sleep(Duration::from_millis(50)).await;
    frames.set(gray_frame());
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert!(sink.uploads().is_empty());

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert!(!sink.uploads().is_empty());
    shutdown.trigger();
    task.await.unwrap();
}

#[tokio::test]
async fn test_cycle_against_http_endpoint() {
    let app = Router::new().route("/c/snapshot", put(|| async { StatusCode::NO_CONTENT }));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = Client::new(
        ClientConfig::default()
            .with_endpoint(format!("http://{addr}/c/snapshot"))
            .with_fingerprint("cam")
            .with_token("token"),
    )
    .unwrap();
    let frames = Latest::new();
    frames.set(gray_frame());
    let mut uploader = Uploader::new(client, frames, Latest::new(), Overlay::new(Font::builtin(2)));

    assert_eq!(uploader.cycle().await, CycleOutcome::Status(204));
    assert_eq!(uploader.state(), UploadState::Normal);
}
