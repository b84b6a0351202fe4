use {
    crate::*,
    axum::{
        Json, Router,
        body::Body,
        extract::State,
        http::{HeaderName, header},
        response::{Html, IntoResponse, Response},
        routing::get,
    },
    chrono::NaiveDateTime,
    sensor::SensorReading,
    serde::{Deserialize, Serialize},
};

const INDEX_HTML: &str = include_str!("index.html");

const X_ACCEL_BUFFERING: HeaderName = HeaderName::from_static("x-accel-buffering");

/// Body of `GET /status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub time: String,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

impl StatusReport {
    pub fn new(reading: Option<&SensorReading>, at: NaiveDateTime) -> Self {
        Self {
            time: base::format_display(at),
            temperature: reading.map(|r| round1(r.temperature)),
            humidity: reading.map(|r| round1(r.humidity)),
        }
    }
}

fn round1(value: f32) -> f64 {
    (value as f64 * 10.0).round() / 10.0
}

/// Routes: `/` (viewer page), `/video_feed` (live stream), `/status` (JSON).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/video_feed", get(video_feed))
        .route("/status", get(status))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn video_feed(State(state): State<AppState>) -> Response {
    let guard = state.viewers.enter();
    let stream = mjpeg_stream(
        state.frames.clone(),
        state.stream_interval,
        guard,
        state.shutdown.clone(),
    );
    (
        [
            (header::CONTENT_TYPE, MJPEG_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
            (header::PRAGMA, "no-cache"),
            (header::EXPIRES, "0"),
            (X_ACCEL_BUFFERING, "no"),
        ],
        Body::from_stream(stream),
    )
        .into_response()
}

async fn status(State(state): State<AppState>) -> Json<StatusReport> {
    let reading = state.readings.get();
    Json(StatusReport::new(reading.as_ref(), base::local_now()))
}
