use {
    base::{Latest, Shutdown},
    bytes::Bytes,
    com::{BOUNDARY, encode_part},
    futures_core::Stream,
    futures_util::stream,
    std::{
        convert::Infallible,
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    },
    tokio::time::{Interval, MissedTickBehavior},
    video::Frame,
};

/// `Content-Type` of the live stream response.
pub const MJPEG_CONTENT_TYPE: &str = "multipart/x-mixed-replace; boundary=frame";

/// Count of connected stream viewers.
#[derive(Debug, Clone, Default)]
pub struct Viewers {
    count: Arc<AtomicUsize>,
}

impl Viewers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a viewer. The viewer leaves when the guard is dropped.
    pub fn enter(&self) -> ViewerGuard {
        let count = self.count.fetch_add(1, Ordering::SeqCst) + 1;
        log::info!("stream: viewer connected ({count} watching)");
        ViewerGuard {
            count: self.count.clone(),
        }
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct ViewerGuard {
    count: Arc<AtomicUsize>,
}

impl Drop for ViewerGuard {
    fn drop(&mut self) {
        let count = self.count.fetch_sub(1, Ordering::SeqCst) - 1;
        log::info!("stream: viewer disconnected ({count} watching)");
    }
}

struct Viewer {
    frames: Latest<Frame>,
    ticker: Interval,
    sent: Option<u64>,
    shutdown: Shutdown,
    _guard: ViewerGuard,
}

/// Endless multipart stream of the newest frame for one viewer.
///
/// Polls the frame cell every `period` and emits a part only when a frame
/// newer than the last one sent is available. The stream ends when
/// `shutdown` is triggered. Dropping it releases the ticker and the viewer
/// guard.
pub fn mjpeg_stream(
    frames: Latest<Frame>,
    period: Duration,
    guard: ViewerGuard,
    shutdown: Shutdown,
) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let viewer = Viewer {
        frames,
        ticker,
        sent: None,
        shutdown,
        _guard: guard,
    };

    stream::unfold(viewer, |mut viewer| async move {
        loop {
            tokio::select! {
                _ = viewer.ticker.tick() => {}
                _ = viewer.shutdown.wait() => return None,
            }
            let Some((version, frame)) = viewer.frames.get_versioned() else {
                continue;
            };
            if viewer.sent == Some(version) {
                continue;
            }
            viewer.sent = Some(version);
            let part = encode_part(BOUNDARY, "image/jpeg", frame.as_bytes());
            return Some((Ok(part), viewer));
        }
    })
}
