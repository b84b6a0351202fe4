use {
    crate::{
        Frame,
        frame::{EOI, SOI},
    },
    bytes::{Buf, BytesMut},
};

/// Default upper bound for buffered bytes without a complete frame.
pub const DEFAULT_MAX_BUFFER: usize = 16 * 1024 * 1024;

/// Splits an MJPEG byte stream into complete JPEG frames.
///
/// Bytes arrive in arbitrary chunks; markers may straddle chunk boundaries.
/// `push()` appends a chunk and returns every frame completed by it, oldest
/// first. Anything in front of a start marker is discarded.
#[derive(Debug)]
pub struct FrameDemuxer {
    buffer: BytesMut,
    // offset from which to resume searching for EOI in a partial frame
    scan_from: usize,
    max_buffer: usize,
    resyncs: u64,
}

impl FrameDemuxer {
    pub fn new() -> Self {
        Self::with_max_buffer(DEFAULT_MAX_BUFFER)
    }

    /// Create a demuxer that drops its buffer and resynchronizes once more
    /// than `max_buffer` bytes are pending without a complete frame.
    pub fn with_max_buffer(max_buffer: usize) -> Self {
        Self {
            buffer: BytesMut::new(),
            scan_from: SOI.len(),
            max_buffer,
            resyncs: 0,
        }
    }

    /// Feed one chunk and collect the frames it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Frame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        loop {
            let Some(start) = find_marker(&self.buffer, &SOI, 0) else {
                // no start marker yet; a trailing 0xFF may be the first half of one
                let keep = usize::from(self.buffer.last() == Some(&SOI[0]));
                let discard = self.buffer.len() - keep;
                self.buffer.advance(discard);
                self.scan_from = SOI.len();
                break;
            };

            if start > 0 {
                self.buffer.advance(start);
                self.scan_from = SOI.len();
            }

            match find_marker(&self.buffer, &EOI, self.scan_from.max(SOI.len())) {
                Some(end) => {
                    let data = self.buffer.split_to(end + EOI.len()).freeze();
                    frames.push(Frame::new(data));
                    self.scan_from = SOI.len();
                }
                None => {
                    // the last byte may be the 0xFF of an EOI that is still in flight
                    self.scan_from = self.buffer.len().saturating_sub(1);
                    break;
                }
            }
        }

        if self.buffer.len() > self.max_buffer {
            log::warn!(
                "demuxer: no frame within {} bytes, resynchronizing",
                self.buffer.len()
            );
            self.buffer.clear();
            self.scan_from = SOI.len();
            self.resyncs += 1;
        }

        frames
    }

    /// Number of bytes held back waiting for more data.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Number of times the buffer overflowed and was discarded.
    pub fn resyncs(&self) -> u64 {
        self.resyncs
    }
}

impl Default for FrameDemuxer {
    fn default() -> Self {
        Self::new()
    }
}

fn find_marker(haystack: &[u8], marker: &[u8; 2], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(marker.len())
        .position(|window| window == marker)
        .map(|position| position + from)
}
