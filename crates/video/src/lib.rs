//! Camera capture for the picam service.
//!
//! The camera runs as an external process that writes an MJPEG byte stream
//! to stdout. This crate splits that stream into complete JPEG frames and
//! keeps the newest one in a shared `Latest<Frame>` cell.

pub mod capture;
pub mod config;
pub mod demux;
pub mod error;
pub mod frame;

pub use capture::{Capture, CaptureEnd, pump};
pub use config::CaptureConfig;
pub use demux::FrameDemuxer;
pub use error::VideoError;
pub use frame::Frame;
