//! Telemetry overlay for camera frames.
//!
//! Wraps the `image` crate for JPEG decoding/encoding and draws a text
//! label with the capture time and the latest sensor reading onto a frame.

pub mod error;
pub mod font;
pub mod jpeg;
pub mod overlay;

pub use error::ImageError;
pub use font::{Font, TextSize};
pub use jpeg::{decode_rgb, encode_rgb};
pub use overlay::{Overlay, OverlayLayout};
