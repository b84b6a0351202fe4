//! Wire formats and the remote snapshot endpoint.
//!
//! `framing` builds and parses the parts of a `multipart/x-mixed-replace`
//! stream, `client` uploads JPEG snapshots with an HTTP `PUT`.

pub mod client;
pub mod error;
pub mod framing;

pub use client::{Client, ClientConfig};
pub use error::ComError;
pub use framing::{BOUNDARY, Part, decode_part, encode_part};

use bytes::Bytes;

/// Destination for composited snapshots.
///
/// Resolves to the HTTP status code of the remote answer. Transport faults
/// (timeouts, refused connections, TLS errors) are reported as `Err`.
pub trait SnapshotSink: Send + Sync {
    fn put(&self, body: Bytes) -> impl Future<Output = Result<u16, ComError>> + Send;
}
