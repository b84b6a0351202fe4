use {
    crate::ComError,
    bytes::{BufMut, Bytes, BytesMut},
};

/// Boundary used by the live video stream.
pub const BOUNDARY: &str = "frame";

// upper bound for the header block of one part
const MAX_HEADER_SIZE: usize = 4096;

/// One decoded part of a multipart stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub content_type: String,
    pub body: Bytes,
}

/// Frame `payload` as one part of a `multipart/x-mixed-replace` stream:
///
/// ```text
/// --<boundary>\r\n
/// Content-Type: <content_type>\r\n
/// Content-Length: <len>\r\n
/// \r\n
/// <payload>\r\n
/// ```
pub fn encode_part(boundary: &str, content_type: &str, payload: &[u8]) -> Bytes {
    let header = format!(
        "--{boundary}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\n\r\n",
        payload.len()
    );
    let mut part = BytesMut::with_capacity(header.len() + payload.len() + 2);
    part.put_slice(header.as_bytes());
    part.put_slice(payload);
    part.put_slice(b"\r\n");
    part.freeze()
}

/// Parse one part from the start of `buf`.
///
/// Returns the part and the number of bytes it occupied, or `None` if `buf`
/// does not hold a complete part yet. Parts must carry a `Content-Length`.
pub fn decode_part(buf: &[u8], boundary: &str) -> Result<Option<(Part, usize)>, ComError> {
    let delimiter = format!("--{boundary}\r\n");
    let prefix = buf.len().min(delimiter.len());
    if buf[..prefix] != delimiter.as_bytes()[..prefix] {
        return Err(ComError::Framing("missing boundary".to_string()));
    }

    if buf.len() < delimiter.len() {
        return Ok(None);
    }

    // the delimiter line ends in the first \r\n of an empty header block
    let search_from = delimiter.len() - 2;
    let Some(header_end) = find(&buf[search_from..], b"\r\n\r\n").map(|at| at + search_from) else {
        if buf.len() > MAX_HEADER_SIZE {
            return Err(ComError::Framing("header block too large".to_string()));
        }
        return Ok(None);
    };
    if header_end < delimiter.len() {
        return Err(ComError::Framing("missing content length".to_string()));
    }

    let headers = std::str::from_utf8(&buf[delimiter.len()..header_end])
        .map_err(|_| ComError::Framing("headers are not utf-8".to_string()))?;
    let mut content_type = None;
    let mut content_length = None;
    for line in headers.split("\r\n") {
        let Some((name, value)) = line.split_once(':') else {
            return Err(ComError::Framing(format!("malformed header {line:?}")));
        };
        let value = value.trim();
        if name.eq_ignore_ascii_case("content-type") {
            content_type = Some(value.to_string());
        } else if name.eq_ignore_ascii_case("content-length") {
            let length = value
                .parse::<usize>()
                .map_err(|_| ComError::Framing(format!("bad content length {value:?}")))?;
            content_length = Some(length);
        }
    }
    let length =
        content_length.ok_or_else(|| ComError::Framing("missing content length".to_string()))?;

    let body_start = header_end + 4;
    let end = body_start + length + 2;
    if buf.len() < end {
        return Ok(None);
    }
    if &buf[end - 2..end] != b"\r\n" {
        return Err(ComError::Framing("body not terminated".to_string()));
    }

    let part = Part {
        content_type: content_type.unwrap_or_default(),
        body: Bytes::copy_from_slice(&buf[body_start..body_start + length]),
    };
    Ok(Some((part, end)))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
