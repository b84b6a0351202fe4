use std::fmt;

#[derive(Debug)]
pub enum ComError {
    Timeout,
    Connection(String),
    Http(String),
    InvalidHeader(String),
    Framing(String),
}

impl fmt::Display for ComError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComError::Timeout => write!(f, "request timed out"),
            ComError::Connection(msg) => write!(f, "connection error: {msg}"),
            ComError::Http(msg) => write!(f, "http error: {msg}"),
            ComError::InvalidHeader(msg) => write!(f, "invalid header: {msg}"),
            ComError::Framing(msg) => write!(f, "framing error: {msg}"),
        }
    }
}

impl std::error::Error for ComError {}

impl From<reqwest::Error> for ComError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ComError::Timeout
        } else if err.is_connect() {
            ComError::Connection(err.to_string())
        } else {
            ComError::Http(err.to_string())
        }
    }
}

impl From<http::header::InvalidHeaderValue> for ComError {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        ComError::InvalidHeader(err.to_string())
    }
}
