use std::fmt;

#[derive(Debug)]
pub enum VideoError {
    Spawn(String),
    Io(std::io::Error),
    Stream(String),
}

impl fmt::Display for VideoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoError::Spawn(msg) => write!(f, "spawn error: {msg}"),
            VideoError::Io(err) => write!(f, "io error: {err}"),
            VideoError::Stream(msg) => write!(f, "stream error: {msg}"),
        }
    }
}

impl std::error::Error for VideoError {}

impl From<std::io::Error> for VideoError {
    fn from(err: std::io::Error) -> Self {
        VideoError::Io(err)
    }
}
