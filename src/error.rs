//! Error Types

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type
///
/// The first four variants are per-file failures: the engine turns them into
/// a failed outcome instead of propagating them past the batch.
#[derive(Debug, Clone, Error)]
pub enum SpcError {
    #[error("Open error: {}: {message}", .path.display())]
    Open { path: PathBuf, message: String },
    #[error("Decode error: {}: {message}", .path.display())]
    Decode { path: PathBuf, message: String },
    #[error("Write error: {}: {message}", .path.display())]
    Write { path: PathBuf, message: String },
    #[error("Unsupported input: {}: {message}", .path.display())]
    UnsupportedInput { path: PathBuf, message: String },
    #[error("Resample error: {message}")]
    Resample { message: String },
    #[error("Config error: {message}")]
    Config { message: String },
    #[error("IO error: {message}")]
    Io { message: String },
}

/// Coarse classification of an [`SpcError`], used when tallying outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKind {
    Open,
    Decode,
    Write,
    UnsupportedInput,
    Resample,
    Config,
    Io,
}

impl ErrorKind {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::Open => "open",
            ErrorKind::Decode => "decode",
            ErrorKind::Write => "write",
            ErrorKind::UnsupportedInput => "unsupported",
            ErrorKind::Resample => "resample",
            ErrorKind::Config => "config",
            ErrorKind::Io => "io",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl SpcError {
    pub fn open<P: AsRef<Path>, S: Into<String>>(path: P, msg: S) -> Self {
        Self::Open { path: path.as_ref().to_path_buf(), message: msg.into() }
    }
    pub fn decode<P: AsRef<Path>, S: Into<String>>(path: P, msg: S) -> Self {
        Self::Decode { path: path.as_ref().to_path_buf(), message: msg.into() }
    }
    pub fn write<P: AsRef<Path>, S: Into<String>>(path: P, msg: S) -> Self {
        Self::Write { path: path.as_ref().to_path_buf(), message: msg.into() }
    }
    pub fn unsupported<P: AsRef<Path>, S: Into<String>>(path: P, msg: S) -> Self {
        Self::UnsupportedInput { path: path.as_ref().to_path_buf(), message: msg.into() }
    }
    pub fn resample<S: Into<String>>(msg: S) -> Self { Self::Resample { message: msg.into() } }
    pub fn config<S: Into<String>>(msg: S) -> Self { Self::Config { message: msg.into() } }
    pub fn io<S: Into<String>>(msg: S) -> Self { Self::Io { message: msg.into() } }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Open { .. } => ErrorKind::Open,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Write { .. } => ErrorKind::Write,
            Self::UnsupportedInput { .. } => ErrorKind::UnsupportedInput,
            Self::Resample { .. } => ErrorKind::Resample,
            Self::Config { .. } => ErrorKind::Config,
            Self::Io { .. } => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, SpcError>;

impl From<std::io::Error> for SpcError {
    fn from(err: std::io::Error) -> Self { Self::io(err.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = SpcError::decode("a/b.flac", "truncated stream");
        let text = e.to_string();
        assert!(text.contains("Decode"));
        assert!(text.contains("a/b.flac"));
        assert!(text.contains("truncated stream"));
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(SpcError::open("x.wav", "missing").kind(), ErrorKind::Open);
        assert_eq!(SpcError::write("x.wav", "denied").kind(), ErrorKind::Write);
        assert_eq!(SpcError::unsupported("x.txt", "ext").kind(), ErrorKind::UnsupportedInput);
        let io: SpcError = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();
        assert_eq!(io.kind(), ErrorKind::Io);
        assert_eq!(ErrorKind::UnsupportedInput.to_string(), "unsupported");
    }
}
