// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Error types for the overlay library.
//!
//! Rendering a frame never fails: missing landmarks or masks simply mean there is
//! nothing to draw. Errors only come from the edges of the system, such as loading
//! frames, parsing recorded results, configuring an engine, or opening a window.

use std::fmt;

/// Result type alias for overlay operations.
pub type Result<T> = std::result::Result<T, OverlayError>;

/// Main error type for the overlay library.
#[derive(Debug)]
pub enum OverlayError {
    /// Error loading or decoding images and masks.
    ImageError(String),
    /// Invalid configuration provided.
    ConfigError(String),
    /// IO error with context (file not found, permission denied, etc.).
    IoError(String),
    /// Wrapped `std::io::Error`
    Io(std::io::Error),
    /// Malformed recorded perception result.
    ResultFormatError(String),
    /// Perception engine lifecycle error.
    EngineError(String),
    /// Visualizer error.
    VisualizerError(String),
}

impl fmt::Display for OverlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageError(msg) => write!(f, "Image error: {msg}"),
            Self::ConfigError(msg) => write!(f, "Config error: {msg}"),
            Self::IoError(msg) => write!(f, "IO error: {msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
            Self::ResultFormatError(msg) => write!(f, "Result format error: {msg}"),
            Self::EngineError(msg) => write!(f, "Engine error: {msg}"),
            Self::VisualizerError(msg) => write!(f, "Visualizer error: {msg}"),
        }
    }
}

impl std::error::Error for OverlayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for OverlayError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<image::ImageError> for OverlayError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageError(err.to_string())
    }
}

impl From<serde_json::Error> for OverlayError {
    fn from(err: serde_json::Error) -> Self {
        Self::ResultFormatError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OverlayError::ConfigError("test".to_string());
        assert_eq!(err.to_string(), "Config error: test");

        let err = OverlayError::EngineError("released".to_string());
        assert_eq!(err.to_string(), "Engine error: released");
    }

    #[test]
    fn test_io_error_source() {
        use std::error::Error;

        let err = OverlayError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(err.source().is_some());
        assert!(OverlayError::ImageError("x".into()).source().is_none());
    }

    #[test]
    fn test_json_error_conversion() {
        let parse = serde_json::from_str::<Vec<u32>>("[1, oops]").unwrap_err();
        let err = OverlayError::from(parse);
        assert!(matches!(err, OverlayError::ResultFormatError(_)));
    }
}
