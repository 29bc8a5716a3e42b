//! The error type shared by the cost-field builder and the search engine.

use std::fmt;

use crate::geom::Point;

/// Broad classification of a [`TraceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An operation was called out of sequence or with inconsistent input.
    Configuration,
    /// A coordinate fell outside the image.
    OutOfBounds,
}

/// Errors raised by cost-field construction and path queries.
///
/// Every error is raised before any state is touched, so a rejected call
/// leaves the engine exactly as it was. An unreachable target is not an
/// error: queries report it as `Ok(None)`.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceError {
    /// A path query was made before any search was started.
    NotStarted,
    /// The pixel buffer does not hold `width × height × channels` values.
    BufferSize { expected: usize, actual: usize },
    /// The image is smaller than the 5×5 Laplacian stencil.
    GridTooSmall { width: usize, height: usize },
    /// A side exceeds `i32::MAX` or the pixel count overflows `usize`.
    GridTooLarge { width: usize, height: usize },
    /// The VOI window is empty, inverted, or not finite.
    InvalidVoiRange { lower: f32, upper: f32 },
    /// A seed or target coordinate lies outside the image.
    OutOfBounds {
        point: Point,
        width: usize,
        height: usize,
    },
}

impl TraceError {
    /// The kind of failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OutOfBounds { .. } => ErrorKind::OutOfBounds,
            Self::NotStarted
            | Self::BufferSize { .. }
            | Self::GridTooSmall { .. }
            | Self::GridTooLarge { .. }
            | Self::InvalidVoiRange { .. } => ErrorKind::Configuration,
        }
    }
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "no search in progress: call start_search first"),
            Self::BufferSize { expected, actual } => {
                write!(f, "pixel buffer holds {actual} values, expected {expected}")
            }
            Self::GridTooSmall { width, height } => {
                write!(f, "image {width}x{height} is smaller than the 5x5 kernel margin")
            }
            Self::GridTooLarge { width, height } => {
                write!(f, "image {width}x{height} is too large to index")
            }
            Self::InvalidVoiRange { lower, upper } => {
                write!(f, "invalid VOI window [{lower}, {upper}]")
            }
            Self::OutOfBounds {
                point,
                width,
                height,
            } => write!(f, "point {point} is outside the {width}x{height} image"),
        }
    }
}

impl std::error::Error for TraceError {}

/// Result alias used throughout the scissors crates.
pub type Result<T> = std::result::Result<T, TraceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(TraceError::NotStarted.kind(), ErrorKind::Configuration);
        assert_eq!(
            TraceError::GridTooSmall {
                width: 3,
                height: 9
            }
            .kind(),
            ErrorKind::Configuration
        );
        let oob = TraceError::OutOfBounds {
            point: Point::new(-1, 0),
            width: 8,
            height: 8,
        };
        assert_eq!(oob.kind(), ErrorKind::OutOfBounds);
        assert_eq!(oob.to_string(), "point (-1, 0) is outside the 8x8 image");
    }
}
