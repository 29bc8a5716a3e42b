//! **scissors-core**: building blocks for interactive boundary tracing.
//!
//! This crate turns a raw pixel buffer into the per-pixel cost arrays that
//! the livewire search in `scissors-paths` runs on:
//!
//! - [`geom`]: [`Point`] and [`Range`], with flat row-major indexing;
//! - [`image`]: [`PixelSource`] description of the input buffer and its
//!   [`GrayImage`] conversion (channel averaging, VOI windowing);
//! - [`cost`]: the immutable [`CostField`] (gradient, Laplacian and
//!   gradient-direction terms);
//! - [`error`]: the shared [`TraceError`].

pub mod cost;
pub mod error;
pub mod geom;
pub mod image;

pub use cost::{CostField, CostFieldOptions};
pub use error::{ErrorKind, Result, TraceError};
pub use geom::{Point, Range};
pub use image::{Channels, GrayImage, MIN_SIDE, PixelData, PixelSource, VoiRange};

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn point_round_trip() {
        let p = Point::new(3, -7);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"x":3,"y":-7}"#);
        let back: Point = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn options_fill_missing_fields_with_defaults() {
        let opts: CostFieldOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, CostFieldOptions::default());
        let voi: VoiRange = serde_json::from_str(r#"{"lower":-160.0,"upper":240.0}"#).unwrap();
        assert_eq!(voi, VoiRange::new(-160.0, 240.0));
    }
}
