//! Pixel sources and their grayscale conversion.
//!
//! The search never looks at raw pixels: a [`PixelSource`] describes the
//! buffer handed over by the image cache, and [`GrayImage`] is the
//! normalized single-channel grid every cost term is derived from.

use crate::error::{Result, TraceError};
use crate::geom::{Point, Range};

/// Smallest width/height that leaves room for the 5×5 Laplacian stencil.
pub const MIN_SIDE: usize = 5;

/// Number of interleaved channels in a pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Channels {
    Gray,
    Rgb,
    Rgba,
}

impl Channels {
    /// Values per pixel.
    #[inline]
    pub const fn count(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// A VOI (value of interest) window: raw values in `[lower, upper]` map
/// linearly onto `[0, 1]`, everything outside is clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoiRange {
    pub lower: f32,
    pub upper: f32,
}

impl VoiRange {
    pub const fn new(lower: f32, upper: f32) -> Self {
        Self { lower, upper }
    }

    fn validate(self) -> Result<Self> {
        if !self.lower.is_finite() || !self.upper.is_finite() || self.upper <= self.lower {
            return Err(TraceError::InvalidVoiRange {
                lower: self.lower,
                upper: self.upper,
            });
        }
        Ok(self)
    }

    #[inline]
    fn apply(self, v: f32) -> f32 {
        ((v - self.lower) / (self.upper - self.lower)).clamp(0.0, 1.0)
    }
}

/// Borrowed pixel values, either display bytes or raw intensities
/// (e.g. modality values before windowing).
#[derive(Debug, Clone, Copy)]
pub enum PixelData<'a> {
    Bytes(&'a [u8]),
    Intensity(&'a [f32]),
}

impl PixelData<'_> {
    #[inline]
    fn len(&self) -> usize {
        match self {
            Self::Bytes(b) => b.len(),
            Self::Intensity(v) => v.len(),
        }
    }

    #[inline]
    fn value(&self, i: usize) -> f32 {
        match self {
            Self::Bytes(b) => f32::from(b[i]),
            Self::Intensity(v) => v[i],
        }
    }
}

/// A pixel buffer as supplied by the image layer.
#[derive(Debug, Clone, Copy)]
pub struct PixelSource<'a> {
    pub data: PixelData<'a>,
    pub width: usize,
    pub height: usize,
    pub channels: Channels,
    pub voi_range: Option<VoiRange>,
}

impl<'a> PixelSource<'a> {
    /// Single-channel 8-bit pixels.
    pub fn gray_bytes(data: &'a [u8], width: usize, height: usize) -> Self {
        Self {
            data: PixelData::Bytes(data),
            width,
            height,
            channels: Channels::Gray,
            voi_range: None,
        }
    }

    /// Interleaved 8-bit color pixels.
    pub fn color_bytes(data: &'a [u8], width: usize, height: usize, channels: Channels) -> Self {
        Self {
            data: PixelData::Bytes(data),
            width,
            height,
            channels,
            voi_range: None,
        }
    }

    /// Single-channel raw intensities.
    pub fn intensity(data: &'a [f32], width: usize, height: usize) -> Self {
        Self {
            data: PixelData::Intensity(data),
            width,
            height,
            channels: Channels::Gray,
            voi_range: None,
        }
    }

    /// Attach a VOI window.
    pub fn with_voi(mut self, voi: VoiRange) -> Self {
        self.voi_range = Some(voi);
        self
    }
}

/// Check the kernel margin and the coordinate range; shared by every
/// constructor. Returns the pixel count.
fn check_size(width: usize, height: usize) -> Result<usize> {
    if width < MIN_SIDE || height < MIN_SIDE {
        return Err(TraceError::GridTooSmall { width, height });
    }
    let max = i32::MAX as usize;
    if width > max || height > max {
        return Err(TraceError::GridTooLarge { width, height });
    }
    width
        .checked_mul(height)
        .ok_or(TraceError::GridTooLarge { width, height })
}

/// A row-major grayscale grid with intensities in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct GrayImage {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl GrayImage {
    /// Wrap already normalized intensities. Values are clamped to `[0, 1]`
    /// and NaN becomes 0.
    pub fn new(width: usize, height: usize, mut data: Vec<f32>) -> Result<Self> {
        let n = check_size(width, height)?;
        if data.len() != n {
            return Err(TraceError::BufferSize {
                expected: n,
                actual: data.len(),
            });
        }
        for v in data.iter_mut() {
            *v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Convert a pixel buffer to grayscale.
    ///
    /// Color pixels average R, G and B (alpha is ignored). With a VOI window
    /// every value is windowed; otherwise bytes are scaled by 1/255 and raw
    /// intensities are stretched over their own min/max.
    pub fn from_source(src: &PixelSource<'_>) -> Result<Self> {
        let n = check_size(src.width, src.height)?;
        let stride = src.channels.count();
        let expected = n.checked_mul(stride).ok_or(TraceError::GridTooLarge {
            width: src.width,
            height: src.height,
        })?;
        if src.data.len() != expected {
            return Err(TraceError::BufferSize {
                expected,
                actual: src.data.len(),
            });
        }
        let voi = src.voi_range.map(VoiRange::validate).transpose()?;

        let mut raw: Vec<f32> = (0..n)
            .map(|i| {
                let base = i * stride;
                match src.channels {
                    Channels::Gray => src.data.value(base),
                    Channels::Rgb | Channels::Rgba => {
                        (src.data.value(base) + src.data.value(base + 1) + src.data.value(base + 2))
                            / 3.0
                    }
                }
            })
            .collect();

        match (voi, src.data) {
            (Some(voi), _) => {
                for v in raw.iter_mut() {
                    *v = voi.apply(*v);
                }
            }
            (None, PixelData::Bytes(_)) => {
                for v in raw.iter_mut() {
                    *v /= 255.0;
                }
            }
            (None, PixelData::Intensity(_)) => {
                let (lo, hi) = raw
                    .iter()
                    .filter(|v| v.is_finite())
                    .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                        (lo.min(v), hi.max(v))
                    });
                let span = hi - lo;
                for v in raw.iter_mut() {
                    *v = if span > 0.0 && v.is_finite() {
                        (*v - lo) / span
                    } else {
                        0.0
                    };
                }
            }
        }

        Self::new(src.width, src.height, raw)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// The image rectangle.
    #[inline]
    pub fn range(&self) -> Range {
        Range::with_size(self.width, self.height)
    }

    /// Intensity at `p`, or `None` outside the image.
    #[inline]
    pub fn at(&self, p: Point) -> Option<f32> {
        self.range().index_of(p).map(|i| self.data[i])
    }

    /// Row-major intensities.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}
