//! Per-pixel cost fields derived from image derivatives.
//!
//! A [`CostField`] is built once per image and never mutated. It carries:
//!
//! - **gradient cost**: `1 - |∇I| / max|∇I|`, so strong edges are cheap (0);
//! - **Laplacian cost**: thresholded response of a 5×5 Laplacian-of-Gaussian
//!   stencil, 0 on edges and 1 elsewhere;
//! - **gradient vectors**: signed forward differences and their unit
//!   vectors, consumed by the direction term of the search.
//!
//! Forward differences on the last column (row) reuse the difference of the
//! previous column (row) instead of reading past the image. The two outer
//! rows and columns have no room for the stencil and get Laplacian cost 1.

use crate::error::Result;
use crate::geom::{Point, Range};
use crate::image::{GrayImage, PixelSource};

/// Laplacian-of-Gaussian stencil, row-major, centered at `[2][2]`.
const LOG_KERNEL: [[f32; 5]; 5] = [
    [0.0, 0.0, 1.0, 0.0, 0.0],
    [0.0, 1.0, 2.0, 1.0, 0.0],
    [1.0, 2.0, -16.0, 2.0, 1.0],
    [0.0, 1.0, 2.0, 1.0, 0.0],
    [0.0, 0.0, 1.0, 0.0, 0.0],
];

/// Stencil half-size; also the width of the border left at cost 1.
const MARGIN: usize = 2;

/// Tunables of the cost-field builder.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CostFieldOptions {
    /// Stencil responses strictly above this value count as edges.
    pub laplace_threshold: f32,
}

impl Default for CostFieldOptions {
    fn default() -> Self {
        Self {
            laplace_threshold: 0.33,
        }
    }
}

/// Immutable per-pixel cost arrays for one image.
#[derive(Debug, Clone, PartialEq)]
pub struct CostField {
    gray: GrayImage,
    gradient_cost: Vec<f32>,
    laplace_cost: Vec<f32>,
    unit_x: Vec<f32>,
    unit_y: Vec<f32>,
}

impl CostField {
    /// Build a cost field from a raw pixel buffer with default options.
    pub fn build(src: &PixelSource<'_>) -> Result<Self> {
        Self::build_with(src, CostFieldOptions::default())
    }

    /// Build a cost field from a raw pixel buffer.
    pub fn build_with(src: &PixelSource<'_>, opts: CostFieldOptions) -> Result<Self> {
        let gray = GrayImage::from_source(src)?;
        Ok(Self::from_gray_with(gray, opts))
    }

    /// Build a cost field from an already normalized grayscale image.
    pub fn from_gray(gray: GrayImage) -> Self {
        Self::from_gray_with(gray, CostFieldOptions::default())
    }

    /// Build a cost field from a grayscale image with explicit options.
    pub fn from_gray_with(gray: GrayImage, opts: CostFieldOptions) -> Self {
        let (grad_x, grad_y) = forward_differences(&gray);

        let mut gradient_cost: Vec<f32> = grad_x
            .iter()
            .zip(&grad_y)
            .map(|(dx, dy)| (dx * dx + dy * dy).sqrt())
            .collect();
        let max = gradient_cost.iter().copied().fold(0.0f32, f32::max);
        if max > 0.0 {
            for g in gradient_cost.iter_mut() {
                *g = 1.0 - *g / max;
            }
        } else {
            log::warn!(
                "flat {}x{} image: every pixel gets gradient cost 1",
                gray.width(),
                gray.height()
            );
            gradient_cost.fill(1.0);
        }

        let laplace_cost = laplace_crossings(&gray, opts.laplace_threshold);

        let (unit_x, unit_y): (Vec<f32>, Vec<f32>) = grad_x
            .iter()
            .zip(&grad_y)
            .map(|(&gx, &gy)| {
                let len = (gx * gx + gy * gy).sqrt();
                if len > 0.0 {
                    (gx / len, gy / len)
                } else {
                    (0.0, 0.0)
                }
            })
            .unzip();

        log::debug!(
            "built cost field {}x{} (max gradient {max:.4})",
            gray.width(),
            gray.height()
        );

        Self {
            gray,
            gradient_cost,
            laplace_cost,
            unit_x,
            unit_y,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.gray.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.gray.height()
    }

    /// The image rectangle.
    #[inline]
    pub fn range(&self) -> Range {
        self.gray.range()
    }

    /// Number of pixels.
    #[inline]
    pub fn len(&self) -> usize {
        self.gradient_cost.len()
    }

    /// Always false: the builder rejects images below the kernel margin.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.gradient_cost.is_empty()
    }

    /// The grayscale grid the field was derived from.
    #[inline]
    pub fn gray(&self) -> &GrayImage {
        &self.gray
    }

    /// Inverted normalized gradient magnitude, row-major.
    #[inline]
    pub fn gradient_cost(&self) -> &[f32] {
        &self.gradient_cost
    }

    /// Laplacian zero-crossing indicator, row-major.
    #[inline]
    pub fn laplace_cost(&self) -> &[f32] {
        &self.laplace_cost
    }

    /// Unit gradient vector at flat index `i`; zero where the image is flat.
    #[inline]
    pub fn unit_gradient(&self, i: usize) -> (f32, f32) {
        (self.unit_x[i], self.unit_y[i])
    }

    /// Grayscale values `edge_width` pixels from `p` along and against the
    /// local gradient, as `(inside, outside)`. Sample positions are rounded
    /// and clamped to the image. Returns `None` if `p` is outside.
    pub fn side_samples(&self, p: Point, edge_width: f32) -> Option<(f32, f32)> {
        let rng = self.range();
        let i = rng.index_of(p)?;
        let (ux, uy) = self.unit_gradient(i);
        let ox = (ux * edge_width).round() as i32;
        let oy = (uy * edge_width).round() as i32;
        let data = self.gray.as_slice();
        let sample = |q: Point| rng.index_of(rng.clamp(q)).map_or(0.0, |j| data[j]);
        Some((sample(p.shift(ox, oy)), sample(p.shift(-ox, -oy))))
    }
}

/// Forward differences with the last column/row repeating its neighbour.
fn forward_differences(gray: &GrayImage) -> (Vec<f32>, Vec<f32>) {
    let (w, h) = (gray.width(), gray.height());
    let g = gray.as_slice();
    let mut dx = vec![0.0f32; w * h];
    let mut dy = vec![0.0f32; w * h];

    for y in 0..h {
        let row = y * w;
        for x in 0..w - 1 {
            dx[row + x] = g[row + x + 1] - g[row + x];
        }
        dx[row + w - 1] = dx[row + w - 2];
    }
    for y in 0..h - 1 {
        let row = y * w;
        for x in 0..w {
            dy[row + x] = g[row + w + x] - g[row + x];
        }
    }
    let (head, last) = dy.split_at_mut((h - 1) * w);
    last.copy_from_slice(&head[(h - 2) * w..]);

    (dx, dy)
}

/// Apply the LoG stencil and threshold it; the border keeps cost 1.
fn laplace_crossings(gray: &GrayImage, threshold: f32) -> Vec<f32> {
    let (w, h) = (gray.width(), gray.height());
    let g = gray.as_slice();
    let mut out = vec![1.0f32; w * h];

    for y in MARGIN..h - MARGIN {
        for x in MARGIN..w - MARGIN {
            let mut lap = 0.0f32;
            for (ky, krow) in LOG_KERNEL.iter().enumerate() {
                let row = (y + ky - MARGIN) * w;
                for (kx, &k) in krow.iter().enumerate() {
                    if k != 0.0 {
                        lap += k * g[row + x + kx - MARGIN];
                    }
                }
            }
            out[y * w + x] = if lap > threshold { 0.0 } else { 1.0 };
        }
    }
    out
}
