//! Online adaptation of edge costs from a traced boundary segment.
//!
//! Training samples the most recent part of a traced path and builds four
//! lookup tables, one per per-pixel signal: grayscale intensity ("edge"),
//! gradient cost, and the grayscale a few pixels to either side of the
//! boundary ("inside"/"outside"). Each table is a histogram of the samples,
//! inverted so that values the user's boundary actually has are cheap and
//! everything else is expensive, then smoothed.

use scissors_core::{CostField, Point};

use crate::config::LiveWireConfig;

/// Bins of the edge (intensity) table.
pub const EDGE_BINS: usize = 256;
/// Bins of the gradient-cost table.
pub const GRADIENT_BINS: usize = 1024;
/// Bins of each side table.
pub const SIDE_BINS: usize = 256;

/// Smoothing taps, centered.
const BLUR: [f32; 5] = [0.05, 0.25, 0.4, 0.25, 0.05];

/// Learned lookup tables. Every entry lies in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingTables {
    edge: Vec<f32>,
    gradient: Vec<f32>,
    inside: Vec<f32>,
    outside: Vec<f32>,
    points: Vec<Point>,
}

impl TrainingTables {
    /// Build tables from boundary samples. Returns `None` if there are fewer
    /// than `config.min_training_points` samples.
    pub fn from_samples(
        field: &CostField,
        points: &[Point],
        config: &LiveWireConfig,
    ) -> Option<Self> {
        if points.len() < config.min_training_points.max(1) {
            return None;
        }
        let rng = field.range();
        let points: Vec<Point> = points.iter().copied().filter(|&p| rng.contains(p)).collect();
        if points.len() < config.min_training_points.max(1) {
            return None;
        }
        let idx: Vec<usize> = points.iter().filter_map(|&p| rng.index_of(p)).collect();

        let gray = field.gray().as_slice();
        let gradient_cost = field.gradient_cost();
        let sides: Vec<(f32, f32)> = points
            .iter()
            .filter_map(|&p| field.side_samples(p, config.edge_width))
            .collect();

        let edge = inverted_histogram(idx.iter().map(|&i| gray[i]), EDGE_BINS);
        let mut gradient =
            inverted_histogram(idx.iter().map(|&i| gradient_cost[i]), GRADIENT_BINS);
        let inside = inverted_histogram(sides.iter().map(|s| s.0), SIDE_BINS);
        let outside = inverted_histogram(sides.iter().map(|s| s.1), SIDE_BINS);

        let have = idx.len();
        let need = config.grad_points_needed;
        if have < need {
            // Too few samples for a smooth table: lean on the identity map
            // the untrained cost uses, in proportion to the shortfall.
            let t = (need - have) as f32 / need as f32;
            let last = (GRADIENT_BINS - 1) as f32;
            for (i, g) in gradient.iter_mut().enumerate() {
                *g = (1.0 - t) * *g + t * (i as f32 / last);
            }
        }

        Some(Self {
            edge,
            gradient,
            inside,
            outside,
            points,
        })
    }

    /// Number of boundary samples the tables were built from.
    #[inline]
    pub fn samples(&self) -> usize {
        self.points.len()
    }

    /// The boundary samples, starting from the point training was run on.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Trained cost of an intensity in `[0, 1]`.
    #[inline]
    pub fn edge(&self, v: f32) -> f32 {
        lookup(&self.edge, v)
    }

    /// Trained cost of a gradient cost in `[0, 1]`.
    #[inline]
    pub fn gradient(&self, v: f32) -> f32 {
        lookup(&self.gradient, v)
    }

    #[inline]
    pub fn inside(&self, v: f32) -> f32 {
        lookup(&self.inside, v)
    }

    #[inline]
    pub fn outside(&self, v: f32) -> f32 {
        lookup(&self.outside, v)
    }
}

#[inline]
fn bin(bins: usize, v: f32) -> usize {
    let v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
    ((bins - 1) as f32 * v).round() as usize
}

#[inline]
fn lookup(table: &[f32], v: f32) -> f32 {
    table[bin(table.len(), v)]
}

/// Histogram `values`, map each bin to `1 - count / max_count`, then blur.
fn inverted_histogram(values: impl Iterator<Item = f32>, bins: usize) -> Vec<f32> {
    let mut counts = vec![0u32; bins];
    for v in values {
        counts[bin(bins, v)] += 1;
    }
    let max = counts.iter().copied().max().unwrap_or(0).max(1) as f32;
    let inverted: Vec<f32> = counts.iter().map(|&c| 1.0 - c as f32 / max).collect();
    blur(&inverted)
}

/// 5-tap smoothing. The two bins at each end fold the missing taps onto
/// their existing neighbours so every output still sums its weights to 1.
fn blur(buf: &[f32]) -> Vec<f32> {
    let n = buf.len();
    let mut out = vec![0.0f32; n];
    if n < 4 {
        out.copy_from_slice(buf);
        return out;
    }
    out[0] = 0.4 * buf[0] + 0.5 * buf[1] + 0.1 * buf[2];
    out[1] = 0.25 * buf[0] + 0.4 * buf[1] + 0.25 * buf[2] + 0.1 * buf[3];
    for i in 2..n - 2 {
        out[i] = BLUR.iter().zip(&buf[i - 2..=i + 2]).map(|(k, v)| k * v).sum();
    }
    out[n - 2] = 0.25 * buf[n - 1] + 0.4 * buf[n - 2] + 0.25 * buf[n - 3] + 0.1 * buf[n - 4];
    out[n - 1] = 0.4 * buf[n - 1] + 0.5 * buf[n - 2] + 0.1 * buf[n - 3];
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use scissors_core::PixelSource;

    fn step_field() -> CostField {
        let (w, h) = (24usize, 24usize);
        let mut data = vec![40u8; w * h];
        for y in 0..h {
            for x in 12..w {
                data[y * w + x] = 200;
            }
        }
        CostField::build(&PixelSource::gray_bytes(&data, w, h)).unwrap()
    }

    #[test]
    fn blur_preserves_constants() {
        let out = blur(&[0.5; 16]);
        assert!(out.iter().all(|v| (v - 0.5).abs() < 1e-6));
    }

    #[test]
    fn blur_spreads_a_spike() {
        let mut buf = vec![0.0f32; 9];
        buf[4] = 1.0;
        let out = blur(&buf);
        assert!((out[4] - 0.4).abs() < 1e-6);
        assert!((out[3] - 0.25).abs() < 1e-6);
        assert!((out[2] - 0.05).abs() < 1e-6);
        assert_eq!(out[0], 0.0);
    }

    #[test]
    fn common_values_are_cheap() {
        let table = inverted_histogram([0.5f32; 20].into_iter(), 256);
        let hot = table[bin(256, 0.5)];
        let cold = table[bin(256, 0.1)];
        assert!(hot < 0.7);
        assert!((cold - 1.0).abs() < 1e-6);
    }

    #[test]
    fn too_few_samples_is_none() {
        let field = step_field();
        let cfg = LiveWireConfig::default();
        let pts: Vec<Point> = (0..7).map(|y| Point::new(11, y)).collect();
        assert!(TrainingTables::from_samples(&field, &pts, &cfg).is_none());
    }

    #[test]
    fn tables_follow_the_sampled_boundary() {
        let field = step_field();
        let cfg = LiveWireConfig::default();
        let pts: Vec<Point> = (0..20).map(|y| Point::new(11, y)).collect();
        let t = TrainingTables::from_samples(&field, &pts, &cfg).unwrap();
        assert_eq!(t.samples(), 20);
        // The dark boundary column is cheap, bright pixels are not.
        assert!(t.edge(40.0 / 255.0) < t.edge(200.0 / 255.0));
        // Bright on the gradient side, dark on the other.
        assert!(t.inside(200.0 / 255.0) < t.inside(40.0 / 255.0));
        assert!(t.outside(40.0 / 255.0) < t.outside(200.0 / 255.0));
    }

    #[test]
    fn short_training_blends_gradient_toward_identity() {
        let field = step_field();
        let cfg = LiveWireConfig::default();
        let pts: Vec<Point> = (0..16).map(|y| Point::new(11, y)).collect();
        let t = TrainingTables::from_samples(&field, &pts, &cfg).unwrap();
        // Half the needed samples: the top bin is halfway to the identity.
        let top = t.gradient(1.0);
        assert!(top > 0.5 && top <= 1.0);
        let full = LiveWireConfig {
            grad_points_needed: 16,
            ..cfg
        };
        let unblended = TrainingTables::from_samples(&field, &pts, &full).unwrap();
        assert!(unblended.gradient(0.0) >= t.gradient(0.0));
    }
}
