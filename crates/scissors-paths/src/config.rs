//! Tunables of the livewire search and its training mode.

/// Term weights of the untrained edge cost.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StaticWeights {
    pub gradient: f32,
    pub laplace: f32,
    pub direction: f32,
}

impl Default for StaticWeights {
    fn default() -> Self {
        Self {
            gradient: 0.43,
            laplace: 0.43,
            direction: 0.11,
        }
    }
}

/// Term weights used once training tables are active. `extra` scales the
/// sum of the direction term and the three trained lookups (edge, inside,
/// outside).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TrainedWeights {
    pub gradient: f32,
    pub laplace: f32,
    pub extra: f32,
}

impl Default for TrainedWeights {
    fn default() -> Self {
        Self {
            gradient: 0.3,
            laplace: 0.3,
            extra: 0.1,
        }
    }
}

/// Configuration of a [`LiveWire`](crate::LiveWire) engine.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LiveWireConfig {
    /// Queue granularity: `2^bucket_bits` buckets, and path costs are
    /// quantized to `1 / 2^bucket_bits`.
    pub bucket_bits: u32,
    pub static_weights: StaticWeights,
    pub trained_weights: TrainedWeights,
    /// Most parent-chain points sampled by one training call.
    pub training_length: usize,
    /// Fewer sampled points than this and training is skipped.
    pub min_training_points: usize,
    /// Sample count below which the trained gradient table is blended
    /// toward the static one.
    pub grad_points_needed: usize,
    /// Distance in pixels of the inside/outside samples from the boundary.
    pub edge_width: f32,
}

impl Default for LiveWireConfig {
    fn default() -> Self {
        Self {
            bucket_bits: 8,
            static_weights: StaticWeights::default(),
            trained_weights: TrainedWeights::default(),
            training_length: 32,
            min_training_points: 8,
            grad_points_needed: 32,
            edge_width: 2.0,
        }
    }
}

impl LiveWireConfig {
    /// Clamp out-of-range values, logging each correction.
    pub fn sanitized(mut self) -> Self {
        if !(1..=16).contains(&self.bucket_bits) {
            let fixed = self.bucket_bits.clamp(1, 16);
            log::warn!("bucket_bits {} out of range, using {fixed}", self.bucket_bits);
            self.bucket_bits = fixed;
        }
        if self.min_training_points == 0 {
            log::warn!("min_training_points 0 out of range, using 1");
            self.min_training_points = 1;
        }
        if self.training_length < self.min_training_points {
            log::warn!(
                "training_length {} below min_training_points, using {}",
                self.training_length,
                self.min_training_points
            );
            self.training_length = self.min_training_points;
        }
        if !self.edge_width.is_finite() || self.edge_width < 0.0 {
            log::warn!("edge_width {} out of range, using 2", self.edge_width);
            self.edge_width = 2.0;
        }
        self
    }

    /// Queue priority of an accumulated path cost.
    #[inline]
    pub(crate) fn priority(&self, cost: f32) -> u32 {
        (cost * (1u32 << self.bucket_bits) as f32).round() as u32
    }
}
