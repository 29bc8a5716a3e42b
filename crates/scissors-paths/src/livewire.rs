//! The incremental livewire search.
//!
//! [`LiveWire`] owns one image's [`CostField`] and a shortest-path tree that
//! grows from the current seed. Each [`find_path_to_point`] call expands the
//! tree only until the requested target is finalized, and the tree survives
//! between calls, so a pointer sweeping around the seed mostly reads paths
//! that were already computed.
//!
//! States: *idle* until the first [`start_search`]; *searching* afterwards.
//! A new seed restarts the tree; replacing the cost field returns to idle.
//!
//! [`find_path_to_point`]: LiveWire::find_path_to_point
//! [`start_search`]: LiveWire::start_search

use std::f32::consts::{FRAC_1_SQRT_2, PI};

use scissors_core::{CostField, Point, Result, TraceError};

use crate::bucket::BucketQueue;
use crate::config::LiveWireConfig;
use crate::distance::manhattan;
use crate::neighbors::Neighbors;
use crate::training::TrainingTables;
use crate::traits::EdgeCost;

const NO_PARENT: usize = usize::MAX;

/// Scale of the direction term, so that it spans `[0, 1]`.
const DIRECTION_SCALE: f32 = 2.0 / (3.0 * PI);

/// Which edge-cost formula is in effect.
#[derive(Debug, Clone)]
enum Mode {
    Untrained,
    Trained(Box<TrainingTables>),
}

impl Mode {
    #[inline]
    fn tables(&self) -> Option<&TrainingTables> {
        match self {
            Self::Untrained => None,
            Self::Trained(t) => Some(t.as_ref()),
        }
    }
}

// ---------------------------------------------------------------------------
// Edge cost
// ---------------------------------------------------------------------------

/// The weighted step cost over one cost field.
struct CostModel<'a> {
    field: &'a CostField,
    config: &'a LiveWireConfig,
    training: Option<&'a TrainingTables>,
}

impl CostModel<'_> {
    /// Gradient-direction penalty of the step `a -> b` (Mortensen–Barrett):
    /// 0 when the step runs along the local edge at both ends, 1 when it
    /// cuts straight across.
    fn direction(&self, ai: usize, bi: usize, a: Point, b: Point) -> f32 {
        let (aux, auy) = self.field.unit_gradient(ai);
        let (bux, buy) = self.field.unit_gradient(bi);
        let lx = (b.x - a.x) as f32;
        let ly = (b.y - a.y) as f32;

        let mut dp = auy * lx - aux * ly;
        let mut dq = buy * lx - bux * ly;
        if dp < 0.0 {
            dp = -dp;
            dq = -dq;
        }
        if a.is_diagonal_to(b) {
            dp *= FRAC_1_SQRT_2;
            dq *= FRAC_1_SQRT_2;
        }
        DIRECTION_SCALE * (dp.clamp(-1.0, 1.0).acos() + dq.clamp(-1.0, 1.0).acos())
    }
}

impl EdgeCost for CostModel<'_> {
    fn edge_cost(&self, from: Point, to: Point) -> f32 {
        let rng = self.field.range();
        let Some(bi) = rng.index_of(to) else {
            return 1.0;
        };
        let Some(ai) = rng.index_of(from) else {
            return 0.0;
        };

        let mut grad = self.field.gradient_cost()[bi];
        if from.is_diagonal_to(to) {
            grad *= FRAC_1_SQRT_2;
        }
        let lap = self.field.laplace_cost()[bi];
        let dir = self.direction(ai, bi, from, to);

        let cost = match self.training {
            None => {
                let w = &self.config.static_weights;
                w.gradient * grad + w.laplace * lap + w.direction * dir
            }
            Some(t) => {
                let w = &self.config.trained_weights;
                let edge = t.edge(self.field.gray().as_slice()[bi]);
                let (inside, outside) = self
                    .field
                    .side_samples(to, self.config.edge_width)
                    .unwrap_or((0.0, 0.0));
                w.gradient * t.gradient(grad)
                    + w.laplace * lap
                    + w.extra * (dir + edge + t.inside(inside) + t.outside(outside))
            }
        };

        if cost.is_finite() { cost.max(0.0) } else { 1.0 }
    }
}

// ---------------------------------------------------------------------------
// LiveWire
// ---------------------------------------------------------------------------

/// Interactive boundary tracer over one image.
///
/// All per-pixel arrays are allocated once per cost field and reused by
/// every search, so queries allocate nothing but the returned path.
///
/// Untrained steps cost at most 0.97, inside the queue's window of one
/// cost unit. A trained step can cost exactly 1.0 and then shares a bucket
/// with the pixel being expanded, so trained searches may finalize a few
/// pixels slightly out of order.
#[derive(Debug, Clone)]
pub struct LiveWire {
    field: CostField,
    config: LiveWireConfig,
    mode: Mode,
    seed: Option<usize>,
    costs: Vec<f32>,
    parents: Vec<usize>,
    visited: Vec<bool>,
    queue: BucketQueue<usize>,
    expanded: usize,
    nbuf: Neighbors,
}

impl LiveWire {
    /// Create an idle engine with the default configuration.
    pub fn new(field: CostField) -> Self {
        Self::with_config(field, LiveWireConfig::default())
    }

    /// Create an idle engine.
    pub fn with_config(field: CostField, config: LiveWireConfig) -> Self {
        let config = config.sanitized();
        let len = field.len();
        Self {
            field,
            mode: Mode::Untrained,
            seed: None,
            costs: vec![f32::INFINITY; len],
            parents: vec![NO_PARENT; len],
            visited: vec![false; len],
            queue: BucketQueue::new(config.bucket_bits),
            expanded: 0,
            nbuf: Neighbors::new(),
            config,
        }
    }

    /// Replace the cost field (e.g. the image changed). Drops the search
    /// tree and any training; the engine becomes idle.
    pub fn set_cost_field(&mut self, field: CostField) {
        let len = field.len();
        log::debug!(
            "cost field replaced ({}x{}), engine idle",
            field.width(),
            field.height()
        );
        self.field = field;
        self.mode = Mode::Untrained;
        self.seed = None;
        self.costs.clear();
        self.costs.resize(len, f32::INFINITY);
        self.parents.clear();
        self.parents.resize(len, NO_PARENT);
        self.visited.clear();
        self.visited.resize(len, false);
        self.queue.clear();
        self.expanded = 0;
    }

    /// The cost field being searched.
    #[inline]
    pub fn cost_field(&self) -> &CostField {
        &self.field
    }

    #[inline]
    pub fn config(&self) -> &LiveWireConfig {
        &self.config
    }

    #[inline]
    fn model(&self) -> CostModel<'_> {
        CostModel {
            field: &self.field,
            config: &self.config,
            training: self.mode.tables(),
        }
    }

    fn checked_index(&self, p: Point) -> Result<usize> {
        self.field
            .range()
            .index_of(p)
            .ok_or(TraceError::OutOfBounds {
                point: p,
                width: self.field.width(),
                height: self.field.height(),
            })
    }

    // -----------------------------------------------------------------------
    // Search
    // -----------------------------------------------------------------------

    /// Discard any previous tree and root a new one at `seed`.
    pub fn start_search(&mut self, seed: Point) -> Result<()> {
        let si = self.checked_index(seed)?;

        self.costs.fill(f32::INFINITY);
        self.parents.fill(NO_PARENT);
        self.visited.fill(false);
        self.queue.clear();
        self.expanded = 0;

        self.costs[si] = 0.0;
        self.queue.push(si, 0);
        self.seed = Some(si);

        log::debug!(
            "search started at {seed} on {}x{} image",
            self.field.width(),
            self.field.height()
        );
        Ok(())
    }

    /// Minimum-cost path from the seed to `target`, both included.
    ///
    /// Returns an empty path if `target` is the seed and `Ok(None)` if the
    /// target cannot be reached. Work done for earlier targets is reused.
    pub fn find_path_to_point(&mut self, target: Point) -> Result<Option<Vec<Point>>> {
        let si = self.seed.ok_or(TraceError::NotStarted)?;
        let ti = self.checked_index(target)?;
        if ti == si {
            return Ok(Some(Vec::new()));
        }

        let before = self.expanded;
        let rng = self.field.range();
        let model = CostModel {
            field: &self.field,
            config: &self.config,
            training: self.mode.tables(),
        };
        let mut nbuf = std::mem::take(&mut self.nbuf);

        while !self.visited[ti] {
            let Some(ci) = self.queue.pop() else {
                break;
            };
            if self.visited[ci] {
                continue;
            }
            self.visited[ci] = true;
            self.expanded += 1;

            let cp = rng.point_at(ci);
            let base = self.costs[ci];
            for &np in nbuf.within(cp, rng) {
                let Some(ni) = rng.index_of(np) else {
                    continue;
                };
                // Finalized costs never change.
                if self.visited[ni] {
                    continue;
                }
                let next = base + model.edge_cost(cp, np);
                let old = self.costs[ni];
                if next < old {
                    if old.is_finite() {
                        self.queue.remove(&ni, self.config.priority(old));
                    }
                    self.costs[ni] = next;
                    self.parents[ni] = ci;
                    self.queue.push(ni, self.config.priority(next));
                }
            }
        }

        self.nbuf = nbuf;

        if !self.visited[ti] {
            log::trace!(
                "no path to {target} after expanding {} pixels",
                self.expanded - before
            );
            return Ok(None);
        }

        let mut path = Vec::new();
        let mut ci = ti;
        while ci != NO_PARENT {
            path.push(rng.point_at(ci));
            ci = self.parents[ci];
        }
        path.reverse();

        log::trace!(
            "path to {target}: {} points, {} pixels expanded",
            path.len(),
            self.expanded - before
        );
        Ok(Some(path))
    }

    /// Snap an imprecise click to a nearby pixel that is cheap to reach.
    ///
    /// Scores every pixel in the `(2·delta+1)²` window around `test` as
    /// `0.8·cost + 0.2·manhattan/(2·delta)` and returns the best one, or
    /// `test` itself if nothing beats `0.8·cost(test)`. Costs are those of
    /// the current search tree, so the result depends on the seed and on
    /// what earlier queries reached; unreached pixels have infinite cost.
    pub fn find_min_nearby(&self, test: Point, delta: i32) -> Result<Point> {
        let ti = self.checked_index(test)?;
        let delta = delta.max(0);
        let norm = (2 * delta).max(1) as f32;

        let rng = self.field.range();
        let mut best = test;
        let mut min = self.costs[ti] * 0.8;
        for p in rng.around(test, delta) {
            let Some(i) = rng.index_of(p) else {
                continue;
            };
            let score = self.costs[i] * 0.8 + 0.2 * manhattan(p, test) as f32 / norm;
            if score < min {
                min = score;
                best = p;
            }
        }
        Ok(best)
    }

    /// Cost of the single step `a -> b` under the current mode.
    #[inline]
    pub fn get_cost(&self, a: Point, b: Point) -> f32 {
        self.model().edge_cost(a, b)
    }

    // -----------------------------------------------------------------------
    // Training
    // -----------------------------------------------------------------------

    /// Learn edge costs from the path that currently leads to `point`.
    ///
    /// Samples up to `training_length` points up the parent chain. Returns
    /// `Ok(false)` without changing anything if fewer than
    /// `min_training_points` are available.
    pub fn do_training(&mut self, point: Point) -> Result<bool> {
        self.seed.ok_or(TraceError::NotStarted)?;
        let mut ci = self.checked_index(point)?;

        let rng = self.field.range();
        let mut samples = Vec::with_capacity(self.config.training_length);
        while ci != NO_PARENT && samples.len() < self.config.training_length {
            samples.push(rng.point_at(ci));
            ci = self.parents[ci];
        }

        match TrainingTables::from_samples(&self.field, &samples, &self.config) {
            Some(tables) => {
                log::debug!(
                    "trained on {} points from {point}{}",
                    tables.samples(),
                    if tables.samples() < self.config.grad_points_needed {
                        " (gradient table blended)"
                    } else {
                        ""
                    }
                );
                self.mode = Mode::Trained(Box::new(tables));
                Ok(true)
            }
            None => {
                log::debug!(
                    "training skipped: {} points from {point}, need {}",
                    samples.len(),
                    self.config.min_training_points
                );
                Ok(false)
            }
        }
    }

    /// Return to the untrained cost formula.
    pub fn reset_training(&mut self) {
        self.mode = Mode::Untrained;
    }

    #[inline]
    pub fn is_trained(&self) -> bool {
        matches!(self.mode, Mode::Trained(_))
    }

    /// The active training tables, if any.
    #[inline]
    pub fn training(&self) -> Option<&TrainingTables> {
        self.mode.tables()
    }

    /// Points the active training was sampled from (empty if untrained).
    pub fn training_points(&self) -> &[Point] {
        self.mode
            .tables()
            .map(TrainingTables::points)
            .unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Inspection
    // -----------------------------------------------------------------------

    /// Whether a search is in progress.
    #[inline]
    pub fn is_searching(&self) -> bool {
        self.seed.is_some()
    }

    /// The current seed.
    #[inline]
    pub fn seed(&self) -> Option<Point> {
        self.seed.map(|i| self.field.range().point_at(i))
    }

    /// Best known path cost to `p` (infinite if not reached yet), or `None`
    /// outside the image.
    pub fn cost_at(&self, p: Point) -> Option<f32> {
        self.field.range().index_of(p).map(|i| self.costs[i])
    }

    /// Predecessor of `p` in the search tree.
    pub fn parent_of(&self, p: Point) -> Option<Point> {
        let rng = self.field.range();
        let i = rng.index_of(p)?;
        match self.parents[i] {
            NO_PARENT => None,
            pi => Some(rng.point_at(pi)),
        }
    }

    /// Whether `p`'s cost is final.
    pub fn is_visited(&self, p: Point) -> bool {
        self.field
            .range()
            .index_of(p)
            .is_some_and(|i| self.visited[i])
    }

    /// Pixels finalized since the last [`start_search`](Self::start_search).
    #[inline]
    pub fn expanded_count(&self) -> usize {
        self.expanded
    }
}

impl EdgeCost for LiveWire {
    #[inline]
    fn edge_cost(&self, from: Point, to: Point) -> f32 {
        self.get_cost(from, to)
    }
}
