use scissors_core::Point;

/// Cost of a single step between adjacent pixels.
pub trait EdgeCost {
    /// Cost of moving from `from` to the adjacent pixel `to`. Stepping onto a
    /// pixel outside the image costs 1; stepping from outside back in
    /// costs 0.
    fn edge_cost(&self, from: Point, to: Point) -> f32;

    /// Sum of [`edge_cost`](EdgeCost::edge_cost) over consecutive points.
    fn path_cost(&self, path: &[Point]) -> f32 {
        path.windows(2).map(|w| self.edge_cost(w[0], w[1])).sum()
    }
}
