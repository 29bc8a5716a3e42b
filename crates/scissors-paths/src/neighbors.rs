use scissors_core::{Point, Range};

/// Reusable buffer for enumerating the in-image neighbours of a pixel.
#[derive(Debug, Clone)]
pub struct Neighbors {
    buf: Vec<Point>,
}

impl Default for Neighbors {
    fn default() -> Self {
        Self::new()
    }
}

impl Neighbors {
    /// Create a new `Neighbors` helper.
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(8),
        }
    }

    /// The up-to-8 neighbours of `p` that lie inside `rng`, clockwise from
    /// the one above.
    pub fn within(&mut self, p: Point, rng: Range) -> &[Point] {
        self.buf.clear();
        self.buf
            .extend(p.neighbors_8().into_iter().filter(|&n| rng.contains(n)));
        &self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_has_three_neighbors() {
        let mut nb = Neighbors::new();
        let rng = Range::with_size(5, 5);
        assert_eq!(
            nb.within(Point::new(0, 0), rng),
            &[Point::new(1, 0), Point::new(1, 1), Point::new(0, 1)]
        );
        assert_eq!(nb.within(Point::new(2, 2), rng).len(), 8);
        assert_eq!(nb.within(Point::new(4, 2), rng).len(), 5);
    }
}
