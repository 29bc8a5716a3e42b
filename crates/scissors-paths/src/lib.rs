//! Interactive boundary tracing on a [`CostField`](scissors_core::CostField).
//!
//! The user drops a seed on an object's edge and moves the pointer;
//! [`LiveWire`] answers each pointer position with the minimum-cost
//! 8-connected path back to the seed. Pieces:
//!
//! - [`BucketQueue`]: the bounded-range priority queue driving the search;
//! - [`LiveWire`]: the incremental Dijkstra tree, cursor snapping
//!   ([`LiveWire::find_min_nearby`]) and single-step costs;
//! - [`TrainingTables`]: lookup tables learned from an accepted boundary
//!   segment ([`LiveWire::do_training`]), which make edges that look like
//!   it cheaper;
//! - [`LiveWireConfig`]: weights and limits.
//!
//! ```no_run
//! use scissors_core::{CostField, PixelSource, Point};
//! use scissors_paths::LiveWire;
//!
//! # fn main() -> scissors_core::Result<()> {
//! let pixels = vec![0u8; 64 * 64];
//! let field = CostField::build(&PixelSource::gray_bytes(&pixels, 64, 64))?;
//! let mut wire = LiveWire::new(field);
//! wire.start_search(Point::new(10, 10))?;
//! if let Some(path) = wire.find_path_to_point(Point::new(40, 30))? {
//!     println!("{} points", path.len());
//! }
//! # Ok(())
//! # }
//! ```

mod bucket;
mod config;
mod distance;
mod livewire;
mod neighbors;
mod training;
mod traits;

pub use bucket::{BucketQueue, MAX_BITS};
pub use config::{LiveWireConfig, StaticWeights, TrainedWeights};
pub use distance::manhattan;
pub use livewire::LiveWire;
pub use neighbors::Neighbors;
pub use training::{EDGE_BINS, GRADIENT_BINS, SIDE_BINS, TrainingTables};
pub use traits::EdgeCost;
