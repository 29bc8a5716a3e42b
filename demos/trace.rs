//! Trace the outline of a noisy synthetic disk.
//!
//! Run: cargo run --bin trace
//! Set `RUST_LOG=debug` (or `trace`) to watch the engine work.

use std::error::Error;
use std::f32::consts::TAU;

use flexi_logger::Logger;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scissors_core::{CostField, PixelSource, Point};
use scissors_paths::{EdgeCost, LiveWire};

const SIZE: usize = 160;
const RADIUS: f32 = 52.0;
const NOISE: i32 = 18;
const STOPS: usize = 12;
const SNAP: i32 = 3;

fn disk_image(rng: &mut StdRng) -> Vec<u8> {
    let c = SIZE as f32 / 2.0;
    let mut data = vec![0u8; SIZE * SIZE];
    for y in 0..SIZE {
        for x in 0..SIZE {
            let (dx, dy) = (x as f32 - c, y as f32 - c);
            let base = if dx.hypot(dy) <= RADIUS { 180 } else { 70 };
            let v = base + rng.random_range(-NOISE..=NOISE);
            data[y * SIZE + x] = v.clamp(0, 255) as u8;
        }
    }
    data
}

/// A point on the disk outline, jittered the way a hand on a mouse would be.
fn rim(rng: &mut StdRng, angle: f32) -> Point {
    let c = SIZE as f32 / 2.0;
    let r = RADIUS + rng.random_range(-2.0..2.0);
    Point::new(
        (c + r * angle.cos()).round() as i32,
        (c + r * angle.sin()).round() as i32,
    )
}

fn main() -> Result<(), Box<dyn Error>> {
    let _logger = Logger::try_with_env_or_str("info")?.start()?;

    let mut rng = StdRng::seed_from_u64(2024);
    let pixels = disk_image(&mut rng);
    let field = CostField::build(&PixelSource::gray_bytes(&pixels, SIZE, SIZE))?;
    let mut wire = LiveWire::new(field);

    let mut anchor = rim(&mut rng, 0.0);
    wire.start_search(anchor)?;
    log::info!("seeded at {anchor}");

    let mut outline: Vec<Point> = vec![anchor];
    for stop in 1..=STOPS {
        let angle = TAU * stop as f32 / STOPS as f32;
        let click = rim(&mut rng, angle);
        let target = wire.find_min_nearby(click, SNAP)?;

        let Some(path) = wire.find_path_to_point(target)? else {
            log::warn!("{target} is unreachable, skipping");
            continue;
        };
        let cost = wire.path_cost(&path);
        println!(
            "stop {stop:2}: click {click} -> {target}, {} points, cost {cost:.3}, {} expanded",
            path.len(),
            wire.expanded_count()
        );

        // Accept the segment: learn from it, then continue from its end.
        if wire.do_training(target)? {
            log::info!("trained on {} points", wire.training_points().len());
        }
        outline.extend(path.into_iter().skip(1));
        anchor = target;
        wire.start_search(anchor)?;
    }

    let closed = outline.first() == outline.last();
    println!(
        "outline: {} points, closed: {closed}, trained: {}",
        outline.len(),
        wire.is_trained()
    );
    Ok(())
}
