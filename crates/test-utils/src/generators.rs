//! Synthetic point datasets in Web Mercator meters.
//!
//! All generators are seeded so a failing test reproduces exactly.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::fixtures::WORLD_HALF_WIDTH;

/// Uniformly distributed points inside `(min_x, min_y, max_x, max_y)`.
///
/// # Example
///
/// ```
/// use test_utils::uniform_points;
///
/// let pts = uniform_points(100, (0.0, 0.0, 10.0, 10.0), 7);
/// assert_eq!(pts.len(), 100);
/// assert!(pts.iter().all(|&(x, y)| (0.0..10.0).contains(&x) && (0.0..10.0).contains(&y)));
/// ```
pub fn uniform_points(count: usize, bounds: (f64, f64, f64, f64), seed: u64) -> Vec<(f64, f64)> {
    let (min_x, min_y, max_x, max_y) = bounds;
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| (rng.gen_range(min_x..max_x), rng.gen_range(min_y..max_y)))
        .collect()
}

/// Uniform points over the whole Web Mercator square.
pub fn world_points(count: usize, seed: u64) -> Vec<(f64, f64)> {
    uniform_points(
        count,
        (-WORLD_HALF_WIDTH, -WORLD_HALF_WIDTH, WORLD_HALF_WIDTH, WORLD_HALF_WIDTH),
        seed,
    )
}

/// Heavy-tailed clustered points: a handful of dense clusters over a sparse
/// uniform background, similar to real-world incident or address data.
///
/// Cluster offsets follow a triangular-ish distribution (sum of two uniform
/// draws) scaled by `spread` meters.
pub fn clustered_points(
    count: usize,
    centers: &[(f64, f64)],
    spread: f64,
    seed: u64,
) -> Vec<(f64, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let background = count / 10;
    let mut points = Vec::with_capacity(count);

    for _ in 0..background {
        points.push((
            rng.gen_range(-WORLD_HALF_WIDTH..WORLD_HALF_WIDTH),
            rng.gen_range(-WORLD_HALF_WIDTH..WORLD_HALF_WIDTH),
        ));
    }

    if centers.is_empty() {
        return points;
    }

    for _ in background..count {
        // Earlier centers get more weight, so cluster sizes are uneven.
        let pick = (rng.gen::<f64>().powi(2) * centers.len() as f64) as usize;
        let (cx, cy) = centers[pick.min(centers.len() - 1)];
        let dx = (rng.gen::<f64>() + rng.gen::<f64>() - 1.0) * spread;
        let dy = (rng.gen::<f64>() + rng.gen::<f64>() - 1.0) * spread;
        points.push((cx + dx, cy + dy));
    }

    points
}

/// Points laid on an exact `n × n` lattice with the given spacing, starting
/// at `origin`. Useful for boundary tests because coordinates are exact.
pub fn lattice_points(n: usize, origin: (f64, f64), spacing: f64) -> Vec<(f64, f64)> {
    let mut points = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            points.push((origin.0 + i as f64 * spacing, origin.1 + j as f64 * spacing));
        }
    }
    points
}

/// Random axis-aligned boxes, some inside `bounds`, some straddling it, some
/// degenerate (zero width or height).
pub fn random_boxes(count: usize, bounds: (f64, f64, f64, f64), seed: u64) -> Vec<(f64, f64, f64, f64)> {
    let (min_x, min_y, max_x, max_y) = bounds;
    let w = max_x - min_x;
    let h = max_y - min_y;
    let mut rng = StdRng::seed_from_u64(seed);

    (0..count)
        .map(|i| {
            let x0 = rng.gen_range(min_x - 0.1 * w..max_x + 0.1 * w);
            let y0 = rng.gen_range(min_y - 0.1 * h..max_y + 0.1 * h);
            let scale = 10f64.powf(rng.gen_range(-4.0..0.0));
            let bw = if i % 17 == 0 { 0.0 } else { rng.gen::<f64>() * w * scale };
            let bh = if i % 19 == 0 { 0.0 } else { rng.gen::<f64>() * h * scale };
            (x0, y0, x0 + bw, y0 + bh)
        })
        .collect()
}
