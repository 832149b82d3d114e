//! Monte Carlo estimation of the area shared by a set of circles.
//!
//! Points are drawn uniformly from a [`SamplingDomain`]; the fraction that lands in every
//! circle, scaled by the domain area, estimates the intersection area. The estimate is
//! unbiased when the intersection lies inside the domain and its variance falls as `1/n`.
//!
//! Every call owns its random stream. Streams are [`Xoshiro256PlusPlus`] generators, either
//! seeded explicitly (bit-reproducible) or from OS entropy.

use crate::core::predicate::point_in_intersection;
use crate::domain::model::{Circle, SamplingDomain};
use crate::utils::error::{ExperimentError, Result};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

pub type SampleRng = Xoshiro256PlusPlus;

/// Use `seed` when given, otherwise draw a fresh one from OS entropy.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(rand::random)
}

pub fn sample_rng(seed: u64) -> SampleRng {
    SampleRng::seed_from_u64(seed)
}

/// Split one seeded stream into `n` non-overlapping streams.
///
/// Stream 0 is the seeded generator itself; each following stream is advanced by one
/// `jump()` (2^128 steps) past its predecessor.
pub fn partition_streams(seed: u64, n: usize) -> Vec<SampleRng> {
    let mut current = sample_rng(seed);
    let mut streams = Vec::with_capacity(n);
    for _ in 0..n {
        streams.push(current.clone());
        current.jump();
    }
    streams
}

/// Number of `sample_count` uniform points in `domain` that fall inside every circle.
pub fn count_inside<R: Rng + ?Sized>(
    circles: &[Circle],
    domain: &SamplingDomain,
    sample_count: u64,
    rng: &mut R,
) -> u64 {
    let (x_min, width) = (domain.x_min(), domain.width());
    let (y_min, height) = (domain.y_min(), domain.height());

    let mut inside = 0;
    for _ in 0..sample_count {
        let x = x_min + width * rng.gen::<f64>();
        let y = y_min + height * rng.gen::<f64>();
        if point_in_intersection(x, y, circles) {
            inside += 1;
        }
    }
    inside
}

fn check_inputs(circles: &[Circle], sample_count: u64) -> Result<()> {
    if circles.is_empty() {
        return Err(ExperimentError::invalid_argument(
            "at least one circle is required",
        ));
    }
    if sample_count == 0 {
        return Err(ExperimentError::invalid_argument(
            "sample count must be at least 1",
        ));
    }
    Ok(())
}

fn scale(inside: u64, sample_count: u64, domain: &SamplingDomain) -> f64 {
    (inside as f64 / sample_count as f64) * domain.area()
}

/// Estimate the intersection area using a caller-owned random stream.
pub fn estimate_area_with_rng<R: Rng + ?Sized>(
    circles: &[Circle],
    domain: &SamplingDomain,
    sample_count: u64,
    rng: &mut R,
) -> Result<f64> {
    check_inputs(circles, sample_count)?;
    let inside = count_inside(circles, domain, sample_count, rng);
    Ok(scale(inside, sample_count, domain))
}

/// Estimate the intersection area from `sample_count` points.
///
/// With `seed = Some(_)` two calls return bit-identical results.
///
/// # Errors
///
/// `InvalidArgument` when `circles` is empty or `sample_count` is zero.
pub fn estimate_area(
    circles: &[Circle],
    domain: &SamplingDomain,
    sample_count: u64,
    seed: Option<u64>,
) -> Result<f64> {
    let mut rng = sample_rng(resolve_seed(seed));
    estimate_area_with_rng(circles, domain, sample_count, &mut rng)
}

/// Same estimate as [`estimate_area`], with the sample budget split across `workers`
/// scoped threads.
///
/// Each worker gets its own stream from [`partition_streams`]; the last worker also takes
/// the remainder of the budget. The result depends on `(seed, workers)`, and with one
/// worker matches [`estimate_area`] for the same seed.
pub fn estimate_area_parallel(
    circles: &[Circle],
    domain: &SamplingDomain,
    sample_count: u64,
    seed: Option<u64>,
    workers: usize,
) -> Result<f64> {
    check_inputs(circles, sample_count)?;
    if workers == 0 {
        return Err(ExperimentError::invalid_argument(
            "worker count must be at least 1",
        ));
    }

    let workers = workers.min(usize::try_from(sample_count).unwrap_or(usize::MAX));
    let per_worker = sample_count / workers as u64;
    let remainder = sample_count % workers as u64;
    let streams = partition_streams(resolve_seed(seed), workers);

    let inside = std::thread::scope(|scope| {
        let handles: Vec<_> = streams
            .into_iter()
            .enumerate()
            .map(|(id, mut rng)| {
                let budget = if id == workers - 1 {
                    per_worker + remainder
                } else {
                    per_worker
                };
                scope.spawn(move || count_inside(circles, domain, budget, &mut rng))
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .map_err(|_| ExperimentError::processing("sampling worker panicked"))
            })
            .sum::<Result<u64>>()
    })?;

    Ok(scale(inside, sample_count, domain))
}
