//! Reference geometry for the three-circle experiment.
//!
//! The circles are centred at (1, 1), (1.5, 2) and (2, 1.5) with radii 1, √5/2 and √5/2.
//! Their common region has the closed-form area `π/4 + 1.25·asin(0.8) − 1`.

use crate::domain::model::{Circle, Region, SamplingDomain};
use std::f64::consts::PI;

pub fn calculate_exact_area() -> f64 {
    0.25 * PI + 1.25 * 0.8_f64.asin() - 1.0
}

pub fn reference_circles() -> Vec<Circle> {
    let r = 5.0_f64.sqrt() / 2.0;
    vec![
        Circle::from_parts(1.0, 1.0, 1.0),
        Circle::from_parts(1.5, 2.0, r),
        Circle::from_parts(2.0, 1.5, r),
    ]
}

/// [0.5, 2.5] × [0.5, 2.5]; covers the whole intersection.
pub fn wide_region() -> Region {
    Region::new("wide", SamplingDomain::from_parts(0.5, 2.5, 0.5, 2.5))
}

/// [1, 2] × [1, 2]; tighter window around the intersection.
pub fn narrow_region() -> Region {
    Region::new("narrow", SamplingDomain::from_parts(1.0, 2.0, 1.0, 2.0))
}

pub fn reference_regions() -> Vec<Region> {
    vec![wide_region(), narrow_region()]
}

/// `|approx − exact| / exact`. `exact` must be non-zero.
pub fn relative_error(approx: f64, exact: f64) -> f64 {
    (approx - exact).abs() / exact
}
