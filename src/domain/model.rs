use crate::utils::error::{ExperimentError, Result};
use serde::{Deserialize, Serialize};

/// A circle in the plane. Radius is non-negative and every component finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CircleDef")]
pub struct Circle {
    center_x: f64,
    center_y: f64,
    radius: f64,
}

#[derive(Deserialize)]
struct CircleDef {
    center_x: f64,
    center_y: f64,
    radius: f64,
}

impl TryFrom<CircleDef> for Circle {
    type Error = ExperimentError;

    fn try_from(def: CircleDef) -> Result<Self> {
        Self::new(def.center_x, def.center_y, def.radius)
    }
}

impl Circle {
    pub fn new(center_x: f64, center_y: f64, radius: f64) -> Result<Self> {
        if !(center_x.is_finite() && center_y.is_finite()) {
            return Err(ExperimentError::invalid_argument(format!(
                "circle center ({}, {}) must be finite",
                center_x, center_y
            )));
        }
        if !radius.is_finite() || radius < 0.0 {
            return Err(ExperimentError::invalid_argument(format!(
                "circle radius {} must be finite and non-negative",
                radius
            )));
        }
        Ok(Self::from_parts(center_x, center_y, radius))
    }

    /// Caller guarantees the invariants; used for the built-in reference geometry.
    pub(crate) fn from_parts(center_x: f64, center_y: f64, radius: f64) -> Self {
        Self {
            center_x,
            center_y,
            radius,
        }
    }

    pub fn center_x(&self) -> f64 {
        self.center_x
    }

    pub fn center_y(&self) -> f64 {
        self.center_y
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

/// Axis-aligned rectangle that points are sampled from.
///
/// Bounds may coincide (zero-area domain) but never cross.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingDomain {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl SamplingDomain {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Result<Self> {
        if ![x_min, x_max, y_min, y_max].iter().all(|v| v.is_finite()) {
            return Err(ExperimentError::invalid_argument(
                "sampling domain bounds must be finite",
            ));
        }
        if x_min > x_max {
            return Err(ExperimentError::invalid_argument(format!(
                "x_min {} is greater than x_max {}",
                x_min, x_max
            )));
        }
        if y_min > y_max {
            return Err(ExperimentError::invalid_argument(format!(
                "y_min {} is greater than y_max {}",
                y_min, y_max
            )));
        }
        Ok(Self::from_parts(x_min, x_max, y_min, y_max))
    }

    pub(crate) fn from_parts(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    pub fn x_min(&self) -> f64 {
        self.x_min
    }

    pub fn x_max(&self) -> f64 {
        self.x_max
    }

    pub fn y_min(&self) -> f64 {
        self.y_min
    }

    pub fn y_max(&self) -> f64 {
        self.y_max
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }
}

/// A sampling domain with a name; the name keys the output files.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RegionDef")]
pub struct Region {
    pub name: String,
    pub domain: SamplingDomain,
}

#[derive(Deserialize)]
struct RegionDef {
    name: String,
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl TryFrom<RegionDef> for Region {
    type Error = ExperimentError;

    fn try_from(def: RegionDef) -> Result<Self> {
        let domain = SamplingDomain::new(def.x_min, def.x_max, def.y_min, def.y_max)?;
        Ok(Self::new(def.name, domain))
    }
}

impl Region {
    pub fn new(name: impl Into<String>, domain: SamplingDomain) -> Self {
        Self {
            name: name.into(),
            domain,
        }
    }

    pub fn file_stem(&self) -> String {
        format!("{}_area_results", self.name)
    }
}

/// Sample-count schedule: `start, start + step, ...` up to and including `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepRange {
    pub start: u64,
    pub end: u64,
    pub step: u64,
    /// Log a progress line every this many sweep steps.
    pub report_every: usize,
}

impl SweepRange {
    /// Empty when `step` is zero or `start > end`, matching [`SweepRange::len`].
    pub fn iter(&self) -> impl Iterator<Item = u64> {
        let bounds = if self.step == 0 { 1..=0 } else { self.start..=self.end };
        let step = usize::try_from(self.step).unwrap_or(usize::MAX).max(1);
        bounds.step_by(step)
    }

    pub fn len(&self) -> usize {
        if self.step == 0 || self.start > self.end {
            return 0;
        }
        ((self.end - self.start) / self.step + 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Points drawn per region over the whole sweep; `None` on overflow.
    pub fn total_samples(&self) -> Option<u64> {
        self.iter().try_fold(0u64, |total, n| total.checked_add(n))
    }
}

impl Default for SweepRange {
    fn default() -> Self {
        Self {
            start: 100,
            end: 100_000,
            step: 500,
            report_every: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Csv,
    Tsv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Json => "json",
        }
    }
}

/// Raw estimator output for one (region, sample count) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub region: String,
    pub sample_count: u64,
    pub approximate_area: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(rename = "N")]
    pub sample_count: u64,
    #[serde(rename = "ApproximateArea")]
    pub approximate_area: f64,
    #[serde(rename = "RelativeError")]
    pub relative_error: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorSummary {
    pub min_relative_error: f64,
    pub max_relative_error: f64,
    pub final_estimate: f64,
}

impl ErrorSummary {
    /// `None` for an empty series.
    pub fn from_records(records: &[ResultRecord]) -> Option<Self> {
        let last = records.last()?;
        let (min, max) = records.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(min, max), r| (min.min(r.relative_error), max.max(r.relative_error)),
        );
        Some(Self {
            min_relative_error: min,
            max_relative_error: max,
            final_estimate: last.approximate_area,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSeries {
    pub region: String,
    pub records: Vec<ResultRecord>,
    pub summary: ErrorSummary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputFile {
    pub name: String,
    pub contents: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ConvergenceReport {
    pub exact_area: f64,
    pub seed: u64,
    pub series: Vec<RegionSeries>,
    pub files: Vec<OutputFile>,
}
