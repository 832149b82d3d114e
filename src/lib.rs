pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::{cli::LocalStorage, toml_config::TomlConfig};

pub use crate::core::estimator::{estimate_area, estimate_area_parallel, estimate_area_with_rng};
pub use crate::core::predicate::{point_in_circle, point_in_intersection};
pub use crate::core::reference::{calculate_exact_area, relative_error};
pub use crate::core::{engine::ExperimentEngine, pipeline::ConvergencePipeline};
pub use crate::domain::model::{Circle, Region, ResultRecord, SamplingDomain, SweepRange};
pub use crate::utils::error::{ExperimentError, Result};
