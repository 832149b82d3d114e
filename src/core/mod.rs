pub mod engine;
pub mod estimator;
pub mod pipeline;
pub mod predicate;
pub mod reference;

pub use crate::domain::model::{
    Circle, ConvergenceReport, Estimate, OutputFile, OutputFormat, Region, SamplingDomain,
    SweepRange,
};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
