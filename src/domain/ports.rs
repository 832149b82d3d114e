use crate::domain::model::{Circle, ConvergenceReport, Estimate, OutputFormat, Region, SweepRange};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Experiment parameters handed to the driver.
pub trait ConfigProvider: Send + Sync {
    fn experiment_name(&self) -> &str;
    fn circles(&self) -> &[Circle];
    fn regions(&self) -> &[Region];
    fn sweep(&self) -> SweepRange;
    fn exact_area(&self) -> f64;
    fn seed(&self) -> Option<u64>;
    fn workers(&self) -> usize;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[OutputFormat];
    /// Bundle every output file into this zip archive instead of writing them loose.
    fn archive_name(&self) -> Option<&str>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Estimate>>;
    async fn transform(&self, data: Vec<Estimate>) -> Result<ConvergenceReport>;
    async fn load(&self, report: ConvergenceReport) -> Result<String>;
}
