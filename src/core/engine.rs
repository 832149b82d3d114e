use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct ExperimentEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> ExperimentEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub fn monitor(&self) -> &SystemMonitor {
        &self.monitor
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting convergence experiment");
        self.monitor.log_phase("Start");

        // Extract
        tracing::info!("Sampling estimates...");
        let estimates = self.pipeline.extract().await?;
        let drawn = estimates
            .iter()
            .fold(0u64, |total, e| total.saturating_add(e.sample_count));
        self.monitor.record_samples(drawn);
        tracing::info!("Collected {} estimates from {} points", estimates.len(), drawn);
        self.monitor.log_phase("Extract");

        // Transform
        tracing::info!("Scoring estimates against the exact area...");
        let report = self.pipeline.transform(estimates).await?;
        tracing::info!(
            "Prepared {} output files for {} regions",
            report.files.len(),
            report.series.len()
        );
        self.monitor.log_phase("Transform");

        // Load
        tracing::info!("Writing results...");
        let output_path = self.pipeline.load(report).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_phase("Load");
        self.monitor.log_summary();

        Ok(output_path)
    }
}
