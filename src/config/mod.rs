pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli_config::CliConfig;

#[cfg(feature = "cli")]
mod cli_config {
    use crate::core::reference::{calculate_exact_area, reference_circles, reference_regions};
    use crate::core::{Circle, ConfigProvider, OutputFormat, Region, SweepRange};
    use crate::utils::error::Result;
    use crate::utils::validation::{validate_experiment, Validate};
    use clap::Parser;

    /// Runs the three-circle reference experiment over the wide and narrow regions.
    #[derive(Debug, Clone, Parser)]
    #[command(name = "circle-mc")]
    #[command(about = "Monte Carlo convergence study of a three-circle intersection area")]
    pub struct CliConfig {
        #[arg(long, default_value = "./output")]
        pub output_path: String,

        /// Master seed; omit for a fresh random seed (logged so the run can be replayed)
        #[arg(long)]
        pub seed: Option<u64>,

        #[arg(long, default_value = "100")]
        pub start: u64,

        #[arg(long, default_value = "100000")]
        pub end: u64,

        #[arg(long, default_value = "500")]
        pub step: u64,

        /// Log a progress line every N sweep steps (0 disables)
        #[arg(long, default_value = "20")]
        pub report_every: usize,

        /// Threads per estimate
        #[arg(long, default_value = "1")]
        pub workers: usize,

        #[arg(long, value_enum, value_delimiter = ',', default_value = "csv")]
        pub output_formats: Vec<OutputFormat>,

        /// Bundle all output files into this zip archive
        #[arg(long)]
        pub archive: Option<String>,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Emit logs as JSON")]
        pub json_logs: bool,

        #[arg(long, help = "Log CPU and memory usage per phase")]
        pub monitor: bool,

        #[arg(skip = reference_circles())]
        pub circles: Vec<Circle>,

        #[arg(skip = reference_regions())]
        pub regions: Vec<Region>,
    }

    impl ConfigProvider for CliConfig {
        fn experiment_name(&self) -> &str {
            "three-circle-reference"
        }

        fn circles(&self) -> &[Circle] {
            &self.circles
        }

        fn regions(&self) -> &[Region] {
            &self.regions
        }

        fn sweep(&self) -> SweepRange {
            SweepRange {
                start: self.start,
                end: self.end,
                step: self.step,
                report_every: self.report_every,
            }
        }

        fn exact_area(&self) -> f64 {
            calculate_exact_area()
        }

        fn seed(&self) -> Option<u64> {
            self.seed
        }

        fn workers(&self) -> usize {
            self.workers
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn output_formats(&self) -> &[OutputFormat] {
            &self.output_formats
        }

        fn archive_name(&self) -> Option<&str> {
            self.archive.as_deref()
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_experiment(self)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_defaults_match_reference_experiment() {
            let config = CliConfig::parse_from(["circle-mc"]);

            assert_eq!(config.sweep(), SweepRange::default());
            assert_eq!(config.circles().len(), 3);
            assert_eq!(config.regions().len(), 2);
            assert_eq!(config.output_formats(), &[OutputFormat::Csv]);
            assert_eq!(config.workers(), 1);
            assert!(config.seed().is_none());
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_parse_overrides() {
            let config = CliConfig::parse_from([
                "circle-mc",
                "--seed",
                "42",
                "--step",
                "1000",
                "--workers",
                "4",
                "--output-formats",
                "csv,json",
                "--archive",
                "results.zip",
            ]);

            assert_eq!(config.seed(), Some(42));
            assert_eq!(config.sweep().step, 1000);
            assert_eq!(config.workers(), 4);
            assert_eq!(
                config.output_formats(),
                &[OutputFormat::Csv, OutputFormat::Json]
            );
            assert_eq!(config.archive_name(), Some("results.zip"));
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_invalid_sweep_rejected() {
            let config = CliConfig::parse_from(["circle-mc", "--start", "0"]);
            assert!(config.validate().is_err());

            let config = CliConfig::parse_from(["circle-mc", "--start", "500", "--end", "100"]);
            assert!(config.validate().is_err());

            let config = CliConfig::parse_from(["circle-mc", "--workers", "0"]);
            assert!(config.validate().is_err());

            let config = CliConfig::parse_from(["circle-mc", "--archive", "results.tar"]);
            assert!(config.validate().is_err());
        }
    }
}
