use crate::core::reference::{calculate_exact_area, reference_circles, reference_regions};
use crate::core::{Circle, ConfigProvider, OutputFormat, Region, SweepRange};
use crate::utils::error::{ExperimentError, Result};
use crate::utils::validation::{validate_experiment, validate_non_empty_string, Validate};
use serde::Deserialize;
use std::path::Path;

/// Experiment described by a TOML file.
///
/// `circles` and `regions` default to the three-circle reference experiment; a custom circle
/// set must come with its own `experiment.exact_area`.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    pub experiment: ExperimentInfo,
    #[serde(default = "reference_circles")]
    pub circles: Vec<Circle>,
    #[serde(default = "reference_regions")]
    pub regions: Vec<Region>,
    #[serde(default)]
    pub sweep: SweepRange,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExperimentInfo {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
    pub seed: Option<u64>,
    pub workers: Option<usize>,
    pub exact_area: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    #[serde(default = "LoadConfig::default_formats")]
    pub output_formats: Vec<OutputFormat>,
    pub compression: Option<CompressionConfig>,
}

impl LoadConfig {
    fn default_formats() -> Vec<OutputFormat> {
        vec![OutputFormat::Csv]
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ExperimentError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ExperimentError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR}` with the environment value; unknown variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| {
            ExperimentError::ConfigValidationError {
                field: "environment".to_string(),
                message: e.to_string(),
            }
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("experiment.name", &self.experiment.name)?;

        if self.experiment.exact_area.is_none() && self.circles != reference_circles() {
            return Err(ExperimentError::MissingConfigError {
                field: "experiment.exact_area".to_string(),
            });
        }

        if let Some(compression) = &self.load.compression {
            if compression.enabled {
                validate_non_empty_string("load.compression.filename", &compression.filename)?;
            }
        }

        validate_experiment(self)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn experiment_name(&self) -> &str {
        &self.experiment.name
    }

    fn circles(&self) -> &[Circle] {
        &self.circles
    }

    fn regions(&self) -> &[Region] {
        &self.regions
    }

    fn sweep(&self) -> SweepRange {
        self.sweep
    }

    fn exact_area(&self) -> f64 {
        self.experiment
            .exact_area
            .unwrap_or_else(calculate_exact_area)
    }

    fn seed(&self) -> Option<u64> {
        self.experiment.seed
    }

    fn workers(&self) -> usize {
        self.experiment.workers.unwrap_or(1)
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_formats(&self) -> &[OutputFormat] {
        &self.load.output_formats
    }

    fn archive_name(&self) -> Option<&str> {
        self.load
            .compression
            .as_ref()
            .filter(|c| c.enabled)
            .map(|c| c.filename.as_str())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
