use crate::core::estimator::{estimate_area_parallel, resolve_seed};
use crate::core::reference::relative_error;
use crate::core::{
    ConfigProvider, ConvergenceReport, Estimate, OutputFile, OutputFormat, Pipeline, Storage,
};
use crate::domain::model::{ErrorSummary, RegionSeries, ResultRecord};
use crate::utils::error::{ExperimentError, Result};
use crate::utils::validation::validate_experiment;
use std::io::Write;
use std::sync::Mutex;
use zip::write::{FileOptions, ZipWriter};

/// Seed for one estimator call, derived from the run's master seed.
pub fn stream_seed(master: u64, stream: u64) -> u64 {
    master.wrapping_add(stream.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Sweeps sample counts over every configured region, scores each estimate against the
/// exact area and writes one result table per region.
pub struct ConvergencePipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    master_seed: Mutex<Option<u64>>,
}

impl<S: Storage, C: ConfigProvider> ConvergencePipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            master_seed: Mutex::new(None),
        }
    }

    /// Configured seed, or the one drawn for this run. Stable once resolved.
    pub fn master_seed(&self) -> u64 {
        let mut guard = match self.master_seed.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard.get_or_insert_with(|| resolve_seed(self.config.seed()))
    }

    fn render(&self, series: &RegionSeries, format: OutputFormat, seed: u64) -> Result<Vec<u8>> {
        match format {
            OutputFormat::Csv => write_delimited(&series.records, b','),
            OutputFormat::Tsv => write_delimited(&series.records, b'\t'),
            OutputFormat::Json => {
                let document = serde_json::json!({
                    "experiment": self.config.experiment_name(),
                    "region": series.region,
                    "exact_area": self.config.exact_area(),
                    "seed": seed,
                    "generated_at": chrono::Utc::now().to_rfc3339(),
                    "summary": series.summary,
                    "records": series.records,
                });
                Ok(serde_json::to_vec_pretty(&document)?)
            }
        }
    }
}

fn write_delimited(records: &[ResultRecord], delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    // Header only, even without rows.
    if records.is_empty() {
        writer.write_record(["N", "ApproximateArea", "RelativeError"])?;
    }
    writer
        .into_inner()
        .map_err(|e| ExperimentError::IoError(e.into_error()))
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ConvergencePipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Estimate>> {
        validate_experiment(&self.config)?;

        let circles = self.config.circles().to_vec();
        let regions = self.config.regions().to_vec();
        let sweep = self.config.sweep();
        let workers = self.config.workers();
        let master = self.master_seed();

        tracing::info!(
            "Sampling {} circles over {} regions, {} sweep steps (seed {}, {} workers)",
            circles.len(),
            regions.len(),
            sweep.len(),
            master,
            workers
        );

        let estimates = tokio::task::spawn_blocking(move || -> Result<Vec<Estimate>> {
            let mut estimates = Vec::with_capacity(sweep.len() * regions.len());
            for (step, sample_count) in sweep.iter().enumerate() {
                let mut progress = Vec::with_capacity(regions.len());
                for (index, region) in regions.iter().enumerate() {
                    let stream = (step * regions.len() + index) as u64;
                    let approximate_area = estimate_area_parallel(
                        &circles,
                        &region.domain,
                        sample_count,
                        Some(stream_seed(master, stream)),
                        workers,
                    )?;
                    progress.push(format!("{} = {:.6}", region.name, approximate_area));
                    estimates.push(Estimate {
                        region: region.name.clone(),
                        sample_count,
                        approximate_area,
                    });
                }

                if sweep.report_every > 0 && (step + 1) % sweep.report_every == 0 {
                    tracing::info!("N = {}: {}", sample_count, progress.join(", "));
                } else {
                    tracing::trace!("N = {}: {}", sample_count, progress.join(", "));
                }
            }
            Ok(estimates)
        })
        .await??;

        Ok(estimates)
    }

    async fn transform(&self, data: Vec<Estimate>) -> Result<ConvergenceReport> {
        let exact = self.config.exact_area();
        let seed = self.master_seed();
        let mut series = Vec::with_capacity(self.config.regions().len());
        let mut files = Vec::new();

        for region in self.config.regions() {
            let records: Vec<ResultRecord> = data
                .iter()
                .filter(|estimate| estimate.region == region.name)
                .map(|estimate| ResultRecord {
                    sample_count: estimate.sample_count,
                    approximate_area: estimate.approximate_area,
                    relative_error: relative_error(estimate.approximate_area, exact),
                })
                .collect();

            let summary = ErrorSummary::from_records(&records).ok_or_else(|| {
                ExperimentError::processing(format!("no estimates for region '{}'", region.name))
            })?;

            tracing::info!(
                "Relative error range ({}): {:.6} - {:.6}, final estimate {:.6}",
                region.name,
                summary.min_relative_error,
                summary.max_relative_error,
                summary.final_estimate
            );

            let region_series = RegionSeries {
                region: region.name.clone(),
                records,
                summary,
            };

            for format in self.config.output_formats() {
                files.push(OutputFile {
                    name: format!("{}.{}", region.file_stem(), format.extension()),
                    contents: self.render(&region_series, *format, seed)?,
                });
            }

            series.push(region_series);
        }

        Ok(ConvergenceReport {
            exact_area: exact,
            seed,
            series,
            files,
        })
    }

    async fn load(&self, report: ConvergenceReport) -> Result<String> {
        let base = self.config.output_path().trim_end_matches('/');
        tracing::info!(
            "Writing {} series scored against exact area {:.6} (seed {})",
            report.series.len(),
            report.exact_area,
            report.seed
        );

        if let Some(archive) = self.config.archive_name() {
            tracing::debug!("Creating ZIP archive with {} files", report.files.len());

            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                for file in &report.files {
                    zip.start_file::<_, ()>(file.name.as_str(), FileOptions::default())?;
                    zip.write_all(&file.contents)?;
                }
                let cursor = zip.finish()?;
                cursor.into_inner()
            };

            tracing::debug!("Writing ZIP archive ({} bytes) to storage", zip_data.len());
            self.storage.write_file(archive, &zip_data).await?;
            return Ok(format!("{}/{}", base, archive));
        }

        for file in &report.files {
            tracing::debug!("Writing {} ({} bytes)", file.name, file.contents.len());
            self.storage.write_file(&file.name, &file.contents).await?;
        }

        Ok(base.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reference::{calculate_exact_area, reference_circles, reference_regions};
    use crate::domain::model::{Circle, Region, SweepRange};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex as AsyncMutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<AsyncMutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(AsyncMutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                ExperimentError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        circles: Vec<Circle>,
        regions: Vec<Region>,
        sweep: SweepRange,
        seed: Option<u64>,
        formats: Vec<OutputFormat>,
        archive: Option<String>,
    }

    impl MockConfig {
        fn new() -> Self {
            Self {
                circles: reference_circles(),
                regions: reference_regions(),
                sweep: SweepRange {
                    start: 100,
                    end: 1_100,
                    step: 500,
                    report_every: 1,
                },
                seed: Some(42),
                formats: vec![OutputFormat::Csv],
                archive: None,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn experiment_name(&self) -> &str {
            "mock"
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
            calculate_exact_area()
        }

        fn seed(&self) -> Option<u64> {
            self.seed
        }

        fn workers(&self) -> usize {
            2
        }

        fn output_path(&self) -> &str {
            "test_output"
        }

        fn output_formats(&self) -> &[OutputFormat] {
            &self.formats
        }

        fn archive_name(&self) -> Option<&str> {
            self.archive.as_deref()
        }
    }

    fn estimate(region: &str, sample_count: u64, approximate_area: f64) -> Estimate {
        Estimate {
            region: region.to_string(),
            sample_count,
            approximate_area,
        }
    }

    #[test]
    fn test_stream_seed_spreads_streams() {
        assert_eq!(stream_seed(10, 0), 10);
        assert_ne!(stream_seed(10, 1), stream_seed(10, 2));
        assert_ne!(stream_seed(10, 1), stream_seed(11, 1));
    }

    #[tokio::test]
    async fn test_extract_covers_every_region_and_step() {
        let pipeline = ConvergencePipeline::new(MockStorage::new(), MockConfig::new());

        let estimates = pipeline.extract().await.unwrap();

        assert_eq!(estimates.len(), 3 * 2);
        assert_eq!(estimates[0].region, "wide");
        assert_eq!(estimates[0].sample_count, 100);
        assert_eq!(estimates[1].region, "narrow");
        assert_eq!(estimates[5].sample_count, 1_100);
        assert!(estimates
            .iter()
            .all(|e| e.approximate_area >= 0.0 && e.approximate_area <= 4.0));
    }

    #[tokio::test]
    async fn test_extract_rejects_zero_step_sweep() {
        let mut config = MockConfig::new();
        config.sweep.step = 0;
        let pipeline = ConvergencePipeline::new(MockStorage::new(), config);

        let err = pipeline.extract().await.unwrap_err();

        assert!(matches!(
            err,
            ExperimentError::InvalidConfigValueError { ref field, .. } if field == "sweep.step"
        ));
    }

    #[tokio::test]
    async fn test_extract_rejects_empty_circle_set() {
        let mut config = MockConfig::new();
        config.circles.clear();
        let pipeline = ConvergencePipeline::new(MockStorage::new(), config);

        let err = pipeline.extract().await.unwrap_err();

        assert!(matches!(err, ExperimentError::MissingConfigError { .. }));
    }

    #[tokio::test]
    async fn test_extract_is_reproducible_with_seed() {
        let first = ConvergencePipeline::new(MockStorage::new(), MockConfig::new())
            .extract()
            .await
            .unwrap();
        let second = ConvergencePipeline::new(MockStorage::new(), MockConfig::new())
            .extract()
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_random_seed_is_stable_within_a_run() {
        let mut config = MockConfig::new();
        config.seed = None;
        let pipeline = ConvergencePipeline::new(MockStorage::new(), config);
        assert_eq!(pipeline.master_seed(), pipeline.master_seed());
    }

    #[tokio::test]
    async fn test_transform_computes_relative_error() {
        let exact = calculate_exact_area();
        let pipeline = ConvergencePipeline::new(MockStorage::new(), MockConfig::new());

        let data = vec![
            estimate("wide", 100, exact * 1.5),
            estimate("narrow", 100, exact * 0.5),
            estimate("wide", 600, exact),
            estimate("narrow", 600, exact * 0.9),
        ];

        let report = pipeline.transform(data).await.unwrap();

        assert_eq!(report.seed, 42);
        assert_eq!(report.series.len(), 2);
        let wide = &report.series[0];
        assert_eq!(wide.region, "wide");
        assert_eq!(wide.records.len(), 2);
        assert!((wide.records[0].relative_error - 0.5).abs() < 1e-12);
        assert_eq!(wide.records[1].relative_error, 0.0);
        assert_eq!(wide.summary.max_relative_error, wide.records[0].relative_error);
        assert_eq!(wide.summary.final_estimate, exact);

        let narrow = &report.series[1];
        assert!((narrow.summary.min_relative_error - 0.1).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_transform_renders_csv_per_region() {
        let pipeline = ConvergencePipeline::new(MockStorage::new(), MockConfig::new());
        let data = vec![estimate("wide", 100, 0.25), estimate("narrow", 100, 0.3)];

        let report = pipeline.transform(data).await.unwrap();

        let names: Vec<&str> = report.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["wide_area_results.csv", "narrow_area_results.csv"]);

        let csv = String::from_utf8(report.files[0].contents.clone()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "N,ApproximateArea,RelativeError");
        assert!(lines[1].starts_with("100,0.25,"));
    }

    #[tokio::test]
    async fn test_transform_renders_tsv_and_json() {
        let mut config = MockConfig::new();
        config.formats = vec![OutputFormat::Tsv, OutputFormat::Json];
        let pipeline = ConvergencePipeline::new(MockStorage::new(), config);
        let data = vec![estimate("wide", 100, 0.25), estimate("narrow", 100, 0.3)];

        let report = pipeline.transform(data).await.unwrap();

        assert_eq!(report.files.len(), 4);
        assert_eq!(report.files[0].name, "wide_area_results.tsv");
        let tsv = String::from_utf8(report.files[0].contents.clone()).unwrap();
        assert!(tsv.starts_with("N\tApproximateArea\tRelativeError"));

        assert_eq!(report.files[1].name, "wide_area_results.json");
        let json: serde_json::Value = serde_json::from_slice(&report.files[1].contents).unwrap();
        assert_eq!(json["experiment"], "mock");
        assert_eq!(json["seed"], 42);
        assert_eq!(json["records"][0]["N"], 100);
        assert_eq!(json["records"][0]["ApproximateArea"], 0.25);
    }

    #[tokio::test]
    async fn test_transform_missing_region_is_an_error() {
        let pipeline = ConvergencePipeline::new(MockStorage::new(), MockConfig::new());
        let data = vec![estimate("wide", 100, 0.25)];

        let err = pipeline.transform(data).await.unwrap_err();

        assert!(matches!(err, ExperimentError::ProcessingError { .. }));
    }

    #[tokio::test]
    async fn test_load_writes_each_file() {
        let storage = MockStorage::new();
        let pipeline = ConvergencePipeline::new(storage.clone(), MockConfig::new());
        let report = ConvergenceReport {
            exact_area: 0.28,
            seed: 1,
            series: vec![],
            files: vec![
                OutputFile {
                    name: "wide_area_results.csv".to_string(),
                    contents: b"N,ApproximateArea,RelativeError\n".to_vec(),
                },
                OutputFile {
                    name: "narrow_area_results.csv".to_string(),
                    contents: b"N,ApproximateArea,RelativeError\n".to_vec(),
                },
            ],
        };

        let output = pipeline.load(report).await.unwrap();

        assert_eq!(output, "test_output");
        assert!(storage.get_file("wide_area_results.csv").await.is_some());
        assert!(storage.get_file("narrow_area_results.csv").await.is_some());
    }

    #[tokio::test]
    async fn test_load_bundles_archive() {
        let storage = MockStorage::new();
        let mut config = MockConfig::new();
        config.archive = Some("results.zip".to_string());
        let pipeline = ConvergencePipeline::new(storage.clone(), config);
        let report = ConvergenceReport {
            exact_area: 0.28,
            seed: 1,
            series: vec![],
            files: vec![
                OutputFile {
                    name: "wide_area_results.csv".to_string(),
                    contents: b"N,ApproximateArea,RelativeError\n100,0.3,0.05\n".to_vec(),
                },
                OutputFile {
                    name: "narrow_area_results.csv".to_string(),
                    contents: b"N,ApproximateArea,RelativeError\n".to_vec(),
                },
            ],
        };

        let output = pipeline.load(report).await.unwrap();

        assert_eq!(output, "test_output/results.zip");
        assert!(storage.get_file("wide_area_results.csv").await.is_none());

        let zip_bytes = storage.read_file("results.zip").await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();
        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["narrow_area_results.csv", "wide_area_results.csv"]);

        let mut content = String::new();
        std::io::Read::read_to_string(
            &mut archive.by_name("wide_area_results.csv").unwrap(),
            &mut content,
        )
        .unwrap();
        assert!(content.contains("100,0.3,0.05"));
    }
}
