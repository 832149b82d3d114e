use circle_mc::config::toml_config::TomlConfig;
use circle_mc::core::ConfigProvider;
use circle_mc::utils::{logger, validation::Validate};
use circle_mc::{ConvergencePipeline, ExperimentEngine, LocalStorage};
use clap::Parser;

#[derive(Parser)]
#[command(name = "toml-experiment")]
#[command(about = "Monte Carlo area experiment driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "experiment.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the master seed from config
    #[arg(long)]
    seed: Option<u64>,

    /// Dry run - show the sampling plan without executing it
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    logger::init_logger(args.verbose, args.json_logs);

    tracing::info!("🚀 Starting TOML-based experiment");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Some(seed) = args.seed {
        config.experiment.seed = Some(seed);
        tracing::info!("🔧 Seed overridden to: {}", seed);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No sampling will occur");
        perform_dry_run(&config);
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = ConvergencePipeline::new(storage, config);
    let engine = ExperimentEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            println!("✅ Experiment completed successfully!");
            println!(
                "📁 Output saved to: {} (seed {})",
                output_path,
                engine.pipeline().master_seed()
            );
        }
        Err(e) => {
            tracing::error!(
                "❌ Experiment failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!(
        "  Experiment: {} v{}",
        config.experiment.name,
        config.experiment.version.as_deref().unwrap_or("0")
    );
    if let Some(description) = &config.experiment.description {
        println!("  Description: {}", description);
    }
    println!("  Circles: {}", config.circles().len());
    println!("  Regions: {}", config.regions().len());
    println!("  Exact area: {:.6}", config.exact_area());
    println!("  Output: {}", config.output_path());

    let formats: Vec<&str> = config
        .output_formats()
        .iter()
        .map(|f| f.extension())
        .collect();
    println!("  Formats: {}", formats.join(", "));

    match config.seed() {
        Some(seed) => println!("  Seed: {}", seed),
        None => println!("  Seed: random"),
    }
    println!("  Workers: {}", config.workers());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("⭕ Circles:");
    for circle in config.circles() {
        println!(
            "  center ({}, {}), radius {:.6}",
            circle.center_x(),
            circle.center_y(),
            circle.radius()
        );
    }

    println!();
    println!("🔲 Sampling Regions:");
    for region in config.regions() {
        let d = &region.domain;
        println!(
            "  {}: [{}, {}] x [{}, {}] (area {}) -> {}.*",
            region.name,
            d.x_min(),
            d.x_max(),
            d.y_min(),
            d.y_max(),
            d.area(),
            region.file_stem()
        );
    }

    let sweep = config.sweep();
    let total_points = sweep
        .total_samples()
        .and_then(|per_region| per_region.checked_mul(config.regions().len() as u64));
    println!();
    println!("⚙️ Sweep:");
    println!(
        "  N from {} to {} step {} ({} steps)",
        sweep.start,
        sweep.end,
        sweep.step,
        sweep.len()
    );
    match total_points {
        Some(total) => println!("  Total sampled points: {}", total),
        None => println!("  Total sampled points: more than {}", u64::MAX),
    }

    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    if let Some(archive) = config.archive_name() {
        println!("  Compression: {} (ZIP)", archive);
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
