use circle_mc::core::ConfigProvider;
use circle_mc::utils::{logger, validation::Validate};
use circle_mc::{CliConfig, ConvergencePipeline, ExperimentEngine, LocalStorage};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    logger::init_logger(config.verbose, config.json_logs);

    tracing::info!("Starting circle-mc");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    let exact_area = config.exact_area();
    println!("Exact area: {:.6}", exact_area);

    if config.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let monitor_enabled = config.monitor;
    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = ConvergencePipeline::new(storage, config);
    let engine = ExperimentEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            println!(
                "Results saved to {} (seed {})",
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
