use clap::Parser;
use sku_pricer::core::ConfigProvider;
use sku_pricer::utils::error::ErrorSeverity;
use sku_pricer::utils::{logger, validation::Validate};
use sku_pricer::{CliConfig, CsvPricingPipeline, LocalStorage, PricingEngine, TomlConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 載入 TOML 配置並套用命令列覆蓋
    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    if config.json_logs() {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting {}", config.pipeline_name());
    if cli.verbose {
        tracing::debug!("CLI args: {:?}", cli);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config);

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        return Ok(());
    }

    let monitor_enabled = config.monitoring_enabled();
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(".");
    let pipeline = CsvPricingPipeline::new(storage, config);
    let engine = PricingEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            println!("✅ Pricing run completed successfully!");
            println!("📁 Saved: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Pricing run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig) {
    let options = config.optimizer_options();
    let load = config.load_options();

    println!("📋 Configuration Summary:");
    println!("  SKU daily:   {}", config.sku_daily_path());
    println!("  Elasticity:  {}", config.model_elasticity_path());
    println!("  Costs:       {}", config.sku_costs_path());
    println!(
        "  Bounds:      [{:.2}, {:.2}] x current price",
        options.price_bounds_pct.0, options.price_bounds_pct.1
    );
    println!("  Grid points: {}", options.n_grid);
    match options.active_ending() {
        Some(ending) => println!(
            "  Ending:      {:.2} ({})",
            ending, options.price_ending_policy
        ),
        None => println!("  Ending:      disabled"),
    }
    println!("  Min margin:  {:.2}", options.min_margin_abs);
    println!("  |beta| > 1:  {}", options.require_elasticity_gt_one);
    println!(
        "  Output:      {}/{}",
        config.output_path(),
        load.filename
    );
    if let Some(bundle) = &load.bundle_filename {
        println!("  Bundle:      {}", bundle);
    }
    println!();
}
