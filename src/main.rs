use clap::Parser;
use risk_burndown::core::etl::RunOutcome;
use risk_burndown::utils::error::BurndownError;
use risk_burndown::utils::{logger, validation::Validate};
use risk_burndown::{BurndownEngine, BurndownPipeline, CliConfig, LocalStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting risk-burndown CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = BurndownPipeline::new(LocalStorage::current_dir(), config);
    let engine = BurndownEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(outcome) => print_outcome(&outcome),
        Err(e) => exit_with(e),
    }

    Ok(())
}

fn print_outcome(outcome: &RunOutcome) {
    tracing::info!("✅ Burndown computed successfully!");
    println!("✅ Burndown computed successfully!");
    println!("📁 Output saved to: {}", outcome.output_path);
    println!();
    println!("📊 Summary");
    println!("  🟢 Total Risks: {}", outcome.summary.total);
    println!("  🔴 Currently Open Risks: {}", outcome.summary.open);
    println!("  ✅ Closed Risks: {}", outcome.summary.closed);
    println!(
        "  📅 Average Risks Opened Per Month (RPM): {:.2}",
        outcome.average_monthly_opened
    );
    println!(
        "  📈 {} daily points, {} monthly points",
        outcome.daily_points, outcome.monthly_points
    );
    if outcome.data_quality_issues > 0 {
        println!(
            "  ⚠️ {} data-quality issues (see burndown_report.json)",
            outcome.data_quality_issues
        );
    }
}

fn exit_with(e: BurndownError) -> ! {
    tracing::error!(
        "❌ Burndown failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    std::process::exit(e.severity().exit_code());
}
