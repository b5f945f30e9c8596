use clap::Parser;
use risk_burndown::config::toml_config::{LogFormat, TomlConfig};
use risk_burndown::core::ConfigProvider;
use risk_burndown::utils::{logger, validation::Validate};
use risk_burndown::{BurndownEngine, BurndownPipeline, LocalStorage};

#[derive(Parser)]
#[command(name = "toml-burndown")]
#[command(about = "Risk burndown with TOML configuration support")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "burndown.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override input file from config
    #[arg(long)]
    input: Option<String>,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    match config.log_format() {
        LogFormat::Compact => logger::init_cli_logger(args.verbose),
        LogFormat::Json => logger::init_json_logger(args.verbose),
    }

    tracing::info!("🚀 Starting TOML-based risk burndown");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(input) = args.input.clone() {
        tracing::info!("🔧 Input file overridden to: {}", input);
        config.source.input_file = input;
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&config);
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = BurndownPipeline::new(LocalStorage::current_dir(), config);
    let engine = BurndownEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(outcome) => {
            tracing::info!("✅ Burndown computed successfully!");
            println!("✅ Burndown computed successfully!");
            println!("📁 Output saved to: {}", outcome.output_path);
            println!(
                "📊 Total: {}, Open: {}, Closed: {}, RPM: {:.2}",
                outcome.summary.total,
                outcome.summary.open,
                outcome.summary.closed,
                outcome.average_monthly_opened
            );
        }
        Err(e) => {
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
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!(
        "  Report: {} v{}",
        config.report.name,
        config.report.version.as_deref().unwrap_or("-")
    );
    println!("  Input: {}", config.input_file());
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));

    if let Some(archive) = config.archive_name() {
        println!("  Archive: {}", archive);
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📄 Input Columns:");
    let columns = config.columns();
    println!("  Open date: {}", columns.open_date);
    println!("  Expected close date: {}", columns.expected_close_date);
    println!("  Actual close date: {}", columns.actual_close_date);
    println!("  Date format: DD-MMM-YY (e.g. 05-Mar-24)");

    println!();
    println!("💾 Planned Outputs:");
    for format in config.output_formats() {
        match format.as_str() {
            "json" => println!("  burndown_report.json"),
            ext => {
                println!("  daily_burndown.{}", ext);
                println!("  monthly_metrics.{}", ext);
            }
        }
    }
    if let Some(archive) = config.archive_name() {
        println!("  (bundled into {})", archive);
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
