use clap::Parser;
use starmap::utils::monitor::SystemMonitor;
use starmap::utils::{logger, validation::Validate};
use starmap::{
    CliArgs, FileChartSink, PlottersRenderer, StarChartGenerator, StarmapConfig, StarmapEngine,
    StarmapError,
};

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 先讀取配置，才能知道日誌格式
    let config = args.load_config();
    let log_json = args.log_json
        || config
            .as_ref()
            .map(|c| c.monitoring.log_json)
            .unwrap_or(false);

    // 初始化日誌
    if log_json {
        logger::init_json_logger(args.verbose)?;
    } else {
        logger::init_cli_logger(args.verbose)?;
    }

    tracing::info!("Starting starmap CLI");
    if let Err(e) = run(&args, config) {
        // 記錄詳細錯誤信息
        tracing::error!("❌ {} failed: {} (Category: {:?})", e.kind(), e, e.category());
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        // 輸出用戶友好的錯誤信息
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }

    Ok(())
}

fn run(args: &CliArgs, config: Result<StarmapConfig, StarmapError>) -> Result<(), StarmapError> {
    let config = config?;
    if args.verbose {
        tracing::debug!("Config: {:?}", config);
    }

    // 驗證配置
    config.validate()?;
    let observer = config.observer()?;

    if args.dry_run {
        tracing::info!("🧪 Dry run, nothing will be rendered");
        println!("✅ Configuration is valid");
        println!("   {}", config.summary());
        return Ok(());
    }

    let monitor = SystemMonitor::new(config.monitoring.enabled);
    if monitor.is_enabled() {
        tracing::info!("🔍 System monitoring enabled");
    }

    let renderer = PlottersRenderer::new(config.chart_style()?, config.output_format()?);
    let generator = StarChartGenerator::new(config.chart_options(), renderer);
    let mut sink = FileChartSink::new(&config.output.path);
    if let Some(points) = &config.output.points_path {
        sink = sink.with_points(points);
    }

    let mut engine =
        StarmapEngine::new(config.catalog_source(), generator, sink).with_monitor(monitor);
    let summary = engine.run(&observer)?;

    println!("✅ Star chart generated successfully!");
    println!(
        "🔭 {} objects, {} constellation segments, {}x{} px",
        summary.visible_objects, summary.segments, summary.width, summary.height
    );
    println!("📁 Output saved to: {}", summary.output_path);
    Ok(())
}
