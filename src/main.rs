//! Gateway Probe - Main CLI Application
//!
//! Collects gateway health every interval and forwards it to DogStatsD.

use clap::Parser;
use gateway_probe::{
    cli::Cli,
    collector::CycleDriver,
    config::{load_config, EnvManager},
    defaults,
    emitter::{LogEmitter, MetricsEmitter, StatsdEmitter},
    error::{AppError, Result},
    logging::LoggerFactory,
    models::Config,
    output::render_report,
    PKG_NAME, VERSION,
};
use std::process;
use std::sync::Arc;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(1);
    }));

    let cli = Cli::parse();

    if cli.env_help {
        println!("{}", EnvManager::display_env_help());
        return;
    }

    let use_color = !cli.no_color;
    if let Err(e) = run_application(cli).await {
        eprintln!("{}", e.format_for_console(use_color));
        print_error_suggestions(&e);
        process::exit(e.exit_code());
    }
}

async fn run_application(cli: Cli) -> Result<()> {
    let once = cli.once;
    let dry_run = cli.dry_run;
    let config = load_config(cli)?;

    let factory = LoggerFactory::new(config.clone());
    let logger = factory.create_logger("MAIN").await;
    logger
        .info(&format!("{} v{} starting", PKG_NAME, VERSION))
        .field("gateway", &config.gateway_ip)
        .field("statsd", format!("{}:{}", config.statsd_host, config.statsd_port))
        .field("interval_secs", config.collection_interval_secs)
        .field("dry_run", dry_run)
        .field("build", option_env!("GIT_COMMIT").unwrap_or("unknown"))
        .field("built_at", env!("BUILD_TIME"))
        .log()
        .await;

    let emitter = create_emitter(&config, &factory, dry_run).await?;
    let mut driver = CycleDriver::builder(&config, emitter)
        .logger(factory.create_collector_logger().await)
        .build()?;

    if once {
        let report = driver.run_cycle().await?;
        println!("{}", render_report(&report, config.enable_color));
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let signal_logger = logger.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_logger.info("Shutdown requested").log().await;
            let _ = shutdown_tx.send(true);
        }
        // Keep the sender alive so a failed signal hook does not stop the loop
        std::future::pending::<()>().await;
    });

    driver
        .run(config.collection_interval(), defaults::FAILURE_BACKOFF, shutdown_rx)
        .await;
    Ok(())
}

async fn create_emitter(config: &Config, factory: &LoggerFactory, dry_run: bool) -> Result<Arc<dyn MetricsEmitter>> {
    if dry_run {
        let logger = factory.create_logger("EMITTER").await;
        return Ok(Arc::new(LogEmitter::new(logger, config.metric_prefix.clone())));
    }
    let emitter = StatsdEmitter::from_config(config).await?;
    Ok(Arc::new(emitter))
}

fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) | AppError::Validation(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Check your .env file format");
            eprintln!("  - Run with --env-help to list supported variables");
        }
        AppError::Emit(_) | AppError::Io(_) => {
            eprintln!();
            eprintln!("Emitter troubleshooting:");
            eprintln!("  - Verify the DogStatsD agent address (STATSD_HOST, STATSD_PORT)");
            eprintln!("  - Use --dry-run to log metrics instead of sending them");
        }
        _ => {}
    }
}
