use clap::Parser;
use depthsync::cli::{Cli, Commands};
use depthsync::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration, falling back to defaults when no file exists
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::default()
    });

    // Initialize telemetry
    let _guard = depthsync::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Watch(args) => {
            tracing::info!(symbol = %args.symbol, "Starting book watch");
            args.execute(config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Feed: {} (depth {})", config.feed.ws_url, config.feed.depth);
            println!(
                "  Sync: backoff {:?}ms, max {} reconnects, gaps {}",
                config.sync.backoff_ms,
                config.sync.max_reconnect_attempts,
                if config.sync.detect_gaps { "detected" } else { "ignored" }
            );
            println!(
                "  Telemetry: level {}, metrics {}",
                config.telemetry.log_level,
                config
                    .telemetry
                    .metrics_port
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "disabled".to_string())
            );
        }
    }

    Ok(())
}
