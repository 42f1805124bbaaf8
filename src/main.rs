use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::{error, info};
use std::sync::Arc;

use liveframe::player::PlayerController;
use liveframe::session::mock::{MockEngineFactory, MockMediaSurface};
use liveframe::session::AdaptiveEngineFactory;
use liveframe::session::MediaSurface;
use liveframe::source::{classify, StreamKind};
use liveframe::utils::{format_duration, Config};

/// Liveframe - live-video playback core (headless harness)
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Stream URL to classify and load
    #[arg(value_name = "URL")]
    url: String,

    /// Set initial volume (0-100)
    #[arg(short, long, value_name = "VOLUME", default_value = "100")]
    volume: u8,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    info!("Starting Liveframe v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load().unwrap_or_else(|e| {
        error!("Failed to load config, using defaults: {}", e);
        Config::default()
    });
    config.player.default_volume = (args.volume.min(100) as f32) / 100.0;

    let kind = classify(&args.url);
    info!("Classified {} as {}", args.url, kind.label());
    if kind == StreamKind::RawNetwork {
        error!("Raw network streams must go through the conversion service first");
    }

    // Headless harness: mock surface and engine stand in for the
    // embedding environment so the core can be exercised end to end.
    let (surface, media_events) = MockMediaSurface::new();
    let factory = Arc::new(MockEngineFactory::new());

    let mut controller = PlayerController::new(
        Arc::clone(&surface) as Arc<dyn MediaSurface>,
        media_events,
        factory as Arc<dyn AdaptiveEngineFactory>,
        config,
    );

    controller.on_state_change(|snapshot| {
        info!(
            "phase={:?} t={} live={} edge={} error={:?}",
            snapshot.phase,
            format_duration(snapshot.current_time),
            snapshot.is_live,
            snapshot.is_at_live_edge,
            snapshot.error.as_ref().map(|e| &e.message)
        );
    });

    controller.load_source(&args.url);

    let shutdown = controller.command_sender();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown.send(liveframe::player::PlayerCommand::Shutdown);
        }
    });

    controller.run().await;
    info!("Shutting down");
    Ok(())
}
