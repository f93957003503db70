use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use kagami_capture::{
    Addressing, CaptureCoordinateMapper, CaptureService, CaptureSettings, Capturer, StillImageCapture, desktop_bounds,
};
use kagami_config::Config;
use kagami_translator::{GeminiBackend, TranslationPipeline};
use tokio::signal;

use crate::controller::AppController;
use crate::overlay::Overlay;
use crate::topmost::HeadlessWindow;
use crate::view::LogRenderer;

pub mod console;
pub mod controller;
pub mod logging;
pub mod overlay;
pub mod status;
pub mod topmost;
pub mod view;


/// Screen-region translation overlay
#[derive(Parser, Debug)]
#[command(name = "kagami", version, about)]
struct Args {
    /// Use a PNG file as the desktop instead of grabbing the screen
    #[arg(long, value_name = "PNG")]
    still: Option<PathBuf>,

    /// Map capture rectangles into one physical display
    #[arg(long)]
    primary_only: bool,

    /// Display used with --primary-only
    #[arg(long, value_name = "INDEX")]
    monitor_index: Option<usize>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Default to debug logging when RUST_LOG is unset
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    logging::init(args.log_json, args.debug);

    let mut config = Config::new();
    if args.primary_only {
        config.capture.primary_only = true;
    }
    if let Some(index) = args.monitor_index {
        config.capture.monitor_index = index;
    }

    let service = capture_service(&args)?;
    let addressing = if config.capture.primary_only {
        Addressing::PrimaryOnly {
            monitor_index: config.capture.monitor_index,
        }
    } else {
        Addressing::VirtualDesktop
    };
    let displays = service.displays()?;
    let desktop = desktop_bounds(&displays, addressing)?;
    tracing::info!("Desktop {:?} across {} display(s)", desktop, displays.len());

    let capturer = Capturer::new(
        service,
        CaptureCoordinateMapper::new(addressing),
        CaptureSettings::from_config(&config.capture, &config.ui),
    );

    let pipeline = match GeminiBackend::new(&config.translator) {
        Ok(backend) => Some(TranslationPipeline::new(
            Arc::new(backend),
            &config.translator,
            &config.recovery,
        )),
        Err(e) => {
            tracing::warn!("Translation disabled: {}", e);
            None
        }
    };

    let controller = AppController::new();
    let overlay = Overlay::new(
        &config,
        desktop,
        capturer,
        pipeline,
        controller.report_sender(),
        Box::new(HeadlessWindow),
        Box::new(LogRenderer::default()),
    );

    let mut tasks = controller.spawn_tasks(overlay, Duration::from_millis(config.delta_time));

    tokio::select! {
        result = signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!("failed to listen for ctrl+c: {e}");
            }
            tracing::info!("Shutdown requested");
        }
        Some(result) = tasks.join_next() => {
            match result {
                Ok(Ok(())) => tracing::info!("task finished"),
                Ok(Err(e)) => tracing::error!("task exited: {e}"),
                Err(e) => tracing::error!("task panicked: {e}"),
            }
        }
    }

    controller.shutdown();
    tasks.abort_all();
    while let Some(result) = tasks.join_next().await {
        if let Ok(Err(e)) = result {
            tracing::warn!("task exited during shutdown: {e}");
        }
    }
    Ok(())
}

fn capture_service(args: &Args) -> anyhow::Result<Box<dyn CaptureService>> {
    if let Some(path) = &args.still {
        return Ok(Box::new(StillImageCapture::open(path)?));
    }

    #[cfg(feature = "xcap")]
    return Ok(Box::new(kagami_capture::ScreenCapture));

    #[cfg(not(feature = "xcap"))]
    anyhow::bail!("no capture source: pass --still <PNG> or build with the `xcap` feature");
}
