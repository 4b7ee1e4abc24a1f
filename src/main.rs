use anyhow::{Context, Result};
use parley::ui::ParleyApp;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parley=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Parley chat assistant");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([480.0, 640.0])
            .with_min_inner_size([360.0, 480.0])
            .with_title("Parley"),
        ..Default::default()
    };

    eframe::run_native(
        "Parley",
        native_options,
        Box::new(|cc| Ok(Box::new(ParleyApp::new(cc)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
    .context("GUI event loop failed")
}
