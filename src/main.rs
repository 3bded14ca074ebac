//! Recital - desktop media recorder
//!
//! Main entry point for the Recital application.

use eframe::egui;
use recital::ui::{Capabilities, RecitalApp};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recital=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Recital");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([560.0, 640.0])
            .with_min_inner_size([400.0, 420.0])
            .with_title("Recital"),
        ..Default::default()
    };

    eframe::run_native(
        "Recital",
        options,
        Box::new(|_cc| Ok(Box::new(RecitalApp::new(Capabilities::native())))),
    )
}
