// Deal Calendar Application
// Main entry point

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use deal_calendar::models::settings::LayoutSettings;
use deal_calendar::services::config::{default_config_path, load_settings, resolve};
use deal_calendar::ui_egui::CalendarApp;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    log::info!("Starting Deal Calendar");

    let settings = match default_config_path() {
        Some(path) => load_settings(&path).unwrap_or_else(|err| {
            log::error!("{:#}; falling back to default settings", err);
            LayoutSettings::default()
        }),
        None => {
            log::warn!("Unable to resolve config directory; using default settings");
            LayoutSettings::default()
        }
    };
    let resolved = resolve(settings).context("invalid layout settings")?;

    // An explicit path on the command line wins over the configured feed
    let feed_path = std::env::args()
        .nth(1)
        .or_else(|| resolved.settings.events_path.clone())
        .map(PathBuf::from);

    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    let handle = runtime.handle().clone();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 780.0])
            .with_min_inner_size([360.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Deal Calendar",
        options,
        Box::new(move |cc| Ok(Box::new(CalendarApp::new(cc, resolved, handle, feed_path)))),
    )
    .map_err(|err| anyhow!("calendar window failed: {}", err))?;

    log::info!("Deal Calendar closed");
    Ok(())
}
