//! Continuous discovery: report each new device until Ctrl-C
//!
//! Usage: UPNP_FINDER_LOG_MODE=development cargo run -p upnp-finder --example watch

use std::time::Duration;

use upnp_finder::{logging, Finder};

const REPROBE_INTERVAL: Duration = Duration::from_secs(15);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging_from_env()?;

    let finder = Finder::new().await?;
    finder.set_callback(|device| {
        println!(
            "Name: {} MAC: {} ({})",
            device.friendly_name().unwrap_or("<unnamed>"),
            device.get_str("device.macAddress").unwrap_or("unknown"),
            device.location()
        );
    })?;
    finder.probe_periodically(REPROBE_INTERVAL)?;

    tokio::signal::ctrl_c().await?;
    println!("Tracked {} devices", finder.tracked().len());
    finder.close().await;
    Ok(())
}
