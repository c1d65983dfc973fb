//! One discovery window, printed as JSON for scripting
//!
//! Usage: cargo run -p upnp-finder --example discover_json [SECONDS]

use std::time::Duration;

use upnp_finder::{find_devices, logging};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging_from_env()?;

    let window = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(3);

    let devices = find_devices(Duration::from_secs(window)).await?;

    println!("{}", serde_json::to_string_pretty(&devices)?);
    Ok(())
}
