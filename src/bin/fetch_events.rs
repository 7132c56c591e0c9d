//! CLI tool to pull the current events feed through the proxy logic.
//!
//! Produces:
//! - `output/srrc_events.json`: the payload exactly as the endpoint would relay it
//! - A digest of the unique events on stdout

use srrc_events_proxy::events::{dedupe, events_from_payload};
use srrc_events_proxy::{EventsProxy, ProxyConfig};

const OUTPUT_DIR: &str = "output";
const OUTPUT_FILE: &str = "output/srrc_events.json";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let proxy = EventsProxy::new(ProxyConfig::from_env())?;
    println!("Release: {}", proxy.config().release_url());
    println!("Asset:   {}", proxy.config().asset_name);

    let payload = proxy.fetch_events().await?;

    std::fs::create_dir_all(OUTPUT_DIR)?;
    std::fs::write(OUTPUT_FILE, serde_json::to_string_pretty(&payload)?)?;
    println!("Wrote {OUTPUT_FILE}");

    let events = events_from_payload(&payload);
    let total = events.len();
    let unique = dedupe(events);

    println!();
    println!("=== EVENTS ===");
    println!("Total events:  {total}");
    println!("Unique events: {}", unique.len());
    println!();
    for event in &unique {
        println!("{}", event.display());
        println!();
    }

    Ok(())
}
