//! CLI tool to scrape the SRRC calendar into the events file.
//!
//! Produces:
//! - `srrc_events.json`: unique events, the file attached to each release
//! - A digest of every unique event on stdout

use srrc_events_proxy::calendar::{date_ranges, CalendarScraper, AJAX_URL};
use srrc_events_proxy::events::dedupe;

const OUTPUT_FILE: &str = "srrc_events.json";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let scraper = CalendarScraper::new(AJAX_URL)?;
    let ranges = date_ranges(chrono::Local::now().date_naive());
    let events = scraper.fetch_all(&ranges).await;

    if events.is_empty() {
        println!("No events found!");
        return Ok(());
    }

    let total = events.len();
    let unique = dedupe(events);

    println!();
    println!("Total events found: {total}");
    println!("Unique events:      {}", unique.len());
    println!();
    println!("=== EVENTS ===");
    println!();
    for event in &unique {
        println!("{}", event.display());
        println!();
    }

    std::fs::write(OUTPUT_FILE, serde_json::to_string_pretty(&unique)?)?;
    println!("Events saved to: {OUTPUT_FILE}");

    Ok(())
}
