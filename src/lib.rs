//! SRRC Events Proxy: Shared Library
//!
//! Relays the events file published by the SRRC calendar scraper: look up
//! the latest GitHub release, download its JSON asset, and hand it to the
//! browser with permissive CORS headers.
//!
//! The `calendar` module is the producer side: it scrapes the SRRC calendar
//! into the records that get published as that asset.
//!
//! Each serverless function in `api/` imports from this library
//! to keep handlers thin and logic reusable.

pub mod calendar;
pub mod config;
pub mod error;
pub mod events;
pub mod github;
pub mod proxy;

pub use config::ProxyConfig;
pub use error::{FetchError, ScrapeError, Stage};
pub use proxy::{EventsProxy, ProxyResponse};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
