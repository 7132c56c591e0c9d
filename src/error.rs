//! Failure taxonomy for the two upstream fetches and the calendar scraper.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Which upstream request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// The GitHub "latest release" lookup.
    Release,
    /// The download of the events asset itself.
    Asset,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Release => write!(f, "GitHub API"),
            Stage::Asset => write!(f, "events asset"),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{stage} error: HTTP {status}")]
    UpstreamStatus { stage: Stage, status: u16 },

    #[error("{stage} request failed: {source}")]
    Network {
        stage: Stage,
        #[source]
        source: reqwest::Error,
    },

    #[error("{stage} request timed out after {}s", .after.as_secs_f64())]
    Timeout { stage: Stage, after: Duration },

    #[error("{stage} returned invalid JSON: {source}")]
    Parse {
        stage: Stage,
        #[source]
        source: serde_json::Error,
    },

    #[error("Events data file not found in latest release: {asset}")]
    AssetNotFound { asset: String },

    #[error("http client: {0}")]
    Client(#[source] reqwest::Error),
}

impl FetchError {
    /// Classifies a transport error from `stage`, splitting out deadline hits.
    pub fn transport(stage: Stage, source: reqwest::Error, timeout: Duration) -> Self {
        if source.is_timeout() {
            Self::Timeout { stage, after: timeout }
        } else {
            Self::Network { stage, source }
        }
    }

    /// Stable tag for logs. Not exposed to callers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UpstreamStatus { .. } => "upstream_status",
            Self::Network { .. } => "network",
            Self::Timeout { .. } => "timeout",
            Self::Parse { .. } => "parse",
            Self::AssetNotFound { .. } => "asset_not_found",
            Self::Client(_) => "client",
        }
    }
}

/// Failure while pulling one page from the calendar's load-more endpoint.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("calendar request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("calendar error: HTTP {0}")]
    Status(u16),

    #[error("calendar returned invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("form encoding: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),

    #[error("selector: {0}")]
    Selector(String),
}
