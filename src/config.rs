//! Proxy configuration.
//!
//! The defaults point at the SRRC calendar scraper's release feed. Deploys may
//! override individual values through environment variables; anything unset
//! keeps its default.

use std::time::Duration;

/// GitHub REST API root.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";
/// Owner of the repository publishing the events asset.
pub const DEFAULT_OWNER: &str = "raphaelguye";
/// Repository publishing the events asset.
pub const DEFAULT_REPO: &str = "srrc-calendar-scraper";
/// Asset attached to every release by the scraper.
pub const DEFAULT_ASSET_NAME: &str = "srrc_events.json";
/// Per-request upstream deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub const ENV_API_BASE: &str = "GITHUB_API_BASE";
pub const ENV_OWNER: &str = "EVENTS_RELEASE_OWNER";
pub const ENV_REPO: &str = "EVENTS_RELEASE_REPO";
pub const ENV_ASSET_NAME: &str = "EVENTS_ASSET_NAME";
pub const ENV_TIMEOUT_SECS: &str = "EVENTS_UPSTREAM_TIMEOUT_SECS";
pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";

/// Where to find the release, which asset to relay, and how long to wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// GitHub API root, e.g. `https://api.github.com`.
    pub api_base: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Exact name of the release asset to relay.
    pub asset_name: String,
    /// Deadline applied to each upstream request (headers and body).
    pub timeout: Duration,
    /// Sent as `User-Agent` on every upstream request. GitHub rejects requests without one.
    pub user_agent: String,
    /// Optional token for the release lookup. Never sent to the asset host.
    pub github_token: Option<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            owner: DEFAULT_OWNER.to_string(),
            repo: DEFAULT_REPO.to_string(),
            asset_name: DEFAULT_ASSET_NAME.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("srrc-events-proxy/{}", crate::version()),
            github_token: None,
        }
    }
}

impl ProxyConfig {
    /// Builds a config from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, starting from the defaults.
    ///
    /// Empty values are treated as unset. A timeout that is not a positive
    /// integer number of seconds is ignored with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(base) = get(ENV_API_BASE) {
            config.api_base = base;
        }
        if let Some(owner) = get(ENV_OWNER) {
            config.owner = owner;
        }
        if let Some(repo) = get(ENV_REPO) {
            config.repo = repo;
        }
        if let Some(asset) = get(ENV_ASSET_NAME) {
            config.asset_name = asset;
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => log::warn!(
                    "ignoring {ENV_TIMEOUT_SECS}={raw:?}, keeping {}s",
                    config.timeout.as_secs()
                ),
            }
        }
        config.github_token = get(ENV_GITHUB_TOKEN);

        config
    }

    /// Overrides the API root. Mostly useful for pointing at a local upstream.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Overrides the per-request deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The "latest release" endpoint for the configured repository.
    pub fn release_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/releases/latest",
            self.api_base.trim_end_matches('/'),
            self.owner,
            self.repo
        )
    }
}
