//! Release asset proxy: look up the latest release, download the events
//! asset, relay it with permissive CORS headers.
//!
//! Every request is independent. The release lookup and the asset download
//! run strictly in order, each bounded by the configured timeout, and any
//! failure along the way collapses into the same 500 response shape.

use http::{Method, StatusCode};
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::config::ProxyConfig;
use crate::error::{FetchError, Stage};
use crate::github::Release;

/// Headers attached to every response, success or failure.
pub const CORS_HEADERS: [(&str, &str); 4] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Headers", "Content-Type"),
    ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
    ("Content-Type", "application/json"),
];

/// `error` field of every failure body.
pub const FAILURE_ERROR: &str = "Failed to fetch events data";

const GITHUB_JSON: &str = "application/vnd.github+json";

/// What the handler hands back to the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub headers: Vec<(&'static str, &'static str)>,
    pub body: String,
}

/// The fixed CORS/content-type header set.
pub fn cors_headers() -> Vec<(&'static str, &'static str)> {
    CORS_HEADERS.to_vec()
}

impl ProxyResponse {
    fn new(status: StatusCode, body: String) -> Self {
        Self {
            status,
            headers: cors_headers(),
            body,
        }
    }

    /// Answer to a CORS preflight: 200 with an empty body.
    pub fn preflight() -> Self {
        Self::new(StatusCode::OK, String::new())
    }

    /// 200 carrying the upstream payload, serialized as received.
    pub fn ok(payload: &Value) -> Self {
        Self::new(StatusCode::OK, payload.to_string())
    }

    /// 500 with `{"error": ..., "message": ...}`.
    pub fn failure(err: &FetchError) -> Self {
        let body = json!({
            "error": FAILURE_ERROR,
            "message": err.to_string(),
        });
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, body.to_string())
    }

    /// Looks up a header value, ignoring ASCII case in the name.
    pub fn header(&self, name: &str) -> Option<&'static str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| *value)
    }

    pub fn into_http(self) -> Result<http::Response<String>, http::Error> {
        let mut builder = http::Response::builder().status(self.status);
        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }
        builder.body(self.body)
    }
}

/// Fetches the events asset attached to the latest release of one repository.
pub struct EventsProxy {
    config: ProxyConfig,
    client: reqwest::Client,
}

impl EventsProxy {
    /// Builds the HTTP client. No request is made here.
    pub fn new(config: ProxyConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(FetchError::Client)?;

        Ok(EventsProxy { config, client })
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Full request cycle. Never fails: every error becomes a 500 response.
    pub async fn respond(&self, method: &Method) -> ProxyResponse {
        if *method == Method::OPTIONS {
            log::debug!("answering CORS preflight");
            return ProxyResponse::preflight();
        }

        match self.fetch_events().await {
            Ok(payload) => ProxyResponse::ok(&payload),
            Err(err) => {
                log::error!("events fetch failed [{}]: {}", err.code(), err);
                ProxyResponse::failure(&err)
            }
        }
    }

    /// Looks up the latest release, then downloads and parses its events asset.
    ///
    /// The payload is returned as-is; its shape is not checked.
    pub async fn fetch_events(&self) -> Result<Value, FetchError> {
        let release = self.fetch_release().await?;
        let asset = release
            .find_asset(&self.config.asset_name)
            .ok_or_else(|| FetchError::AssetNotFound {
                asset: self.config.asset_name.clone(),
            })?;

        log::info!(
            "release {} carries {}, downloading {}",
            release.tag_name.as_deref().unwrap_or("<untagged>"),
            asset.name,
            asset.browser_download_url
        );

        let request = self.client.get(&asset.browser_download_url);
        let payload: Value = self.fetch_json(Stage::Asset, request).await?;

        if let Some(events) = payload.as_array() {
            log::info!("relaying {} events", events.len());
        }
        Ok(payload)
    }

    /// Latest release metadata for the configured repository.
    pub async fn fetch_release(&self) -> Result<Release, FetchError> {
        let url = self.config.release_url();
        log::debug!("fetching release metadata from {url}");

        let mut request = self.client.get(&url).header(ACCEPT, GITHUB_JSON);
        if let Some(token) = &self.config.github_token {
            request = request.bearer_auth(token);
        }
        self.fetch_json(Stage::Release, request).await
    }

    /// Sends `request`, requires a 2xx status, and parses the body as JSON.
    async fn fetch_json<T: DeserializeOwned>(
        &self,
        stage: Stage,
        request: reqwest::RequestBuilder,
    ) -> Result<T, FetchError> {
        let timeout = self.config.timeout;
        let response = request
            .send()
            .await
            .map_err(|e| FetchError::transport(stage, e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UpstreamStatus {
                stage,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::transport(stage, e, timeout))?;

        serde_json::from_slice(&body).map_err(|source| FetchError::Parse { stage, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preflight_is_empty_with_cors_headers() {
        let response = ProxyResponse::preflight();
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.body.is_empty());
        assert_eq!(response.headers, CORS_HEADERS.to_vec());
    }

    #[test]
    fn test_failure_body_shape() {
        let err = FetchError::UpstreamStatus { stage: Stage::Release, status: 404 };
        let response = ProxyResponse::failure(&err);
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.header("content-type"), Some("application/json"));

        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["error"], FAILURE_ERROR);
        assert_eq!(body["message"], "GitHub API error: HTTP 404");
        assert_eq!(body.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_ok_keeps_payload_key_order() {
        let payload: Value = serde_json::from_str(r#"[{"title":"Dance","event_id":"7","location":"Bern"}]"#).unwrap();
        let response = ProxyResponse::ok(&payload);
        assert_eq!(response.body, r#"[{"title":"Dance","event_id":"7","location":"Bern"}]"#);
    }

    #[test]
    fn test_into_http_carries_all_headers() {
        let response = ProxyResponse::preflight().into_http().unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().len(), 4);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert_eq!(
            response.headers()["access-control-allow-methods"],
            "GET, POST, OPTIONS"
        );
        assert_eq!(response.body(), "");
    }
}
