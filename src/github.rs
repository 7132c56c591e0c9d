//! GitHub release types. Only the fields the proxy reads are modelled.

use serde::Deserialize;

/// A release as returned by `GET /repos/{owner}/{repo}/releases/latest`.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub tag_name: Option<String>,
    pub assets: Vec<ReleaseAsset>,
}

/// A file attached to a release.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
}

impl Release {
    /// First asset named exactly `name`, in upstream order.
    pub fn find_asset(&self, name: &str) -> Option<&ReleaseAsset> {
        self.assets.iter().find(|asset| asset.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_release() -> Release {
        serde_json::from_str(
            r#"{
                "tag_name": "events-2026-10-01",
                "draft": false,
                "assets": [
                    {"name": "srrc_events.csv", "browser_download_url": "https://example.test/a.csv", "size": 10},
                    {"name": "srrc_events.json", "browser_download_url": "https://example.test/first.json"},
                    {"name": "srrc_events.json", "browser_download_url": "https://example.test/second.json"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_find_asset_returns_first_exact_match() {
        let release = sample_release();
        let asset = release.find_asset("srrc_events.json").unwrap();
        assert_eq!(asset.browser_download_url, "https://example.test/first.json");
    }

    #[test]
    fn test_find_asset_is_case_sensitive() {
        let release = sample_release();
        assert!(release.find_asset("SRRC_EVENTS.JSON").is_none());
        assert!(release.find_asset("srrc_events").is_none());
    }

    #[test]
    fn test_release_without_assets_field_is_rejected() {
        let result = serde_json::from_str::<Release>(r#"{"tag_name": "v1"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_tag_name_is_optional() {
        let release: Release = serde_json::from_str(r#"{"assets": []}"#).unwrap();
        assert!(release.tag_name.is_none());
        assert!(release.find_asset("srrc_events.json").is_none());
    }
}
