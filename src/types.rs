//! Data types and structures for the package finder application

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder shown for metadata fields the registry did not provide
pub const NOT_AVAILABLE: &str = "Not available";

/// Placeholder shown when a package has no summary
pub const NO_DESCRIPTION: &str = "No description available";

/// Package metadata as returned by a registry lookup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PackageMetadata {
    /// Package name as published
    pub name: String,

    /// Latest version
    pub version: String,

    /// One-line summary
    pub summary: String,

    /// Author name
    pub author: String,

    /// License string
    pub license: String,

    /// Project page on the registry
    pub project_url: Option<String>,

    /// Documentation URL
    pub docs_url: Option<String>,

    /// Requirement specifiers (`requires_dist`)
    pub requires: Vec<String>,

    /// Self-declared keywords
    pub keywords: Option<KeywordField>,
}

/// The registry's keyword field: usually one string, occasionally a list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum KeywordField {
    Text(String),
    List(Vec<String>),
}

impl KeywordField {
    /// True when the field carries no usable token
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::List(items) => items.iter().all(|item| item.trim().is_empty()),
        }
    }
}

/// Display-ready view of a package with fallbacks for missing fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageDetails {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
    pub license: String,
    pub project_url: Option<String>,
    pub docs_url: Option<String>,
    pub requirements: Vec<String>,
}

impl From<&PackageMetadata> for PackageDetails {
    fn from(metadata: &PackageMetadata) -> Self {
        Self {
            name: or_placeholder(&metadata.name, NOT_AVAILABLE),
            version: or_placeholder(&metadata.version, NOT_AVAILABLE),
            description: or_placeholder(&metadata.summary, NO_DESCRIPTION),
            author: or_placeholder(&metadata.author, NOT_AVAILABLE),
            license: or_placeholder(&metadata.license, NOT_AVAILABLE),
            project_url: non_empty_link(&metadata.project_url),
            docs_url: non_empty_link(&metadata.docs_url),
            requirements: metadata.requires.clone(),
        }
    }
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.trim().is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

fn non_empty_link(link: &Option<String>) -> Option<String> {
    link.as_ref()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string)
}

/// Shell commands for installing a package
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstallCommands {
    pub windows: String,
    pub unix: String,
    pub virtualenv: String,
}

impl InstallCommands {
    pub fn for_package(name: &str) -> Self {
        Self {
            windows: format!("pip install {}", name),
            unix: format!("pip3 install {}", name),
            virtualenv: format!(
                "python -m venv venv\n\
                 venv\\Scripts\\activate  # Windows\n\
                 source venv/bin/activate  # Linux/macOS\n\
                 pip install {}",
                name
            ),
        }
    }
}

// Server API types

/// Package lookup response
#[derive(Debug, Serialize, Deserialize)]
pub struct PackageResponse {
    #[serde(flatten)]
    pub details: PackageDetails,
    pub install: InstallCommands,
}

/// Similar-packages response
#[derive(Debug, Serialize, Deserialize)]
pub struct SimilarResponse {
    pub request_id: String,
    pub package: String,
    pub similar: Vec<String>,

    /// Set when no recommendation could be produced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// One row of the category table
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CategoryEntry {
    pub category: String,
    pub packages: Vec<String>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Metrics response
#[derive(Debug, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub requests_total: u64,
    pub requests_successful: u64,
    pub requests_failed: u64,
    pub recommendations_served: u64,
    pub recommendations_empty: u64,
    pub average_response_time_ms: f64,
    pub uptime_seconds: u64,
}

// PyPI JSON API response types (internal)

/// Response from `GET /pypi/{name}/json`
#[derive(Debug, Deserialize)]
pub struct PypiResponse {
    pub info: PypiInfo,
}

/// The `info` object of a PyPI response. PyPI sends `null` for most absent
/// fields, so everything is optional here.
#[derive(Debug, Deserialize)]
pub struct PypiInfo {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub project_url: Option<String>,
    #[serde(default)]
    pub docs_url: Option<String>,
    #[serde(default)]
    pub requires_dist: Option<Vec<String>>,
    #[serde(default)]
    pub keywords: Option<KeywordField>,
}

impl From<PypiInfo> for PackageMetadata {
    fn from(info: PypiInfo) -> Self {
        Self {
            name: info.name,
            version: info.version.unwrap_or_default(),
            summary: info.summary.unwrap_or_default(),
            author: info.author.unwrap_or_default(),
            license: info.license.unwrap_or_default(),
            project_url: info.project_url,
            docs_url: info.docs_url,
            requires: info.requires_dist.unwrap_or_default(),
            keywords: info.keywords.filter(|k| !k.is_blank()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pypi_info_with_nulls() {
        let json = r#"{
            "info": {
                "name": "flask",
                "version": "3.0.0",
                "summary": null,
                "author": null,
                "license": "BSD",
                "project_url": "https://pypi.org/project/Flask/",
                "docs_url": null,
                "requires_dist": null,
                "keywords": ""
            }
        }"#;

        let response: PypiResponse = serde_json::from_str(json).unwrap();
        let metadata = PackageMetadata::from(response.info);

        assert_eq!(metadata.name, "flask");
        assert_eq!(metadata.summary, "");
        assert!(metadata.requires.is_empty());
        assert!(metadata.keywords.is_none());
    }

    #[test]
    fn test_keyword_list_shape() {
        let json = r#"{"info": {"name": "x", "keywords": ["web", "http"]}}"#;
        let response: PypiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.info.keywords,
            Some(KeywordField::List(vec!["web".into(), "http".into()]))
        );
    }

    #[test]
    fn test_details_fallbacks() {
        let metadata = PackageMetadata {
            name: "requests".to_string(),
            project_url: Some("  ".to_string()),
            ..Default::default()
        };

        let details = PackageDetails::from(&metadata);
        assert_eq!(details.name, "requests");
        assert_eq!(details.version, NOT_AVAILABLE);
        assert_eq!(details.description, NO_DESCRIPTION);
        assert_eq!(details.project_url, None);
    }

    #[test]
    fn test_install_commands() {
        let commands = InstallCommands::for_package("numpy");
        assert_eq!(commands.windows, "pip install numpy");
        assert_eq!(commands.unix, "pip3 install numpy");
        assert!(commands.virtualenv.starts_with("python -m venv venv\n"));
        assert!(commands.virtualenv.ends_with("pip install numpy"));
        assert_eq!(commands.virtualenv.lines().count(), 4);
    }
}
