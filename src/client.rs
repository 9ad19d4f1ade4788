//! HTTP client for the PyPI JSON API

use crate::error::{PyLibFinderError, Result};
use crate::types::{PackageMetadata, PypiResponse};
use crate::utils::validate_package_name;
use crate::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, error, warn};

/// A package registry that can look up metadata by name.
///
/// `Ok(None)` means the registry answered that no such package exists;
/// `Err` is reserved for transient failures and invalid names. Implementations
/// never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Registry: Send + Sync {
    async fn lookup(&self, name: &str) -> Result<Option<PackageMetadata>>;
}

/// HTTP client for PyPI API interactions
#[derive(Debug, Clone)]
pub struct PypiClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl PypiClient {
    /// Create a new client with default settings
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a new client builder
    pub fn builder() -> PypiClientBuilder {
        PypiClientBuilder::default()
    }

    /// Base URL this client sends requests to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch metadata, treating a missing package as an error
    pub async fn get_package(&self, name: &str) -> Result<PackageMetadata> {
        self.fetch_metadata(name)
            .await?
            .ok_or_else(|| PyLibFinderError::PackageNotFound(name.to_string()))
    }

    /// Check whether a package exists on the registry
    pub async fn package_exists(&self, name: &str) -> Result<bool> {
        Ok(self.fetch_metadata(name).await?.is_some())
    }

    async fn fetch_metadata(&self, name: &str) -> Result<Option<PackageMetadata>> {
        validate_package_name(name)?;

        let url = format!("{}/{}/json", self.base_url, urlencoding::encode(name));
        debug!("Fetching package metadata: {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            error!("Failed to fetch package '{}': {}", name, e);
            self.classify_send_error(e)
        })?;

        match response.status() {
            StatusCode::OK => {
                let body: PypiResponse = response.json().await.map_err(|e| {
                    warn!("Malformed registry response for '{}': {}", name, e);
                    PyLibFinderError::from(e)
                })?;
                debug!("Fetched metadata for package '{}'", name);
                Ok(Some(PackageMetadata::from(body.info)))
            }
            StatusCode::NOT_FOUND => {
                debug!("Package '{}' not found", name);
                Ok(None)
            }
            status => {
                warn!("Unexpected status {} for package '{}'", status, name);
                Err(PyLibFinderError::from(status))
            }
        }
    }

    fn classify_send_error(&self, err: reqwest::Error) -> PyLibFinderError {
        if err.is_timeout() {
            PyLibFinderError::Timeout(self.timeout.as_secs())
        } else if err.is_connect() {
            PyLibFinderError::network(err.to_string())
        } else {
            PyLibFinderError::from(err)
        }
    }
}

#[async_trait]
impl Registry for PypiClient {
    async fn lookup(&self, name: &str) -> Result<Option<PackageMetadata>> {
        self.fetch_metadata(name).await
    }
}

/// Builder for creating a PypiClient with custom configuration
#[derive(Debug, Default)]
pub struct PypiClientBuilder {
    base_url: Option<String>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
}

impl PypiClientBuilder {
    /// Set the base URL of the JSON API (`https://pypi.org/pypi` by default)
    pub fn base_url<S: Into<String>>(mut self, url: S) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the user agent string
    pub fn user_agent<S: Into<String>>(mut self, agent: S) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the PypiClient
    pub fn build(self) -> Result<PypiClient> {
        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        let user_agent = self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(PypiClient {
            client,
            base_url,
            timeout,
        })
    }
}
