//! Error taxonomy shared by the client, engine and presentation layers

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PyLibFinderError>;

/// Everything that can go wrong looking packages up or serving them.
///
/// Registry failures split into [`PackageNotFound`](Self::PackageNotFound)
/// and transient conditions (see [`is_recoverable`](Self::is_recoverable)).
#[derive(Error, Debug)]
pub enum PyLibFinderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Package '{0}' not found")]
    PackageNotFound(String),

    /// Rejected before any request is made
    #[error("Invalid package name: '{0}'. {1}")]
    InvalidPackageName(String, &'static str),

    #[error("Registry rate limit exceeded. Please try again later")]
    RateLimitExceeded,

    /// Any non-200, non-404 status that is not 429 or 5xx
    #[error("Registry answered {status} - {reason}")]
    UnexpectedStatus { status: u16, reason: String },

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Service temporarily unavailable: {0}")]
    ServiceUnavailable(String),
}

impl PyLibFinderError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::ValidationError(message.into())
    }

    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::NetworkError(message.into())
    }

    /// Transient failures: the caller may retry, nothing retries automatically
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::HttpError(_)
                | Self::JsonError(_)
                | Self::NetworkError(_)
                | Self::Timeout(_)
                | Self::ServiceUnavailable(_)
                | Self::RateLimitExceeded
                | Self::UnexpectedStatus { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PackageNotFound(_))
    }

    /// HTTP status this error corresponds to, when there is one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            Self::PackageNotFound(_) => Some(404),
            Self::RateLimitExceeded => Some(429),
            Self::ValidationError(_) | Self::InvalidPackageName(_, _) => Some(400),
            Self::ServiceUnavailable(_) => Some(503),
            _ => None,
        }
    }

    /// Message suitable for end users
    pub fn user_message(&self) -> String {
        match self {
            Self::PackageNotFound(name) => {
                format!(
                    "Package '{}' was not found. Check the name and try again.",
                    name
                )
            }
            Self::InvalidPackageName(name, reason) => {
                format!("'{}' is not a valid package name. {}", name, reason)
            }
            Self::RateLimitExceeded => {
                "The registry rate limit was exceeded. Please wait a moment before trying again."
                    .to_string()
            }
            Self::HttpError(_) | Self::NetworkError(_) | Self::Timeout(_) => {
                "Could not reach the package registry. Please try again.".to_string()
            }
            Self::ServiceUnavailable(_) => {
                "The package registry is temporarily unavailable. Please try again later."
                    .to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Classify a registry status other than 200 or 404
impl From<reqwest::StatusCode> for PyLibFinderError {
    fn from(status: reqwest::StatusCode) -> Self {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            Self::RateLimitExceeded
        } else if status.is_server_error() {
            Self::ServiceUnavailable(format!("registry returned {}", status))
        } else {
            Self::UnexpectedStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown").to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_status_code_mapping() {
        assert!(matches!(
            PyLibFinderError::from(StatusCode::TOO_MANY_REQUESTS),
            PyLibFinderError::RateLimitExceeded
        ));
        assert!(matches!(
            PyLibFinderError::from(StatusCode::BAD_GATEWAY),
            PyLibFinderError::ServiceUnavailable(_)
        ));

        let err = PyLibFinderError::from(StatusCode::FORBIDDEN);
        assert_eq!(err.status_code(), Some(403));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_not_found_is_not_recoverable() {
        let err = PyLibFinderError::PackageNotFound("nope".to_string());
        assert!(err.is_not_found());
        assert!(!err.is_recoverable());
        assert_eq!(err.status_code(), Some(404));
        assert!(err.user_message().contains("'nope' was not found"));
    }
}
