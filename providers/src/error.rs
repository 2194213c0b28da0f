use thiserror::Error;
use url::Url;

/// Failure of a single fetch.
///
/// Carries only strings so fakes and tests can construct every variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    pub(crate) fn from_reqwest(url: &Url, error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Network {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }

    /// Whether a later attempt could plausibly succeed.
    ///
    /// Informational only: nothing in this workspace retries.
    #[must_use]
    pub fn retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Network { .. } => true,
            Self::Status { status, .. } => matches!(status, 408 | 429 | 500..=599),
            Self::Decode { .. } | Self::InvalidUrl(_) => false,
        }
    }
}
