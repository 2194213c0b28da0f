//! Remote fetch clients for the pets API.
//!
//! # Architecture
//!
//! - [`PetService`] - The fetch capability consumed by the aggregation engine:
//!   "fetch the pet collection" and "fetch one vet by id".
//! - [`HttpPetService`] - reqwest-backed implementation against `{base}/pets` and
//!   `{base}/practitioners/{id}`.
//! - [`endpoints`] - URL construction for the two endpoints.
//!
//! # Outcomes
//!
//! Both capability methods resolve to `Result<Option<T>, FetchError>`:
//!
//! | Outcome | Meaning |
//! |---------|---------|
//! | `Ok(Some(value))` | Fetched and decoded |
//! | `Ok(None)` | Server had no data (404, empty body, JSON `null`) |
//! | `Err(FetchError)` | Transport, status, or decode failure |
//!
//! Per-request diagnostics (status codes, undecodable bodies) are logged here
//! with `tracing`. Callers only see the outcome.

pub mod endpoints;
mod error;
mod http;

pub use error::FetchError;
pub use http::HttpPetService;
pub use petvet_types;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use petvet_types::{PetRecord, VetId, VetRecord};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use url::Url;

/// Production pets API.
pub const DEFAULT_BASE_URL: &str = "https://wildflower-hidden-35037.v2.vapor.cloud/api";

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("petvet/", env!("CARGO_PKG_VERSION"));

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const TCP_KEEPALIVE_SECS: u64 = 60;
const POOL_MAX_IDLE_PER_HOST: usize = 32;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

/// Future returned by [`PetService`] methods.
pub type FetchFut<'a, T> =
    Pin<Box<dyn Future<Output = Result<Option<T>, FetchError>> + Send + 'a>>;

/// Fetch capability for pets and their vets.
///
/// Implementations must be safe to call concurrently; the engine issues one
/// `vet` call per eligible pet, all in flight at once.
pub trait PetService: Send + Sync {
    fn pets(&self) -> FetchFut<'_, Vec<PetRecord>>;

    fn vet(&self, id: VetId) -> FetchFut<'_, VetRecord>;
}

impl<T: PetService + ?Sized> PetService for Arc<T> {
    fn pets(&self) -> FetchFut<'_, Vec<PetRecord>> {
        (**self).pets()
    }

    fn vet(&self, id: VetId) -> FetchFut<'_, VetRecord> {
        (**self).vet(id)
    }
}

impl<T: PetService + ?Sized> PetService for &T {
    fn pets(&self) -> FetchFut<'_, Vec<PetRecord>> {
        (**self).pets()
    }

    fn vet(&self, id: VetId) -> FetchFut<'_, VetRecord> {
        (**self).vet(id)
    }
}

/// Connection settings for [`HttpPetService`].
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub base_url: Url,
    /// Whole-request timeout, the only per-fetch deadline in the system.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl ServiceSettings {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Build an HTTP client for the pets API.
pub fn http_client(settings: &ServiceSettings) -> Result<reqwest::Client, reqwest::Error> {
    base_client_builder(settings).build()
}

fn base_client_builder(settings: &ServiceSettings) -> reqwest::ClientBuilder {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .user_agent(settings.user_agent.clone())
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.timeout)
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
        .default_headers(default_headers)
}
