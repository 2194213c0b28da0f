//! reqwest-backed [`PetService`].

use petvet_types::{PetRecord, VetId, VetRecord};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use crate::endpoints::{pets_url, vet_url};
use crate::{FetchError, FetchFut, PetService, ServiceSettings, http_client};

const MAX_LOGGED_BODY_BYTES: usize = 2 * 1024;

/// Fetches pets and vets over HTTP.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpPetService {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpPetService {
    pub fn new(settings: &ServiceSettings) -> Result<Self, FetchError> {
        let client = http_client(settings).map_err(|e| FetchError::Network {
            url: settings.base_url.to_string(),
            message: format!("failed to build HTTP client: {e}"),
        })?;
        Ok(Self::with_client(client, settings.base_url.clone()))
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, FetchError> {
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            tracing::warn!(url = %url, error = %e, "Request failed");
            FetchError::from_reqwest(&url, &e)
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(url = %url, "Resource not found");
            return Ok(None);
        }
        if !status.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "Unexpected response status");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| {
            tracing::warn!(url = %url, error = %e, "Failed to read response body");
            FetchError::from_reqwest(&url, &e)
        })?;

        decode_body(&url, &body)
    }
}

impl PetService for HttpPetService {
    fn pets(&self) -> FetchFut<'_, Vec<PetRecord>> {
        Box::pin(async move {
            let url = pets_url(&self.base_url)?;
            self.get_json(url).await
        })
    }

    fn vet(&self, id: VetId) -> FetchFut<'_, VetRecord> {
        Box::pin(async move {
            let url = vet_url(&self.base_url, id)?;
            self.get_json(url).await
        })
    }
}

/// Empty bodies and JSON `null` mean "no data".
fn decode_body<T: DeserializeOwned>(url: &Url, body: &[u8]) -> Result<Option<T>, FetchError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    serde_json::from_slice::<Option<T>>(body).map_err(|e| {
        let shown = &body[..body.len().min(MAX_LOGGED_BODY_BYTES)];
        tracing::debug!(url = %url, body = %String::from_utf8_lossy(shown), "Undecodable body");
        tracing::warn!(url = %url, error = %e, "Failed to decode response");
        FetchError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        }
    })
}
