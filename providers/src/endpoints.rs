//! URL construction for the pets API.

use petvet_types::VetId;
use url::Url;

use crate::FetchError;

/// Parse and validate a service base URL.
pub fn parse_base_url(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw.trim()).map_err(|e| FetchError::InvalidUrl(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(FetchError::InvalidUrl(format!(
                "{raw}: scheme '{scheme}' not allowed; only http and https are supported"
            )));
        }
    }
    if url.cannot_be_a_base() {
        return Err(FetchError::InvalidUrl(format!("{raw}: not a base URL")));
    }
    Ok(url)
}

/// `{base}/pets`
pub fn pets_url(base: &Url) -> Result<Url, FetchError> {
    join(base, &["pets"])
}

/// `{base}/practitioners/{id}`
pub fn vet_url(base: &Url, id: VetId) -> Result<Url, FetchError> {
    join(base, &["practitioners", &id.to_string()])
}

fn join(base: &Url, segments: &[&str]) -> Result<Url, FetchError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| FetchError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
