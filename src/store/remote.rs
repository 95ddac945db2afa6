//! HTTP binding of the configuration store.

use serde::Deserialize;
use serde_json::Value as Json;
use tracing::debug;
use url::Url;

use crate::model::UpdateRequest;

use super::{ConfigStore, HttpClient, HttpError, HttpRequest, HttpResponse, StoreError};

/// Body of a collection listing.
#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    resources: Vec<Json>,
}

/// [`ConfigStore`] over the server's configuration REST API.
///
/// Objects live at `<base>/config/<endpoint>/<id>`. Create is a POST to the
/// collection, update a PATCH with an operation batch, delete a DELETE.
///
/// # Type Parameters
///
/// - `H`: The HTTP client implementation
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use dsconfig_sync::store::{HttpConfigStore, ReqwestClient};
/// use url::Url;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = HttpConfigStore::new(
///     ReqwestClient::new(Duration::from_secs(30))?,
///     Url::parse("https://ds.example.com:1443")?,
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct HttpConfigStore<H> {
    client: H,
    base_url: Url,
    headers: http::HeaderMap,
}

impl<H> HttpConfigStore<H> {
    /// Creates a store rooted at `base_url`.
    #[must_use]
    pub fn new(client: H, base_url: Url) -> Self {
        Self {
            client,
            base_url,
            headers: http::HeaderMap::new(),
        }
    }

    /// Sets headers sent with every request (authorization, etc.).
    #[must_use]
    pub fn with_headers(mut self, headers: http::HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Returns the HTTP client.
    #[must_use]
    pub const fn client(&self) -> &H {
        &self.client
    }

    /// Returns the configured base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the configured headers.
    #[must_use]
    pub const fn headers(&self) -> &http::HeaderMap {
        &self.headers
    }

    /// Builds `<base>/config/<endpoint>[/<id>]`, percent-encoding the id.
    fn url(&self, endpoint: &str, id: Option<&str>) -> Result<Url, HttpError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| HttpError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("config")
            .push(endpoint)
            .extend(id);
        Ok(url)
    }
}

impl<H: HttpClient> HttpConfigStore<H> {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, StoreError> {
        let req = req.with_headers(&self.headers).with_header(
            http::header::ACCEPT,
            http::HeaderValue::from_static("application/json"),
        );
        debug!(method = %req.method, url = %req.url, "Store request");

        let response = self.client.request(req).await?;
        if !response.is_success() {
            return Err(StoreError::Status {
                status: response.status,
                body: response.body_text(),
            });
        }

        Ok(response)
    }

    async fn send_json(&self, req: HttpRequest) -> Result<Json, StoreError> {
        let response = self.send(req).await?;
        Ok(serde_json::from_slice(&response.body)?)
    }
}

impl<H: HttpClient> ConfigStore for HttpConfigStore<H> {
    async fn create(&self, endpoint: &str, payload: &Json) -> Result<Json, StoreError> {
        let url = self.url(endpoint, None)?;
        let body = serde_json::to_vec(payload)?;
        self.send_json(HttpRequest::post(url).with_json(body)).await
    }

    async fn get(&self, endpoint: &str, id: &str) -> Result<Json, StoreError> {
        let url = self.url(endpoint, Some(id))?;
        self.send_json(HttpRequest::get(url)).await
    }

    async fn update(
        &self,
        endpoint: &str,
        id: &str,
        request: &UpdateRequest,
    ) -> Result<Json, StoreError> {
        let url = self.url(endpoint, Some(id))?;
        let body = serde_json::to_vec(request)?;
        self.send_json(HttpRequest::patch(url).with_json(body)).await
    }

    async fn delete(&self, endpoint: &str, id: &str) -> Result<(), StoreError> {
        let url = self.url(endpoint, Some(id))?;
        self.send(HttpRequest::delete(url)).await?;
        Ok(())
    }

    async fn list(&self, endpoint: &str) -> Result<Vec<Json>, StoreError> {
        let url = self.url(endpoint, None)?;
        let response = self.send(HttpRequest::get(url)).await?;
        let listing: ListResponse = serde_json::from_slice(&response.body)?;
        Ok(listing.resources)
    }
}
