//! reqwest binding of [`HttpClient`] for the configuration API.

use std::time::Duration;

use super::{HttpClient, HttpError, HttpRequest, HttpResponse};

/// Sent as `User-Agent` on every request.
pub const USER_AGENT: &str = concat!("dsconfig-sync/", env!("CARGO_PKG_VERSION"));

/// Upper bound on connection setup, whatever the request timeout.
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// [`HttpClient`] over a pooled `reqwest::Client`.
///
/// Built once per run and shared by every store call:
/// - each request, body included, is bounded by the configured timeout
/// - connecting is bounded by the smaller of that timeout and 10 seconds
/// - redirects are returned as-is, so the store reports them as a status
///   instead of replaying a PATCH or DELETE elsewhere
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
///
/// use dsconfig_sync::store::{HttpClient, HttpRequest, ReqwestClient};
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ReqwestClient::new(Duration::from_secs(30))?;
/// let url = Url::parse("https://ds.example.com:1443/config/cipher-stream-providers")?;
/// let response = client.request(HttpRequest::get(url)).await?;
/// println!("Status: {}", response.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a client whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Connection`] if the TLS backend cannot be
    /// initialized.
    pub fn new(timeout: Duration) -> Result<Self, HttpError> {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout(timeout))
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| HttpError::Connection(Box::new(e)))?;

        Ok(Self { inner })
    }
}

/// Connection setup budget for a request timeout.
pub fn connect_timeout(timeout: Duration) -> Duration {
    timeout.min(MAX_CONNECT_TIMEOUT)
}

/// Maps a reqwest failure onto the transport error kinds.
fn transport_error(error: reqwest::Error) -> HttpError {
    if error.is_timeout() {
        HttpError::Timeout
    } else if error.is_builder() {
        HttpError::InvalidUrl(error.to_string())
    } else {
        HttpError::Connection(Box::new(error))
    }
}

impl HttpClient for ReqwestClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut builder = self
            .inner
            .request(req.method, req.url.as_str())
            .headers(req.headers);

        if let Some(body) = req.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(transport_error)?;

        let status = response.status();
        let headers = response.headers().clone();
        // A stalled body hits the same timeout as a stalled connect.
        let body = response.bytes().await.map_err(transport_error)?.to_vec();

        Ok(HttpResponse::new(status, headers, body))
    }
}
