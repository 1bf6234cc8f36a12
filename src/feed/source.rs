use futures::StreamExt;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::config::Config;

const MAX_BODY_SIZE: usize = 5 * 1024 * 1024; // 5MB

/// Transport-level failures talking to the intel backend.
///
/// The controller never lets these escape: every variant becomes a status
/// transition plus fixture substitution.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    /// 2xx response whose body is not JSON
    #[error("Malformed response body: {0}")]
    MalformedBody(#[from] serde_json::Error),
    /// Response body exceeded the 5MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Base URL and path do not form a valid http(s) URL
    #[error("Invalid endpoint '{0}'")]
    InvalidEndpoint(String),
}

/// The outbound HTTP collaborator the controller talks to.
///
/// Both calls return the parsed JSON body; shape interpretation is left to
/// [`normalize`](super::normalize::normalize).
pub trait IntelSource: Send + Sync + 'static {
    /// Read the current feed (`GET <base><feed_path>`).
    fn fetch_feed(&self) -> impl Future<Output = Result<Value, FetchError>> + Send;

    /// Ask the backend to rescan (`POST <base><scan_path>?target=<target>`).
    fn request_scan(&self, target: &str)
        -> impl Future<Output = Result<Value, FetchError>> + Send;
}

/// Build the shared HTTP client.
///
/// - Limits redirects to 3 hops
/// - Keeps a small idle pool, since only two endpoints are ever contacted
/// - Per-request deadlines are applied by [`HttpIntelSource`], not here
pub fn build_client() -> Result<reqwest::Client, FetchError> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("cyberhound/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(3))
        .pool_max_idle_per_host(2)
        .pool_idle_timeout(Duration::from_secs(30))
        .tcp_keepalive(Duration::from_secs(60))
        .build()?;
    Ok(client)
}

/// [`IntelSource`] over `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpIntelSource {
    client: reqwest::Client,
    feed_url: Url,
    scan_url: Url,
    timeout: Duration,
}

fn endpoint(base: &str, path: &str) -> Result<Url, FetchError> {
    let raw = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    let url = Url::parse(&raw).map_err(|_| FetchError::InvalidEndpoint(raw.clone()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(FetchError::InvalidEndpoint(raw)),
    }
}

impl HttpIntelSource {
    pub fn new(
        client: reqwest::Client,
        base: &str,
        feed_path: &str,
        scan_path: &str,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            client,
            feed_url: endpoint(base, feed_path)?,
            scan_url: endpoint(base, scan_path)?,
            timeout,
        })
    }

    pub fn from_config(client: reqwest::Client, config: &Config) -> Result<Self, FetchError> {
        Self::new(
            client,
            &config.api_base,
            &config.feed_path,
            &config.scan_path,
            config.request_timeout(),
        )
    }

    pub fn feed_url(&self) -> &Url {
        &self.feed_url
    }

    pub fn scan_url_for(&self, target: &str) -> Url {
        let mut url = self.scan_url.clone();
        url.query_pairs_mut().append_pair("target", target);
        url
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, FetchError> {
        let timeout = self.timeout;
        // The whole exchange, body included, shares one deadline.
        tokio::time::timeout(timeout, async move {
            let response = request.send().await?;

            if !response.status().is_success() {
                return Err(FetchError::HttpStatus(response.status().as_u16()));
            }

            let bytes = read_limited_bytes(response, MAX_BODY_SIZE).await?;
            let body: Value = serde_json::from_slice(&bytes)?;
            Ok::<Value, FetchError>(body)
        })
        .await
        .map_err(|_| FetchError::Timeout(timeout))?
    }
}

impl IntelSource for HttpIntelSource {
    async fn fetch_feed(&self) -> Result<Value, FetchError> {
        tracing::debug!(url = %self.feed_url, "Fetching intel feed");
        self.send(self.client.get(self.feed_url.clone())).await
    }

    async fn request_scan(&self, target: &str) -> Result<Value, FetchError> {
        let url = self.scan_url_for(target);
        tracing::debug!(url = %url, scan_target = %target, "Requesting scan");
        self.send(self.client.post(url)).await
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
