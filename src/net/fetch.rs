//! The fetch seam.
//!
//! The engine only sees the [`Fetcher`] trait; production uses
//! [`HttpFetcher`], a blocking reqwest client that can route requests
//! through the course cache server, and tests substitute an in-memory stub.

use url::Url;

/// Result of fetching a URL.
#[derive(Clone)]
pub struct FetchResponse {
    pub status: u16,
    /// Final URL after redirects; links resolve against this.
    pub url: String,
    pub body: Vec<u8>,
    pub content_type: String,
}

/// Error during fetch.
#[derive(Debug)]
pub struct FetchError {
    pub message: String,
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Anything that can turn a URL into a response. Implementations must be
/// shareable across worker threads.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

/// Bodies larger than this are dropped and treated as empty; pages that
/// big are never worth tokenizing.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Blocking HTTP fetcher.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    /// When set, requests go to `{cache_server}?q={url}` instead of the
    /// target host.
    cache_server: Option<String>,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, cache_server: Option<String>) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent.to_string())
            .timeout(std::time::Duration::from_secs(15))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FetchError {
                message: format!("Client error: {}", e),
            })?;
        Ok(Self {
            client,
            cache_server,
        })
    }

    fn request_target(&self, url: &str) -> Result<Url, FetchError> {
        match &self.cache_server {
            Some(base) => {
                let mut target = Url::parse(base).map_err(|e| FetchError {
                    message: format!("Invalid cache server {base}: {e}"),
                })?;
                target.query_pairs_mut().append_pair("q", url);
                Ok(target)
            }
            None => Url::parse(url).map_err(|e| FetchError {
                message: format!("Invalid URL: {}", e),
            }),
        }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let target = self.request_target(url)?;

        let response = self
            .client
            .get(target.as_str())
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .map_err(|e| FetchError {
                message: format!("Request failed: {}", e),
            })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/html")
            .to_string();

        // Through the cache server the response URL is the cache's own;
        // the requested URL stays the resolution base in that case.
        let final_url = if self.cache_server.is_some() {
            url.to_string()
        } else {
            response.url().to_string()
        };

        let body = response
            .bytes()
            .map_err(|e| FetchError {
                message: format!("Failed to read body: {}", e),
            })?
            .to_vec();

        let body = if body.len() > MAX_BODY_BYTES {
            log::warn!("dropping {} byte body from {final_url}", body.len());
            Vec::new()
        } else {
            body
        };

        Ok(FetchResponse {
            status,
            url: final_url,
            body,
            content_type,
        })
    }
}
