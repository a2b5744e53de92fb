//! Page sources: an in-process HTTP client and a `curl` subprocess.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::config::Settings;

const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("timed out fetching {url}")]
    Timeout { url: String },

    #[error("curl failed for {url}: {message}")]
    Command { url: String, message: String },
}

/// Anything that can turn a URL into an HTML body.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FetcherKind {
    Http,
    Curl,
}

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub user_agent: String,
    pub timeout: Duration,
}

impl FetchOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        FetchOptions {
            user_agent: settings.user_agent.clone(),
            timeout: Duration::from_secs(settings.request_timeout_secs),
        }
    }
}

pub fn build_fetcher(kind: FetcherKind, options: &FetchOptions) -> anyhow::Result<Arc<dyn PageSource>> {
    let fetcher: Arc<dyn PageSource> = match kind {
        FetcherKind::Http => Arc::new(HttpFetcher::new(options)?),
        FetcherKind::Curl => Arc::new(CurlFetcher::new(options)),
    };
    Ok(fetcher)
}

/// reqwest client with browser-like headers, a request timeout and at most 5 redirects.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(options: &FetchOptions) -> anyhow::Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::ACCEPT, reqwest::header::HeaderValue::from_static(ACCEPT));
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("en-US,en;q=0.5"),
        );

        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent.clone())
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await.map_err(|e| request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(|e| request_error(url, e))
    }
}

fn request_error(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout { url: url.to_string() }
    } else {
        FetchError::Request {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}

/// Shells out to `curl -s -L --max-time <timeout>`.
pub struct CurlFetcher {
    user_agent: String,
    timeout: Duration,
}

impl CurlFetcher {
    pub fn new(options: &FetchOptions) -> Self {
        CurlFetcher {
            user_agent: options.user_agent.clone(),
            timeout: options.timeout,
        }
    }
}

#[async_trait]
impl PageSource for CurlFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        debug!("curl {}", url);
        let max_time = self.timeout.as_secs().max(1).to_string();
        let child = tokio::process::Command::new("curl")
            .args(["-s", "-L", "--max-time", &max_time])
            .arg("-H")
            .arg(format!("User-Agent: {}", self.user_agent))
            .arg("-H")
            .arg(format!("Accept: {}", ACCEPT))
            .arg(url)
            .kill_on_drop(true)
            .output();

        // curl enforces --max-time itself; this only guards a hung process.
        let output = tokio::time::timeout(self.timeout + Duration::from_secs(5), child)
            .await
            .map_err(|_| FetchError::Timeout { url: url.to_string() })?
            .map_err(|e| FetchError::Command {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            // 28 is curl's "operation timed out"
            if output.status.code() == Some(28) {
                return Err(FetchError::Timeout { url: url.to_string() });
            }
            return Err(FetchError::Command {
                url: url.to_string(),
                message: format!(
                    "exit {}: {}",
                    output.status.code().unwrap_or(-1),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// In-memory page source for tests.
#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{FetchError, PageSource};

    /// Serves fixture files by URL; anything else is a 404.
    pub struct StaticSource {
        pub pages: HashMap<String, String>,
        pub requested: Mutex<Vec<String>>,
    }

    impl StaticSource {
        pub fn new(pages: &[(&str, &str)]) -> Self {
            StaticSource {
                pages: pages
                    .iter()
                    .map(|(u, f)| {
                        let body = std::fs::read_to_string(format!("tests/fixtures/{}", f)).unwrap();
                        (u.to_string(), body)
                    })
                    .collect(),
                requested: Mutex::new(Vec::new()),
            }
        }

        pub fn acme() -> Self {
            Self::new(&[
                ("https://acme.example/", "acme_home.html"),
                ("https://acme.example/services/cloud-migration", "acme_service.html"),
                ("https://acme.example/products/vault", "acme_product.html"),
                ("https://acme.example/sitemap.xml", "acme_sitemap.xml"),
            ])
        }
    }

    #[async_trait]
    impl PageSource for StaticSource {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.requested.lock().unwrap().push(url.to_string());
            self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }
}
