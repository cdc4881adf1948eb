//! Retrieval of dataset files.
//!
//! A [`DataSource`] knows how to read one relative dataset path; the
//! [`Fetcher`] wraps any source with the fetch timeout and JSON parsing.
//! Sources never retry; callers decide whether a failure is shown or not.

use crate::error::{DataError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use visa_core::{AppConfig, FetchConfig};

/// How much of an error body is kept in [`DataError::Fetch`].
const ERROR_BODY_CHARS: usize = 200;

/// Default fetch timeout when none is configured.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// A place the dataset can be read from.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Read the raw bytes of a dataset path such as `data/reg/00/00007.json`.
    ///
    /// # Errors
    /// Returns `DataError::NotFound` when the file does not exist and
    /// another variant for every other failure.
    async fn fetch_bytes(&self, path: &str) -> Result<Vec<u8>>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// Dataset published on a static HTTP host.
pub struct HttpSource {
    client: Client,
    base_url: Url,
    timeout: Duration,
    cache_bust: Option<AtomicU64>,
}

impl HttpSource {
    /// Create a source rooted at `base_url`.
    ///
    /// # Errors
    /// Returns error if the URL is invalid or the HTTP client cannot be created.
    pub fn new(base_url: &str, config: &FetchConfig, cache_bust: bool) -> Result<Self> {
        // Url::join drops the last segment unless the base ends with '/'
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url =
            Url::parse(&normalized).map_err(|e| DataError::InvalidUrl(format!("{base_url}: {e}")))?;

        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| DataError::InvalidUrl(format!("failed to create HTTP client: {e}")))?;

        let cache_bust = cache_bust.then(|| {
            let seed = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default();
            AtomicU64::new(seed)
        });

        Ok(Self {
            client,
            base_url,
            timeout,
            cache_bust,
        })
    }

    /// Full URL for a dataset path, including the cache-busting parameter.
    ///
    /// Every call yields a larger `v` than the previous one.
    pub fn url_for(&self, path: &str) -> Result<Url> {
        let mut url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| DataError::InvalidUrl(format!("{path}: {e}")))?;

        if let Some(counter) = &self.cache_bust {
            let version = counter.fetch_add(1, Ordering::Relaxed);
            url.query_pairs_mut()
                .append_pair("v", &version.to_string());
        }

        Ok(url)
    }
}

#[async_trait]
impl DataSource for HttpSource {
    async fn fetch_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let url = self.url_for(path)?;
        debug!(%url, "fetching dataset file");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                DataError::Timeout {
                    path: path.to_string(),
                    after: self.timeout,
                }
            } else {
                DataError::Network {
                    path: path.to_string(),
                    source: e,
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(path, status, &body));
        }

        let bytes = response.bytes().await.map_err(|e| DataError::Network {
            path: path.to_string(),
            source: e,
        })?;
        Ok(bytes.to_vec())
    }

    fn describe(&self) -> String {
        self.base_url.to_string()
    }
}

/// Map a non-success status to the error taxonomy.
///
/// Static hosts answer 404 (or 410) for files that were never published.
fn status_error(path: &str, status: StatusCode, body: &str) -> DataError {
    if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
        return DataError::NotFound {
            path: path.to_string(),
        };
    }
    DataError::Fetch {
        path: path.to_string(),
        status: status.as_u16(),
        body: body.chars().take(ERROR_BODY_CHARS).collect(),
    }
}

/// Dataset mirrored to a local directory with the same layout.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    /// Create a source rooted at `root` (the directory that contains `data/`).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(DataError::InvalidUrl(format!(
                "dataset path must stay inside the mirror: {path}"
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl DataSource for DirSource {
    async fn fetch_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let file = self.resolve(path)?;
        debug!(file = %file.display(), "reading dataset file");

        tokio::fs::read(&file).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DataError::NotFound {
                    path: path.to_string(),
                }
            } else {
                DataError::Io {
                    path: path.to_string(),
                    source: e,
                }
            }
        })
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Reads JSON documents from a [`DataSource`] with a timeout.
#[derive(Clone)]
pub struct Fetcher {
    source: Arc<dyn DataSource>,
    timeout: Duration,
}

impl Fetcher {
    /// Create a fetcher over `source` with the default timeout.
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            source,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the timeout applied to every fetch.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the fetcher described by the configuration.
    ///
    /// A local `data_dir` takes precedence over `base_url`.
    ///
    /// # Errors
    /// Returns error if neither location is configured or the URL is invalid.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let source: Arc<dyn DataSource> = if let Some(dir) = &config.source.data_dir {
            Arc::new(DirSource::new(dir.clone()))
        } else if let Some(url) = &config.source.base_url {
            Arc::new(HttpSource::new(url, &config.fetch, config.source.cache_bust)?)
        } else {
            return Err(DataError::InvalidUrl(
                "no dataset location configured (set source.base_url or source.data_dir)"
                    .to_string(),
            ));
        };

        debug!(source = %source.describe(), "dataset source selected");
        Ok(Self::new(source).with_timeout(Duration::from_secs(config.fetch.timeout_secs)))
    }

    /// Fetch and parse a JSON document.
    ///
    /// # Errors
    /// Returns `DataError::Timeout` when the source does not answer in time,
    /// `DataError::Parse` for malformed JSON, or the source's own error.
    pub async fn fetch_json(&self, path: &str) -> Result<serde_json::Value> {
        self.fetch(path).await
    }

    /// Fetch a JSON document and deserialize it into `T`.
    pub async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let bytes = tokio::time::timeout(self.timeout, self.source.fetch_bytes(path))
            .await
            .map_err(|_| DataError::Timeout {
                path: path.to_string(),
                after: self.timeout,
            })??;

        serde_json::from_slice(&bytes).map_err(|e| DataError::Parse {
            path: path.to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn http_source(cache_bust: bool) -> HttpSource {
        HttpSource::new(
            "https://example.org/VISA",
            &FetchConfig::default(),
            cache_bust,
        )
        .expect("create http source")
    }

    #[test]
    fn test_url_for_joins_base_path() {
        let source = http_source(false);
        let url = source.url_for("data/reg/00/00007.json").expect("build url");
        assert_eq!(url.as_str(), "https://example.org/VISA/data/reg/00/00007.json");
    }

    #[test]
    fn test_cache_bust_is_monotonic() {
        let source = http_source(true);
        let version = |url: Url| -> u64 {
            url.query_pairs()
                .find(|(k, _)| k == "v")
                .and_then(|(_, v)| v.parse().ok())
                .expect("cache-busting parameter")
        };

        let first = version(source.url_for(crate::layout::INDEX_PATH).expect("url"));
        let second = version(source.url_for(crate::layout::INDEX_PATH).expect("url"));
        assert!(second > first);
    }

    #[test]
    fn test_status_error_mapping() {
        let err = status_error("data/his/45/12345.json", StatusCode::NOT_FOUND, "");
        assert!(err.is_not_found());

        let long_body = "x".repeat(500);
        let err = status_error(crate::layout::INDEX_PATH, StatusCode::BAD_GATEWAY, &long_body);
        match err {
            DataError::Fetch { status, body, .. } => {
                assert_eq!(status, 502);
                assert_eq!(body.len(), ERROR_BODY_CHARS);
            }
            other => panic!("expected Fetch error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_base_url() {
        let result = HttpSource::new("not a url", &FetchConfig::default(), true);
        assert!(matches!(result, Err(DataError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_dir_source_reads_and_reports_missing() {
        let tmp = TempDir::new().expect("create temp dir");
        std::fs::create_dir_all(tmp.path().join("data")).expect("create data dir");
        std::fs::write(tmp.path().join("data/ok.json"), br#"{"ok": true}"#).expect("write file");

        let fetcher = Fetcher::new(Arc::new(DirSource::new(tmp.path())));
        let value = fetcher.fetch_json("data/ok.json").await.expect("fetch json");
        assert_eq!(value["ok"], serde_json::Value::Bool(true));

        let err = fetcher
            .fetch_json("data/absent.json")
            .await
            .expect_err("missing file");
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_malformed_json_is_parse_error() {
        let tmp = TempDir::new().expect("create temp dir");
        std::fs::create_dir_all(tmp.path().join("data")).expect("create data dir");
        std::fs::write(tmp.path().join("data/bad.json"), b"{not json").expect("write file");

        let fetcher = Fetcher::new(Arc::new(DirSource::new(tmp.path())));
        let err = fetcher.fetch_json("data/bad.json").await.expect_err("bad json");
        assert!(matches!(err, DataError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_dir_source_rejects_escaping_paths() {
        let tmp = TempDir::new().expect("create temp dir");
        let source = DirSource::new(tmp.path());
        let err = source
            .fetch_bytes("data/../../etc/passwd")
            .await
            .expect_err("escaping path");
        assert!(matches!(err, DataError::InvalidUrl(_)));
    }

    struct StalledSource;

    #[async_trait]
    impl DataSource for StalledSource {
        async fn fetch_bytes(&self, _path: &str) -> Result<Vec<u8>> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Vec::new())
        }

        fn describe(&self) -> String {
            "stalled".to_string()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_times_out() {
        let fetcher =
            Fetcher::new(Arc::new(StalledSource)).with_timeout(Duration::from_secs(2));
        let err = fetcher
            .fetch_json(crate::layout::INDEX_PATH)
            .await
            .expect_err("should time out");
        assert!(err.is_timeout());
    }

    /// Answer `count` requests on a loopback port: `/VISA/data/ok.json`
    /// gets a JSON body, everything else a 404. Returns the base URL and
    /// the request lines seen.
    async fn serve(count: usize) -> (String, tokio::task::JoinHandle<Vec<String>>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let base = format!("http://{}/VISA", listener.local_addr().expect("local addr"));

        let handle = tokio::spawn(async move {
            let mut seen = Vec::new();
            for _ in 0..count {
                let (mut socket, _) = listener.accept().await.expect("accept");
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = socket.read(&mut buf).await.expect("read request");
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }
                let text = String::from_utf8_lossy(&request);
                let line = text.lines().next().unwrap_or_default().to_string();

                let response = if line.starts_with("GET /VISA/data/ok.json?") {
                    let body = r#"{"ok": true}"#;
                    format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    )
                } else {
                    "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                        .to_string()
                };
                socket
                    .write_all(response.as_bytes())
                    .await
                    .expect("write response");
                seen.push(line);
            }
            seen
        });
        (base, handle)
    }

    #[tokio::test]
    async fn test_http_source_sends_version_and_maps_404() {
        let (base, server) = serve(2).await;
        let source = HttpSource::new(&base, &FetchConfig::default(), true).expect("http source");

        let body = source.fetch_bytes("data/ok.json").await.expect("fetch ok");
        assert_eq!(body, br#"{"ok": true}"#);

        let err = source
            .fetch_bytes("data/his/45/12345.json")
            .await
            .expect_err("missing file");
        assert!(err.is_not_found());

        let seen = server.await.expect("server task");
        assert_eq!(seen.len(), 2);
        assert!(seen[0].starts_with("GET /VISA/data/ok.json?v="));
        assert!(seen[1].starts_with("GET /VISA/data/his/45/12345.json?v="));
    }

    #[test]
    fn test_from_config_requires_location() {
        let config = AppConfig::default();
        assert!(matches!(
            Fetcher::from_config(&config),
            Err(DataError::InvalidUrl(_))
        ));
    }
}
