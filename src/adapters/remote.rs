use crate::utils::error::{Result, StarmapError};
use crate::utils::validation::parse_remote_location;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Resolves catalog locations to local files, downloading URLs into a cache
/// directory the first time they are seen.
#[derive(Debug, Clone)]
pub struct RemoteFetcher {
    cache_dir: PathBuf,
    refresh: bool,
    timeout: Duration,
}

impl RemoteFetcher {
    pub fn new(cache_dir: impl Into<PathBuf>, refresh: bool) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            refresh,
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns a local path for `location`; plain paths pass through unchanged.
    pub fn resolve(&self, field: &str, location: &str) -> Result<PathBuf> {
        let Some(url) = parse_remote_location(field, location)? else {
            return Ok(PathBuf::from(location));
        };

        let target = self.cache_path(&url);

        if target.exists() && !self.refresh {
            tracing::debug!("Using cached {} for {}", target.display(), url);
            return Ok(target);
        }

        self.download(&url, &target)?;
        Ok(target)
    }

    /// Cache location for `url`: `<cache_dir>/<host>[_<port>]/<path segments>`.
    ///
    /// The file name stays the URL's last segment so the catalog format can
    /// still be detected from its extension.
    pub fn cache_path(&self, url: &Url) -> PathBuf {
        let mut host = url.host_str().unwrap_or("local").replace(':', "_");
        if let Some(port) = url.port() {
            host = format!("{}_{}", host, port);
        }

        let mut path = self.cache_dir.join(host);
        for segment in url.path_segments().into_iter().flatten() {
            if !segment.is_empty() && segment != "." && segment != ".." {
                path.push(segment);
            }
        }
        path
    }

    fn download(&self, url: &Url, target: &Path) -> Result<()> {
        let location = url.as_str();
        tracing::info!("📥 Downloading {}", location);

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| StarmapError::catalog(location, e))?;

        let response = client
            .get(location)
            .send()
            .map_err(|e| StarmapError::catalog(location, e))?;

        let status = response.status();
        tracing::debug!("Download response status: {}", status);
        if !status.is_success() {
            return Err(StarmapError::catalog(
                location,
                format!("server responded with HTTP {}", status),
            ));
        }

        let body = response
            .bytes()
            .map_err(|e| StarmapError::catalog(location, e))?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| StarmapError::catalog(location, e))?;
        }

        // 先寫入暫存檔，避免下載失敗留下殘缺的快取
        let partial = target.with_extension("part");
        let written = fs::write(&partial, &body).and_then(|_| fs::rename(&partial, target));
        if let Err(e) = written {
            let _ = fs::remove_file(&partial);
            return Err(StarmapError::catalog(location, e));
        }

        tracing::info!("💾 Cached {} bytes at {}", body.len(), target.display());
        Ok(())
    }
}
