//! The network primitive and its retry wrapper

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, warn};
use url::Url;

use super::task::AbortToken;
use crate::error::AssetError;

/// A single failed attempt
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FetchFailure {
    pub status: Option<u16>,
    pub message: String,
}

impl FetchFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// Blocking fetch of one URL.
///
/// Implementations may be called from worker threads.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchFailure>;
}

/// Fetch `url`, retrying up to `retries` more times on failure or an empty
/// body. Stops early once `token` is aborted.
pub fn fetch_with_retry(
    fetcher: &dyn Fetcher,
    url: &str,
    retries: u32,
    token: &AbortToken,
) -> Result<Arc<Vec<u8>>, AssetError> {
    let mut last = FetchFailure::new("not attempted");

    for attempt in 0..=retries {
        if token.is_aborted() {
            return Err(AssetError::new(url, "aborted"));
        }
        match fetcher.fetch(url) {
            Ok(body) if !body.is_empty() => return Ok(Arc::new(body)),
            Ok(_) => last = FetchFailure::new("empty response"),
            Err(failure) => last = failure,
        }
        debug!("Fetch attempt {} for {url} failed: {last}", attempt + 1);
    }

    warn!("Giving up on {url}: {last}");
    let error = AssetError::new(url, last.message);
    Err(match last.status {
        Some(status) => error.with_status(status),
        None => error,
    })
}

/// Reads assets from the local filesystem.
///
/// Accepts `file://` URLs and plain paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsFetcher;

impl FsFetcher {
    fn path_for(url: &str) -> Result<PathBuf, FetchFailure> {
        if url.starts_with("file:") {
            let mut parsed = Url::parse(url).map_err(|e| FetchFailure::new(e.to_string()))?;
            parsed.set_query(None);
            return parsed
                .to_file_path()
                .map_err(|()| FetchFailure::new(format!("not a local path: {url}")));
        }
        let path = url.split('?').next().unwrap_or(url);
        Ok(PathBuf::from(path))
    }
}

impl Fetcher for FsFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchFailure> {
        let path = Self::path_for(url)?;
        fs::read(&path).map_err(|e| {
            let failure = FetchFailure::new(format!("{}: {e}", path.display()));
            if e.kind() == ErrorKind::NotFound {
                failure.with_status(404)
            } else {
                failure
            }
        })
    }
}
