//! Where dataset documents come from.
//!
//! The cache only ever asks a [`DatasetSource`] for the raw bytes of one named
//! resource. Production reads over HTTP, offline setups read a directory of
//! pre-downloaded files, and tests or embedders hand over bytes directly.

use std::{
    collections::HashMap,
    future::Future,
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
};

use bytes::Bytes;
use tracing::{debug, info, instrument};

use crate::{DataError, Result};

/// Fetches a dataset resource by name.
pub trait DatasetSource: Send + Sync {
    /// Returns the raw document for `resource` (e.g. `"MasterSet_barcelona.json"`).
    fn fetch(&self, resource: &str) -> impl Future<Output = Result<Bytes>> + Send;
}

/// Reads resources with a plain GET against a base URL.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

#[cfg(feature = "http")]
impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Uses the base URL configured through `MASTERSET_DATA_URL`.
    pub fn from_env() -> Self {
        Self::new(crate::DATA_URL.as_str())
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn resource_url(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url, resource)
    }
}

#[cfg(feature = "http")]
impl DatasetSource for HttpSource {
    #[instrument(name = "Fetch dataset over HTTP", skip(self), level = "debug")]
    async fn fetch(&self, resource: &str) -> Result<Bytes> {
        let url = self.resource_url(resource);
        info!(url, "Starting download");
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let body = response.bytes().await?;
        debug!(url, bytes = body.len(), "Download complete");
        Ok(body)
    }
}

/// Reads resources from files in a local directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DatasetSource for DirectorySource {
    async fn fetch(&self, resource: &str) -> Result<Bytes> {
        let path = self.dir.join(resource);
        debug!(path = %path.display(), "Reading dataset file");
        match tokio::fs::read(&path).await {
            Ok(contents) => Ok(Bytes::from(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(DataError::ResourceNotFound(path.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Serves resources from memory and counts how often it was asked.
#[derive(Debug, Default)]
pub struct MemorySource {
    resources: HashMap<String, Bytes>,
    fetches: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource(mut self, resource: impl Into<String>, body: impl Into<Bytes>) -> Self {
        self.insert(resource, body);
        self
    }

    pub fn insert(&mut self, resource: impl Into<String>, body: impl Into<Bytes>) {
        self.resources.insert(resource.into(), body.into());
    }

    /// Number of `fetch` calls so far, successful or not.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl DatasetSource for MemorySource {
    async fn fetch(&self, resource: &str) -> Result<Bytes> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.resources
            .get(resource)
            .cloned()
            .ok_or_else(|| DataError::ResourceNotFound(resource.to_string()))
    }
}

impl<S: DatasetSource> DatasetSource for std::sync::Arc<S> {
    fn fetch(&self, resource: &str) -> impl Future<Output = Result<Bytes>> + Send {
        (**self).fetch(resource)
    }
}
