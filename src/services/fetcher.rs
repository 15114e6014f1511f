// src/services/fetcher.rs

//! Conditional fetcher for status page documents.
//!
//! Remembers the `ETag` / `Last-Modified` validators of the last successful
//! response per URL and sends them back as `If-None-Match` /
//! `If-Modified-Since`, so an unchanged page costs a 304 and no parsing.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{
    ETAG, HeaderMap, HeaderName, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED,
};
use reqwest::{Client, StatusCode};

use crate::error::{AppError, Result};
use crate::models::IncidentsDocument;

/// Validators returned by the server for one URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validators {
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

impl Validators {
    fn from_headers(headers: &HeaderMap) -> Self {
        let read = |name: HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Self {
            etag: read(ETAG),
            last_modified: read(LAST_MODIFIED),
        }
    }
}

/// Result of one fetch attempt.
#[derive(Debug)]
pub enum FetchOutcome {
    /// A fresh document was downloaded and parsed
    Document(IncidentsDocument),
    /// The server answered 304 Not Modified
    Unchanged,
    /// Transport error, timeout, unexpected status or unparseable body
    Failed,
}

/// Anything that can produce the current document for a URL.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetch the document. Never fails; errors are reported as
    /// [`FetchOutcome::Failed`].
    async fn fetch(&self, url: &str) -> FetchOutcome;
}

/// HTTP fetcher with a per-URL validator cache.
pub struct StatusPageFetcher {
    client: Client,
    timeout: Option<Duration>,
    cache: Mutex<HashMap<String, Validators>>,
}

impl StatusPageFetcher {
    /// Create a fetcher on top of a (possibly shared) client.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            timeout: None,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Bound each request by `timeout` instead of the client default.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Validators currently stored for `url`.
    pub fn validators(&self, url: &str) -> Option<Validators> {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
    }

    fn store_validators(&self, url: &str, validators: Validators) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string(), validators);
    }

    /// `Ok(None)` means 304.
    async fn try_fetch(&self, url: &str) -> Result<Option<IncidentsDocument>> {
        let mut request = self.client.get(url);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        if let Some(cached) = self.validators(url) {
            if let Some(etag) = &cached.etag {
                request = request.header(IF_NONE_MATCH, etag.as_str());
            }
            if let Some(last_modified) = &cached.last_modified {
                request = request.header(IF_MODIFIED_SINCE, last_modified.as_str());
            }
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_MODIFIED {
            log::debug!("304 Not Modified, no new data at {}", url);
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::status(url, status));
        }

        let validators = Validators::from_headers(response.headers());
        let body = response.bytes().await?;
        let document = IncidentsDocument::from_slice(&body)?;

        // A body that fails to parse leaves the old validators in place,
        // so the next poll downloads the document again.
        self.store_validators(url, validators);
        Ok(Some(document))
    }
}

#[async_trait]
impl DocumentSource for StatusPageFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        match self.try_fetch(url).await {
            Ok(Some(document)) => FetchOutcome::Document(document),
            Ok(None) => FetchOutcome::Unchanged,
            Err(e) if e.is_timeout() => {
                log::warn!("Timeout fetching {}", url);
                FetchOutcome::Failed
            }
            Err(e) => {
                log::warn!("Failed to fetch {}: {}", url, e);
                FetchOutcome::Failed
            }
        }
    }
}
