//! HTTP client for the remote quote endpoint.
//!
//! The endpoint is a plain JSON collection: `GET` returns an array of items,
//! `POST` accepts a single quote. Items are mapped onto [`Quote`] leniently,
//! since the remote does not have to speak our exact schema.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::domain::{AppError, Quote, RemoteConfig, Result};

/// A source of remote quotes.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch the remote collection mapped onto quotes.
    ///
    /// # Errors
    /// Returns error on transport, status or decoding failures.
    async fn fetch(&self) -> Result<Vec<Quote>>;

    /// Send a single quote to the remote collection.
    ///
    /// # Errors
    /// Returns error on transport or status failures.
    async fn push(&self, quote: &Quote) -> Result<()>;
}

/// `RemoteSource` backed by a JSON HTTP endpoint.
#[derive(Clone)]
pub struct HttpRemote {
    client: Client,
    endpoint: String,
    default_category: String,
    fetch_limit: usize,
}

impl HttpRemote {
    /// Create a client for the configured endpoint.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::remote("Failed to build HTTP client", e))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            default_category: config.default_category.clone(),
            fetch_limit: config.fetch_limit,
        })
    }

    /// The configured endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RemoteSource for HttpRemote {
    async fn fetch(&self) -> Result<Vec<Quote>> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| AppError::remote(format!("GET {} failed", self.endpoint), e))?
            .error_for_status()
            .map_err(|e| AppError::remote(format!("GET {} returned an error", self.endpoint), e))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::remote("Failed to decode remote response", e))?;

        map_remote_items(&body, &self.default_category, self.fetch_limit)
    }

    async fn push(&self, quote: &Quote) -> Result<()> {
        self.client
            .post(&self.endpoint)
            .json(quote)
            .send()
            .await
            .map_err(|e| AppError::remote(format!("POST {} failed", self.endpoint), e))?
            .error_for_status()
            .map_err(|e| {
                AppError::remote(format!("POST {} returned an error", self.endpoint), e)
            })?;

        tracing::debug!(endpoint = %self.endpoint, "Pushed quote");
        Ok(())
    }
}

impl std::fmt::Debug for HttpRemote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRemote")
            .field("endpoint", &self.endpoint)
            .field("fetch_limit", &self.fetch_limit)
            .finish_non_exhaustive()
    }
}

/// Map a remote JSON collection onto quotes.
///
/// `text` comes from `text`, `title` or `body` (first non-empty string);
/// `category` from `category`, else `default_category`. Items that yield no
/// text are skipped. At most `limit` quotes are returned.
///
/// # Errors
/// Returns error if the document is not an array.
pub fn map_remote_items(body: &Value, default_category: &str, limit: usize) -> Result<Vec<Quote>> {
    let items = body.as_array().ok_or_else(|| AppError::JsonParse {
        message: "remote response is not a JSON array".into(),
        source: None,
    })?;

    let quotes: Vec<Quote> = items
        .iter()
        .filter_map(|item| map_remote_item(item, default_category))
        .take(limit)
        .collect();

    if quotes.len() < items.len().min(limit) {
        tracing::debug!(
            received = items.len(),
            mapped = quotes.len(),
            "Skipped unmappable remote items"
        );
    }

    Ok(quotes)
}

fn map_remote_item(item: &Value, default_category: &str) -> Option<Quote> {
    let text = ["text", "title", "body"]
        .iter()
        .filter_map(|field| item.get(field).and_then(Value::as_str))
        .find(|s| !s.trim().is_empty())?;

    let category = item
        .get("category")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_category);

    Quote::new(text, category).ok()
}
