//! The quote store.
//!
//! Owns the in-memory quote list and mirrors it to persistent storage.
//! A second, process-lifetime storage holds session data (the last
//! displayed quote).

use std::collections::HashSet;

use serde_json::Value;

use crate::domain::{
    default_quotes, AppError, CategoryFilter, ImportReport, Quote, Result, SyncReport,
};
use crate::infrastructure::LocalStorage;

/// Key of the serialized quote list.
pub const QUOTES_KEY: &str = "quotes_local_storage";
/// Key of the persisted category filter.
pub const SELECTED_CATEGORY_KEY: &str = "selected_category";
/// Session key of the last displayed quote index.
pub const LAST_VIEWED_KEY: &str = "quotes_last_viewed_index";

/// Owner of the quote collection.
pub struct QuoteStore {
    quotes: Vec<Quote>,
    selected: CategoryFilter,
    storage: LocalStorage,
    session: LocalStorage,
}

impl QuoteStore {
    /// Load the store from `storage`.
    ///
    /// Missing or invalid data falls back to the built-in quotes; this never
    /// fails.
    #[must_use]
    pub fn load(storage: LocalStorage, session: LocalStorage) -> Self {
        let quotes = match storage.get_value(QUOTES_KEY) {
            Ok(Some(data)) => parse_stored_quotes(&data).unwrap_or_else(|| {
                tracing::warn!("Stored quotes are invalid, using defaults");
                default_quotes()
            }),
            Ok(None) => {
                tracing::debug!("No stored quotes, using defaults");
                default_quotes()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored quotes, using defaults");
                default_quotes()
            }
        };

        let mut store = Self {
            quotes,
            selected: CategoryFilter::All,
            storage,
            session,
        };
        store.selected = store.load_selected();

        tracing::info!(
            quotes = store.quotes.len(),
            selected = %store.selected,
            "Loaded quote store"
        );

        store
    }

    fn load_selected(&self) -> CategoryFilter {
        let stored = match self.storage.get_value(SELECTED_CATEGORY_KEY) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read selected category");
                None
            }
        };

        match stored.and_then(|s| s.parse::<CategoryFilter>().ok()) {
            Some(CategoryFilter::Named(name)) if self.has_category(&name) => {
                CategoryFilter::Named(name)
            }
            Some(CategoryFilter::Named(name)) => {
                tracing::debug!(category = %name, "Selected category no longer present");
                CategoryFilter::All
            }
            _ => CategoryFilter::All,
        }
    }

    /// Write the current list to persistent storage.
    ///
    /// # Errors
    /// Returns error if serialization or the storage write fails.
    pub fn save(&self) -> Result<()> {
        let data = serde_json::to_string(&self.quotes).map_err(AppError::json_parse)?;
        self.storage.set_value(QUOTES_KEY, &data)
    }

    /// Save, logging instead of propagating a failure.
    fn persist(&self) -> bool {
        match self.save() {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Failed to persist quotes");
                false
            }
        }
    }

    /// Append a new quote.
    ///
    /// # Errors
    /// Returns `InvalidInput` and leaves the list untouched if either field
    /// is empty after trimming.
    pub fn add(&mut self, text: &str, category: &str) -> Result<Quote> {
        let quote = Quote::new(text, category)?;

        self.quotes.push(quote.clone());
        self.persist();
        self.record_viewed(self.quotes.len() - 1);

        tracing::info!(category = %quote.category, "Added quote");
        Ok(quote)
    }

    /// All quotes in insertion order.
    #[must_use]
    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    /// Number of quotes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// Distinct categories in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();
        for quote in &self.quotes {
            if !categories.contains(&quote.category) {
                categories.push(quote.category.clone());
            }
        }
        categories
    }

    fn has_category(&self, name: &str) -> bool {
        self.quotes.iter().any(|q| q.category == name)
    }

    /// Quotes passing `filter`, in list order.
    #[must_use]
    pub fn filter(&self, filter: &CategoryFilter) -> Vec<Quote> {
        self.quotes
            .iter()
            .filter(|q| filter.matches(q))
            .cloned()
            .collect()
    }

    /// The persisted category filter.
    #[must_use]
    pub const fn selected(&self) -> &CategoryFilter {
        &self.selected
    }

    /// Change and persist the category filter.
    ///
    /// # Errors
    /// Returns `InvalidInput` for a category no quote carries.
    pub fn select_category(&mut self, filter: CategoryFilter) -> Result<()> {
        if let CategoryFilter::Named(name) = &filter {
            if !self.has_category(name) {
                return Err(AppError::invalid_input(format!("unknown category: {name}")));
            }
        }

        self.set_selected(filter);
        Ok(())
    }

    fn set_selected(&mut self, filter: CategoryFilter) {
        if let Err(e) = self
            .storage
            .set_value(SELECTED_CATEGORY_KEY, &filter.to_string())
        {
            tracing::error!(error = %e, "Failed to persist selected category");
        }
        self.selected = filter;
    }

    /// Merge a remote list into the store, remote side authoritative.
    ///
    /// The result holds every remote quote in remote order, followed by the
    /// local quotes whose text no remote quote shares. Only the first entry
    /// for a given text is kept.
    pub fn merge(&mut self, remote: Vec<Quote>) -> SyncReport {
        let local = std::mem::take(&mut self.quotes);
        let local_count = local.len();

        let mut seen: HashSet<String> = HashSet::new();
        let mut merged: Vec<Quote> = remote
            .into_iter()
            .filter(|q| seen.insert(q.text.clone()))
            .collect();
        let remote_count = merged.len();
        merged.extend(local.into_iter().filter(|l| seen.insert(l.text.clone())));
        let local_kept = merged.len() - remote_count;

        self.quotes = merged;
        self.persist();

        if let CategoryFilter::Named(name) = &self.selected {
            if !self.has_category(name) {
                tracing::debug!(category = %name, "Selected category emptied by merge");
                self.set_selected(CategoryFilter::All);
            }
        }

        let report = SyncReport {
            remote_count,
            local_kept,
            local_dropped: local_count - local_kept,
            total: self.quotes.len(),
        };

        tracing::info!(
            remote = report.remote_count,
            kept = report.local_kept,
            dropped = report.local_dropped,
            total = report.total,
            "Merged remote quotes"
        );

        report
    }

    /// Serialize the full list as a pretty JSON document.
    ///
    /// # Errors
    /// Returns error if serialization fails.
    pub fn export_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.quotes).map_err(AppError::json_parse)
    }

    /// Append the valid entries of a JSON document.
    ///
    /// # Errors
    /// Returns error if the document is not valid JSON or not an array.
    pub fn import_json(&mut self, document: &str) -> Result<ImportReport> {
        let value: Value = serde_json::from_str(document).map_err(AppError::json_parse)?;
        let items = value
            .as_array()
            .ok_or_else(|| AppError::invalid_input("imported JSON must be an array of quotes"))?;

        let mut report = ImportReport::default();
        for item in items {
            match Quote::from_json(item) {
                Some(quote) => {
                    self.quotes.push(quote);
                    report.accepted += 1;
                }
                None => report.rejected += 1,
            }
        }

        if report.accepted > 0 {
            self.persist();
        }

        tracing::info!(
            accepted = report.accepted,
            rejected = report.rejected,
            "Imported quotes"
        );

        Ok(report)
    }

    /// Index of the quote last displayed in this session, if still valid.
    #[must_use]
    pub fn last_viewed(&self) -> Option<usize> {
        let value = match self.session.get_value(LAST_VIEWED_KEY) {
            Ok(value) => value?,
            Err(e) => {
                tracing::debug!(error = %e, "Failed to read session state");
                return None;
            }
        };

        value
            .parse::<usize>()
            .ok()
            .filter(|&index| index < self.quotes.len())
    }

    /// Remember `index` as the last displayed quote for this session.
    pub fn record_viewed(&self, index: usize) {
        if let Err(e) = self.session.set_value(LAST_VIEWED_KEY, &index.to_string()) {
            tracing::debug!(error = %e, "Failed to write session state");
        }
    }

    /// The storage backing this store.
    #[must_use]
    pub const fn storage(&self) -> &LocalStorage {
        &self.storage
    }
}

/// Parse a stored list, keeping valid entries.
///
/// Returns `None` when the data is not a JSON array.
fn parse_stored_quotes(data: &str) -> Option<Vec<Quote>> {
    let value: Value = serde_json::from_str(data).ok()?;
    let items = value.as_array()?;
    Some(items.iter().filter_map(Quote::from_json).collect())
}
