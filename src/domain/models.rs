//! Domain models for quotes.
//!
//! A quote is a text/category pair with no identifier of its own; merge
//! equality is exact text match.

use serde::{Deserialize, Serialize};

use super::error::{AppError, Result};

/// Sentinel used for "every category", both on the command line and in storage.
pub const ALL_CATEGORIES: &str = "all";

/// A single quote record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// The quote itself.
    pub text: String,
    /// Category the quote belongs to.
    pub category: String,
}

impl Quote {
    /// Build a quote from user input, trimming both fields.
    ///
    /// # Errors
    /// Returns `InvalidInput` if either field is empty after trimming, or if
    /// the category is the reserved `all` filter value.
    pub fn new(text: &str, category: &str) -> Result<Self> {
        let text = text.trim();
        let category = category.trim();

        if text.is_empty() {
            return Err(AppError::invalid_input("quote text must not be empty"));
        }
        if category.is_empty() {
            return Err(AppError::invalid_input("quote category must not be empty"));
        }
        if category == ALL_CATEGORIES {
            return Err(AppError::invalid_input(format!(
                "\"{ALL_CATEGORIES}\" is reserved and cannot be used as a category"
            )));
        }

        Ok(Self {
            text: text.to_string(),
            category: category.to_string(),
        })
    }

    /// Build a quote from loosely typed JSON, as found in storage or imports.
    ///
    /// Returns `None` unless both `text` and `category` are non-empty strings.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let text = value.get("text")?.as_str()?;
        let category = value.get("category")?.as_str()?;
        Self::new(text, category).ok()
    }
}

impl std::fmt::Display for Quote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\" [{}]", self.text, self.category)
    }
}

/// The currently selected category filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// No filtering.
    #[default]
    All,
    /// Only quotes whose category equals this value.
    Named(String),
}

impl CategoryFilter {
    /// Check whether a quote passes this filter.
    #[must_use]
    pub fn matches(&self, quote: &Quote) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => quote.category == *name,
        }
    }
}

impl std::str::FromStr for CategoryFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AppError::invalid_input("category must not be empty"));
        }
        if s == ALL_CATEGORIES {
            Ok(Self::All)
        } else {
            Ok(Self::Named(s.to_string()))
        }
    }
}

impl std::fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "{ALL_CATEGORIES}"),
            Self::Named(name) => write!(f, "{name}"),
        }
    }
}

/// Outcome of importing a JSON document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Entries appended to the store.
    pub accepted: usize,
    /// Entries skipped because they were not valid quotes.
    pub rejected: usize,
}

/// Outcome of merging a remote list into the local one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Quotes received from the remote.
    pub remote_count: usize,
    /// Local quotes that survived the merge.
    pub local_kept: usize,
    /// Local quotes replaced by a remote quote with the same text.
    pub local_dropped: usize,
    /// Size of the merged list.
    pub total: usize,
}

/// The quotes shipped with the application, used when nothing valid is stored.
#[must_use]
pub fn default_quotes() -> Vec<Quote> {
    [
        (
            "The best way to get started is to quit talking and begin doing.",
            "Motivation",
        ),
        (
            "Don’t let yesterday take up too much of today.",
            "Inspiration",
        ),
        (
            "It’s not whether you get knocked down, it’s whether you get up.",
            "Resilience",
        ),
    ]
    .into_iter()
    .map(|(text, category)| Quote {
        text: text.to_string(),
        category: category.to_string(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_new_trims() {
        let quote = Quote::new("  Stay hungry.  ", " Life ").unwrap();
        assert_eq!(quote.text, "Stay hungry.");
        assert_eq!(quote.category, "Life");
    }

    #[test]
    fn test_quote_new_rejects_blank_fields() {
        assert!(matches!(
            Quote::new("   ", "Life"),
            Err(AppError::InvalidInput { .. })
        ));
        assert!(matches!(
            Quote::new("Stay hungry.", ""),
            Err(AppError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_quote_new_rejects_reserved_category() {
        assert!(matches!(
            Quote::new("Stay hungry.", " all "),
            Err(AppError::InvalidInput { .. })
        ));
        assert!(Quote::new("Stay hungry.", "All").is_ok());

        let stored = serde_json::json!({ "text": "a", "category": "all" });
        assert!(Quote::from_json(&stored).is_none());
    }

    #[test]
    fn test_quote_from_json() {
        let ok = serde_json::json!({ "text": "a", "category": "b" });
        assert!(Quote::from_json(&ok).is_some());

        let missing = serde_json::json!({ "text": "a" });
        assert!(Quote::from_json(&missing).is_none());

        let wrong_type = serde_json::json!({ "text": 1, "category": "b" });
        assert!(Quote::from_json(&wrong_type).is_none());
    }

    #[test]
    fn test_category_filter_parse() {
        assert_eq!("all".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(
            "Motivation".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Named("Motivation".into())
        );
        assert!("  ".parse::<CategoryFilter>().is_err());
        assert_eq!(CategoryFilter::All.to_string(), "all");
    }

    #[test]
    fn test_default_quotes() {
        let quotes = default_quotes();
        assert_eq!(quotes.len(), 3);
        assert_eq!(quotes[0].category, "Motivation");
    }
}
