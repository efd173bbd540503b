//! Rendering of quotes onto a display surface.
//!
//! The surface is any `io::Write`; the binary uses stdout. Supports
//! plain text, JSON and table output.

use std::io::Write;

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};
use rand::Rng;

use crate::domain::{AppError, CategoryFilter, Quote, Result, SyncState};

use super::quote_store::QuoteStore;

/// Shown by `render_one` when there is nothing to display.
pub const NO_QUOTES: &str = "No quotes available.";
/// Shown by `render_many` for an empty list.
pub const NONE_FOUND: &str = "No quotes found.";

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text blocks.
    #[default]
    Text,
    /// JSON for programmatic use.
    Json,
    /// Compact table listing.
    Table,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "table" => Ok(Self::Table),
            _ => Err(format!("Unknown format: {s}. Use: text, json, table")),
        }
    }
}

/// Pick a uniformly random index in `[0, len)`, or `None` for an empty list.
pub fn pick_random<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Option<usize> {
    if len == 0 {
        None
    } else {
        Some(rng.gen_range(0..len))
    }
}

/// Writes quotes to a display surface.
pub struct Presenter<W: Write> {
    out: W,
    format: OutputFormat,
}

impl<W: Write> Presenter<W> {
    /// Create a presenter over `out`.
    pub const fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    /// Consume the presenter, returning the surface.
    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Write raw content followed by a newline.
    ///
    /// # Errors
    /// Returns error if the surface cannot be written.
    pub fn print(&mut self, content: &str) -> Result<()> {
        writeln!(self.out, "{content}")
            .and_then(|()| self.out.flush())
            .map_err(|e| AppError::io("Failed to write to display", e))
    }

    /// Replace the display with a single quote, or the empty state.
    ///
    /// # Errors
    /// Returns error if the surface cannot be written.
    pub fn render_one(&mut self, quote: Option<&Quote>) -> Result<()> {
        let content = match (self.format, quote) {
            (OutputFormat::Json, quote) => {
                serde_json::to_string_pretty(&quote).map_err(AppError::json_parse)?
            }
            (_, None) => NO_QUOTES.to_string(),
            (OutputFormat::Table, Some(quote)) => format_table(std::slice::from_ref(quote)),
            (OutputFormat::Text, Some(quote)) => format_quote(quote),
        };
        self.print(&content)
    }

    /// Replace the display with one block per quote, or the empty state.
    ///
    /// # Errors
    /// Returns error if the surface cannot be written.
    pub fn render_many(&mut self, quotes: &[Quote]) -> Result<()> {
        let content = match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(quotes).map_err(AppError::json_parse)?
            }
            _ if quotes.is_empty() => NONE_FOUND.to_string(),
            OutputFormat::Table => format_table(quotes),
            OutputFormat::Text => quotes
                .iter()
                .map(format_quote)
                .collect::<Vec<_>>()
                .join("\n\n"),
        };
        self.print(&content)
    }

    /// Show a random quote from the selected category and remember it.
    ///
    /// # Errors
    /// Returns error if the surface cannot be written.
    pub fn show_random<R: Rng + ?Sized>(
        &mut self,
        store: &QuoteStore,
        rng: &mut R,
    ) -> Result<Option<Quote>> {
        let candidates = selected_indices(store);
        let index = pick_random(candidates.len(), rng).map(|k| candidates[k]);
        self.show_index(store, index)
    }

    /// Show the quote last displayed in this session again.
    ///
    /// Falls back to a random pick when nothing was shown yet or the last
    /// quote no longer passes the filter.
    ///
    /// # Errors
    /// Returns error if the surface cannot be written.
    pub fn show_last<R: Rng + ?Sized>(
        &mut self,
        store: &QuoteStore,
        rng: &mut R,
    ) -> Result<Option<Quote>> {
        match store
            .last_viewed()
            .filter(|i| selected_indices(store).contains(i))
        {
            Some(index) => self.show_index(store, Some(index)),
            None => self.show_random(store, rng),
        }
    }

    fn show_index(&mut self, store: &QuoteStore, index: Option<usize>) -> Result<Option<Quote>> {
        let quote = index.and_then(|i| store.quotes().get(i)).cloned();
        self.render_one(quote.as_ref())?;

        if let Some(i) = index {
            store.record_viewed(i);
        }

        Ok(quote)
    }

    /// Show the categories, marking the selected one.
    ///
    /// # Errors
    /// Returns error if the surface cannot be written.
    pub fn render_categories(
        &mut self,
        categories: &[String],
        selected: &CategoryFilter,
    ) -> Result<()> {
        let content = match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(categories).map_err(AppError::json_parse)?
            }
            _ => std::iter::once(CategoryFilter::All.to_string())
                .chain(categories.iter().cloned())
                .map(|name| {
                    if name == selected.to_string() {
                        format!("* {}", name.cyan().bold())
                    } else {
                        format!("  {name}")
                    }
                })
                .collect::<Vec<_>>()
                .join("\n"),
        };
        self.print(&content)
    }

    /// Show the store and sync status.
    ///
    /// # Errors
    /// Returns error if the surface cannot be written.
    pub fn render_status(&mut self, store: &QuoteStore, state: &SyncState) -> Result<()> {
        let content = format_status(store, state);
        self.print(&content)
    }

    /// Show a transient notification.
    ///
    /// # Errors
    /// Returns error if the surface cannot be written.
    pub fn notify(&mut self, message: &str) -> Result<()> {
        let line = format!("{} {}", "✓".green().bold(), message);
        self.print(&line)
    }

    /// Show a warning notification.
    ///
    /// # Errors
    /// Returns error if the surface cannot be written.
    pub fn warn(&mut self, message: &str) -> Result<()> {
        let line = format!("{} {}", "!".yellow().bold(), message);
        self.print(&line)
    }
}

/// Indices of the quotes passing the selected category.
fn selected_indices(store: &QuoteStore) -> Vec<usize> {
    let selected = store.selected();
    store
        .quotes()
        .iter()
        .enumerate()
        .filter(|(_, q)| selected.matches(q))
        .map(|(i, _)| i)
        .collect()
}

/// Formats a single quote as a text block.
fn format_quote(quote: &Quote) -> String {
    format!(
        "{} {}\n\"{}\"",
        "Category:".bold(),
        quote.category.cyan(),
        quote.text
    )
}

/// Formats a table listing of quotes.
fn format_table(quotes: &[Quote]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Category", "Quote"]);

    for (i, quote) in quotes.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            truncate(&quote.category, 18),
            truncate(&quote.text, 60),
        ]);
    }

    table.to_string()
}

/// Formats store and sync statistics for display.
fn format_status(store: &QuoteStore, state: &SyncState) -> String {
    let last_sync = state.last_sync.map_or_else(
        || "never".to_string(),
        |dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    );

    let storage = match store.storage().get_storage_size() {
        Ok(0) => "in memory".to_string(),
        Ok(bytes) => format!("{:.1} KB", bytes as f64 / 1024.0),
        Err(e) => {
            tracing::debug!(error = %e, "Failed to read storage size");
            "unknown".to_string()
        }
    };

    let mut out = format!(
        "{}\n  Quotes: {}\n  Categories: {}\n  Selected: {}\n  Storage: {}\n  Last sync: {}\n  Last remote count: {}",
        "📊 Status".bold(),
        store.len().to_string().cyan(),
        store.categories().len().to_string().cyan(),
        store.selected().to_string().green(),
        storage,
        last_sync.yellow(),
        state.last_remote_count,
    );

    if let Some(error) = &state.last_error {
        out.push_str(&format!("\n  Last error: {}", error.red()));
    }

    out
}

/// Truncates a string to max chars with ellipsis.
fn truncate(s: &str, max_len: usize) -> String {
    let s = s.lines().next().unwrap_or(s);
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::LocalStorage;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn memory_store() -> QuoteStore {
        QuoteStore::load(
            LocalStorage::open_in_memory().unwrap(),
            LocalStorage::open_in_memory().unwrap(),
        )
    }

    fn rendered(presenter: Presenter<Vec<u8>>) -> String {
        String::from_utf8(presenter.into_inner()).unwrap()
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world!", 8), "hello...");
        assert_eq!(truncate("Don’t let yesterday", 8), "Don’t...");
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("table".parse::<OutputFormat>(), Ok(OutputFormat::Table));
        assert!("invalid".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_pick_random_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(pick_random(0, &mut rng), None);

        for len in 1..20 {
            for _ in 0..50 {
                let index = pick_random(len, &mut rng).unwrap();
                assert!(index < len);
            }
        }
    }

    #[test]
    fn test_render_one_empty_state() {
        let mut presenter = Presenter::new(Vec::new(), OutputFormat::Text);
        presenter.render_one(None).unwrap();
        assert_eq!(rendered(presenter).trim(), NO_QUOTES);
    }

    #[test]
    fn test_render_one_shows_text_and_category() {
        let quote = Quote::new("Be brief.", "Style").unwrap();
        let mut presenter = Presenter::new(Vec::new(), OutputFormat::Text);
        presenter.render_one(Some(&quote)).unwrap();

        let out = rendered(presenter);
        assert!(out.contains("\"Be brief.\""));
        assert!(out.contains("Style"));
    }

    #[test]
    fn test_render_many_order_and_empty_state() {
        let quotes = vec![
            Quote::new("first", "A").unwrap(),
            Quote::new("second", "B").unwrap(),
        ];
        let mut presenter = Presenter::new(Vec::new(), OutputFormat::Text);
        presenter.render_many(&quotes).unwrap();
        let out = rendered(presenter);
        let first = out.find("first").unwrap();
        let second = out.find("second").unwrap();
        assert!(first < second);

        let mut presenter = Presenter::new(Vec::new(), OutputFormat::Table);
        presenter.render_many(&[]).unwrap();
        assert_eq!(rendered(presenter).trim(), NONE_FOUND);
    }

    #[test]
    fn test_render_many_json() {
        let quotes = vec![Quote::new("only", "A").unwrap()];
        let mut presenter = Presenter::new(Vec::new(), OutputFormat::Json);
        presenter.render_many(&quotes).unwrap();

        let parsed: Vec<Quote> = serde_json::from_str(&rendered(presenter)).unwrap();
        assert_eq!(parsed, quotes);
    }

    #[test]
    fn test_show_random_respects_selected_category() {
        let mut store = memory_store();
        store
            .select_category(CategoryFilter::Named("Inspiration".into()))
            .unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        let mut presenter = Presenter::new(Vec::new(), OutputFormat::Text);
        for _ in 0..10 {
            let shown = presenter.show_random(&store, &mut rng).unwrap();
            assert_eq!(shown.unwrap().category, "Inspiration");
        }
        assert_eq!(store.last_viewed(), Some(1));
    }

    #[test]
    fn test_show_last_repeats_session_quote() {
        let store = memory_store();
        let mut rng = StdRng::seed_from_u64(3);
        let mut presenter = Presenter::new(Vec::new(), OutputFormat::Text);

        let first = presenter.show_random(&store, &mut rng).unwrap();
        for _ in 0..5 {
            assert_eq!(presenter.show_last(&store, &mut rng).unwrap(), first);
        }
    }

    #[test]
    fn test_show_last_without_history_picks_from_selection() {
        let mut store = memory_store();
        store
            .select_category(CategoryFilter::Named("Motivation".into()))
            .unwrap();
        store.record_viewed(2);

        let mut rng = StdRng::seed_from_u64(3);
        let mut presenter = Presenter::new(Vec::new(), OutputFormat::Text);
        let shown = presenter.show_last(&store, &mut rng).unwrap().unwrap();

        assert_eq!(shown.category, "Motivation");
        assert_eq!(store.last_viewed(), Some(0));
    }

    #[test]
    fn test_show_on_empty_store() {
        let storage = LocalStorage::open_in_memory().unwrap();
        storage.set_value(crate::application::quote_store::QUOTES_KEY, "[]").unwrap();
        let store = QuoteStore::load(storage, LocalStorage::open_in_memory().unwrap());

        let mut rng = StdRng::seed_from_u64(3);
        let mut presenter = Presenter::new(Vec::new(), OutputFormat::Text);
        assert!(presenter.show_last(&store, &mut rng).unwrap().is_none());
        assert_eq!(rendered(presenter).trim(), NO_QUOTES);
    }

    #[test]
    fn test_render_categories_marks_selected() {
        let mut presenter = Presenter::new(Vec::new(), OutputFormat::Text);
        presenter
            .render_categories(&["A".to_string(), "B".to_string()], &CategoryFilter::All)
            .unwrap();

        let out = rendered(presenter);
        assert!(out.lines().next().unwrap().starts_with("* "));
        assert!(out.contains("  A"));
    }

    #[test]
    fn test_render_status_includes_error() {
        let store = memory_store();
        let state = SyncState::default().with_error("connection refused");

        let mut presenter = Presenter::new(Vec::new(), OutputFormat::Text);
        presenter.render_status(&store, &state).unwrap();

        let out = rendered(presenter);
        assert!(out.contains("never"));
        assert!(out.contains("connection refused"));
        assert!(out.contains("Storage: in memory"));
    }
}
