use std::collections::BTreeMap;
use std::fmt::Write as _;

use common::transforms::numbers::{Sentiment, PLACEHOLDER};
use strum::IntoEnumIterator;

use crate::view::{DashboardView, Field};

#[derive(Debug, Clone, PartialEq)]
struct Cell {
    text: String,
    sentiment: Option<Sentiment>,
}

/// Console stand-in for the page: keeps the last value of every field and
/// prints a panel on demand.
#[derive(Debug, Default)]
pub struct TerminalView {
    cells: BTreeMap<Field, Cell>,
    loading: bool,
    error: Option<String>,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self, field: Field) -> Option<&str> {
        self.cells.get(&field).map(|cell| cell.text.as_str())
    }

    pub fn sentiment(&self, field: Field) -> Option<Sentiment> {
        self.cells.get(&field).and_then(|cell| cell.sentiment)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn summary(&self) -> String {
        let mut out = String::new();
        if let Some(error) = &self.error {
            let _ = writeln!(out, "!! {error}");
        }
        for field in Field::iter() {
            let (text, marker) = match self.cells.get(&field) {
                Some(cell) => (cell.text.as_str(), marker(cell.sentiment)),
                None => (PLACEHOLDER, " "),
            };
            let _ = writeln!(out, "{marker} {:<28} {text}", field.as_ref());
        }
        out
    }
}

fn marker(sentiment: Option<Sentiment>) -> &'static str {
    match sentiment {
        Some(Sentiment::Positive) => "▲",
        Some(Sentiment::Negative) => "▼",
        None => " ",
    }
}

impl DashboardView for TerminalView {
    fn set_text(&mut self, field: Field, text: &str) {
        log::debug!("{field} = {text}");
        self.cells
            .entry(field)
            .and_modify(|cell| cell.text = text.to_string())
            .or_insert_with(|| Cell {
                text: text.to_string(),
                sentiment: None,
            });
    }

    fn set_sentiment(&mut self, field: Field, sentiment: Sentiment) {
        log::debug!("{field} is {sentiment}");
        self.cells
            .entry(field)
            .or_insert_with(|| Cell {
                text: PLACEHOLDER.to_string(),
                sentiment: None,
            })
            .sentiment = Some(sentiment);
    }

    fn set_loading(&mut self, visible: bool) {
        if visible && !self.loading {
            log::info!("Loading...");
        }
        self.loading = visible;
    }

    fn show_error(&mut self, message: &str) {
        log::error!("{message}");
        self.error = Some(message.to_string());
    }

    fn hide_error(&mut self) {
        if self.error.take().is_some() {
            log::info!("Error banner dismissed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::FieldUpdate;

    #[test]
    fn test_sentiment_replaces_previous() {
        let mut view = TerminalView::new();
        FieldUpdate::styled(Field::PriceChange, "+$1.00 (0.10%)", Sentiment::Positive)
            .apply(&mut view);
        FieldUpdate::styled(Field::PriceChange, "$-2.00 (-0.20%)", Sentiment::Negative)
            .apply(&mut view);

        assert_eq!(view.text(Field::PriceChange), Some("$-2.00 (-0.20%)"));
        assert_eq!(view.sentiment(Field::PriceChange), Some(Sentiment::Negative));
    }

    #[test]
    fn test_plain_text_keeps_sentiment() {
        let mut view = TerminalView::new();
        view.set_sentiment(Field::Volume, Sentiment::Negative);
        view.set_text(Field::Volume, "$10.00");
        assert_eq!(view.sentiment(Field::Volume), Some(Sentiment::Negative));
    }

    #[test]
    fn test_summary_lists_every_field() {
        let mut view = TerminalView::new();
        view.set_text(Field::CurrentPrice, "$100.00");
        view.show_error("Error: boom");

        let summary = view.summary();
        assert!(summary.starts_with("!! Error: boom\n"));
        assert!(summary.contains("current-price"));
        assert!(summary.contains("$100.00"));
        assert_eq!(summary.lines().count(), Field::iter().count() + 1);

        view.hide_error();
        assert!(view.error().is_none());
        assert!(!view.summary().contains("boom"));
    }

    #[test]
    fn test_loading_toggle() {
        let mut view = TerminalView::new();
        view.set_loading(true);
        assert!(view.is_loading());
        view.set_loading(false);
        assert!(!view.is_loading());
    }
}
