//! Search box state: query, derived suggestions, dropdown visibility and
//! the emission of normalized symbols to the owning container.

use crate::catalog::Catalog;

pub const MAX_SUGGESTIONS: usize = 5;

/// Separator between symbol and name in suggestion rows and chip fill text.
pub const SYMBOL_SEPARATOR: &str = " - ";

/// Suggestions for `query`, in catalog order, at most [`MAX_SUGGESTIONS`].
pub fn suggest(query: &str, catalog: &Catalog) -> Vec<String> {
    if query.trim().is_empty() {
        return Vec::new();
    }

    let term = query.to_uppercase();
    catalog
        .entries()
        .iter()
        .filter(|e| e.symbol.contains(&term) || e.full_name.to_uppercase().contains(&term))
        .take(MAX_SUGGESTIONS)
        .map(|e| e.suggestion_label())
        .collect()
}

/// First `" - "` segment, trimmed and uppercased. Idempotent.
pub fn normalize_symbol(input: &str) -> String {
    input
        .split(SYMBOL_SEPARATOR)
        .next()
        .unwrap_or_default()
        .trim()
        .to_uppercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    Input(String),
    Focus,
    Blur,
    Key(Key),
    SearchButton,
    /// Index into the currently displayed suggestion rows.
    SuggestionClicked(usize),
    ChipClicked(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    EnterKey,
    SearchButton,
    Suggestion,
    Chip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub symbol: String,
    pub trigger: Trigger,
}

#[derive(Debug, Clone)]
pub struct SearchBox {
    catalog: Catalog,
    query: String,
    suggestions: Vec<String>,
    focused: bool,
    // Set by focus or typing, cleared once a search is emitted.
    interacted: bool,
    loading: bool,
}

impl SearchBox {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            query: String::new(),
            suggestions: Vec::new(),
            focused: false,
            interacted: false,
            loading: false,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn suggestions_visible(&self) -> bool {
        self.interacted && !self.suggestions.is_empty() && !self.loading
    }

    /// Applies one UI event. Returns the request to issue, if the event emits one.
    pub fn handle(&mut self, event: SearchEvent) -> Option<SearchRequest> {
        match event {
            SearchEvent::Input(text) => {
                self.set_query(text);
                self.interacted = true;
                None
            }
            SearchEvent::Focus => {
                self.focused = true;
                self.interacted = true;
                None
            }
            SearchEvent::Blur => {
                self.focused = false;
                None
            }
            SearchEvent::Key(Key::Enter) if self.focused => self.submit_query(Trigger::EnterKey),
            SearchEvent::Key(_) => None,
            SearchEvent::SearchButton => self.submit_query(Trigger::SearchButton),
            SearchEvent::SuggestionClicked(index) => {
                // Rows can only be clicked while the dropdown is shown.
                if !self.suggestions_visible() {
                    return None;
                }
                let suggestion = self.suggestions.get(index)?.clone();
                let symbol = normalize_symbol(&suggestion);
                self.set_query(suggestion);
                self.emit(symbol, Trigger::Suggestion)
            }
            SearchEvent::ChipClicked(symbol) => {
                if self.loading {
                    return None;
                }
                let Some(chip) = self.catalog.chip(&normalize_symbol(&symbol)) else {
                    tracing::debug!(%symbol, "not a popular chip");
                    return None;
                };
                self.set_query(chip.fill_text());
                self.emit(chip.symbol.to_string(), Trigger::Chip)
            }
        }
    }

    fn set_query(&mut self, text: String) {
        self.suggestions = suggest(&text, &self.catalog);
        self.query = text;
    }

    fn submit_query(&mut self, trigger: Trigger) -> Option<SearchRequest> {
        if self.loading || self.query.is_empty() {
            return None;
        }
        let symbol = normalize_symbol(&self.query);
        self.emit(symbol, trigger)
    }

    fn emit(&mut self, symbol: String, trigger: Trigger) -> Option<SearchRequest> {
        if symbol.is_empty() {
            return None;
        }
        self.interacted = false;
        tracing::debug!(%symbol, ?trigger, "search emitted");
        Some(SearchRequest { symbol, trigger })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_box() -> SearchBox {
        SearchBox::new(Catalog::builtin())
    }

    #[test]
    fn empty_or_whitespace_query_yields_no_suggestions() {
        let catalog = Catalog::builtin();
        assert!(suggest("", &catalog).is_empty());
        assert!(suggest("   \t", &catalog).is_empty());

        let mut sb = search_box();
        sb.handle(SearchEvent::Focus);
        sb.handle(SearchEvent::Input("  ".to_string()));
        assert!(sb.suggestions().is_empty());
        assert!(!sb.suggestions_visible());
    }

    #[test]
    fn ap_matches_apple() {
        let s = suggest("AP", &Catalog::builtin());
        assert!(s.contains(&"AAPL - Apple Inc.".to_string()));
    }

    #[test]
    fn matching_is_case_insensitive_and_checks_names() {
        let s = suggest("disney", &Catalog::builtin());
        assert_eq!(s, vec!["DIS - The Walt Disney Company".to_string()]);
    }

    #[test]
    fn suggestions_are_capped_and_keep_catalog_order() {
        let catalog = Catalog::builtin();
        for q in ["a", "i", "n", "inc", "o", "m", "t", "e", "."] {
            let s = suggest(q, &catalog);
            assert!(s.len() <= MAX_SUGGESTIONS, "{q}: {s:?}");
            let term = q.to_uppercase();
            for label in &s {
                let symbol = normalize_symbol(label);
                let entry = catalog.find(&symbol).unwrap();
                assert!(
                    entry.symbol.contains(&term) || entry.full_name.to_uppercase().contains(&term)
                );
            }
        }

        // "A" hits more than five entries; the first five in catalog order survive.
        let s = suggest("a", &catalog);
        assert_eq!(
            s,
            vec![
                "AAPL - Apple Inc.",
                "GOOG - Alphabet Inc.",
                "TSLA - Tesla, Inc.",
                "MSFT - Microsoft Corporation",
                "AMZN - Amazon.com, Inc.",
            ]
        );
    }

    #[test]
    fn normalization_splits_trims_uppercases() {
        assert_eq!(normalize_symbol("AAPL - Apple Inc."), "AAPL");
        assert_eq!(normalize_symbol("  msft "), "MSFT");
        assert_eq!(normalize_symbol("nvda - NVIDIA - extra"), "NVDA");
        assert_eq!(normalize_symbol("BRK-B"), "BRK-B");
    }

    #[test]
    fn normalization_is_idempotent() {
        for s in ["AAPL - Apple Inc.", " tsla", "jpm - JPMorgan Chase & Co.", ""] {
            let once = normalize_symbol(s);
            assert_eq!(normalize_symbol(&once), once);
        }
    }

    #[test]
    fn enter_emits_only_when_focused() {
        let mut sb = search_box();
        sb.handle(SearchEvent::Input("aapl".to_string()));
        assert_eq!(sb.handle(SearchEvent::Key(Key::Enter)), None);

        sb.handle(SearchEvent::Focus);
        let req = sb.handle(SearchEvent::Key(Key::Enter)).unwrap();
        assert_eq!(req.symbol, "AAPL");
        assert_eq!(req.trigger, Trigger::EnterKey);
        assert_eq!(sb.handle(SearchEvent::Key(Key::Other)), None);
    }

    #[test]
    fn button_submits_formatted_query() {
        let mut sb = search_box();
        sb.handle(SearchEvent::Input("msft - Microsoft Corporation".to_string()));
        let req = sb.handle(SearchEvent::SearchButton).unwrap();
        assert_eq!(req.symbol, "MSFT");
        assert_eq!(req.trigger, Trigger::SearchButton);
    }

    #[test]
    fn blank_query_does_not_emit() {
        let mut sb = search_box();
        assert_eq!(sb.handle(SearchEvent::SearchButton), None);
        sb.handle(SearchEvent::Input("   ".to_string()));
        assert_eq!(sb.handle(SearchEvent::SearchButton), None);
    }

    #[test]
    fn suggestion_click_fills_query_and_hides_dropdown() {
        let mut sb = search_box();
        sb.handle(SearchEvent::Focus);
        sb.handle(SearchEvent::Input("ap".to_string()));
        assert!(sb.suggestions_visible());

        let req = sb.handle(SearchEvent::SuggestionClicked(0)).unwrap();
        assert_eq!(req.symbol, "AAPL");
        assert_eq!(req.trigger, Trigger::Suggestion);
        assert_eq!(sb.query(), "AAPL - Apple Inc.");
        assert!(!sb.suggestions_visible());
    }

    #[test]
    fn hidden_suggestion_rows_cannot_be_clicked() {
        let mut sb = search_box();
        sb.handle(SearchEvent::Focus);
        sb.handle(SearchEvent::Input("ap".to_string()));
        assert!(sb.handle(SearchEvent::SearchButton).is_some());
        sb.set_loading(false);

        // The rows for the submitted query are still derived but no longer shown.
        assert_eq!(sb.suggestions().to_vec(), vec!["AAPL - Apple Inc.".to_string()]);
        assert!(!sb.suggestions_visible());
        assert_eq!(sb.handle(SearchEvent::SuggestionClicked(0)), None);

        // Typing again reopens the dropdown.
        sb.handle(SearchEvent::Input("app".to_string()));
        assert!(sb.suggestions_visible());
        assert!(sb.handle(SearchEvent::SuggestionClicked(0)).is_some());
    }

    #[test]
    fn suggestion_click_out_of_range_is_ignored() {
        let mut sb = search_box();
        sb.handle(SearchEvent::Input("ap".to_string()));
        assert_eq!(sb.handle(SearchEvent::SuggestionClicked(42)), None);
    }

    #[test]
    fn chip_click_fills_short_name_and_emits() {
        let mut sb = search_box();
        let req = sb
            .handle(SearchEvent::ChipClicked("GOOG".to_string()))
            .unwrap();
        assert_eq!(req.symbol, "GOOG");
        assert_eq!(req.trigger, Trigger::Chip);
        assert_eq!(sb.query(), "GOOG - Google");
    }

    #[test]
    fn unknown_chip_is_ignored() {
        let mut sb = search_box();
        sb.handle(SearchEvent::Input("dis".to_string()));
        assert_eq!(sb.handle(SearchEvent::ChipClicked("WMT".to_string())), None);
        assert_eq!(sb.query(), "dis");

        let req = sb.handle(SearchEvent::ChipClicked("nvda".to_string())).unwrap();
        assert_eq!(req.symbol, "NVDA");
        assert_eq!(sb.query(), "NVDA - NVIDIA");
    }

    #[test]
    fn no_emission_while_loading() {
        let mut sb = search_box();
        sb.handle(SearchEvent::Focus);
        sb.handle(SearchEvent::Input("ap".to_string()));
        sb.set_loading(true);

        assert!(!sb.suggestions_visible());
        assert_eq!(sb.handle(SearchEvent::Key(Key::Enter)), None);
        assert_eq!(sb.handle(SearchEvent::SearchButton), None);
        assert_eq!(sb.handle(SearchEvent::SuggestionClicked(0)), None);
        assert_eq!(sb.handle(SearchEvent::ChipClicked("AAPL".to_string())), None);
        assert_eq!(sb.query(), "ap");

        sb.set_loading(false);
        assert!(sb.handle(SearchEvent::SearchButton).is_some());
    }

    #[test]
    fn dropdown_survives_blur_until_emission() {
        let mut sb = search_box();
        sb.handle(SearchEvent::Focus);
        sb.handle(SearchEvent::Input("net".to_string()));
        sb.handle(SearchEvent::Blur);
        assert!(sb.suggestions_visible());
        sb.handle(SearchEvent::SearchButton);
        assert!(!sb.suggestions_visible());
        sb.handle(SearchEvent::Input("netf".to_string()));
        assert!(sb.suggestions_visible());
    }
}
