use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub symbol: &'static str,
    pub full_name: &'static str,
}

impl CatalogEntry {
    /// Suggestion row text, `"{symbol} - {full_name}"`.
    pub fn suggestion_label(&self) -> String {
        format!("{} - {}", self.symbol, self.full_name)
    }
}

/// Quick-select shortcut shown under the search box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PopularChip {
    pub symbol: &'static str,
    pub short_name: &'static str,
}

impl PopularChip {
    /// Text the chip writes into the search field.
    pub fn fill_text(&self) -> String {
        format!("{} - {}", self.symbol, self.short_name)
    }
}

const fn entry(symbol: &'static str, full_name: &'static str) -> CatalogEntry {
    CatalogEntry { symbol, full_name }
}

const fn chip(symbol: &'static str, short_name: &'static str) -> PopularChip {
    PopularChip { symbol, short_name }
}

const BUILTIN_ENTRIES: &[CatalogEntry] = &[
    entry("AAPL", "Apple Inc."),
    entry("GOOG", "Alphabet Inc."),
    entry("TSLA", "Tesla, Inc."),
    entry("MSFT", "Microsoft Corporation"),
    entry("AMZN", "Amazon.com, Inc."),
    entry("META", "Meta Platforms, Inc."),
    entry("NFLX", "Netflix, Inc."),
    entry("NVDA", "NVIDIA Corporation"),
    entry("JPM", "JPMorgan Chase & Co."),
    entry("V", "Visa Inc."),
    entry("WMT", "Walmart Inc."),
    entry("DIS", "The Walt Disney Company"),
];

const BUILTIN_CHIPS: &[PopularChip] = &[
    chip("AAPL", "Apple"),
    chip("GOOG", "Google"),
    chip("TSLA", "Tesla"),
    chip("MSFT", "Microsoft"),
    chip("AMZN", "Amazon"),
    chip("META", "Meta"),
    chip("NFLX", "Netflix"),
    chip("NVDA", "NVIDIA"),
];

/// Fixed, ordered ticker list. Symbol uniqueness is assumed, not enforced.
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    entries: &'static [CatalogEntry],
    chips: &'static [PopularChip],
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    pub const fn builtin() -> Self {
        Self {
            entries: BUILTIN_ENTRIES,
            chips: BUILTIN_CHIPS,
        }
    }

    pub const fn new(entries: &'static [CatalogEntry], chips: &'static [PopularChip]) -> Self {
        Self { entries, chips }
    }

    pub fn entries(&self) -> &'static [CatalogEntry] {
        self.entries
    }

    pub fn popular(&self) -> &'static [PopularChip] {
        self.chips
    }

    pub fn find(&self, symbol: &str) -> Option<&'static CatalogEntry> {
        self.entries.iter().find(|e| e.symbol == symbol)
    }

    pub fn chip(&self, symbol: &str) -> Option<&'static PopularChip> {
        self.chips.iter().find(|c| c.symbol == symbol)
    }
}
