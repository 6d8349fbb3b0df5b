use crate::catalog::{Catalog, PopularChip};
use serde::Serialize;

/// Anchor id of the search section; the hero's call to action scrolls here.
pub const SEARCH_SECTION_ID: &str = "search-section";

pub const SEARCH_PLACEHOLDER: &str = "Enter stock symbol or company name...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeroBanner {
    pub title: &'static str,
    pub tagline: &'static str,
    pub call_to_action: &'static str,
    pub scroll_target: &'static str,
}

pub const HERO: HeroBanner = HeroBanner {
    title: "Predict the Future of Stocks with AI",
    tagline: "Harness the power of artificial intelligence to make smarter investment decisions. \
              Our advanced algorithms analyze market trends to provide accurate stock predictions.",
    call_to_action: "Get Started",
    scroll_target: SEARCH_SECTION_ID,
};

#[derive(Debug, Clone, Serialize)]
pub struct SearchSection {
    pub id: &'static str,
    pub heading: &'static str,
    pub placeholder: &'static str,
    pub popular: &'static [PopularChip],
}

/// Static content of the single page, top to bottom.
#[derive(Debug, Clone, Serialize)]
pub struct PageLayout {
    pub hero: HeroBanner,
    pub search: SearchSection,
}

impl PageLayout {
    pub fn new(catalog: &Catalog) -> Self {
        Self {
            hero: HERO,
            search: SearchSection {
                id: SEARCH_SECTION_ID,
                heading: "Search for a Stock",
                placeholder: SEARCH_PLACEHOLDER,
                popular: catalog.popular(),
            },
        }
    }
}
