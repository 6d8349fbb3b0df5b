//! Results panel: view-state precedence, pagination, detail selection and the
//! idle placeholder.

pub mod idle;

use crate::display::StockCard;
use crate::domain::prediction::{ChartImage, CompanyResult, ModelSummary, PricePoint, StockRecord};
use idle::{IdlePhrases, IdleTicker};
use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewState {
    Loading,
    Error,
    Empty,
    LoadedEmpty,
    Loaded,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResultsInput<'a> {
    pub result: Option<&'a CompanyResult>,
    pub loading: bool,
    pub error: Option<&'a str>,
}

impl ResultsInput<'_> {
    /// First match wins: loading, error, no result, empty result, loaded.
    pub fn state(&self) -> ViewState {
        if self.loading {
            return ViewState::Loading;
        }
        if self.error.is_some() {
            return ViewState::Error;
        }
        match self.result {
            None => ViewState::Empty,
            Some(r) if r.stocks.is_empty() => ViewState::LoadedEmpty,
            Some(_) => ViewState::Loaded,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockDetail {
    pub index: usize,
    pub card: StockCard,
    pub series: Vec<PricePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedView {
    pub company_symbol: String,
    pub company_name: String,
    pub page: usize,
    pub total_pages: usize,
    pub cards: Vec<StockCard>,
    pub detail: Option<StockDetail>,
    pub chart: Option<ChartImage>,
    pub model: Option<ModelSummary>,
}

/// What the results area shows, tagged by `state` when serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ResultsView {
    Loading,
    Error {
        message: String,
    },
    Empty {
        idle_phrase: String,
    },
    LoadedEmpty {
        company_symbol: String,
        company_name: String,
    },
    Loaded(LoadedView),
}

impl ResultsView {
    pub fn state(&self) -> ViewState {
        match self {
            Self::Loading => ViewState::Loading,
            Self::Error { .. } => ViewState::Error,
            Self::Empty { .. } => ViewState::Empty,
            Self::LoadedEmpty { .. } => ViewState::LoadedEmpty,
            Self::Loaded(_) => ViewState::Loaded,
        }
    }
}

#[derive(Debug)]
pub struct ResultsPanel {
    result: Option<CompanyResult>,
    loading: bool,
    error: Option<String>,
    page: usize,
    page_size: usize,
    selected: Option<usize>,
    idle_phrases: IdlePhrases,
    mounted: bool,
    idle: Option<IdleTicker>,
}

impl ResultsPanel {
    pub fn new(page_size: usize, idle_phrases: IdlePhrases) -> Self {
        Self {
            result: None,
            loading: false,
            error: None,
            page: 1,
            page_size: page_size.max(1),
            selected: None,
            idle_phrases,
            mounted: false,
            idle: None,
        }
    }

    pub fn input(&self) -> ResultsInput<'_> {
        ResultsInput {
            result: self.result.as_ref(),
            loading: self.loading,
            error: self.error.as_deref(),
        }
    }

    pub fn state(&self) -> ViewState {
        self.input().state()
    }

    pub fn result(&self) -> Option<&CompanyResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Starts the idle rotation if the panel is idle. Needs a tokio runtime.
    pub fn mount(&mut self) {
        self.mounted = true;
        self.sync_idle();
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
        self.sync_idle();
    }

    pub fn idle_running(&self) -> bool {
        self.idle.as_ref().is_some_and(IdleTicker::is_running)
    }

    /// Receiver for phrase index changes while the rotation runs.
    pub fn idle_updates(&self) -> Option<tokio::sync::watch::Receiver<usize>> {
        self.idle.as_ref().map(IdleTicker::subscribe)
    }

    pub fn idle_phrase(&self) -> &'static str {
        match &self.idle {
            Some(ticker) => ticker.current(),
            None => self.idle_phrases.phrase(0),
        }
    }

    /// A new search: drop detail selection, back to page 1, show the spinner.
    pub fn begin_request(&mut self) {
        self.selected = None;
        self.page = 1;
        self.error = None;
        self.loading = true;
        self.sync_idle();
    }

    /// `Err` carries the message shown in the error panel.
    pub fn resolve(&mut self, outcome: Result<Option<CompanyResult>, String>) {
        self.loading = false;
        match outcome {
            Ok(result) => {
                self.result = result;
                self.error = None;
            }
            Err(message) => {
                self.result = None;
                self.error = Some(message);
            }
        }
        self.sync_idle();
    }

    fn sync_idle(&mut self) {
        let want = self.mounted && self.state() == ViewState::Empty;
        match (want, self.idle.is_some()) {
            (true, false) => {
                if tokio::runtime::Handle::try_current().is_ok() {
                    self.idle = Some(IdleTicker::start(self.idle_phrases));
                } else {
                    tracing::debug!("no runtime; idle phrase stays fixed");
                }
            }
            (false, true) => {
                if let Some(ticker) = self.idle.take() {
                    ticker.stop();
                }
            }
            _ => {}
        }
    }

    fn stocks(&self) -> &[StockRecord] {
        self.result.as_ref().map(|r| r.stocks.as_slice()).unwrap_or(&[])
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self) -> usize {
        self.stocks().len().div_ceil(self.page_size).max(1)
    }

    /// Clamps to `1..=total_pages` and returns the page actually shown.
    pub fn set_page(&mut self, page: usize) -> usize {
        self.page = page.clamp(1, self.total_pages());
        self.page
    }

    pub fn next_page(&mut self) -> usize {
        self.set_page(self.page + 1)
    }

    pub fn prev_page(&mut self) -> usize {
        self.set_page(self.page.saturating_sub(1))
    }

    pub fn page_items(&self) -> &[StockRecord] {
        let stocks = self.stocks();
        let start = (self.page - 1) * self.page_size;
        if start >= stocks.len() {
            return &[];
        }
        let end = (start + self.page_size).min(stocks.len());
        &stocks[start..end]
    }

    /// Opens the detail view for the stock at `index` in the full list.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.stocks().len() {
            self.selected = Some(index);
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&StockRecord> {
        self.selected.and_then(|i| self.stocks().get(i))
    }

    pub fn render(&self) -> ResultsView {
        self.render_with_idle_phrase(self.idle_phrase())
    }

    pub fn render_with_idle_phrase(&self, idle_phrase: &str) -> ResultsView {
        match self.state() {
            ViewState::Loading => ResultsView::Loading,
            ViewState::Error => ResultsView::Error {
                message: self.error.clone().unwrap_or_default(),
            },
            ViewState::Empty => ResultsView::Empty {
                idle_phrase: idle_phrase.to_string(),
            },
            ViewState::LoadedEmpty | ViewState::Loaded => {
                let Some(result) = self.result.as_ref() else {
                    return ResultsView::Empty {
                        idle_phrase: idle_phrase.to_string(),
                    };
                };
                if result.stocks.is_empty() {
                    return ResultsView::LoadedEmpty {
                        company_symbol: result.company_symbol.clone(),
                        company_name: result.company_name.clone(),
                    };
                }
                ResultsView::Loaded(self.loaded_view(result))
            }
        }
    }

    fn loaded_view(&self, result: &CompanyResult) -> LoadedView {
        let detail = self.selected.and_then(|index| {
            result.stocks.get(index).map(|record| StockDetail {
                index,
                card: StockCard::from_record(record),
                series: record.chart_series(),
            })
        });

        LoadedView {
            company_symbol: result.company_symbol.clone(),
            company_name: result.company_name.clone(),
            page: self.page,
            total_pages: self.total_pages(),
            cards: self.page_items().iter().map(StockCard::from_record).collect(),
            detail,
            chart: displayable_chart(result),
            model: result.model.clone(),
        }
    }
}

/// Undecodable images are hidden, not reported.
fn displayable_chart(result: &CompanyResult) -> Option<ChartImage> {
    let chart = result.chart.as_ref()?;
    match chart.decode_png() {
        Ok(_) => Some(chart.clone()),
        Err(e) => {
            tracing::warn!(symbol = %result.company_symbol, error = %e, "hiding undecodable chart image");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::time::Duration;

    fn record(symbol: &str, predicted: f64) -> StockRecord {
        StockRecord {
            symbol: symbol.to_string(),
            display_name: format!("{symbol} Corp"),
            current_price: 100.0,
            predicted_price: predicted,
            confidence_score: 80.0,
            prediction_date: NaiveDate::from_ymd_opt(2025, 6, 6).unwrap(),
            historical_series: vec![PricePoint {
                date: NaiveDate::from_ymd_opt(2025, 6, 5).unwrap(),
                price: 99.0,
            }],
        }
    }

    fn result(n: usize) -> CompanyResult {
        CompanyResult {
            company_symbol: "ACME".to_string(),
            company_name: "Acme Holdings".to_string(),
            stocks: (0..n).map(|i| record(&format!("S{i}"), 100.0 + i as f64)).collect(),
            chart: None,
            model: None,
        }
    }

    fn panel() -> ResultsPanel {
        ResultsPanel::new(DEFAULT_PAGE_SIZE, IdlePhrases::with_interval(Duration::from_secs(3)))
    }

    #[test]
    fn precedence_is_loading_error_empty_loaded_empty_loaded() {
        let r = result(1);
        let empty = result(0);
        let all = ResultsInput {
            result: Some(&r),
            loading: true,
            error: Some("boom"),
        };
        assert_eq!(all.state(), ViewState::Loading);
        assert_eq!(ResultsInput { loading: false, ..all }.state(), ViewState::Error);
        assert_eq!(ResultsInput::default().state(), ViewState::Empty);
        assert_eq!(
            ResultsInput { result: Some(&empty), ..Default::default() }.state(),
            ViewState::LoadedEmpty
        );
        assert_eq!(
            ResultsInput { result: Some(&r), ..Default::default() }.state(),
            ViewState::Loaded
        );
    }

    #[test]
    fn empty_stock_list_renders_no_data_panel() {
        let mut p = panel();
        p.begin_request();
        p.resolve(Ok(Some(result(0))));
        assert_eq!(
            p.render(),
            ResultsView::LoadedEmpty {
                company_symbol: "ACME".to_string(),
                company_name: "Acme Holdings".to_string(),
            }
        );
        assert_eq!(p.total_pages(), 1);
        assert!(p.page_items().is_empty());
        assert!(!p.select(0));
    }

    #[test]
    fn unknown_symbol_returns_to_idle() {
        let mut p = panel();
        p.begin_request();
        assert_eq!(p.render(), ResultsView::Loading);
        p.resolve(Ok(None));
        assert_eq!(p.state(), ViewState::Empty);
        assert!(matches!(p.render(), ResultsView::Empty { .. }));
    }

    #[test]
    fn error_replaces_previous_result() {
        let mut p = panel();
        p.resolve(Ok(Some(result(2))));
        p.begin_request();
        p.resolve(Err("Failed to fetch prediction for ACME".to_string()));
        assert_eq!(
            p.render(),
            ResultsView::Error {
                message: "Failed to fetch prediction for ACME".to_string()
            }
        );
        // The next request clears the error.
        p.begin_request();
        assert_eq!(p.error(), None);
    }

    #[test]
    fn pagination_clamps_and_slices() {
        let mut p = panel();
        p.resolve(Ok(Some(result(14))));
        assert_eq!(p.total_pages(), 3);
        assert_eq!(p.page_items().len(), 6);
        assert_eq!(p.next_page(), 2);
        assert_eq!(p.next_page(), 3);
        assert_eq!(p.page_items().len(), 2);
        assert_eq!(p.page_items()[0].symbol, "S12");
        assert_eq!(p.next_page(), 3);
        assert_eq!(p.set_page(0), 1);
        assert_eq!(p.prev_page(), 1);
        assert_eq!(p.set_page(99), 3);
    }

    #[test]
    fn new_request_resets_page_and_selection() {
        let mut p = panel();
        p.resolve(Ok(Some(result(14))));
        p.set_page(3);
        assert!(p.select(13));
        assert_eq!(p.selected().unwrap().symbol, "S13");

        p.begin_request();
        assert_eq!(p.page(), 1);
        assert!(p.selected().is_none());
    }

    #[test]
    fn loaded_view_carries_cards_and_detail() {
        let mut p = panel();
        p.resolve(Ok(Some(result(3))));
        p.select(1);
        let ResultsView::Loaded(view) = p.render() else {
            panic!("expected loaded view");
        };
        assert_eq!(view.cards.len(), 3);
        assert_eq!(view.page, 1);
        assert_eq!(view.total_pages, 1);
        let detail = view.detail.unwrap();
        assert_eq!(detail.index, 1);
        assert_eq!(detail.card.symbol, "S1");
        assert_eq!(detail.series.len(), 2);
        assert_eq!(detail.series[1].price, 101.0);
    }

    #[test]
    fn undecodable_chart_is_hidden() {
        let mut r = result(1);
        r.chart = Some(ChartImage::from_base64("%%%"));
        let mut p = panel();
        p.resolve(Ok(Some(r)));
        let ResultsView::Loaded(view) = p.render() else {
            panic!("expected loaded view");
        };
        assert!(view.chart.is_none());
    }

    #[test]
    fn view_serializes_with_state_tag() {
        let mut p = panel();
        let v = serde_json::to_value(p.render_with_idle_phrase("hello")).unwrap();
        assert_eq!(v["state"], "empty");
        assert_eq!(v["idle_phrase"], "hello");

        p.resolve(Ok(Some(result(1))));
        let v = serde_json::to_value(p.render()).unwrap();
        assert_eq!(v["state"], "loaded");
        assert_eq!(v["cards"][0]["symbol"], "S0");
    }

    #[test]
    fn unmounted_panel_never_starts_rotation() {
        let p = panel();
        assert!(!p.idle_running());
        assert_eq!(p.idle_phrase(), idle::DEFAULT_PHRASES[0]);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_rotation_follows_view_state() {
        let mut p = panel();
        p.mount();
        assert!(p.idle_running());

        p.begin_request();
        assert!(!p.idle_running());

        p.resolve(Ok(Some(result(1))));
        assert!(!p.idle_running());

        p.begin_request();
        p.resolve(Ok(None));
        assert!(p.idle_running());

        p.unmount();
        assert!(!p.idle_running());
    }

    #[tokio::test(start_paused = true)]
    async fn idle_updates_advance_rendered_phrase() {
        let mut p = panel();
        assert!(p.idle_updates().is_none());

        p.mount();
        let mut updates = p.idle_updates();
        assert!(updates.is_some());
        assert_eq!(idle::next_tick(&mut updates).await, 1);
        assert_eq!(
            p.render(),
            ResultsView::Empty {
                idle_phrase: idle::DEFAULT_PHRASES[1].to_string()
            }
        );

        p.begin_request();
        assert!(p.idle_updates().is_none());
    }
}
