//! Container owning the search box and the results panel. It turns emitted
//! symbols into source lookups and feeds the outcome back to the results.

use crate::catalog::Catalog;
use crate::config::Settings;
use crate::domain::prediction::CompanyResult;
use crate::search::{SearchBox, SearchEvent, SearchRequest};
use crate::source::PredictionSource;
use crate::view::idle::IdlePhrases;
use crate::view::{ResultsPanel, ResultsView, ViewState};
use std::sync::Arc;
use uuid::Uuid;

/// Ticket for one in-flight lookup. Only the newest ticket's outcome is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSearch {
    pub request_id: Uuid,
    pub generation: u64,
    pub symbol: String,
}

impl PendingSearch {
    pub async fn fetch(
        &self,
        source: &dyn PredictionSource,
    ) -> anyhow::Result<Option<CompanyResult>> {
        tracing::info!(request_id = %self.request_id, symbol = %self.symbol, source = source.source_name(), "resolving prediction");
        source.resolve(&self.symbol).await
    }
}

pub fn error_message(symbol: &str, err: &anyhow::Error) -> String {
    format!("Failed to fetch prediction for {symbol}: {err}")
}

pub struct PredictionApp {
    source: Arc<dyn PredictionSource>,
    search: SearchBox,
    results: ResultsPanel,
    generation: u64,
    in_flight: Option<PendingSearch>,
}

impl PredictionApp {
    pub fn new(source: Arc<dyn PredictionSource>, catalog: Catalog, settings: &Settings) -> Self {
        Self {
            source,
            search: SearchBox::new(catalog),
            results: ResultsPanel::new(
                settings.results_page_size,
                IdlePhrases::with_interval(settings.idle_phrase_interval),
            ),
            generation: 0,
            in_flight: None,
        }
    }

    pub fn source(&self) -> Arc<dyn PredictionSource> {
        self.source.clone()
    }

    pub fn search(&self) -> &SearchBox {
        &self.search
    }

    pub fn results(&self) -> &ResultsPanel {
        &self.results
    }

    pub fn results_mut(&mut self) -> &mut ResultsPanel {
        &mut self.results
    }

    pub fn in_flight(&self) -> Option<&PendingSearch> {
        self.in_flight.as_ref()
    }

    pub fn mount(&mut self) {
        self.results.mount();
    }

    pub fn unmount(&mut self) {
        self.results.unmount();
    }

    pub fn render(&self) -> ResultsView {
        self.results.render()
    }

    /// Feeds a UI event to the search box; returns a ticket when it emits a search.
    pub fn handle(&mut self, event: SearchEvent) -> Option<PendingSearch> {
        let SearchRequest { symbol, trigger } = self.search.handle(event)?;
        tracing::debug!(%symbol, ?trigger, "search requested");
        Some(self.begin_search(symbol))
    }

    /// Starts a lookup directly, superseding any lookup still in flight.
    pub fn begin_search(&mut self, symbol: String) -> PendingSearch {
        self.generation += 1;
        if let Some(prev) = self.in_flight.take() {
            tracing::debug!(superseded = %prev.request_id, symbol = %prev.symbol, "superseding in-flight search");
        }

        let pending = PendingSearch {
            request_id: Uuid::new_v4(),
            generation: self.generation,
            symbol,
        };
        self.search.set_loading(true);
        self.results.begin_request();
        self.in_flight = Some(pending.clone());
        pending
    }

    /// Applies the outcome of `pending`. Returns `false` if a newer search superseded it.
    pub fn complete(
        &mut self,
        pending: &PendingSearch,
        outcome: anyhow::Result<Option<CompanyResult>>,
    ) -> bool {
        if pending.generation != self.generation {
            tracing::debug!(request_id = %pending.request_id, symbol = %pending.symbol, "discarding stale response");
            return false;
        }

        let outcome = match outcome {
            Ok(result) => {
                tracing::info!(
                    request_id = %pending.request_id,
                    symbol = %pending.symbol,
                    found = result.is_some(),
                    "prediction resolved"
                );
                Ok(result)
            }
            Err(err) => {
                tracing::error!(request_id = %pending.request_id, symbol = %pending.symbol, error = %err, "prediction lookup failed");
                Err(error_message(&pending.symbol, &err))
            }
        };

        self.in_flight = None;
        self.search.set_loading(false);
        self.results.resolve(outcome);
        true
    }

    /// `handle` + fetch + `complete` in one step, for front ends without concurrency.
    pub async fn dispatch(&mut self, event: SearchEvent) -> Option<ViewState> {
        let pending = self.handle(event)?;
        let outcome = pending.fetch(self.source.as_ref()).await;
        self.complete(&pending, outcome);
        Some(self.results.state())
    }
}
