use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use stockcast_core::catalog::{Catalog, CatalogEntry};
use stockcast_core::page::PageLayout;
use stockcast_core::search::{normalize_symbol, suggest};
use stockcast_core::source::PredictionSource;
use stockcast_core::view::idle::IdlePhrases;
use stockcast_core::view::{ResultsPanel, ResultsView, ViewState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = stockcast_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let source = match stockcast_core::source::from_settings(&settings) {
        Ok(source) => source,
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "prediction source misconfigured");
            return Err(e);
        }
    };

    let state = AppState::new(source, Catalog::builtin(), &settings);
    let app = router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/page", get(get_page))
        .route("/api/catalog", get(get_catalog))
        .route("/api/suggestions", get(get_suggestions))
        // ?page=N&detail=N, both 1-based
        .route("/api/predictions/:query", get(get_prediction))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    source: Arc<dyn PredictionSource>,
    catalog: Catalog,
    page_size: usize,
    idle_phrases: IdlePhrases,
    started: Instant,
}

impl AppState {
    fn new(
        source: Arc<dyn PredictionSource>,
        catalog: Catalog,
        settings: &stockcast_core::config::Settings,
    ) -> Self {
        Self {
            source,
            catalog,
            page_size: settings.results_page_size,
            idle_phrases: IdlePhrases::with_interval(settings.idle_phrase_interval),
            started: Instant::now(),
        }
    }
}

async fn get_page(State(state): State<AppState>) -> Json<PageLayout> {
    Json(PageLayout::new(&state.catalog))
}

async fn get_catalog(State(state): State<AppState>) -> Json<&'static [CatalogEntry]> {
    Json(state.catalog.entries())
}

#[derive(Debug, Deserialize)]
struct SuggestionsParams {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Serialize)]
struct SuggestionsResponse {
    query: String,
    suggestions: Vec<String>,
    visible: bool,
}

async fn get_suggestions(
    State(state): State<AppState>,
    Query(params): Query<SuggestionsParams>,
) -> Json<SuggestionsResponse> {
    let suggestions = suggest(&params.q, &state.catalog);
    Json(SuggestionsResponse {
        visible: !suggestions.is_empty(),
        query: params.q,
        suggestions,
    })
}

/// Both are 1-based, matching the numbers shown on the cards.
#[derive(Debug, Default, Deserialize)]
struct PredictionParams {
    page: Option<usize>,
    /// Card number to open in the detail view; `0` or a missing card opens nothing.
    detail: Option<usize>,
}

#[derive(Debug, Serialize)]
struct PredictionEnvelope {
    request_id: Uuid,
    symbol: String,
    view: ResultsView,
}

async fn get_prediction(
    State(state): State<AppState>,
    Path(query): Path<String>,
    Query(params): Query<PredictionParams>,
) -> (StatusCode, Json<PredictionEnvelope>) {
    let request_id = Uuid::new_v4();
    let symbol = normalize_symbol(&query);
    if symbol.is_empty() {
        let view = ResultsView::Error {
            message: "Enter a stock symbol".to_string(),
        };
        return (
            StatusCode::BAD_REQUEST,
            Json(PredictionEnvelope {
                request_id,
                symbol,
                view,
            }),
        );
    }

    let mut panel = ResultsPanel::new(state.page_size, state.idle_phrases);
    panel.begin_request();

    tracing::info!(%request_id, %symbol, source = state.source.source_name(), "resolving prediction");
    let outcome = match state.source.resolve(&symbol).await {
        Ok(result) => Ok(result),
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(%request_id, %symbol, error = %e, "prediction lookup failed");
            Err(stockcast_core::app::error_message(&symbol, &e))
        }
    };
    panel.resolve(outcome);

    if let Some(page) = params.page {
        panel.set_page(page);
    }
    if let Some(index) = params.detail.and_then(|n| n.checked_sub(1)) {
        panel.select(index);
    }

    let status = match panel.state() {
        ViewState::Error => StatusCode::BAD_GATEWAY,
        _ => StatusCode::OK,
    };
    let view = panel.render_with_idle_phrase(state.idle_phrases.phrase_at(state.started.elapsed()));

    (
        status,
        Json(PredictionEnvelope {
            request_id,
            symbol,
            view,
        }),
    )
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &stockcast_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockcast_core::config::Settings;
    use stockcast_core::domain::prediction::CompanyResult;
    use stockcast_core::source::DummySource;

    struct DownSource;

    #[async_trait::async_trait]
    impl PredictionSource for DownSource {
        fn source_name(&self) -> &'static str {
            "down"
        }

        async fn resolve(&self, _symbol: &str) -> anyhow::Result<Option<CompanyResult>> {
            anyhow::bail!("connection refused")
        }
    }

    fn state_with(source: Arc<dyn PredictionSource>) -> AppState {
        AppState::new(source, Catalog::builtin(), &Settings::default())
    }

    fn dummy_state() -> AppState {
        state_with(Arc::new(DummySource::with_seed(5).without_charts()))
    }

    #[tokio::test]
    async fn suggestions_endpoint_filters_catalog() {
        let Json(res) = get_suggestions(
            State(dummy_state()),
            Query(SuggestionsParams { q: "ap".to_string() }),
        )
        .await;
        assert!(res.visible);
        assert!(res.suggestions.contains(&"AAPL - Apple Inc.".to_string()));

        let Json(res) = get_suggestions(
            State(dummy_state()),
            Query(SuggestionsParams { q: "  ".to_string() }),
        )
        .await;
        assert!(!res.visible);
        assert!(res.suggestions.is_empty());
    }

    #[tokio::test]
    async fn prediction_endpoint_normalizes_formatted_query() {
        let (status, Json(env)) = get_prediction(
            State(dummy_state()),
            Path("nvda - NVIDIA Corporation".to_string()),
            Query(PredictionParams::default()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(env.symbol, "NVDA");
        let ResultsView::Loaded(view) = env.view else {
            panic!("expected loaded view");
        };
        assert_eq!(view.cards[0].recommendation.label(), "Strong Buy");
        assert!(view.detail.is_none());
    }

    #[tokio::test]
    async fn prediction_endpoint_opens_detail() {
        let (_, Json(env)) = get_prediction(
            State(dummy_state()),
            Path("AAPL".to_string()),
            Query(PredictionParams {
                page: Some(4),
                detail: Some(1),
            }),
        )
        .await;
        let ResultsView::Loaded(view) = env.view else {
            panic!("expected loaded view");
        };
        assert_eq!(view.page, 1);
        let detail = view.detail.unwrap();
        assert_eq!(detail.index, 0);
        assert_eq!(detail.series.len(), 32);
    }

    #[tokio::test]
    async fn detail_zero_or_missing_card_opens_nothing() {
        for detail in [0, 2] {
            let (status, Json(env)) = get_prediction(
                State(dummy_state()),
                Path("AAPL".to_string()),
                Query(PredictionParams {
                    page: None,
                    detail: Some(detail),
                }),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            let ResultsView::Loaded(view) = env.view else {
                panic!("expected loaded view");
            };
            assert!(view.detail.is_none(), "detail={detail}");
        }
    }

    #[tokio::test]
    async fn unknown_symbol_renders_idle_view() {
        let (status, Json(env)) = get_prediction(
            State(dummy_state()),
            Path("wmt".to_string()),
            Query(PredictionParams::default()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(env.view.state(), ViewState::Empty);

        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(v["symbol"], "WMT");
        assert_eq!(v["view"]["state"], "empty");
        assert!(v["view"]["idle_phrase"].is_string());
    }

    #[tokio::test]
    async fn blank_query_is_rejected() {
        let (status, Json(env)) = get_prediction(
            State(dummy_state()),
            Path(" - Apple".to_string()),
            Query(PredictionParams::default()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(env.view.state(), ViewState::Error);
    }

    #[tokio::test]
    async fn source_failure_maps_to_bad_gateway() {
        let (status, Json(env)) = get_prediction(
            State(state_with(Arc::new(DownSource))),
            Path("AAPL".to_string()),
            Query(PredictionParams::default()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            env.view,
            ResultsView::Error {
                message: "Failed to fetch prediction for AAPL: connection refused".to_string()
            }
        );
    }

    #[tokio::test]
    async fn page_endpoint_exposes_hero_and_chips() {
        let Json(page) = get_page(State(dummy_state())).await;
        assert_eq!(page.hero.scroll_target, "search-section");
        assert_eq!(page.search.popular.len(), 8);

        let Json(entries) = get_catalog(State(dummy_state())).await;
        assert_eq!(entries.len(), 12);
    }
}
