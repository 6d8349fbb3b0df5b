use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stockcast_core::app::PredictionApp;
use stockcast_core::catalog::Catalog;
use stockcast_core::config::Settings;
use stockcast_core::search::{suggest, SearchEvent};
use stockcast_core::source::PredictionSource;
use stockcast_core::view::ResultsView;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod browse;
mod render;

#[derive(Debug, Parser)]
#[command(name = "stockcast", about = "Stock price prediction viewer")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print autocomplete suggestions for a query.
    Suggest { query: String },

    /// Resolve one symbol (or a "SYM - Name" suggestion) and print its prediction.
    Predict {
        query: String,

        /// Results page to show (1-based).
        #[arg(long)]
        page: Option<usize>,

        /// Open the detail view for card N (1-based).
        #[arg(long)]
        detail: Option<usize>,

        /// Write the chart PNG here when the result carries one.
        #[arg(long)]
        chart_out: Option<PathBuf>,

        /// Print the rendered view as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Interactive search session on stdin.
    Browse,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let res = run(args, &settings).await;
    if let Err(err) = &res {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %err, "stockcast failed");
    }
    res
}

async fn run(args: Args, settings: &Settings) -> anyhow::Result<()> {
    let catalog = Catalog::builtin();

    match args.command {
        Command::Suggest { query } => {
            for s in suggest(&query, &catalog) {
                println!("{s}");
            }
            Ok(())
        }
        Command::Predict {
            query,
            page,
            detail,
            chart_out,
            json,
        } => {
            let source = stockcast_core::source::from_settings(settings)?;
            let opts = PredictOptions {
                page,
                detail,
                chart_out,
                json,
            };
            predict(source, catalog, settings, query, opts).await
        }
        Command::Browse => {
            let source = stockcast_core::source::from_settings(settings)?;
            browse::run(PredictionApp::new(source, catalog, settings)).await
        }
    }
}

struct PredictOptions {
    page: Option<usize>,
    detail: Option<usize>,
    chart_out: Option<PathBuf>,
    json: bool,
}

async fn predict(
    source: Arc<dyn PredictionSource>,
    catalog: Catalog,
    settings: &Settings,
    query: String,
    opts: PredictOptions,
) -> anyhow::Result<()> {
    let mut app = PredictionApp::new(source, catalog, settings);
    app.handle(SearchEvent::Input(query.clone()));
    app.dispatch(SearchEvent::SearchButton)
        .await
        .with_context(|| format!("no stock symbol in query {query:?}"))?;

    if let Some(page) = opts.page {
        app.results_mut().set_page(page);
    }
    if let Some(n) = opts.detail {
        anyhow::ensure!(
            n >= 1 && app.results_mut().select(n - 1),
            "no card {n} in the result"
        );
    }

    let view = app.render();

    if let Some(path) = &opts.chart_out {
        write_chart(&view, path)?;
    }

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", render::results(&view, app.results().page_size()));
    }

    if let ResultsView::Error { message } = &view {
        anyhow::bail!("{message}");
    }
    Ok(())
}

fn write_chart(view: &ResultsView, path: &Path) -> anyhow::Result<()> {
    let ResultsView::Loaded(loaded) = view else {
        tracing::warn!(path = %path.display(), "no result to chart; skipping chart output");
        return Ok(());
    };
    let Some(chart) = &loaded.chart else {
        tracing::warn!(symbol = %loaded.company_symbol, "result carries no chart image");
        return Ok(());
    };

    let png = chart.decode_png()?;
    std::fs::write(path, &png)
        .with_context(|| format!("failed to write chart to {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = png.len(), "chart written");
    Ok(())
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
