use std::fmt::Write;

use stockcast_core::catalog::Catalog;
use stockcast_core::display::{ConfidenceTier, Direction, StockCard};
use stockcast_core::page::HERO;
use stockcast_core::search::SearchBox;
use stockcast_core::view::{LoadedView, ResultsView};

pub fn hero(catalog: &Catalog) -> String {
    let chips: Vec<&str> = catalog.popular().iter().map(|c| c.symbol).collect();
    format!(
        "{}\n{}\n\nPopular stocks: {}\n",
        HERO.title,
        HERO.tagline,
        chips.join("  ")
    )
}

pub fn suggestions(search: &SearchBox) -> String {
    if !search.suggestions_visible() {
        return String::new();
    }
    let mut out = String::new();
    for (i, s) in search.suggestions().iter().enumerate() {
        let _ = writeln!(out, "  #{} {}", i + 1, s);
    }
    out
}

fn tier_label(tier: ConfidenceTier) -> &'static str {
    match tier {
        ConfidenceTier::High => "high",
        ConfidenceTier::Medium => "medium",
        ConfidenceTier::Low => "low",
    }
}

fn arrow(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => "▲",
        Direction::Down => "▼",
    }
}

fn card(out: &mut String, index: usize, card: &StockCard) {
    let _ = writeln!(out, "[{}] {} ({})", index + 1, card.symbol, card.name);
    let _ = writeln!(out, "    Current Price     {}", card.current_price);
    let _ = writeln!(
        out,
        "    Predicted Price   {} {}",
        card.predicted_price,
        arrow(card.direction)
    );
    let _ = writeln!(out, "    Expected Change   {}", card.percent_change);
    let _ = writeln!(out, "    Prediction Date   {}", card.prediction_date);
    let _ = writeln!(
        out,
        "    Confidence Score  {} ({})",
        card.confidence_label,
        tier_label(card.confidence_tier)
    );
}

fn loaded(out: &mut String, view: &LoadedView, page_size: usize) {
    let _ = writeln!(out, "{} - {}", view.company_symbol, view.company_name);
    if let Some(model) = &view.model {
        match model.rmse {
            Some(rmse) => {
                let _ = writeln!(out, "Model: {} (RMSE {rmse:.4})", model.name);
            }
            None => {
                let _ = writeln!(out, "Model: {}", model.name);
            }
        }
    }

    let offset = (view.page - 1) * page_size;
    for (i, c) in view.cards.iter().enumerate() {
        card(out, offset + i, c);
    }
    if view.total_pages > 1 {
        let _ = writeln!(out, "Page {} of {}", view.page, view.total_pages);
    }
    if view.chart.is_some() {
        let _ = writeln!(out, "(chart image available)");
    }

    if let Some(detail) = &view.detail {
        let _ = writeln!(out, "\nDetail: {}", detail.card.symbol);
        let _ = writeln!(out, "    Recommendation    {}", detail.card.recommendation);
        for p in &detail.series {
            let _ = writeln!(out, "    {}  {:>10.2}", p.date, p.price);
        }
    }
}

pub fn results(view: &ResultsView, page_size: usize) -> String {
    let mut out = String::new();
    match view {
        ResultsView::Loading => out.push_str("Loading prediction...\n"),
        ResultsView::Error { message } => {
            let _ = writeln!(out, "Error: {message}");
        }
        ResultsView::Empty { idle_phrase } => {
            let _ = writeln!(out, "{idle_phrase}");
        }
        ResultsView::LoadedEmpty {
            company_symbol,
            company_name,
        } => {
            let _ = writeln!(out, "No prediction data for {company_symbol} ({company_name}).");
        }
        ResultsView::Loaded(view) => loaded(&mut out, view, page_size),
    }
    out
}
