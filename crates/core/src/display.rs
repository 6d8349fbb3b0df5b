//! Derived display values for a stock record: direction, change, confidence tier
//! and the recommendation label.

use crate::domain::prediction::StockRecord;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

pub fn direction(current: f64, predicted: f64) -> Direction {
    if predicted > current {
        Direction::Up
    } else {
        Direction::Down
    }
}

/// Signed percentage change from `current` to `predicted`.
pub fn percent_change(current: f64, predicted: f64) -> f64 {
    (predicted - current) / current * 100.0
}

/// `"+10.00%"`, `"-3.25%"`. Non-negative values carry a leading `+`.
pub fn format_percent_change(pct: f64) -> String {
    if pct >= 0.0 {
        format!("+{pct:.2}%")
    } else {
        format!("{pct:.2}%")
    }
}

pub fn format_price(price: f64) -> String {
    format!("${price:.2}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    /// `> 85` high, `(70, 85]` medium, `<= 70` low.
    pub fn for_score(score: f64) -> Self {
        if score > 85.0 {
            Self::High
        } else if score > 70.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Recommendation {
    #[serde(rename = "Strong Buy")]
    StrongBuy,
    Buy,
    Hold,
    Sell,
}

impl Recommendation {
    pub fn label(self) -> &'static str {
        match self {
            Self::StrongBuy => "Strong Buy",
            Self::Buy => "Buy",
            Self::Hold => "Hold",
            Self::Sell => "Sell",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct RuleInput {
    rising: bool,
    confidence: f64,
}

fn rising_high_confidence(i: &RuleInput) -> bool {
    i.rising && i.confidence > 85.0
}

fn rising_medium_confidence(i: &RuleInput) -> bool {
    i.rising && i.confidence > 70.0
}

fn rising(i: &RuleInput) -> bool {
    i.rising
}

fn low_confidence(i: &RuleInput) -> bool {
    i.confidence < 70.0
}

// Evaluated top to bottom; the first matching rule wins. The rules overlap, so
// reordering them changes the result.
const RECOMMENDATION_RULES: &[(fn(&RuleInput) -> bool, Recommendation)] = &[
    (rising_high_confidence, Recommendation::StrongBuy),
    (rising_medium_confidence, Recommendation::Buy),
    (rising, Recommendation::Hold),
    (low_confidence, Recommendation::Sell),
];

const RECOMMENDATION_FALLBACK: Recommendation = Recommendation::Hold;

pub fn recommendation(current: f64, predicted: f64, confidence: f64) -> Recommendation {
    let input = RuleInput {
        rising: predicted > current,
        confidence,
    };
    RECOMMENDATION_RULES
        .iter()
        .find(|(matches, _)| matches(&input))
        .map(|(_, rec)| *rec)
        .unwrap_or(RECOMMENDATION_FALLBACK)
}

/// Everything a metrics card shows for one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockCard {
    pub symbol: String,
    pub name: String,
    pub current_price: String,
    pub predicted_price: String,
    pub direction: Direction,
    pub percent_change: String,
    pub prediction_date: String,
    pub confidence_score: f64,
    pub confidence_label: String,
    pub confidence_tier: ConfidenceTier,
    pub recommendation: Recommendation,
}

impl StockCard {
    pub fn from_record(record: &StockRecord) -> Self {
        let current = record.current_price;
        let predicted = record.predicted_price;
        Self {
            symbol: record.symbol.clone(),
            name: record.display_name.clone(),
            current_price: format_price(current),
            predicted_price: format_price(predicted),
            direction: direction(current, predicted),
            percent_change: format_percent_change(percent_change(current, predicted)),
            prediction_date: record.prediction_date.format("%Y-%m-%d").to_string(),
            confidence_score: record.confidence_score,
            confidence_label: format!("{}%", record.confidence_score),
            confidence_tier: ConfidenceTier::for_score(record.confidence_score),
            recommendation: recommendation(current, predicted, record.confidence_score),
        }
    }
}
