use crate::chart;
use crate::config::Settings;
use crate::domain::prediction::{CompanyResult, PricePoint, StockRecord};
use crate::source::PredictionSource;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;

/// Number of days before today in a generated series; the series also includes today.
pub const HISTORY_DAYS: i64 = 30;

struct DummyProfile {
    symbol: &'static str,
    name: &'static str,
    current_price: f64,
    predicted_price: f64,
    confidence_score: f64,
    price_floor: f64,
    price_ceiling: f64,
}

const PROFILES: &[DummyProfile] = &[
    DummyProfile {
        symbol: "AAPL",
        name: "Apple Inc.",
        current_price: 187.68,
        predicted_price: 205.42,
        confidence_score: 87.0,
        price_floor: 150.0,
        price_ceiling: 190.0,
    },
    DummyProfile {
        symbol: "GOOG",
        name: "Alphabet Inc.",
        current_price: 176.32,
        predicted_price: 192.15,
        confidence_score: 82.0,
        price_floor: 140.0,
        price_ceiling: 180.0,
    },
    DummyProfile {
        symbol: "TSLA",
        name: "Tesla, Inc.",
        current_price: 245.67,
        predicted_price: 278.92,
        confidence_score: 75.0,
        price_floor: 200.0,
        price_ceiling: 280.0,
    },
    DummyProfile {
        symbol: "MSFT",
        name: "Microsoft Corporation",
        current_price: 412.76,
        predicted_price: 445.18,
        confidence_score: 91.0,
        price_floor: 380.0,
        price_ceiling: 430.0,
    },
    DummyProfile {
        symbol: "AMZN",
        name: "Amazon.com, Inc.",
        current_price: 178.25,
        predicted_price: 195.37,
        confidence_score: 84.0,
        price_floor: 150.0,
        price_ceiling: 190.0,
    },
    DummyProfile {
        symbol: "META",
        name: "Meta Platforms, Inc.",
        current_price: 472.14,
        predicted_price: 515.63,
        confidence_score: 88.0,
        price_floor: 430.0,
        price_ceiling: 500.0,
    },
    DummyProfile {
        symbol: "NFLX",
        name: "Netflix, Inc.",
        current_price: 632.89,
        predicted_price: 685.52,
        confidence_score: 79.0,
        price_floor: 580.0,
        price_ceiling: 650.0,
    },
    DummyProfile {
        symbol: "NVDA",
        name: "NVIDIA Corporation",
        current_price: 924.73,
        predicted_price: 1025.18,
        confidence_score: 93.0,
        price_floor: 850.0,
        price_ceiling: 950.0,
    },
];

fn prediction_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 6).unwrap_or_default()
}

/// One point per day from `today - HISTORY_DAYS` through `today`.
///
/// Prices are `floor + (ceiling - floor) * (0.5 + u)` with `u` uniform in `[0, 1)`,
/// so they can overshoot the ceiling by up to half the range.
pub fn generate_historical_series<R: Rng + ?Sized>(
    rng: &mut R,
    today: NaiveDate,
    floor: f64,
    ceiling: f64,
) -> Vec<PricePoint> {
    let range = ceiling - floor;
    (0..=HISTORY_DAYS)
        .rev()
        .map(|days_back| {
            let factor = 0.5 + rng.gen::<f64>();
            PricePoint {
                date: today - chrono::Duration::days(days_back),
                price: round2(floor + range * factor),
            }
        })
        .collect()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Locally synthesized predictions for a fixed set of symbols.
pub struct DummySource {
    rng: Mutex<StdRng>,
    today: Option<NaiveDate>,
    delay: Duration,
    render_charts: bool,
}

impl Default for DummySource {
    fn default() -> Self {
        Self::new()
    }
}

impl DummySource {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
            today: None,
            delay: Duration::ZERO,
            render_charts: true,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..Self::new()
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new().with_delay(settings.dummy_source_delay)
    }

    /// Pins "today" instead of reading the local clock.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Simulated latency before each response.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn without_charts(mut self) -> Self {
        self.render_charts = false;
        self
    }

    pub fn symbols() -> impl Iterator<Item = &'static str> {
        PROFILES.iter().map(|p| p.symbol)
    }

    fn build(&self, profile: &DummyProfile) -> CompanyResult {
        let today = self
            .today
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        let historical_series = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            generate_historical_series(&mut *rng, today, profile.price_floor, profile.price_ceiling)
        };

        let record = StockRecord {
            symbol: profile.symbol.to_string(),
            display_name: profile.name.to_string(),
            current_price: profile.current_price,
            predicted_price: profile.predicted_price,
            confidence_score: profile.confidence_score,
            prediction_date: prediction_date(),
            historical_series,
        };

        let chart = if self.render_charts {
            match chart::render_record_chart(&record) {
                Ok(img) => Some(img),
                Err(e) => {
                    tracing::warn!(symbol = profile.symbol, error = %e, "chart render failed; continuing without image");
                    None
                }
            }
        } else {
            None
        };

        CompanyResult {
            company_symbol: profile.symbol.to_string(),
            company_name: profile.name.to_string(),
            stocks: vec![record],
            chart,
            model: None,
        }
    }
}

#[async_trait::async_trait]
impl PredictionSource for DummySource {
    fn source_name(&self) -> &'static str {
        "dummy"
    }

    async fn resolve(&self, symbol: &str) -> anyhow::Result<Option<CompanyResult>> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let Some(profile) = PROFILES.iter().find(|p| p.symbol == symbol) else {
            tracing::debug!(%symbol, "no dummy profile for symbol");
            return Ok(None);
        };

        Ok(Some(self.build(profile)))
    }
}
