use crate::domain::prediction::{ChartImage, CompanyResult, ModelSummary, PricePoint, StockRecord};
use anyhow::ensure;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Body returned by the external prediction backend for a single symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub symbol: String,
    pub company_name: String,
    pub current_price: f64,
    pub predicted_price: f64,
    pub confidence_score: f64,
    pub prediction_date: NaiveDate,
    pub model_name: String,
    #[serde(default)]
    pub rmse: Option<f64>,
    #[serde(default)]
    pub chart_png_base64: Option<String>,
    #[serde(default)]
    pub historical: Vec<PricePoint>,
}

impl PredictionResponse {
    pub fn validate_and_into_result(self, expected_symbol: &str) -> anyhow::Result<CompanyResult> {
        let symbol = self.symbol.trim().to_uppercase();
        ensure!(!symbol.is_empty(), "symbol must be non-empty");
        ensure!(
            symbol == expected_symbol,
            "backend symbol mismatch: expected {expected_symbol}, got {symbol}"
        );

        let company_name = self.company_name.trim().to_string();
        ensure!(!company_name.is_empty(), "company_name must be non-empty");

        ensure!(
            self.current_price.is_finite() && self.current_price > 0.0,
            "current_price must be positive (got {})",
            self.current_price
        );
        ensure!(
            self.predicted_price.is_finite() && self.predicted_price >= 0.0,
            "predicted_price must be non-negative (got {})",
            self.predicted_price
        );
        ensure!(
            (0.0..=100.0).contains(&self.confidence_score),
            "confidence_score must be between 0 and 100 (got {})",
            self.confidence_score
        );

        if let Some(rmse) = self.rmse {
            ensure!(rmse.is_finite() && rmse >= 0.0, "rmse must be non-negative (got {rmse})");
        }

        let model_name = self.model_name.trim().to_string();
        let model = (!model_name.is_empty()).then(|| ModelSummary {
            name: model_name,
            rmse: self.rmse,
        });

        let chart = self
            .chart_png_base64
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(ChartImage::from_base64);

        let record = StockRecord {
            symbol: symbol.clone(),
            display_name: company_name.clone(),
            current_price: self.current_price,
            predicted_price: self.predicted_price,
            confidence_score: self.confidence_score,
            prediction_date: self.prediction_date,
            historical_series: self.historical,
        };

        Ok(CompanyResult {
            company_symbol: symbol,
            company_name,
            stocks: vec![record],
            chart,
            model,
        })
    }
}
