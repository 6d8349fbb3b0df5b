use base64::Engine;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    pub symbol: String,
    pub display_name: String,
    pub current_price: f64,
    pub predicted_price: f64,
    /// 0..=100, cosmetic.
    pub confidence_score: f64,
    pub prediction_date: NaiveDate,
    pub historical_series: Vec<PricePoint>,
}

impl StockRecord {
    /// Historical series with the prediction appended as the final point.
    pub fn chart_series(&self) -> Vec<PricePoint> {
        let mut out = Vec::with_capacity(self.historical_series.len() + 1);
        out.extend_from_slice(&self.historical_series);
        out.push(PricePoint {
            date: self.prediction_date,
            price: self.predicted_price,
        });
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub name: String,
    pub rmse: Option<f64>,
}

/// Opaque base64-encoded PNG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartImage(String);

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

impl ChartImage {
    pub fn from_base64(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn from_png_bytes(png: &[u8]) -> Self {
        Self(base64::engine::general_purpose::STANDARD.encode(png))
    }

    pub fn as_base64(&self) -> &str {
        &self.0
    }

    /// Decodes the payload and checks the PNG signature.
    pub fn decode_png(&self) -> anyhow::Result<Vec<u8>> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(self.0.trim())
            .map_err(|e| anyhow::anyhow!("chart image is not valid base64: {e}"))?;
        anyhow::ensure!(
            bytes.starts_with(&PNG_SIGNATURE),
            "chart image is not a PNG ({} bytes)",
            bytes.len()
        );
        Ok(bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyResult {
    pub company_symbol: String,
    pub company_name: String,
    pub stocks: Vec<StockRecord>,
    pub chart: Option<ChartImage>,
    pub model: Option<ModelSummary>,
}
