use crate::config::Settings;
use crate::domain::contract::PredictionResponse;
use crate::domain::prediction::CompanyResult;
use crate::source::error::SourceError;
use crate::source::PredictionSource;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use std::time::Duration;

const SOURCE_NAME: &str = "external_http_json";
const DEFAULT_PATH: &str = "/predict";

/// Client for an external prediction backend returning one symbol per request.
#[derive(Debug, Clone)]
pub struct HttpPredictionSource {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    path: String,
    retries: u32,
    backoff_base: Duration,
}

impl HttpPredictionSource {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings.require_prediction_api_base_url()?.to_string();

        let path = std::env::var("PREDICTION_API_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PATH.to_string());

        Self::new(
            base_url,
            settings.prediction_api_key.clone(),
            path,
            settings.prediction_api_timeout,
            settings.prediction_api_retries,
        )
    }

    pub fn new(
        base_url: String,
        api_key: Option<String>,
        path: String,
        timeout: Duration,
        retries: u32,
    ) -> Result<Self> {
        anyhow::ensure!(!base_url.trim().is_empty(), "prediction API base url must be non-empty");

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build prediction API http client")?;

        Ok(Self {
            http,
            base_url,
            api_key,
            path,
            retries: retries.max(1),
            backoff_base: Duration::from_secs(1),
        })
    }

    pub fn with_backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    fn url(&self) -> String {
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };

        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &self.api_key {
            headers.insert("x-api-key", HeaderValue::from_str(api_key)?);
        }
        Ok(headers)
    }

    fn error(&self, symbol: &str, stage: &'static str, detail: String, status: Option<u16>) -> SourceError {
        SourceError {
            source_name: SOURCE_NAME,
            stage,
            symbol: symbol.to_string(),
            detail,
            status,
        }
    }

    async fn fetch_once(&self, symbol: &str) -> Result<Option<CompanyResult>> {
        let headers = self.headers()?;

        let res = self
            .http
            .get(self.url())
            .headers(headers)
            .query(&[("symbol", symbol)])
            .send()
            .await
            .map_err(|e| self.error(symbol, "http", e.to_string(), None))?;

        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let text = res
            .text()
            .await
            .map_err(|e| self.error(symbol, "http", e.to_string(), Some(status.as_u16())))?;

        if !status.is_success() {
            return Err(self
                .error(symbol, "status", format!("HTTP {status}: {text}"), Some(status.as_u16()))
                .into());
        }

        let parsed = serde_json::from_str::<PredictionResponse>(&text)
            .map_err(|e| self.error(symbol, "decode", format!("{e}: {text}"), Some(status.as_u16())))?;

        let result = parsed
            .validate_and_into_result(symbol)
            .map_err(|e| self.error(symbol, "validate", format!("{e:#}"), Some(status.as_u16())))?;
        Ok(Some(result))
    }
}

#[async_trait::async_trait]
impl PredictionSource for HttpPredictionSource {
    fn source_name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn resolve(&self, symbol: &str) -> Result<Option<CompanyResult>> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.fetch_once(symbol).await {
                Ok(result) => return Ok(result),
                Err(err) => {
                    let retryable = err
                        .downcast_ref::<SourceError>()
                        .map(SourceError::is_retryable)
                        .unwrap_or(false);
                    if !retryable || attempt >= self.retries {
                        return Err(err);
                    }
                    let backoff = self.backoff_base * (1 << (attempt - 1));
                    tracing::warn!(attempt, ?backoff, %symbol, error = %err, "prediction fetch failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}
