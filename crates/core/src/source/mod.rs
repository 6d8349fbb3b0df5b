pub mod dummy;
pub mod error;
pub mod http;

use crate::config::{Settings, SourceKind};
use crate::domain::prediction::CompanyResult;
use std::sync::Arc;

pub use dummy::DummySource;
pub use error::SourceError;
pub use http::HttpPredictionSource;

/// Resolves a normalized ticker symbol into a prediction result.
///
/// `Ok(None)` means the symbol is unknown to the source, which is not a failure.
#[async_trait::async_trait]
pub trait PredictionSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    async fn resolve(&self, symbol: &str) -> anyhow::Result<Option<CompanyResult>>;
}

pub fn from_settings(settings: &Settings) -> anyhow::Result<Arc<dyn PredictionSource>> {
    let source: Arc<dyn PredictionSource> = match settings.prediction_source {
        SourceKind::Dummy => Arc::new(DummySource::from_settings(settings)),
        SourceKind::Http => Arc::new(HttpPredictionSource::from_settings(settings)?),
    };
    tracing::info!(source = source.source_name(), "prediction source configured");
    Ok(source)
}
