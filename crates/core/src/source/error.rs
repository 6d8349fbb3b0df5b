use std::fmt;

/// Diagnostics for a failed lookup against a prediction backend.
#[derive(Debug, Clone)]
pub struct SourceError {
    pub source_name: &'static str,
    pub stage: &'static str,
    pub symbol: String,
    pub detail: String,
    pub status: Option<u16>,
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "prediction lookup failed (source={}, stage={}, symbol={}): {}",
            self.source_name, self.stage, self.symbol, self.detail
        )
    }
}

impl std::error::Error for SourceError {}

impl SourceError {
    /// Server-side (5xx, 429) and transport failures are retryable.
    pub fn is_retryable(&self) -> bool {
        match self.status {
            Some(status) => status >= 500 || status == 429,
            None => self.stage == "http",
        }
    }
}
