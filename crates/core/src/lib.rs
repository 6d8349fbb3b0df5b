pub mod app;
pub mod catalog;
pub mod chart;
pub mod display;
pub mod domain;
pub mod page;
pub mod search;
pub mod source;
pub mod view;

pub mod config {
    use crate::view::DEFAULT_PAGE_SIZE;
    use anyhow::Context;
    use std::time::Duration;

    const DEFAULT_API_TIMEOUT_SECS: u64 = 30;
    const DEFAULT_API_RETRIES: u32 = 3;
    const DEFAULT_IDLE_PHRASE_INTERVAL_MS: u64 = 3000;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum SourceKind {
        Dummy,
        Http,
    }

    impl std::str::FromStr for SourceKind {
        type Err = anyhow::Error;

        fn from_str(s: &str) -> anyhow::Result<Self> {
            match s.trim().to_ascii_lowercase().as_str() {
                "" | "dummy" => Ok(Self::Dummy),
                "http" => Ok(Self::Http),
                other => anyhow::bail!("unknown PREDICTION_SOURCE {other:?} (expected dummy or http)"),
            }
        }
    }

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub sentry_dsn: Option<String>,
        pub prediction_source: SourceKind,
        pub prediction_api_base_url: Option<String>,
        pub prediction_api_key: Option<String>,
        pub prediction_api_timeout: Duration,
        pub prediction_api_retries: u32,
        pub dummy_source_delay: Duration,
        pub results_page_size: usize,
        pub idle_phrase_interval: Duration,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                sentry_dsn: None,
                prediction_source: SourceKind::Dummy,
                prediction_api_base_url: None,
                prediction_api_key: None,
                prediction_api_timeout: Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
                prediction_api_retries: DEFAULT_API_RETRIES,
                dummy_source_delay: Duration::ZERO,
                results_page_size: DEFAULT_PAGE_SIZE,
                idle_phrase_interval: Duration::from_millis(DEFAULT_IDLE_PHRASE_INTERVAL_MS),
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let prediction_source = match std::env::var("PREDICTION_SOURCE") {
                Ok(s) => s.parse().context("invalid PREDICTION_SOURCE")?,
                Err(_) => SourceKind::Dummy,
            };

            let results_page_size = env_parse("RESULTS_PAGE_SIZE").unwrap_or(DEFAULT_PAGE_SIZE);
            anyhow::ensure!(results_page_size >= 1, "RESULTS_PAGE_SIZE must be >= 1");

            let idle_ms = env_parse("IDLE_PHRASE_INTERVAL_MS").unwrap_or(DEFAULT_IDLE_PHRASE_INTERVAL_MS);
            anyhow::ensure!(idle_ms >= 1, "IDLE_PHRASE_INTERVAL_MS must be >= 1");

            Ok(Self {
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                prediction_source,
                prediction_api_base_url: std::env::var("PREDICTION_API_BASE_URL").ok(),
                prediction_api_key: std::env::var("PREDICTION_API_KEY").ok(),
                prediction_api_timeout: Duration::from_secs(
                    env_parse("PREDICTION_API_TIMEOUT_SECS").unwrap_or(DEFAULT_API_TIMEOUT_SECS),
                ),
                prediction_api_retries: env_parse("PREDICTION_API_RETRIES")
                    .unwrap_or(DEFAULT_API_RETRIES),
                dummy_source_delay: Duration::from_millis(
                    env_parse("DUMMY_SOURCE_DELAY_MS").unwrap_or(0),
                ),
                results_page_size,
                idle_phrase_interval: Duration::from_millis(idle_ms),
            })
        }

        pub fn require_prediction_api_base_url(&self) -> anyhow::Result<&str> {
            self.prediction_api_base_url
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .context("PREDICTION_API_BASE_URL is required when PREDICTION_SOURCE=http")
        }
    }

    fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
        std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
    }

}
