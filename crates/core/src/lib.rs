pub mod domain;
pub mod ingest;
pub mod time;

pub mod config {
    use anyhow::Context;

    pub const DEFAULT_TICKER: &str = "RELIANCE.NS";
    pub const DEFAULT_PORT: u16 = 5000;
    pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";
    pub const DEFAULT_USER_AGENT: &str =
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub default_ticker: String,
        pub port: u16,
        pub yahoo_base_url: String,
        pub yahoo_user_agent: String,
        pub data_provider_timeout_secs: u64,
        pub sentry_dsn: Option<String>,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                default_ticker: DEFAULT_TICKER.to_string(),
                port: DEFAULT_PORT,
                yahoo_base_url: DEFAULT_YAHOO_BASE_URL.to_string(),
                yahoo_user_agent: DEFAULT_USER_AGENT.to_string(),
                data_provider_timeout_secs: DEFAULT_TIMEOUT_SECS,
                sentry_dsn: None,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_lookup(|key| std::env::var(key).ok())
        }

        /// Builds settings from an arbitrary key lookup; `from_env` passes the process environment.
        pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
            let defaults = Self::default();
            let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

            let port = match non_blank("PORT") {
                Some(v) => v
                    .trim()
                    .parse::<u16>()
                    .with_context(|| format!("PORT must be a valid port number (got {v:?})"))?,
                None => defaults.port,
            };

            let data_provider_timeout_secs = match non_blank("DATA_PROVIDER_TIMEOUT_SECS") {
                Some(v) => v.trim().parse::<u64>().with_context(|| {
                    format!("DATA_PROVIDER_TIMEOUT_SECS must be a whole number of seconds (got {v:?})")
                })?,
                None => defaults.data_provider_timeout_secs,
            };

            Ok(Self {
                default_ticker: non_blank("DEFAULT_TICKER")
                    .map(|v| v.trim().to_string())
                    .unwrap_or(defaults.default_ticker),
                port,
                yahoo_base_url: non_blank("YAHOO_BASE_URL").unwrap_or(defaults.yahoo_base_url),
                yahoo_user_agent: non_blank("YAHOO_USER_AGENT")
                    .unwrap_or(defaults.yahoo_user_agent),
                data_provider_timeout_secs,
                sentry_dsn: non_blank("SENTRY_DSN"),
            })
        }
    }

}
