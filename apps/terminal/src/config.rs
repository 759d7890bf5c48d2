use std::time::Duration;

use stocksim_market_data::{DEFAULT_BASE_URL, DEFAULT_CACHE_DURATION, DEFAULT_REQUEST_TIMEOUT};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_API_KEY: &str = "demo";
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_WATCHLIST: [&str; 10] = [
    "AAPL", "TSLA", "MSFT", "AMZN", "GOOGL", "NVDA", "META", "JPM", "V", "UNH",
];

pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub cache_duration: Duration,
    pub request_timeout: Duration,
    pub search_debounce: Duration,
    pub watchlist: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let millis = |name: &str, default: Duration| {
            lookup(name)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(default)
        };

        let api_key = lookup("STOCKSIM_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_KEY.into());
        let base_url = lookup("STOCKSIM_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let watchlist: Vec<String> = lookup("STOCKSIM_WATCHLIST")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
        let watchlist = if watchlist.is_empty() {
            DEFAULT_WATCHLIST.iter().map(|s| s.to_string()).collect()
        } else {
            watchlist
        };

        Self {
            api_key,
            base_url,
            cache_duration: millis("STOCKSIM_CACHE_DURATION_MS", DEFAULT_CACHE_DURATION),
            request_timeout: millis("STOCKSIM_REQUEST_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT),
            search_debounce: millis("STOCKSIM_SEARCH_DEBOUNCE_MS", DEFAULT_SEARCH_DEBOUNCE),
            watchlist,
        }
    }
}

/// Install the global subscriber. `log` records from the market-data crate
/// are bridged into it.
pub fn init_tracing() {
    let log_format = std::env::var("STOCKSIM_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so they never interleave with rendered tables
    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config.api_key, "demo");
        assert_eq!(config.base_url, "https://www.alphavantage.co/query");
        assert_eq!(config.cache_duration, Duration::from_millis(300_000));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.search_debounce, Duration::from_millis(300));
        assert_eq!(config.watchlist.len(), 10);
        assert_eq!(config.watchlist[0], "AAPL");
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("STOCKSIM_API_KEY", "k3y"),
            ("STOCKSIM_CACHE_DURATION_MS", "1000"),
            ("STOCKSIM_SEARCH_DEBOUNCE_MS", "50"),
            ("STOCKSIM_WATCHLIST", " ibm, ,msft "),
        ]);
        assert_eq!(config.api_key, "k3y");
        assert_eq!(config.cache_duration, Duration::from_secs(1));
        assert_eq!(config.search_debounce, Duration::from_millis(50));
        assert_eq!(config.watchlist, vec!["IBM", "MSFT"]);
    }

    #[test]
    fn test_unparseable_numbers_fall_back() {
        let config = config(&[("STOCKSIM_REQUEST_TIMEOUT_MS", "soon")]);
        assert_eq!(config.request_timeout, Duration::from_millis(30_000));
    }
}
