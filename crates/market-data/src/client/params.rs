//! Request parameters and the `function` discriminator.

use std::fmt;

use serde_json::Value;

/// Query parameter carrying the credential. Appended only to the outbound URL.
pub(crate) const API_KEY_PARAM: &str = "apikey";

const FUNCTION_PARAM: &str = "function";

/// Remote operation selected by the `function` query parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Function {
    GlobalQuote,
    TimeSeriesDaily,
    TimeSeriesDailyAdjusted,
    SymbolSearch,
    Overview,
    MarketStatus,
    TopGainersLosers,
    CurrencyExchangeRate,
    Sma,
    Ema,
    Rsi,
    Macd,
}

impl Function {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GlobalQuote => "GLOBAL_QUOTE",
            Self::TimeSeriesDaily => "TIME_SERIES_DAILY",
            Self::TimeSeriesDailyAdjusted => "TIME_SERIES_DAILY_ADJUSTED",
            Self::SymbolSearch => "SYMBOL_SEARCH",
            Self::Overview => "OVERVIEW",
            Self::MarketStatus => "MARKET_STATUS",
            Self::TopGainersLosers => "TOP_GAINERS_LOSERS",
            Self::CurrencyExchangeRate => "CURRENCY_EXCHANGE_RATE",
            Self::Sma => "SMA",
            Self::Ema => "EMA",
            Self::Rsi => "RSI",
            Self::Macd => "MACD",
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single query parameter value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
}

impl ParamValue {
    fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::from(s.as_str()),
            Self::Integer(n) => Value::from(*n),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

/// Ordered query parameters of one API request.
///
/// Insertion order is preserved and is part of the cache key: the same pairs
/// inserted in a different order produce a different key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestParams {
    entries: Vec<(String, ParamValue)>,
}

impl RequestParams {
    /// Start a parameter set for a known operation.
    pub fn new(function: Function) -> Self {
        Self::with_function(function.as_str())
    }

    /// Start a parameter set for an arbitrary `function` name.
    pub fn with_function(function: impl Into<String>) -> Self {
        Self {
            entries: vec![(FUNCTION_PARAM.to_string(), ParamValue::Text(function.into()))],
        }
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a parameter. An existing key keeps its position and takes the new value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// The `function` discriminator.
    pub fn function(&self) -> String {
        self.get(FUNCTION_PARAM)
            .map(|v| v.to_string())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Deterministic, order-sensitive serialization used as the cache key.
    ///
    /// Produces a compact JSON object, e.g. `{"function":"GLOBAL_QUOTE","symbol":"IBM"}`.
    pub fn cache_key(&self) -> String {
        let mut key = String::from("{");
        for (i, (k, v)) in self.entries.iter().enumerate() {
            if i > 0 {
                key.push(',');
            }
            key.push_str(&Value::from(k.as_str()).to_string());
            key.push(':');
            key.push_str(&v.to_json().to_string());
        }
        key.push('}');
        key
    }

    /// Query pairs for the outbound URL, credential last.
    pub(crate) fn query_pairs(&self, api_key: &str) -> Vec<(String, String)> {
        self.entries
            .iter()
            .filter(|(k, _)| k != API_KEY_PARAM)
            .map(|(k, v)| (k.clone(), v.to_string()))
            .chain(std::iter::once((API_KEY_PARAM.to_string(), api_key.to_string())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_is_first_param() {
        let params = RequestParams::new(Function::GlobalQuote).with("symbol", "IBM");
        assert_eq!(params.function(), "GLOBAL_QUOTE");
        assert_eq!(params.iter().next().unwrap().0, "function");
    }

    #[test]
    fn test_cache_key_is_json_object() {
        let params = RequestParams::new(Function::Sma)
            .with("symbol", "IBM")
            .with("time_period", 20u32);
        assert_eq!(
            params.cache_key(),
            r#"{"function":"SMA","symbol":"IBM","time_period":20}"#
        );
    }

    #[test]
    fn test_cache_key_is_order_sensitive() {
        let a = RequestParams::new(Function::TimeSeriesDaily)
            .with("symbol", "IBM")
            .with("outputsize", "compact");
        let b = RequestParams::new(Function::TimeSeriesDaily)
            .with("outputsize", "compact")
            .with("symbol", "IBM");
        assert_ne!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_cache_key_escapes_strings() {
        let params = RequestParams::new(Function::SymbolSearch).with("keywords", "a\"b");
        assert_eq!(
            params.cache_key(),
            r#"{"function":"SYMBOL_SEARCH","keywords":"a\"b"}"#
        );
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut params = RequestParams::new(Function::GlobalQuote).with("symbol", "IBM");
        params.set("symbol", "AAPL");
        let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["function", "symbol"]);
        assert_eq!(params.get("symbol"), Some(&ParamValue::from("AAPL")));
    }

    #[test]
    fn test_query_pairs_append_credential() {
        let params = RequestParams::new(Function::GlobalQuote).with("symbol", "IBM");
        let pairs = params.query_pairs("secret");
        assert_eq!(
            pairs.last(),
            Some(&("apikey".to_string(), "secret".to_string()))
        );
        assert!(!params.cache_key().contains("secret"));
    }

    #[test]
    fn test_query_pairs_ignore_caller_supplied_credential() {
        let params = RequestParams::new(Function::GlobalQuote).with("apikey", "other");
        let pairs = params.query_pairs("secret");
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["function", "apikey"]);
        assert_eq!(pairs[1].1, "secret");
    }
}
