//! Alpha Vantage data client.
//!
//! [`DataClient::request`] is the single entry point to the network: it
//! serves fresh cached payloads, otherwise fetches, checks the API's error
//! conventions and caches the body. The derived operations pick their
//! top-level section out of the payload and reshape it into typed records.
//!
//! A missing section is "no data for this query" and comes back as `None` or
//! an empty collection, never as an error.

mod cache;
mod params;
mod responses;
mod transport;

pub use cache::{ResponseCache, DEFAULT_CACHE_DURATION};
pub use params::{Function, ParamValue, RequestParams};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport, DEFAULT_REQUEST_TIMEOUT};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, warn};
use reqwest::Url;
use serde_json::{Map, Value};

use crate::errors::MarketDataError;
use crate::models::{
    AdjustedDailyBar, DailyBar, ExchangeRate, GlobalQuote, Interval, MarketMover, MarketStatus,
    MoverList, OutputSize, SeriesType, SymbolMatch,
};

use responses::{
    RawAdjustedDailyBar, RawDailyBar, RawExchangeRate, RawGlobalQuote, RawMarketMover,
    RawMarketStatus, RawSymbolMatch, BEST_MATCHES_KEY, DAILY_SERIES_KEY, ERROR_MESSAGE_KEY,
    EXCHANGE_RATE_KEY, GLOBAL_QUOTE_KEY, INFORMATION_KEY, MARKETS_KEY, NOTE_KEY,
};

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";

/// Client for the Alpha Vantage query API with a time-bounded response cache.
///
/// All methods take `&self`; share the client behind an `Arc` when several
/// tasks need it. Concurrent requests for the same parameters are not
/// deduplicated: each one that misses the cache goes to the network.
pub struct DataClient {
    transport: Arc<dyn HttpTransport>,
    api_key: String,
    base_url: String,
    cache: ResponseCache,
}

impl DataClient {
    /// Create a client with the default `reqwest` transport.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_transport(api_key, Arc::new(ReqwestTransport::default()))
    }

    /// Create a client that sends requests through `transport`.
    pub fn with_transport(api_key: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            cache: ResponseCache::default(),
        }
    }

    /// Point the client at another endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache_duration(&self) -> Duration {
        self.cache.ttl()
    }

    /// Replace the cache expiry threshold.
    ///
    /// Entries already stored are measured against the new threshold on their
    /// next lookup. `Duration::ZERO` disables cache hits entirely.
    pub fn set_cache_duration(&self, duration: Duration) {
        debug!("Alpha Vantage: cache duration set to {:?}", duration);
        self.cache.set_ttl(duration);
    }

    /// Drop every cached response.
    pub fn clear_cache(&self) {
        debug!("Alpha Vantage: cache cleared");
        self.cache.clear();
    }

    /// Perform a request, serving it from the cache when a fresh entry exists.
    ///
    /// # Errors
    ///
    /// - [`MarketDataError::Transport`] for a non-success HTTP status
    /// - [`MarketDataError::Api`] when the body carries an `Error Message`
    /// - [`MarketDataError::Network`] when no response arrived
    /// - [`MarketDataError::MalformedResponse`] when the body is not JSON
    ///
    /// Failures are logged before being returned and are never cached.
    pub async fn request(&self, params: &RequestParams) -> Result<Value, MarketDataError> {
        let function = params.function();
        let key = params.cache_key();

        if let Some(payload) = self.cache.get(&key) {
            debug!("Alpha Vantage: cache hit for {}", key);
            return Ok(payload);
        }

        let url = self.build_url(params)?;
        debug!("Alpha Vantage request: {}", self.redact(url.as_str()));

        let response = self.transport.get(&url).await.map_err(|e| {
            let e = self.scrub(e);
            error!("Alpha Vantage {} request failed: {}", function, e);
            e
        })?;

        if !response.is_success() {
            error!(
                "Alpha Vantage {} request failed: HTTP {}",
                function, response.status
            );
            return Err(MarketDataError::Transport {
                status: response.status,
            });
        }

        let body: Value = serde_json::from_str(&response.body).map_err(|e| {
            error!("Alpha Vantage {} returned invalid JSON: {}", function, e);
            MarketDataError::malformed(function.as_str(), format!("invalid JSON: {}", e))
        })?;

        Self::check_api_error(&function, &body)?;

        self.cache.insert(key, body.clone());
        Ok(body)
    }

    fn build_url(&self, params: &RequestParams) -> Result<Url, MarketDataError> {
        Url::parse_with_params(&self.base_url, params.query_pairs(&self.api_key)).map_err(|e| {
            error!("Alpha Vantage: failed to build URL: {}", e);
            MarketDataError::InvalidRequest(format!("Failed to build URL: {}", e))
        })
    }

    /// Strip the credential from a transport failure before it is logged or
    /// handed to the caller.
    fn scrub(&self, error: MarketDataError) -> MarketDataError {
        match error {
            MarketDataError::Network(e) => MarketDataError::Network(e.without_url()),
            MarketDataError::Api { message } => MarketDataError::Api {
                message: self.redact(&message),
            },
            MarketDataError::MalformedResponse { function, message } => {
                MarketDataError::MalformedResponse {
                    function,
                    message: self.redact(&message),
                }
            }
            MarketDataError::InvalidRequest(message) => {
                MarketDataError::InvalidRequest(self.redact(&message))
            }
            other => other,
        }
    }

    fn redact(&self, url: &str) -> String {
        if self.api_key.is_empty() {
            return url.to_string();
        }
        url.replace(&self.api_key, "***")
    }

    /// Check for API-level errors and advisories in the response.
    fn check_api_error(function: &str, body: &Value) -> Result<(), MarketDataError> {
        if let Some(message) = body.get(ERROR_MESSAGE_KEY) {
            let message = match message {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            error!("Alpha Vantage {} error: {}", function, message);
            return Err(MarketDataError::Api { message });
        }

        // "Note" usually indicates rate limiting; it does not stop the call
        if let Some(note) = body.get(NOTE_KEY).and_then(Value::as_str) {
            warn!("Alpha Vantage note: {}", note);
        }

        if let Some(info) = body.get(INFORMATION_KEY).and_then(Value::as_str) {
            warn!("Alpha Vantage info: {}", info);
        }

        Ok(())
    }

    // ========================================================================
    // Derived operations
    // ========================================================================

    /// Latest quote for `symbol` (GLOBAL_QUOTE).
    pub async fn get_global_quote(
        &self,
        symbol: &str,
    ) -> Result<Option<GlobalQuote>, MarketDataError> {
        let function = Function::GlobalQuote;
        let params = RequestParams::new(function).with("symbol", symbol);
        let mut body = self.request(&params).await?;

        match responses::take_record::<RawGlobalQuote>(&mut body, GLOBAL_QUOTE_KEY, function)? {
            Some(raw) => raw.into_model().map(Some),
            None => {
                debug!("Alpha Vantage: no quote for {}", symbol);
                Ok(None)
            }
        }
    }

    /// Daily bars for `symbol`, oldest first (TIME_SERIES_DAILY).
    pub async fn get_time_series_daily(
        &self,
        symbol: &str,
        output_size: OutputSize,
    ) -> Result<Option<Vec<DailyBar>>, MarketDataError> {
        let function = Function::TimeSeriesDaily;
        let params = RequestParams::new(function)
            .with("symbol", symbol)
            .with("outputsize", output_size.as_str());
        let mut body = self.request(&params).await?;

        let Some(series) = responses::take_section::<HashMap<String, RawDailyBar>>(
            &mut body,
            DAILY_SERIES_KEY,
            function,
        )?
        else {
            return Ok(None);
        };

        let bars = responses::daily_bars(series)?;
        debug!(
            "Alpha Vantage: fetched {} daily bars for {}",
            bars.len(),
            symbol
        );
        Ok(Some(bars))
    }

    /// Split/dividend adjusted daily bars for `symbol`, oldest first
    /// (TIME_SERIES_DAILY_ADJUSTED).
    pub async fn get_time_series_daily_adjusted(
        &self,
        symbol: &str,
        output_size: OutputSize,
    ) -> Result<Option<Vec<AdjustedDailyBar>>, MarketDataError> {
        let function = Function::TimeSeriesDailyAdjusted;
        let params = RequestParams::new(function)
            .with("symbol", symbol)
            .with("outputsize", output_size.as_str());
        let mut body = self.request(&params).await?;

        let Some(series) = responses::take_section::<HashMap<String, RawAdjustedDailyBar>>(
            &mut body,
            DAILY_SERIES_KEY,
            function,
        )?
        else {
            return Ok(None);
        };

        let bars = responses::adjusted_daily_bars(series)?;
        debug!(
            "Alpha Vantage: fetched {} adjusted daily bars for {}",
            bars.len(),
            symbol
        );
        Ok(Some(bars))
    }

    /// Symbols matching `keywords`, in the order the server ranked them.
    pub async fn symbol_search(&self, keywords: &str) -> Result<Vec<SymbolMatch>, MarketDataError> {
        let function = Function::SymbolSearch;
        let params = RequestParams::new(function).with("keywords", keywords);
        let mut body = self.request(&params).await?;

        responses::take_section::<Vec<RawSymbolMatch>>(&mut body, BEST_MATCHES_KEY, function)?
            .unwrap_or_default()
            .into_iter()
            .map(RawSymbolMatch::into_model)
            .collect()
    }

    /// Company fundamentals (OVERVIEW), passed through as returned.
    ///
    /// Unknown symbols come back as an empty object, reported as `None`.
    pub async fn get_company_overview(
        &self,
        symbol: &str,
    ) -> Result<Option<Map<String, Value>>, MarketDataError> {
        let params = RequestParams::new(Function::Overview).with("symbol", symbol);
        let body = self.request(&params).await?;

        let overview = responses::into_object(body);
        if overview.is_empty() {
            debug!("Alpha Vantage: no company overview for {}", symbol);
            return Ok(None);
        }
        Ok(Some(overview))
    }

    /// Open/closed status of the major trading venues (MARKET_STATUS).
    pub async fn get_market_status(&self) -> Result<Vec<MarketStatus>, MarketDataError> {
        let function = Function::MarketStatus;
        let params = RequestParams::new(function);
        let mut body = self.request(&params).await?;

        Ok(
            responses::take_section::<Vec<RawMarketStatus>>(&mut body, MARKETS_KEY, function)?
                .unwrap_or_default(),
        )
    }

    /// Top gainers, losers or most actively traded tickers (TOP_GAINERS_LOSERS).
    pub async fn get_market_movers(
        &self,
        list: MoverList,
    ) -> Result<Vec<MarketMover>, MarketDataError> {
        let function = Function::TopGainersLosers;
        let params = RequestParams::new(function);
        let mut body = self.request(&params).await?;

        responses::take_section::<Vec<RawMarketMover>>(&mut body, list.response_key(), function)?
            .unwrap_or_default()
            .into_iter()
            .map(RawMarketMover::into_model)
            .collect()
    }

    /// Realtime exchange rate between two currencies (CURRENCY_EXCHANGE_RATE).
    pub async fn get_exchange_rate(
        &self,
        from_currency: &str,
        to_currency: &str,
    ) -> Result<Option<ExchangeRate>, MarketDataError> {
        let function = Function::CurrencyExchangeRate;
        let params = RequestParams::new(function)
            .with("from_currency", from_currency)
            .with("to_currency", to_currency);
        let mut body = self.request(&params).await?;

        responses::take_record::<RawExchangeRate>(&mut body, EXCHANGE_RATE_KEY, function)?
            .map(RawExchangeRate::into_model)
            .transpose()
    }

    /// Simple moving average (SMA).
    pub async fn get_sma(
        &self,
        symbol: &str,
        interval: Interval,
        time_period: u32,
        series_type: SeriesType,
    ) -> Result<Map<String, Value>, MarketDataError> {
        let params = Self::indicator_params(Function::Sma, symbol, interval)
            .with("time_period", time_period)
            .with("series_type", series_type.as_str());
        self.get_indicator(Function::Sma, &params).await
    }

    /// Exponential moving average (EMA).
    pub async fn get_ema(
        &self,
        symbol: &str,
        interval: Interval,
        time_period: u32,
        series_type: SeriesType,
    ) -> Result<Map<String, Value>, MarketDataError> {
        let params = Self::indicator_params(Function::Ema, symbol, interval)
            .with("time_period", time_period)
            .with("series_type", series_type.as_str());
        self.get_indicator(Function::Ema, &params).await
    }

    /// Relative strength index (RSI).
    pub async fn get_rsi(
        &self,
        symbol: &str,
        interval: Interval,
        time_period: u32,
        series_type: SeriesType,
    ) -> Result<Map<String, Value>, MarketDataError> {
        let params = Self::indicator_params(Function::Rsi, symbol, interval)
            .with("time_period", time_period)
            .with("series_type", series_type.as_str());
        self.get_indicator(Function::Rsi, &params).await
    }

    /// Moving average convergence/divergence (MACD).
    pub async fn get_macd(
        &self,
        symbol: &str,
        interval: Interval,
        series_type: SeriesType,
    ) -> Result<Map<String, Value>, MarketDataError> {
        let params = Self::indicator_params(Function::Macd, symbol, interval)
            .with("series_type", series_type.as_str());
        self.get_indicator(Function::Macd, &params).await
    }

    fn indicator_params(function: Function, symbol: &str, interval: Interval) -> RequestParams {
        RequestParams::new(function)
            .with("symbol", symbol)
            .with("interval", interval.as_str())
    }

    async fn get_indicator(
        &self,
        function: Function,
        params: &RequestParams,
    ) -> Result<Map<String, Value>, MarketDataError> {
        let mut body = self.request(params).await?;
        let key = responses::indicator_key(function);

        Ok(
            responses::take_section::<Map<String, Value>>(&mut body, &key, function)?
                .unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let client = DataClient::new("test_key");
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert_eq!(client.cache_duration(), Duration::from_millis(300_000));
    }

    #[test]
    fn test_build_url_appends_credential() {
        let client = DataClient::new("test_key");
        let params = RequestParams::new(Function::GlobalQuote).with("symbol", "IBM");
        let url = client.build_url(&params).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.alphavantage.co/query?function=GLOBAL_QUOTE&symbol=IBM&apikey=test_key"
        );
    }

    #[test]
    fn test_build_url_invalid_base() {
        let client = DataClient::new("test_key").with_base_url("not a url");
        let params = RequestParams::new(Function::MarketStatus);
        assert!(matches!(
            client.build_url(&params),
            Err(MarketDataError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_redact_hides_credential() {
        let client = DataClient::new("s3cr3t");
        assert_eq!(
            client.redact("https://x/query?function=OVERVIEW&apikey=s3cr3t"),
            "https://x/query?function=OVERVIEW&apikey=***"
        );
    }

    #[test]
    fn test_redact_with_empty_credential() {
        let client = DataClient::new("");
        assert_eq!(client.redact("https://x/query"), "https://x/query");
    }

    #[test]
    fn test_check_api_error() {
        let body = serde_json::json!({"Error Message": "Invalid API call."});
        match DataClient::check_api_error("GLOBAL_QUOTE", &body) {
            Err(MarketDataError::Api { message }) => assert_eq!(message, "Invalid API call."),
            other => panic!("unexpected result: {:?}", other),
        }

        let body = serde_json::json!({"Note": "Thank you for using Alpha Vantage!"});
        assert!(DataClient::check_api_error("GLOBAL_QUOTE", &body).is_ok());
    }
}
