//! Raw API payloads and their conversion into typed records.
//!
//! The API keys most fields with a numbered, human readable label
//! ("05. price") and sends every number as a string. Each payload gets a raw
//! struct mirroring the wire format; conversion parses the strings and fails
//! the call with [`MarketDataError::MalformedResponse`] on the first bad field.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use log::error;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::errors::MarketDataError;
use crate::models::{
    AdjustedDailyBar, DailyBar, ExchangeRate, GlobalQuote, MarketMover, MarketStatus, SymbolMatch,
};

use super::params::Function;

pub(crate) const GLOBAL_QUOTE_KEY: &str = "Global Quote";
pub(crate) const DAILY_SERIES_KEY: &str = "Time Series (Daily)";
pub(crate) const BEST_MATCHES_KEY: &str = "bestMatches";
pub(crate) const MARKETS_KEY: &str = "markets";
pub(crate) const EXCHANGE_RATE_KEY: &str = "Realtime Currency Exchange Rate";
pub(crate) const ERROR_MESSAGE_KEY: &str = "Error Message";
pub(crate) const NOTE_KEY: &str = "Note";
pub(crate) const INFORMATION_KEY: &str = "Information";

/// Top-level key of a technical indicator payload.
pub(crate) fn indicator_key(function: Function) -> String {
    format!("Technical Analysis: {}", function.as_str())
}

// ============================================================================
// Field parsing
// ============================================================================

fn malformed(function: Function, message: String) -> MarketDataError {
    error!("Alpha Vantage {} response malformed: {}", function, message);
    MarketDataError::malformed(function.as_str(), message)
}

fn parse_decimal(function: Function, field: &str, value: &str) -> Result<Decimal, MarketDataError> {
    Decimal::from_str(value.trim())
        .or_else(|_| Decimal::from_scientific(value.trim()))
        .map_err(|_| malformed(function, format!("{}: invalid decimal '{}'", field, value)))
}

fn parse_volume(function: Function, field: &str, value: &str) -> Result<u64, MarketDataError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| malformed(function, format!("{}: invalid volume '{}'", field, value)))
}

fn parse_date(function: Function, field: &str, value: &str) -> Result<NaiveDate, MarketDataError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| malformed(function, format!("{}: invalid date '{}'", field, value)))
}

fn parse_score(function: Function, field: &str, value: &str) -> Result<f64, MarketDataError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|score| score.is_finite())
        .ok_or_else(|| malformed(function, format!("{}: invalid score '{}'", field, value)))
}

// ============================================================================
// Section extraction
// ============================================================================

/// Remove and deserialize the section under `key`.
///
/// A missing key or a JSON `null` means "no data" and yields `Ok(None)`.
pub(crate) fn take_section<T: DeserializeOwned>(
    body: &mut Value,
    key: &str,
    function: Function,
) -> Result<Option<T>, MarketDataError> {
    let section = match body.get_mut(key).map(Value::take) {
        None | Some(Value::Null) => return Ok(None),
        Some(section) => section,
    };

    serde_json::from_value(section)
        .map(Some)
        .map_err(|e| malformed(function, format!("{}: {}", key, e)))
}

/// Like [`take_section`], but an empty object also means "no data".
///
/// Single-record payloads come back as `{}` for unknown symbols.
pub(crate) fn take_record<T: DeserializeOwned>(
    body: &mut Value,
    key: &str,
    function: Function,
) -> Result<Option<T>, MarketDataError> {
    if body
        .get(key)
        .and_then(Value::as_object)
        .is_some_and(Map::is_empty)
    {
        return Ok(None);
    }
    take_section(body, key, function)
}

/// The whole body as an object, advisories removed.
pub(crate) fn into_object(body: Value) -> Map<String, Value> {
    match body {
        Value::Object(mut map) => {
            map.remove(NOTE_KEY);
            map.remove(INFORMATION_KEY);
            map
        }
        _ => Map::new(),
    }
}

// ============================================================================
// GLOBAL_QUOTE
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct RawGlobalQuote {
    #[serde(rename = "01. symbol")]
    symbol: String,
    #[serde(rename = "02. open")]
    open: String,
    #[serde(rename = "03. high")]
    high: String,
    #[serde(rename = "04. low")]
    low: String,
    #[serde(rename = "05. price")]
    price: String,
    #[serde(rename = "06. volume")]
    volume: String,
    #[serde(rename = "07. latest trading day")]
    latest_trading_day: String,
    #[serde(rename = "08. previous close")]
    previous_close: String,
    #[serde(rename = "09. change")]
    change: String,
    #[serde(rename = "10. change percent")]
    change_percent: String,
}

impl RawGlobalQuote {
    pub(crate) fn into_model(self) -> Result<GlobalQuote, MarketDataError> {
        let f = Function::GlobalQuote;
        Ok(GlobalQuote {
            open: parse_decimal(f, "02. open", &self.open)?,
            high: parse_decimal(f, "03. high", &self.high)?,
            low: parse_decimal(f, "04. low", &self.low)?,
            price: parse_decimal(f, "05. price", &self.price)?,
            volume: parse_volume(f, "06. volume", &self.volume)?,
            latest_trading_day: parse_date(
                f,
                "07. latest trading day",
                &self.latest_trading_day,
            )?,
            previous_close: parse_decimal(f, "08. previous close", &self.previous_close)?,
            change: parse_decimal(f, "09. change", &self.change)?,
            change_percent: self.change_percent,
            symbol: self.symbol,
        })
    }
}

// ============================================================================
// TIME_SERIES_DAILY / TIME_SERIES_DAILY_ADJUSTED
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct RawDailyBar {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawAdjustedDailyBar {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. adjusted close")]
    adjusted_close: String,
    #[serde(rename = "6. volume")]
    volume: String,
    #[serde(rename = "7. dividend amount")]
    dividend_amount: String,
    #[serde(rename = "8. split coefficient")]
    split_coefficient: String,
}

/// Convert a date-keyed series into bars sorted by date ascending.
pub(crate) fn daily_bars(
    series: HashMap<String, RawDailyBar>,
) -> Result<Vec<DailyBar>, MarketDataError> {
    let f = Function::TimeSeriesDaily;
    let mut bars = series
        .into_iter()
        .map(|(date, raw)| {
            Ok(DailyBar {
                date: parse_date(f, "date", &date)?,
                open: parse_decimal(f, "1. open", &raw.open)?,
                high: parse_decimal(f, "2. high", &raw.high)?,
                low: parse_decimal(f, "3. low", &raw.low)?,
                close: parse_decimal(f, "4. close", &raw.close)?,
                volume: parse_volume(f, "5. volume", &raw.volume)?,
            })
        })
        .collect::<Result<Vec<_>, MarketDataError>>()?;

    bars.sort_by_key(|bar| bar.date);
    Ok(bars)
}

/// Convert a date-keyed adjusted series into bars sorted by date ascending.
pub(crate) fn adjusted_daily_bars(
    series: HashMap<String, RawAdjustedDailyBar>,
) -> Result<Vec<AdjustedDailyBar>, MarketDataError> {
    let f = Function::TimeSeriesDailyAdjusted;
    let mut bars = series
        .into_iter()
        .map(|(date, raw)| {
            Ok(AdjustedDailyBar {
                date: parse_date(f, "date", &date)?,
                open: parse_decimal(f, "1. open", &raw.open)?,
                high: parse_decimal(f, "2. high", &raw.high)?,
                low: parse_decimal(f, "3. low", &raw.low)?,
                close: parse_decimal(f, "4. close", &raw.close)?,
                adjusted_close: parse_decimal(f, "5. adjusted close", &raw.adjusted_close)?,
                volume: parse_volume(f, "6. volume", &raw.volume)?,
                dividend_amount: parse_decimal(f, "7. dividend amount", &raw.dividend_amount)?,
                split_coefficient: parse_decimal(
                    f,
                    "8. split coefficient",
                    &raw.split_coefficient,
                )?,
            })
        })
        .collect::<Result<Vec<_>, MarketDataError>>()?;

    bars.sort_by_key(|bar| bar.date);
    Ok(bars)
}

// ============================================================================
// SYMBOL_SEARCH
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct RawSymbolMatch {
    #[serde(rename = "1. symbol")]
    symbol: String,
    #[serde(rename = "2. name")]
    name: String,
    #[serde(rename = "3. type")]
    asset_type: String,
    #[serde(rename = "4. region")]
    region: String,
    #[serde(rename = "5. marketOpen")]
    market_open: String,
    #[serde(rename = "6. marketClose")]
    market_close: String,
    #[serde(rename = "7. timezone")]
    timezone: String,
    #[serde(rename = "8. currency")]
    currency: String,
    #[serde(rename = "9. matchScore")]
    match_score: String,
}

impl RawSymbolMatch {
    pub(crate) fn into_model(self) -> Result<SymbolMatch, MarketDataError> {
        Ok(SymbolMatch {
            match_score: parse_score(Function::SymbolSearch, "9. matchScore", &self.match_score)?,
            symbol: self.symbol,
            name: self.name,
            asset_type: self.asset_type,
            region: self.region,
            market_open: self.market_open,
            market_close: self.market_close,
            timezone: self.timezone,
            currency: self.currency,
        })
    }
}

// ============================================================================
// MARKET_STATUS / TOP_GAINERS_LOSERS
// ============================================================================

/// MARKET_STATUS records are plain strings already; no raw mirror needed.
pub(crate) type RawMarketStatus = MarketStatus;

#[derive(Debug, Deserialize)]
pub(crate) struct RawMarketMover {
    ticker: String,
    price: String,
    change_amount: String,
    change_percentage: String,
    volume: String,
}

impl RawMarketMover {
    pub(crate) fn into_model(self) -> Result<MarketMover, MarketDataError> {
        let f = Function::TopGainersLosers;
        Ok(MarketMover {
            price: parse_decimal(f, "price", &self.price)?,
            change_amount: parse_decimal(f, "change_amount", &self.change_amount)?,
            volume: parse_volume(f, "volume", &self.volume)?,
            change_percentage: self.change_percentage,
            ticker: self.ticker,
        })
    }
}

// ============================================================================
// CURRENCY_EXCHANGE_RATE
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct RawExchangeRate {
    #[serde(rename = "1. From_Currency Code")]
    from_currency: String,
    #[serde(rename = "2. From_Currency Name")]
    from_name: String,
    #[serde(rename = "3. To_Currency Code")]
    to_currency: String,
    #[serde(rename = "4. To_Currency Name")]
    to_name: String,
    #[serde(rename = "5. Exchange Rate")]
    rate: String,
    #[serde(rename = "6. Last Refreshed")]
    last_refreshed: String,
    #[serde(rename = "7. Time Zone")]
    time_zone: String,
    #[serde(rename = "8. Bid Price")]
    bid_price: String,
    #[serde(rename = "9. Ask Price")]
    ask_price: String,
}

impl RawExchangeRate {
    pub(crate) fn into_model(self) -> Result<ExchangeRate, MarketDataError> {
        let f = Function::CurrencyExchangeRate;
        Ok(ExchangeRate {
            rate: parse_decimal(f, "5. Exchange Rate", &self.rate)?,
            bid_price: parse_decimal(f, "8. Bid Price", &self.bid_price)?,
            ask_price: parse_decimal(f, "9. Ask Price", &self.ask_price)?,
            from_currency: self.from_currency,
            from_name: self.from_name,
            to_currency: self.to_currency,
            to_name: self.to_name,
            last_refreshed: self.last_refreshed,
            time_zone: self.time_zone,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_parse_decimal() {
        let d = parse_decimal(Function::GlobalQuote, "05. price", "150.25").unwrap();
        assert_eq!(d, dec!(150.25));
    }

    #[test]
    fn test_parse_decimal_scientific() {
        let d = parse_decimal(Function::GlobalQuote, "09. change", "1.5e-3").unwrap();
        assert_eq!(d, dec!(0.0015));
    }

    #[test]
    fn test_parse_decimal_invalid() {
        let err = parse_decimal(Function::GlobalQuote, "05. price", "None").unwrap_err();
        assert!(matches!(err, MarketDataError::MalformedResponse { .. }));
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date(Function::TimeSeriesDaily, "date", "2024-01-15").is_ok());
        assert!(parse_date(Function::TimeSeriesDaily, "date", "01-15-2024").is_err());
        assert!(parse_date(Function::TimeSeriesDaily, "date", "invalid").is_err());
    }

    #[test]
    fn test_parse_score_rejects_nan() {
        assert_eq!(
            parse_score(Function::SymbolSearch, "9. matchScore", "0.8889").unwrap(),
            0.8889
        );
        assert!(parse_score(Function::SymbolSearch, "9. matchScore", "NaN").is_err());
    }

    #[test]
    fn test_take_section_missing_and_null() {
        let mut body = json!({ "other": 1, "Global Quote": null });
        let missing: Option<RawGlobalQuote> =
            take_section(&mut body, "nope", Function::GlobalQuote).unwrap();
        assert!(missing.is_none());
        let null: Option<RawGlobalQuote> =
            take_section(&mut body, GLOBAL_QUOTE_KEY, Function::GlobalQuote).unwrap();
        assert!(null.is_none());
    }

    #[test]
    fn test_take_record_empty_object_is_absent() {
        let mut body = json!({ "Global Quote": {} });
        let record: Option<RawGlobalQuote> =
            take_record(&mut body, GLOBAL_QUOTE_KEY, Function::GlobalQuote).unwrap();
        assert!(record.is_none());
    }

    #[test]
    fn test_take_section_wrong_shape_is_malformed() {
        let mut body = json!({ "bestMatches": "not a list" });
        let result: Result<Option<Vec<RawSymbolMatch>>, _> =
            take_section(&mut body, BEST_MATCHES_KEY, Function::SymbolSearch);
        assert!(matches!(
            result,
            Err(MarketDataError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_global_quote_conversion() {
        let raw: RawGlobalQuote = serde_json::from_value(json!({
            "01. symbol": "IBM",
            "02. open": "138.0000",
            "03. high": "139.8000",
            "04. low": "137.5000",
            "05. price": "139.1200",
            "06. volume": "3409581",
            "07. latest trading day": "2024-01-15",
            "08. previous close": "138.4200",
            "09. change": "0.7000",
            "10. change percent": "0.5057%"
        }))
        .unwrap();

        let quote = raw.into_model().unwrap();
        assert_eq!(quote.symbol, "IBM");
        assert_eq!(quote.price, dec!(139.12));
        assert_eq!(quote.volume, 3_409_581);
        assert_eq!(quote.latest_trading_day.to_string(), "2024-01-15");
        assert_eq!(quote.change_percent, "0.5057%");
    }

    #[test]
    fn test_daily_bars_sorted_ascending() {
        let series: HashMap<String, RawDailyBar> = serde_json::from_value(json!({
            "2024-01-03": {"1. open": "3", "2. high": "3", "3. low": "3", "4. close": "3", "5. volume": "300"},
            "2024-01-01": {"1. open": "1", "2. high": "1", "3. low": "1", "4. close": "1", "5. volume": "100"},
            "2024-01-02": {"1. open": "2", "2. high": "2", "3. low": "2", "4. close": "2", "5. volume": "200"}
        }))
        .unwrap();

        let bars = daily_bars(series).unwrap();
        let closes: Vec<Decimal> = bars.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![dec!(1), dec!(2), dec!(3)]);
    }

    #[test]
    fn test_daily_bars_malformed_volume_fails() {
        let series: HashMap<String, RawDailyBar> = serde_json::from_value(json!({
            "2024-01-01": {"1. open": "1", "2. high": "1", "3. low": "1", "4. close": "1", "5. volume": "lots"}
        }))
        .unwrap();
        assert!(daily_bars(series).is_err());
    }

    #[test]
    fn test_exchange_rate_conversion() {
        let raw: RawExchangeRate = serde_json::from_value(json!({
            "1. From_Currency Code": "USD",
            "2. From_Currency Name": "United States Dollar",
            "3. To_Currency Code": "JPY",
            "4. To_Currency Name": "Japanese Yen",
            "5. Exchange Rate": "147.85000000",
            "6. Last Refreshed": "2024-01-15 16:30:01",
            "7. Time Zone": "UTC",
            "8. Bid Price": "147.84500000",
            "9. Ask Price": "147.85500000"
        }))
        .unwrap();

        let rate = raw.into_model().unwrap();
        assert_eq!(rate.to_currency, "JPY");
        assert_eq!(rate.rate, dec!(147.85));
        assert_eq!(rate.ask_price, dec!(147.855));
    }

    #[test]
    fn test_into_object_strips_advisories() {
        let map = into_object(json!({"Symbol": "IBM", "Note": "slow down", "Information": "x"}));
        assert_eq!(map.len(), 1);
        assert!(into_object(json!({"Note": "slow down"})).is_empty());
        assert!(into_object(json!([1, 2])).is_empty());
    }
}
