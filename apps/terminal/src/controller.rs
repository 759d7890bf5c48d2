//! UI controller: binds input events to [`DataClient`] calls.
//!
//! Every handler catches its own failures and reports them through
//! [`View::alert`]; nothing here returns an error to the input loop.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use stocksim_market_data::{DataClient, MarketDataError, MoverList, OutputSize};

use crate::command::{Command, IndicatorKind, IndicatorQuery, HELP};
use crate::config::{DEFAULT_SEARCH_DEBOUNCE, DEFAULT_WATCHLIST};
use crate::debounce::Debouncer;
use crate::orders::{OrderForm, OrderTicket};
use crate::view::View;

/// Rows shown for long series (most recent first).
const SERIES_ROWS: usize = 10;

/// What the input loop should do after an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct UiController<V: View> {
    client: Arc<DataClient>,
    view: Arc<V>,
    last_prices: Mutex<HashMap<String, Decimal>>,
    watchlist: Vec<String>,
    search_input: Debouncer<String>,
}

impl<V: View + 'static> UiController<V> {
    /// Must be called from within a Tokio runtime (the search debouncer
    /// spawns its worker).
    pub fn new(client: Arc<DataClient>, view: Arc<V>) -> Self {
        Self::with_settings(
            client,
            view,
            DEFAULT_SEARCH_DEBOUNCE,
            DEFAULT_WATCHLIST.iter().map(|s| s.to_string()).collect(),
        )
    }

    pub fn with_settings(
        client: Arc<DataClient>,
        view: Arc<V>,
        search_debounce: Duration,
        watchlist: Vec<String>,
    ) -> Self {
        let search_client = Arc::clone(&client);
        let search_view = Arc::clone(&view);
        let search_input = Debouncer::spawn(search_debounce, move |keywords: String| {
            let client = Arc::clone(&search_client);
            let view = Arc::clone(&search_view);
            async move { run_search(&client, &*view, &keywords).await }
        });

        Self {
            client,
            view,
            last_prices: Mutex::new(HashMap::new()),
            watchlist,
            search_input,
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Last price seen for `symbol` in a quote lookup or refresh.
    pub fn last_price(&self, symbol: &str) -> Option<Decimal> {
        self.prices().get(&symbol.to_uppercase()).copied()
    }

    fn prices(&self) -> MutexGuard<'_, HashMap<String, Decimal>> {
        self.last_prices.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Price map mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn record_price(&self, symbol: &str, price: Decimal) {
        self.prices().insert(symbol.to_uppercase(), price);
    }

    fn report(&self, context: &str, error: &MarketDataError) {
        tracing::error!("{}: {}", context, error);
        self.view.alert(&format!("{}: {}", context, error));
    }

    // ========================================================================
    // Event handlers
    // ========================================================================

    /// Search box input. Searches run once the input has been quiet for the
    /// debounce delay, with the latest text only.
    pub fn on_search_input(&self, input: &str) {
        let keywords = input.trim();
        if keywords.is_empty() {
            return;
        }
        if !self.search_input.push(keywords.to_string()) {
            tracing::warn!("Search input received after shutdown, ignoring");
        }
    }

    /// Undebounced symbol search.
    pub async fn search(&self, keywords: &str) {
        run_search(&self.client, &*self.view, keywords).await;
    }

    pub async fn lookup_quote(&self, symbol: &str) {
        let symbol = symbol.trim().to_uppercase();
        match self.client.get_global_quote(&symbol).await {
            Ok(Some(quote)) => {
                self.record_price(&quote.symbol, quote.price);
                self.view.show_quote(&quote);
            }
            Ok(None) => self.view.alert(&format!("No quote found for {}", symbol)),
            Err(e) => self.report(&format!("Failed to fetch quote for {}", symbol), &e),
        }
    }

    /// Validate and "execute" an order form. Returns the ticket when accepted.
    pub fn submit_order(&self, form: &OrderForm) -> Option<OrderTicket> {
        let last_price = self.last_price(&form.normalized_symbol());
        match OrderTicket::from_form(form, last_price) {
            Ok(ticket) => {
                tracing::info!(
                    side = %ticket.side,
                    symbol = %ticket.symbol,
                    quantity = ticket.quantity,
                    price = %ticket.price,
                    total = %ticket.total(),
                    "Simulated order executed"
                );
                self.view.alert(&ticket.confirmation());
                Some(ticket)
            }
            Err(e) => {
                tracing::warn!("Rejected {} order: {}", form.side, e);
                self.view.alert(&format!("Invalid order: {}", e));
                None
            }
        }
    }

    /// Re-fetch quotes for the watchlist. A failing symbol is reported in its
    /// own row and does not stop the others.
    pub async fn refresh(&self) {
        let mut rows = Vec::with_capacity(self.watchlist.len());
        let mut failures = 0usize;

        for symbol in &self.watchlist {
            match self.client.get_global_quote(symbol).await {
                Ok(Some(quote)) => {
                    self.record_price(&quote.symbol, quote.price);
                    rows.push(vec![
                        quote.symbol.clone(),
                        format!("{:.2}", quote.price),
                        format!("{:.2}", quote.change),
                        quote.change_percent.clone(),
                        quote.volume.to_string(),
                    ]);
                }
                Ok(None) => rows.push(vec![symbol.clone(), "no data".to_string()]),
                Err(e) => {
                    failures += 1;
                    tracing::error!("Refresh failed for {}: {}", symbol, e);
                    rows.push(vec![symbol.clone(), format!("error: {}", e)]);
                }
            }
        }

        self.view.show_table(
            "Watchlist",
            &["Symbol", "Price", "Change", "Change %", "Volume"],
            &rows,
        );
        if failures > 0 {
            self.view.alert(&format!(
                "Refresh incomplete: {} of {} symbols failed",
                failures,
                self.watchlist.len()
            ));
        }
    }

    pub async fn show_daily(&self, symbol: &str, output_size: OutputSize, adjusted: bool) {
        let header = ["Date", "Open", "High", "Low", "Close", "Volume"];

        if adjusted {
            let bars = match self
                .client
                .get_time_series_daily_adjusted(symbol, output_size)
                .await
            {
                Ok(Some(bars)) => bars,
                Ok(None) => return self.view.alert(&format!("No daily data for {}", symbol)),
                Err(e) => {
                    return self.report(&format!("Failed to fetch daily data for {}", symbol), &e)
                }
            };
            let rows: Vec<Vec<String>> = bars
                .iter()
                .rev()
                .take(SERIES_ROWS)
                .map(|b| {
                    vec![
                        b.date.to_string(),
                        b.open.to_string(),
                        b.high.to_string(),
                        b.low.to_string(),
                        b.close.to_string(),
                        b.volume.to_string(),
                        b.adjusted_close.to_string(),
                        b.dividend_amount.to_string(),
                        b.split_coefficient.to_string(),
                    ]
                })
                .collect();
            let mut header = header.to_vec();
            header.extend(["Adj. close", "Dividend", "Split"]);
            self.view.show_table(
                &format!("{} adjusted daily ({} bars)", symbol, bars.len()),
                &header,
                &rows,
            );
        } else {
            let bars = match self.client.get_time_series_daily(symbol, output_size).await {
                Ok(Some(bars)) => bars,
                Ok(None) => return self.view.alert(&format!("No daily data for {}", symbol)),
                Err(e) => {
                    return self.report(&format!("Failed to fetch daily data for {}", symbol), &e)
                }
            };
            let rows: Vec<Vec<String>> = bars
                .iter()
                .rev()
                .take(SERIES_ROWS)
                .map(|b| {
                    vec![
                        b.date.to_string(),
                        b.open.to_string(),
                        b.high.to_string(),
                        b.low.to_string(),
                        b.close.to_string(),
                        b.volume.to_string(),
                    ]
                })
                .collect();
            self.view.show_table(
                &format!("{} daily ({} bars)", symbol, bars.len()),
                &header,
                &rows,
            );
        }
    }

    pub async fn show_overview(&self, symbol: &str) {
        match self.client.get_company_overview(symbol).await {
            Ok(Some(overview)) => {
                let rows: Vec<Vec<String>> = overview
                    .iter()
                    .map(|(key, value)| vec![key.clone(), display_value(value)])
                    .collect();
                self.view
                    .show_table(&format!("{} overview", symbol), &["Field", "Value"], &rows);
            }
            Ok(None) => self.view.alert(&format!("No company overview for {}", symbol)),
            Err(e) => self.report(&format!("Failed to fetch overview for {}", symbol), &e),
        }
    }

    pub async fn show_exchange_rate(&self, from: &str, to: &str) {
        match self.client.get_exchange_rate(from, to).await {
            Ok(Some(rate)) => self.view.show_table(
                &format!("{} → {}", rate.from_currency, rate.to_currency),
                &["Rate", "Bid", "Ask", "Last refreshed"],
                &[vec![
                    rate.rate.to_string(),
                    rate.bid_price.to_string(),
                    rate.ask_price.to_string(),
                    format!("{} {}", rate.last_refreshed, rate.time_zone),
                ]],
            ),
            Ok(None) => self
                .view
                .alert(&format!("No exchange rate for {}/{}", from, to)),
            Err(e) => self.report(
                &format!("Failed to fetch exchange rate {}/{}", from, to),
                &e,
            ),
        }
    }

    pub async fn show_market_status(&self) {
        match self.client.get_market_status().await {
            Ok(markets) if markets.is_empty() => self.view.alert("No market status available"),
            Ok(markets) => {
                let rows: Vec<Vec<String>> = markets
                    .iter()
                    .map(|m| {
                        vec![
                            m.region.clone(),
                            m.market_type.clone(),
                            m.current_status.clone(),
                            format!("{}-{}", m.local_open, m.local_close),
                            m.primary_exchanges.clone(),
                        ]
                    })
                    .collect();
                self.view.show_table(
                    "Market status",
                    &["Region", "Type", "Status", "Hours", "Exchanges"],
                    &rows,
                );
            }
            Err(e) => self.report("Failed to fetch market status", &e),
        }
    }

    pub async fn show_movers(&self, list: MoverList) {
        match self.client.get_market_movers(list).await {
            Ok(movers) if movers.is_empty() => self.view.alert(&format!("No {} available", list)),
            Ok(movers) => {
                let rows: Vec<Vec<String>> = movers
                    .iter()
                    .map(|m| {
                        vec![
                            m.ticker.clone(),
                            m.price.to_string(),
                            m.change_amount.to_string(),
                            m.change_percentage.clone(),
                            m.volume.to_string(),
                        ]
                    })
                    .collect();
                self.view.show_table(
                    &format!("Top {}", list),
                    &["Ticker", "Price", "Change", "Change %", "Volume"],
                    &rows,
                );
            }
            Err(e) => self.report(&format!("Failed to fetch {}", list), &e),
        }
    }

    pub async fn show_indicator(&self, query: &IndicatorQuery) {
        let IndicatorQuery {
            kind,
            symbol,
            interval,
            time_period,
            series_type,
        } = query;

        let result = match kind {
            IndicatorKind::Sma => {
                self.client
                    .get_sma(symbol, *interval, *time_period, *series_type)
                    .await
            }
            IndicatorKind::Ema => {
                self.client
                    .get_ema(symbol, *interval, *time_period, *series_type)
                    .await
            }
            IndicatorKind::Rsi => {
                self.client
                    .get_rsi(symbol, *interval, *time_period, *series_type)
                    .await
            }
            IndicatorKind::Macd => self.client.get_macd(symbol, *interval, *series_type).await,
        };

        let title = format!("{} {} ({})", symbol, kind.as_str(), interval);
        match result {
            Ok(values) if values.is_empty() => {
                self.view.alert(&format!("No {} data for {}", kind.as_str(), symbol))
            }
            Ok(values) => {
                let (header, rows) = indicator_rows(&values);
                let header: Vec<&str> = header.iter().map(String::as_str).collect();
                self.view.show_table(&title, &header, &rows);
            }
            Err(e) => self.report(&format!("Failed to fetch {}", title), &e),
        }
    }

    pub fn clear_cache(&self) {
        self.client.clear_cache();
        self.view.alert("Cache cleared");
    }

    pub fn set_cache_duration(&self, duration: Duration) {
        self.client.set_cache_duration(duration);
        self.view.alert(&format!(
            "Cache duration set to {} ms",
            duration.as_millis()
        ));
    }

    /// Route a parsed command to its handler.
    pub async fn dispatch(&self, command: Command) -> Flow {
        match command {
            Command::Search(keywords) => self.on_search_input(&keywords),
            Command::Quote(symbol) => self.lookup_quote(&symbol).await,
            Command::Order(form) => {
                self.submit_order(&form);
            }
            Command::Refresh => self.refresh().await,
            Command::Daily {
                symbol,
                output_size,
                adjusted,
            } => self.show_daily(&symbol, output_size, adjusted).await,
            Command::Overview(symbol) => self.show_overview(&symbol).await,
            Command::ExchangeRate { from, to } => self.show_exchange_rate(&from, &to).await,
            Command::MarketStatus => self.show_market_status().await,
            Command::Movers(list) => self.show_movers(list).await,
            Command::Indicator(query) => self.show_indicator(&query).await,
            Command::ClearCache => self.clear_cache(),
            Command::CacheDuration(duration) => self.set_cache_duration(duration),
            Command::Help => self.view.alert(HELP),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Flush pending search input and stop the debouncer.
    pub async fn shutdown(&self) {
        self.search_input.close().await;
    }
}

async fn run_search<V: View + ?Sized>(client: &DataClient, view: &V, keywords: &str) {
    match client.symbol_search(keywords).await {
        Ok(matches) => {
            tracing::debug!("Search '{}' returned {} matches", keywords, matches.len());
            view.show_search_results(keywords, &matches);
        }
        Err(e) => {
            tracing::error!("Search for '{}' failed: {}", keywords, e);
            view.alert(&format!("Search failed: {}", e));
        }
    }
}

/// Flatten an indicator payload (date → {field → value}) into table rows,
/// most recent date first.
fn indicator_rows(values: &Map<String, Value>) -> (Vec<String>, Vec<Vec<String>>) {
    let mut dates: Vec<&String> = values.keys().collect();
    dates.sort_unstable_by(|a, b| b.cmp(a));

    let mut header = vec!["Date".to_string()];
    if let Some(Value::Object(fields)) = dates.first().and_then(|d| values.get(*d)) {
        header.extend(fields.keys().cloned());
    }

    let rows = dates
        .into_iter()
        .take(SERIES_ROWS)
        .map(|date| {
            let mut row = vec![date.clone()];
            match values.get(date) {
                Some(Value::Object(fields)) => {
                    row.extend(header[1..].iter().map(|field| {
                        fields.get(field).map(display_value).unwrap_or_default()
                    }));
                }
                Some(other) => row.push(display_value(other)),
                None => {}
            }
            row
        })
        .collect();

    (header, rows)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_indicator_rows_most_recent_first() {
        let values = json!({
            "2024-01-10": {"SMA": "150.0"},
            "2024-01-12": {"SMA": "152.5"},
            "2024-01-11": {"SMA": "151.0"}
        });
        let (header, rows) = indicator_rows(values.as_object().unwrap());

        assert_eq!(header, vec!["Date", "SMA"]);
        assert_eq!(rows[0], vec!["2024-01-12", "152.5"]);
        assert_eq!(rows[2], vec!["2024-01-10", "150.0"]);
    }

    #[test]
    fn test_indicator_rows_multiple_fields() {
        let values = json!({
            "2024-01-12": {"MACD": "1.2", "MACD_Hist": "0.3", "MACD_Signal": "0.9"}
        });
        let (header, rows) = indicator_rows(values.as_object().unwrap());

        assert_eq!(header.len(), 4);
        assert_eq!(rows[0].len(), 4);
        assert!(rows[0].contains(&"0.3".to_string()));
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("IBM")), "IBM");
        assert_eq!(display_value(&json!(12)), "12");
        assert_eq!(display_value(&Value::Null), "null");
    }
}
