use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Realtime exchange rate between two currencies (CURRENCY_EXCHANGE_RATE).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    /// Source currency code (e.g., "USD")
    pub from_currency: String,
    /// Source currency name (e.g., "United States Dollar")
    pub from_name: String,
    /// Target currency code (e.g., "EUR")
    pub to_currency: String,
    /// Target currency name
    pub to_name: String,
    /// Units of `to_currency` per unit of `from_currency`
    pub rate: Decimal,
    /// Timestamp string as reported by the API (e.g., "2024-01-15 16:30:01")
    pub last_refreshed: String,
    /// Timezone of `last_refreshed`
    pub time_zone: String,
    pub bid_price: Decimal,
    pub ask_price: Decimal,
}
