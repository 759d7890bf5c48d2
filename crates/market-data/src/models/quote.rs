use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Latest quote for a symbol (GLOBAL_QUOTE).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalQuote {
    /// Ticker symbol (e.g., "IBM")
    pub symbol: String,

    /// Opening price of the latest trading day
    pub open: Decimal,

    /// Intraday high
    pub high: Decimal,

    /// Intraday low
    pub low: Decimal,

    /// Latest traded price
    pub price: Decimal,

    /// Shares traded on the latest trading day
    pub volume: u64,

    /// Date the quote belongs to
    pub latest_trading_day: NaiveDate,

    /// Close of the previous trading day
    pub previous_close: Decimal,

    /// Absolute change against the previous close
    pub change: Decimal,

    /// Relative change as reported by the API (e.g., "1.23%")
    pub change_percent: String,
}

impl GlobalQuote {
    /// Whether the price moved up (or stayed flat) against the previous close.
    pub fn is_up(&self) -> bool {
        !self.change.is_sign_negative()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn quote(change: Decimal) -> GlobalQuote {
        GlobalQuote {
            symbol: "IBM".to_string(),
            open: dec!(138.00),
            high: dec!(140.00),
            low: dec!(137.50),
            price: dec!(139.12),
            volume: 3_409_581,
            latest_trading_day: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            previous_close: dec!(139.12) - change,
            change,
            change_percent: "0.5%".to_string(),
        }
    }

    #[test]
    fn test_is_up() {
        assert!(quote(dec!(0.70)).is_up());
        assert!(quote(dec!(0)).is_up());
        assert!(!quote(dec!(-0.70)).is_up());
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(quote(dec!(0.70))).unwrap();
        assert_eq!(json["latestTradingDay"], "2024-01-15");
        assert_eq!(json["changePercent"], "0.5%");
    }
}
