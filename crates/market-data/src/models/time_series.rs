use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How much history a time series request returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputSize {
    /// Latest 100 data points
    #[default]
    Compact,
    /// Full history
    Full,
}

impl OutputSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for OutputSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "full" => Ok(Self::Full),
            other => Err(format!("unknown output size '{}'", other)),
        }
    }
}

/// One trading day of a TIME_SERIES_DAILY response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: u64,
}

/// One trading day of a TIME_SERIES_DAILY_ADJUSTED response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustedDailyBar {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    /// Close adjusted for splits and dividends
    pub adjusted_close: Decimal,
    pub volume: u64,
    /// Cash dividend paid on this date (zero on most days)
    pub dividend_amount: Decimal,
    /// Split ratio effective on this date (1.0 on most days)
    pub split_coefficient: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_size_parse() {
        assert_eq!("compact".parse::<OutputSize>(), Ok(OutputSize::Compact));
        assert_eq!("FULL".parse::<OutputSize>(), Ok(OutputSize::Full));
        assert!("everything".parse::<OutputSize>().is_err());
    }

    #[test]
    fn test_output_size_default_is_compact() {
        assert_eq!(OutputSize::default().as_str(), "compact");
    }

    #[test]
    fn test_daily_bar_serializes_camel_case() {
        let bar = DailyBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            open: Decimal::new(138, 0),
            high: Decimal::new(1398, 1),
            low: Decimal::new(1375, 1),
            close: Decimal::new(13912, 2),
            volume: 3_409_581,
        };
        let json = serde_json::to_value(&bar).unwrap();
        assert_eq!(json["date"], "2024-01-15");
        assert_eq!(json["volume"], 3_409_581);
        assert!(json.get("close").is_some());

        let adjusted = AdjustedDailyBar {
            date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            adjusted_close: bar.close,
            volume: bar.volume,
            dividend_amount: Decimal::ZERO,
            split_coefficient: Decimal::ONE,
        };
        let json = serde_json::to_value(&adjusted).unwrap();
        assert!(json.get("adjustedClose").is_some());
        assert!(json.get("splitCoefficient").is_some());
    }
}
