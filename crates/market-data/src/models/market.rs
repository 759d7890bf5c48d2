//! Market-wide records: trading venue status and daily movers.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Open/closed status of one market (MARKET_STATUS).
///
/// Deserializes straight from the API's snake_case records.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct MarketStatus {
    /// e.g. "Equity", "Forex", "Cryptocurrency"
    pub market_type: String,
    pub region: String,
    /// Comma separated exchange names (e.g., "NASDAQ, NYSE, AMEX, BATS")
    pub primary_exchanges: String,
    pub local_open: String,
    pub local_close: String,
    /// "open" or "closed"
    pub current_status: String,
    #[serde(default)]
    pub notes: String,
}

impl MarketStatus {
    pub fn is_open(&self) -> bool {
        self.current_status.eq_ignore_ascii_case("open")
    }
}

/// One row of the TOP_GAINERS_LOSERS lists.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketMover {
    pub ticker: String,
    pub price: Decimal,
    pub change_amount: Decimal,
    /// Relative change as reported by the API (e.g., "12.5%")
    pub change_percentage: String,
    pub volume: u64,
}

/// Which TOP_GAINERS_LOSERS list to return.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoverList {
    #[default]
    Gainers,
    Losers,
    Active,
}

impl MoverList {
    /// Top-level response key holding this list.
    pub fn response_key(&self) -> &'static str {
        match self {
            Self::Gainers => "top_gainers",
            Self::Losers => "top_losers",
            Self::Active => "most_actively_traded",
        }
    }
}

impl fmt::Display for MoverList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Gainers => "gainers",
            Self::Losers => "losers",
            Self::Active => "active",
        };
        f.write_str(name)
    }
}

impl FromStr for MoverList {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gainers" => Ok(Self::Gainers),
            "losers" => Ok(Self::Losers),
            "active" => Ok(Self::Active),
            other => Err(format!("unknown mover list '{}'", other)),
        }
    }
}
