//! Search result models for symbol lookup.

use serde::{Deserialize, Serialize};

/// One entry of a SYMBOL_SEARCH response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolMatch {
    /// Symbol/ticker (e.g., "IBM", "SHOP.TRT")
    pub symbol: String,

    /// Display name (e.g., "International Business Machines Corp")
    pub name: String,

    /// Instrument type (e.g., "Equity", "ETF", "Mutual Fund")
    #[serde(rename = "type")]
    pub asset_type: String,

    /// Listing region (e.g., "United States")
    pub region: String,

    /// Local market open time (e.g., "09:30")
    pub market_open: String,

    /// Local market close time (e.g., "16:00")
    pub market_close: String,

    /// Exchange timezone (e.g., "UTC-04")
    pub timezone: String,

    /// Trading currency (e.g., "USD")
    pub currency: String,

    /// Relevance score from 0.0 to 1.0 (higher = better match)
    pub match_score: f64,
}
