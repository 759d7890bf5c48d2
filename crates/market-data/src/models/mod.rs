//! Market data models
//!
//! Typed records produced from the raw API payloads:
//! - `quote` - Latest quote for a symbol (GlobalQuote)
//! - `time_series` - Daily bars, plain and split/dividend adjusted
//! - `search` - Symbol search matches (SymbolMatch)
//! - `fx` - Realtime exchange rates (ExchangeRate)
//! - `market` - Market status and top movers
//! - `indicator` - Technical indicator request parameters

mod fx;
mod indicator;
mod market;
mod quote;
mod search;
mod time_series;

pub use fx::ExchangeRate;
pub use indicator::{Interval, SeriesType};
pub use market::{MarketMover, MarketStatus, MoverList};
pub use quote::GlobalQuote;
pub use search::SymbolMatch;
pub use time_series::{AdjustedDailyBar, DailyBar, OutputSize};
