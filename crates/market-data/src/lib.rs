//! Stocksim Market Data Crate
//!
//! Client for the Alpha Vantage query API used by the stocksim front ends.
//!
//! # Overview
//!
//! - One entry point to the network, [`DataClient::request`], with an
//!   in-memory response cache keyed by the serialized request parameters
//! - API error conventions: `Error Message` fails the call, `Note` and
//!   `Information` are logged advisories
//! - Derived operations reshaping the verbose payloads into typed records
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! | Derived operation| --> |  RequestParams   |  (function + ordered params)
//! +------------------+     +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |  ResponseCache   |  (hit: return payload)
//!                          +------------------+
//!                                  | miss
//!                                  v
//!                          +------------------+
//!                          |  HttpTransport   |  (GET + apikey)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |  Typed records   |  (GlobalQuote, DailyBar, ...)
//!                          +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`DataClient`] - Cached API client
//! - [`RequestParams`] / [`Function`] - Request description and discriminator
//! - [`HttpTransport`] - Network seam, [`ReqwestTransport`] in production
//! - [`MarketDataError`] - Failure taxonomy

pub mod client;
pub mod errors;
pub mod models;

pub use client::{
    DataClient, Function, HttpResponse, HttpTransport, ParamValue, ReqwestTransport,
    RequestParams, ResponseCache, DEFAULT_BASE_URL, DEFAULT_CACHE_DURATION,
    DEFAULT_REQUEST_TIMEOUT,
};
pub use errors::MarketDataError;
pub use models::{
    AdjustedDailyBar, DailyBar, ExchangeRate, GlobalQuote, Interval, MarketMover, MarketStatus,
    MoverList, OutputSize, SeriesType, SymbolMatch,
};
