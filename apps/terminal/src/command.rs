//! Line-oriented input events.
//!
//! Each line typed at the prompt is one event: a search keystroke batch, a
//! quote lookup, a submitted order form, the refresh button and so on.

use std::str::FromStr;
use std::time::Duration;

use stocksim_market_data::{Interval, MoverList, OutputSize, SeriesType};
use thiserror::Error;

use crate::orders::{OrderForm, OrderSide};

pub const HELP: &str = "\
Commands:
  search <keywords>                      symbol search (debounced)
  quote <SYMBOL>                         latest quote
  buy <SYMBOL> <QTY> [PRICE]             simulated buy
  sell <SYMBOL> <QTY> [PRICE]            simulated sell
  refresh                                quotes for the watchlist
  daily <SYMBOL> [compact|full]          daily bars
  adjusted <SYMBOL> [compact|full]       adjusted daily bars
  overview <SYMBOL>                      company fundamentals
  fx <FROM> <TO>                         exchange rate
  status                                 market open/closed status
  movers [gainers|losers|active]         top movers
  sma|ema|rsi <SYMBOL> <INTERVAL> <PERIOD> [SERIES]
  macd <SYMBOL> <INTERVAL> [SERIES]
  cache clear | cache ttl <MS>
  help | quit";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndicatorKind {
    Sma,
    Ema,
    Rsi,
    Macd,
}

impl IndicatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorKind::Sma => "SMA",
            IndicatorKind::Ema => "EMA",
            IndicatorKind::Rsi => "RSI",
            IndicatorKind::Macd => "MACD",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndicatorQuery {
    pub kind: IndicatorKind,
    pub symbol: String,
    pub interval: Interval,
    /// Not used by MACD.
    pub time_period: u32,
    pub series_type: SeriesType,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Quote(String),
    Order(OrderForm),
    Refresh,
    Daily {
        symbol: String,
        output_size: OutputSize,
        adjusted: bool,
    },
    Overview(String),
    ExchangeRate {
        from: String,
        to: String,
    },
    MarketStatus,
    Movers(MoverList),
    Indicator(IndicatorQuery),
    ClearCache,
    CacheDuration(Duration),
    Help,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty input")]
    Empty,

    #[error("unknown command '{0}', type 'help' for a list")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("invalid {field}: {message}")]
    InvalidArgument {
        field: &'static str,
        message: String,
    },
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Err(CommandError::Empty);
        };
        let args: Vec<&str> = words.collect();

        match name.to_lowercase().as_str() {
            "search" => {
                if args.is_empty() {
                    return Err(CommandError::Usage("search <keywords>"));
                }
                Ok(Command::Search(args.join(" ")))
            }
            "quote" => match args.as_slice() {
                [symbol] => Ok(Command::Quote(symbol.to_uppercase())),
                _ => Err(CommandError::Usage("quote <SYMBOL>")),
            },
            "buy" => order(OrderSide::Buy, &args, "buy <SYMBOL> <QTY> [PRICE]"),
            "sell" => order(OrderSide::Sell, &args, "sell <SYMBOL> <QTY> [PRICE]"),
            "refresh" => Ok(Command::Refresh),
            "daily" | "adjusted" => {
                let usage = if name.eq_ignore_ascii_case("daily") {
                    "daily <SYMBOL> [compact|full]"
                } else {
                    "adjusted <SYMBOL> [compact|full]"
                };
                let (symbol, output_size) = match args.as_slice() {
                    [symbol] => (symbol, OutputSize::default()),
                    [symbol, size] => (symbol, parse_arg("output size", size)?),
                    _ => return Err(CommandError::Usage(usage)),
                };
                Ok(Command::Daily {
                    symbol: symbol.to_uppercase(),
                    output_size,
                    adjusted: name.eq_ignore_ascii_case("adjusted"),
                })
            }
            "overview" => match args.as_slice() {
                [symbol] => Ok(Command::Overview(symbol.to_uppercase())),
                _ => Err(CommandError::Usage("overview <SYMBOL>")),
            },
            "fx" => match args.as_slice() {
                [from, to] => Ok(Command::ExchangeRate {
                    from: from.to_uppercase(),
                    to: to.to_uppercase(),
                }),
                _ => Err(CommandError::Usage("fx <FROM> <TO>")),
            },
            "status" => Ok(Command::MarketStatus),
            "movers" => match args.as_slice() {
                [] => Ok(Command::Movers(MoverList::default())),
                [list] => Ok(Command::Movers(parse_arg("mover list", list)?)),
                _ => Err(CommandError::Usage("movers [gainers|losers|active]")),
            },
            "sma" | "ema" | "rsi" => {
                let kind = match name.to_lowercase().as_str() {
                    "sma" => IndicatorKind::Sma,
                    "ema" => IndicatorKind::Ema,
                    _ => IndicatorKind::Rsi,
                };
                let (symbol, interval, period, series) = match args.as_slice() {
                    [symbol, interval, period] => (symbol, interval, period, None),
                    [symbol, interval, period, series] => {
                        (symbol, interval, period, Some(series))
                    }
                    _ => {
                        return Err(CommandError::Usage(
                            "sma|ema|rsi <SYMBOL> <INTERVAL> <PERIOD> [SERIES]",
                        ))
                    }
                };
                let time_period = period
                    .parse::<u32>()
                    .ok()
                    .filter(|p| *p > 0)
                    .ok_or_else(|| CommandError::InvalidArgument {
                        field: "time period",
                        message: format!("expected a positive whole number, got '{}'", period),
                    })?;
                Ok(Command::Indicator(IndicatorQuery {
                    kind,
                    symbol: symbol.to_uppercase(),
                    interval: parse_arg("interval", interval)?,
                    time_period,
                    series_type: series
                        .map(|s| parse_arg("series type", s))
                        .transpose()?
                        .unwrap_or_default(),
                }))
            }
            "macd" => {
                let (symbol, interval, series) = match args.as_slice() {
                    [symbol, interval] => (symbol, interval, None),
                    [symbol, interval, series] => (symbol, interval, Some(series)),
                    _ => return Err(CommandError::Usage("macd <SYMBOL> <INTERVAL> [SERIES]")),
                };
                Ok(Command::Indicator(IndicatorQuery {
                    kind: IndicatorKind::Macd,
                    symbol: symbol.to_uppercase(),
                    interval: parse_arg("interval", interval)?,
                    time_period: 0,
                    series_type: series
                        .map(|s| parse_arg("series type", s))
                        .transpose()?
                        .unwrap_or_default(),
                }))
            }
            "cache" => match args.as_slice() {
                ["clear"] => Ok(Command::ClearCache),
                ["ttl", millis] => millis
                    .parse::<u64>()
                    .map(|ms| Command::CacheDuration(Duration::from_millis(ms)))
                    .map_err(|_| CommandError::InvalidArgument {
                        field: "cache ttl",
                        message: format!("expected milliseconds, got '{}'", millis),
                    }),
                _ => Err(CommandError::Usage("cache clear | cache ttl <MS>")),
            },
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            _ => Err(CommandError::Unknown(name.to_string())),
        }
    }
}

fn order(side: OrderSide, args: &[&str], usage: &'static str) -> Result<Command, CommandError> {
    match args {
        [symbol, quantity] => Ok(Command::Order(OrderForm::new(side, *symbol, *quantity))),
        [symbol, quantity, price] => Ok(Command::Order(
            OrderForm::new(side, *symbol, *quantity).with_price(*price),
        )),
        _ => Err(CommandError::Usage(usage)),
    }
}

fn parse_arg<T>(field: &'static str, value: &str) -> Result<T, CommandError>
where
    T: FromStr<Err = String>,
{
    value
        .parse::<T>()
        .map_err(|message| CommandError::InvalidArgument { field, message })
}
