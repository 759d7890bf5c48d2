//! Stocksim terminal front end.
//!
//! A line-oriented stand-in for the browser page: each input line is parsed
//! into a [`Command`] and routed through [`UiController`], which calls the
//! market-data client and renders through a [`View`].

pub mod command;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod orders;
pub mod view;

pub use command::{Command, CommandError, IndicatorKind, IndicatorQuery};
pub use config::{init_tracing, Config};
pub use controller::{Flow, UiController};
pub use debounce::Debouncer;
pub use orders::{OrderError, OrderForm, OrderSide, OrderTicket};
pub use view::{TerminalView, View};
