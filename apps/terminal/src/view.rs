//! Presentation surfaces.
//!
//! The controller only talks to the [`View`] trait. [`TerminalView`] renders
//! plain text tables to any writer, stdout in the binary.

use std::io::{self, Stdout, Write};
use std::sync::Mutex;

use stocksim_market_data::{GlobalQuote, SymbolMatch};

/// Where the controller sends results and user feedback.
pub trait View: Send + Sync {
    fn show_search_results(&self, query: &str, matches: &[SymbolMatch]);

    fn show_quote(&self, quote: &GlobalQuote);

    fn show_table(&self, title: &str, header: &[&str], rows: &[Vec<String>]);

    /// Blocking, user-visible message.
    fn alert(&self, message: &str);
}

pub struct TerminalView<W = Stdout> {
    out: Mutex<W>,
}

impl TerminalView<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_lines(&self, lines: &[String]) {
        let mut out = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let result = lines
            .iter()
            .try_for_each(|line| writeln!(out, "{}", line))
            .and_then(|_| out.flush());
        if let Err(e) = result {
            tracing::warn!("Failed to write to terminal: {}", e);
        }
    }
}

impl<W: Write + Send> View for TerminalView<W> {
    fn show_search_results(&self, query: &str, matches: &[SymbolMatch]) {
        self.write_lines(&format_search_results(query, matches));
    }

    fn show_quote(&self, quote: &GlobalQuote) {
        self.write_lines(&format_quote(quote));
    }

    fn show_table(&self, title: &str, header: &[&str], rows: &[Vec<String>]) {
        let mut lines = vec![title.to_string()];
        lines.extend(format_table(header, rows));
        self.write_lines(&lines);
    }

    fn alert(&self, message: &str) {
        self.write_lines(&[format!("! {}", message)]);
    }
}

pub fn format_search_results(query: &str, matches: &[SymbolMatch]) -> Vec<String> {
    if matches.is_empty() {
        return vec![format!("No results for '{}'", query)];
    }

    let rows: Vec<Vec<String>> = matches
        .iter()
        .map(|m| {
            vec![
                m.symbol.clone(),
                m.name.clone(),
                m.asset_type.clone(),
                m.region.clone(),
                m.currency.clone(),
                format!("{:.0}%", m.match_score * 100.0),
            ]
        })
        .collect();

    let mut lines = vec![format!("Results for '{}'", query)];
    lines.extend(format_table(
        &["Symbol", "Name", "Type", "Region", "Currency", "Match"],
        &rows,
    ));
    lines
}

pub fn format_quote(quote: &GlobalQuote) -> Vec<String> {
    let arrow = if quote.is_up() { "▲" } else { "▼" };
    vec![
        format!(
            "{}  {:.2}  {} {:.2} ({})",
            quote.symbol, quote.price, arrow, quote.change, quote.change_percent
        ),
        format!(
            "  open {:.2}  high {:.2}  low {:.2}  prev close {:.2}",
            quote.open, quote.high, quote.low, quote.previous_close
        ),
        format!(
            "  volume {}  as of {}",
            quote.volume, quote.latest_trading_day
        ),
    ]
}

/// Left-aligned columns sized to their widest cell.
pub fn format_table(header: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let columns = rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0);

    let mut widths = vec![0usize; columns];
    for (i, cell) in header.iter().enumerate() {
        widths[i] = widths[i].max(cell.chars().count());
    }
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let render = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    if !header.is_empty() {
        lines.push(render(header.to_vec()));
        lines.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("  "),
        );
    }
    for row in rows {
        lines.push(render(row.iter().map(String::as_str).collect()));
    }
    lines
}
