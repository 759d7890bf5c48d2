//! Simulated buy/sell orders.
//!
//! Nothing is executed anywhere: a validated [`OrderTicket`] is logged and
//! confirmed to the user, and that is the whole workflow.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        }
    }

    /// Verb used in confirmations ("Bought", "Sold").
    pub fn past_tense(&self) -> &'static str {
        match self {
            OrderSide::Buy => "Bought",
            OrderSide::Sell => "Sold",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an order form was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("symbol is required")]
    MissingSymbol,

    #[error("quantity must be a positive whole number, got '{0}'")]
    InvalidQuantity(String),

    #[error("price must be a positive number, got '{0}'")]
    InvalidPrice(String),

    #[error("no known price for {0}, look up a quote first or enter a price")]
    UnknownPrice(String),

    #[error("order total is too large")]
    TotalOverflow,
}

/// Order form fields as the user entered them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderForm {
    pub side: OrderSide,
    pub symbol: String,
    pub quantity: String,
    /// Limit price. When empty the last quoted price is used.
    pub price: Option<String>,
}

impl OrderForm {
    pub fn new(side: OrderSide, symbol: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            side,
            symbol: symbol.into(),
            quantity: quantity.into(),
            price: None,
        }
    }

    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = Some(price.into());
        self
    }

    /// Upper-cased, trimmed symbol.
    pub fn normalized_symbol(&self) -> String {
        self.symbol.trim().to_uppercase()
    }
}

/// A validated order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderTicket {
    pub side: OrderSide,
    pub symbol: String,
    pub quantity: u64,
    pub price: Decimal,
    total: Decimal,
}

impl OrderTicket {
    /// Validate `form`, falling back to `last_price` when no price was entered.
    pub fn from_form(form: &OrderForm, last_price: Option<Decimal>) -> Result<Self, OrderError> {
        let symbol = form.normalized_symbol();
        if symbol.is_empty() {
            return Err(OrderError::MissingSymbol);
        }

        let quantity_input = form.quantity.trim();
        let quantity = quantity_input
            .parse::<u64>()
            .ok()
            .filter(|q| *q > 0)
            .ok_or_else(|| OrderError::InvalidQuantity(quantity_input.to_string()))?;

        let price = match form.price.as_deref().map(str::trim) {
            Some(input) if !input.is_empty() => Decimal::from_str(input)
                .ok()
                .filter(|p| p.is_sign_positive() && !p.is_zero())
                .ok_or_else(|| OrderError::InvalidPrice(input.to_string()))?,
            _ => last_price.ok_or_else(|| OrderError::UnknownPrice(symbol.clone()))?,
        };

        let total = price
            .checked_mul(Decimal::from(quantity))
            .ok_or(OrderError::TotalOverflow)?;

        Ok(Self {
            side: form.side,
            symbol,
            quantity,
            price,
            total,
        })
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    /// User-facing confirmation, e.g. `Bought 10 shares of AAPL at $150.00 (total $1500.00)`.
    pub fn confirmation(&self) -> String {
        format!(
            "{} {} shares of {} at ${:.2} (total ${:.2})",
            self.side.past_tense(),
            self.quantity,
            self.symbol,
            self.price,
            self.total()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_buy_with_explicit_price() {
        let form = OrderForm::new(OrderSide::Buy, " aapl ", "10").with_price("150");
        let ticket = OrderTicket::from_form(&form, None).unwrap();

        assert_eq!(ticket.symbol, "AAPL");
        assert_eq!(ticket.quantity, 10);
        assert_eq!(ticket.total(), dec!(1500));
        assert_eq!(
            ticket.confirmation(),
            "Bought 10 shares of AAPL at $150.00 (total $1500.00)"
        );
    }

    #[test]
    fn test_sell_uses_last_price() {
        let form = OrderForm::new(OrderSide::Sell, "ibm", "3");
        let ticket = OrderTicket::from_form(&form, Some(dec!(139.12))).unwrap();

        assert_eq!(ticket.price, dec!(139.12));
        assert_eq!(
            ticket.confirmation(),
            "Sold 3 shares of IBM at $139.12 (total $417.36)"
        );
    }

    #[test]
    fn test_entered_price_wins_over_last_price() {
        let form = OrderForm::new(OrderSide::Buy, "IBM", "1").with_price("100.5");
        let ticket = OrderTicket::from_form(&form, Some(dec!(139.12))).unwrap();
        assert_eq!(ticket.price, dec!(100.5));
    }

    #[test]
    fn test_rejects_missing_symbol() {
        let form = OrderForm::new(OrderSide::Buy, "  ", "1").with_price("1");
        assert_eq!(
            OrderTicket::from_form(&form, None),
            Err(OrderError::MissingSymbol)
        );
    }

    #[test]
    fn test_rejects_bad_quantity() {
        for quantity in ["0", "-5", "1.5", "ten", ""] {
            let form = OrderForm::new(OrderSide::Buy, "AAPL", quantity).with_price("1");
            assert!(
                matches!(
                    OrderTicket::from_form(&form, None),
                    Err(OrderError::InvalidQuantity(_))
                ),
                "quantity {:?} should be rejected",
                quantity
            );
        }
    }

    #[test]
    fn test_rejects_bad_price() {
        for price in ["0", "-1", "abc"] {
            let form = OrderForm::new(OrderSide::Sell, "AAPL", "1").with_price(price);
            assert_eq!(
                OrderTicket::from_form(&form, Some(dec!(10))),
                Err(OrderError::InvalidPrice(price.to_string()))
            );
        }
    }

    #[test]
    fn test_rejects_unknown_price() {
        let form = OrderForm::new(OrderSide::Buy, "tsla", "2");
        let err = OrderTicket::from_form(&form, None).unwrap_err();
        assert_eq!(err, OrderError::UnknownPrice("TSLA".to_string()));
        assert!(err.to_string().starts_with("no known price for TSLA"));
    }

    #[test]
    fn test_rejects_total_overflow() {
        let form = OrderForm::new(OrderSide::Buy, "AAPL", "18446744073709551615")
            .with_price("99999999999");
        assert_eq!(
            OrderTicket::from_form(&form, None),
            Err(OrderError::TotalOverflow)
        );

        let form = OrderForm::new(OrderSide::Buy, "AAPL", "18446744073709551615");
        let err = OrderTicket::from_form(&form, Some(Decimal::MAX)).unwrap_err();
        assert_eq!(err.to_string(), "order total is too large");
    }
}
