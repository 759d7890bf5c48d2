//! Error types for the market data client.
//!
//! "No data for this query" is not an error: derived operations return
//! `None` or an empty collection for it. Everything in [`MarketDataError`]
//! is a failed request.

use thiserror::Error;

/// Errors that can occur during market data operations.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The endpoint answered with a non-success HTTP status.
    #[error("Transport error: HTTP {status}")]
    Transport {
        /// The HTTP status code returned by the endpoint
        status: u16,
    },

    /// The API reported a failure through its `Error Message` field.
    #[error("API error: {message}")]
    Api {
        /// The message exactly as the API returned it
        message: String,
    },

    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The body was not JSON, or a recognized record could not be parsed.
    #[error("Malformed {function} response: {message}")]
    MalformedResponse {
        /// The `function` discriminator of the request
        function: String,
        /// What failed to parse
        message: String,
    },

    /// The outbound URL could not be built.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl MarketDataError {
    pub(crate) fn malformed(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            function: function.into(),
            message: message.into(),
        }
    }

    /// HTTP status carried by a transport failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_carries_status() {
        let error = MarketDataError::Transport { status: 503 };
        assert_eq!(error.status(), Some(503));
        assert_eq!(format!("{}", error), "Transport error: HTTP 503");
    }

    #[test]
    fn test_api_error_display() {
        let error = MarketDataError::Api {
            message: "Invalid API call.".to_string(),
        };
        assert_eq!(format!("{}", error), "API error: Invalid API call.");
        assert_eq!(error.status(), None);
    }

    #[test]
    fn test_malformed_display() {
        let error = MarketDataError::malformed("GLOBAL_QUOTE", "05. price: invalid decimal 'abc'");
        assert_eq!(
            format!("{}", error),
            "Malformed GLOBAL_QUOTE response: 05. price: invalid decimal 'abc'"
        );
    }
}
