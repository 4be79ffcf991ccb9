//! Error types for the Saferpay client

use thiserror::Error;

/// Result type for Saferpay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Saferpay client errors
#[derive(Error, Debug)]
pub enum Error {
    /// A required collaborator or setting is missing or invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Gateway answered with a non-200 status
    #[error("Saferpay request failed with status code {status_code}")]
    Transport {
        /// HTTP status code
        status_code: u16,
    },

    /// Gateway answered 200 but the body signals a failure
    #[error("Saferpay request failed: {body}")]
    Gateway {
        /// Raw response body
        body: String,
    },

    /// Response XML could not be decoded
    #[error("Invalid xml received from Saferpay: {0}")]
    MalformedResponse(String),

    /// Protocol step invoked out of order
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Production account without a completion password
    #[error("No spPassword given for production account {account_id}")]
    MissingCredential {
        /// Account the password was required for
        account_id: String,
    },

    /// Transport-level failure (DNS, TLS, timeout, ...)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Request fields could not be form-encoded
    #[error("Form encoding error: {0}")]
    Encoding(String),

    /// Amount cannot be expressed in minor units
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

impl Error {
    /// Whether retrying the same call may succeed without caller action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport { .. } | Error::Connection(_))
    }
}

impl From<serde_urlencoded::ser::Error> for Error {
    fn from(err: serde_urlencoded::ser::Error) -> Self {
        Error::Encoding(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::MalformedResponse(err.to_string())
    }
}
