//! Error types for notification delivery

use std::fmt;

/// Result type alias for notification delivery
pub type NotifyResult<T> = Result<T, NotifyError>;

/// Errors that can occur while delivering a notification
#[derive(Debug)]
pub enum NotifyError {
    /// Sender or recipient address could not be parsed
    InvalidAddress(String),

    /// The message could not be built
    Message(String),

    /// Mail transport setup or delivery failed
    Transport(String),

    /// HTTP request failed
    Http(reqwest::Error),

    /// Receiver answered with a non-success status
    Status(u16),
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyError::InvalidAddress(msg) => write!(f, "invalid address: {}", msg),
            NotifyError::Message(msg) => write!(f, "failed to build message: {}", msg),
            NotifyError::Transport(msg) => write!(f, "mail transport error: {}", msg),
            NotifyError::Http(err) => write!(f, "HTTP error: {}", err),
            NotifyError::Status(status) => write!(f, "receiver answered with status {}", status),
        }
    }
}

impl std::error::Error for NotifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NotifyError::Http(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::Http(err)
    }
}

impl From<lettre::address::AddressError> for NotifyError {
    fn from(err: lettre::address::AddressError) -> Self {
        NotifyError::InvalidAddress(err.to_string())
    }
}

impl From<lettre::error::Error> for NotifyError {
    fn from(err: lettre::error::Error) -> Self {
        NotifyError::Message(err.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for NotifyError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        NotifyError::Transport(err.to_string())
    }
}
