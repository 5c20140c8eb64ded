//! Transport error types and recovery policy

use crate::core::RECONNECT_DELAY_MS;
use std::fmt;

/// Errors raised by position sources
#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    /// Connection to the backend failed or was dropped
    ConnectionLost { source_id: u8 },
    /// Request did not complete within the configured timeout
    Timeout { timeout_ms: u64 },
    /// Backend answered with a non-success HTTP status
    HttpStatus { status: u16 },
    /// Request failed before a response arrived
    RequestFailed { details: String },
    /// Response arrived but could not be read
    InvalidResponse { details: String },
    /// Invalid source configuration
    ConfigurationError { parameter: String, value: String },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::ConnectionLost { source_id } => {
                write!(f, "Connection lost on source {}", source_id)
            }
            TransportError::Timeout { timeout_ms } => {
                write!(f, "Request timed out after {} ms", timeout_ms)
            }
            TransportError::HttpStatus { status } => {
                write!(f, "Backend returned HTTP {}", status)
            }
            TransportError::RequestFailed { details } => {
                write!(f, "Request failed: {}", details)
            }
            TransportError::InvalidResponse { details } => {
                write!(f, "Invalid response: {}", details)
            }
            TransportError::ConfigurationError { parameter, value } => {
                write!(f, "Configuration error: invalid {} = {}", parameter, value)
            }
        }
    }
}

impl std::error::Error for TransportError {}

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// What the session should do after a transport error
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecoveryStrategy {
    /// Try again on the next processing pass
    Retry,
    /// Wait, then reconnect the source
    ReconnectWithDelay { delay_ms: u64 },
    /// Drop the update and continue
    Skip,
    /// Not recoverable without operator intervention
    Fail,
}

impl TransportError {
    /// Recommended recovery strategy for this error
    pub fn recovery_strategy(&self) -> RecoveryStrategy {
        match self {
            TransportError::ConnectionLost { .. } => RecoveryStrategy::ReconnectWithDelay {
                delay_ms: RECONNECT_DELAY_MS,
            },
            TransportError::Timeout { .. } => RecoveryStrategy::Retry,
            TransportError::HttpStatus { status } if *status >= 500 => RecoveryStrategy::Retry,
            TransportError::HttpStatus { .. } => RecoveryStrategy::Fail,
            TransportError::RequestFailed { .. } => RecoveryStrategy::Retry,
            TransportError::InvalidResponse { .. } => RecoveryStrategy::Skip,
            TransportError::ConfigurationError { .. } => RecoveryStrategy::Fail,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        !matches!(self.recovery_strategy(), RecoveryStrategy::Fail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_loss_reconnects_after_delay() {
        let error = TransportError::ConnectionLost { source_id: 1 };
        assert_eq!(
            error.recovery_strategy(),
            RecoveryStrategy::ReconnectWithDelay {
                delay_ms: RECONNECT_DELAY_MS
            }
        );
        assert!(error.is_recoverable());
    }

    #[test]
    fn test_server_errors_retry_but_client_errors_fail() {
        assert_eq!(
            TransportError::HttpStatus { status: 503 }.recovery_strategy(),
            RecoveryStrategy::Retry
        );
        assert_eq!(
            TransportError::HttpStatus { status: 404 }.recovery_strategy(),
            RecoveryStrategy::Fail
        );
    }

    #[test]
    fn test_configuration_errors_are_not_recoverable() {
        let error = TransportError::ConfigurationError {
            parameter: "poll_interval_ms".to_string(),
            value: "0".to_string(),
        };
        assert!(!error.is_recoverable());
    }
}
