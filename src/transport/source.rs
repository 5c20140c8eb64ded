//! Position source trait and configuration

use crate::core::POLL_INTERVAL_MS;
use crate::transport::{RawUpdate, TransportError, TransportResult};

/// Abstraction over a channel that delivers live position updates
pub trait PositionSource {
    /// Fetch the next update if one is available.
    ///
    /// Returns `Ok(Some(update))` when an update arrived, `Ok(None)` when
    /// nothing is available yet (non-blocking), and `Err` when the channel
    /// failed.
    fn poll_update(&mut self) -> TransportResult<Option<RawUpdate>>;

    /// Send a payload upstream on this channel (driver-side reporting)
    fn publish(&mut self, payload: &str) -> TransportResult<()>;

    /// Current source status
    fn status(&self) -> SourceStatus;

    /// Re-establish the channel after a connection loss
    fn reconnect(&mut self) -> TransportResult<()>;

    fn is_connected(&self) -> bool;

    /// Identifier distinguishing this source within a session
    fn id(&self) -> u8;
}

/// Status information for a position source
#[derive(Debug, Clone, PartialEq)]
pub struct SourceStatus {
    pub id: u8,
    pub connected: bool,
    pub last_update_ms: Option<u64>,
    pub updates_received: u32,
    pub error_count: u32,
}

impl SourceStatus {
    pub fn new(id: u8) -> Self {
        Self {
            id,
            connected: false,
            last_update_ms: None,
            updates_received: 0,
            error_count: 0,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.connected && self.error_count < 10
    }
}

/// Configuration shared by position sources
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Source identifier
    pub id: u8,
    /// Minimum spacing between polls of the backend (milliseconds)
    pub poll_interval_ms: u64,
    /// Timeout for a single request (milliseconds)
    pub request_timeout_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            id: 0,
            poll_interval_ms: POLL_INTERVAL_MS,
            request_timeout_ms: 10_000,
        }
    }
}

impl SourceConfig {
    pub fn validate(&self) -> TransportResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(TransportError::ConfigurationError {
                parameter: "poll_interval_ms".to_string(),
                value: self.poll_interval_ms.to_string(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(TransportError::ConfigurationError {
                parameter: "request_timeout_ms".to_string(),
                value: self.request_timeout_ms.to_string(),
            });
        }
        Ok(())
    }
}
