//! Transport layer for live position updates
//!
//! Every delivery mechanism for position updates (HTTP polling against the
//! dispatch backend, scripted mocks, push feeds) sits behind the
//! `PositionSource` trait, so the tracking logic never touches sockets or
//! timers directly.

pub mod error;
pub mod http;
pub mod mock;
pub mod source;

pub use error::{RecoveryStrategy, TransportError, TransportResult};
pub use http::HttpPollingSource;
pub use mock::MockPositionSource;
pub use source::{PositionSource, SourceConfig, SourceStatus};

use std::time::{SystemTime, UNIX_EPOCH};

/// Raw update received from a transport, before parsing and validation
#[derive(Debug, Clone)]
pub struct RawUpdate {
    /// Payload text exactly as received from the channel
    pub payload: String,
    /// Wall-clock receipt time (milliseconds since epoch)
    pub received_at_ms: u64,
    /// Identifier of the source that delivered the update
    pub source_id: u8,
}

impl RawUpdate {
    pub fn new(payload: String, source_id: u8) -> Self {
        Self {
            payload,
            received_at_ms: unix_time_ms(),
            source_id,
        }
    }

    pub fn with_received_at(mut self, received_at_ms: u64) -> Self {
        self.received_at_ms = received_at_ms;
        self
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch
pub(crate) fn unix_time_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
