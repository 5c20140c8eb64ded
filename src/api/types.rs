//! Common API types for tracking sessions

use crate::core::{
    GeoPoint, PositionFix, ARRIVAL_THRESHOLD_M, PASSED_POINT_THRESHOLD_M, RECONNECT_DELAY_MS,
    REPORT_INTERVAL_MS,
};
use crate::processing::polyline::PolylineError;
use crate::transport::TransportError;
use crate::validation::data::FixRejection;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for tracking operations
pub type TrackResult<T> = Result<T, TrackError>;

/// Tracking API error types
#[derive(Debug, Clone, PartialEq)]
pub enum TrackError {
    /// A session cannot track an empty route
    EmptyRoute,
    /// The encoded route string could not be decoded
    MalformedRoute { error: PolylineError },
    /// A source with this id is already registered
    DuplicateSource { source_id: u8 },
    /// No source with this id is registered
    UnknownSource { source_id: u8 },
    /// No callback registered under this handle
    UnknownCallback { id: u32 },
    /// Transport failure surfaced by a source
    Transport { error: TransportError },
    /// Invalid configuration value
    ConfigurationError { parameter: String, value: String },
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackError::EmptyRoute => write!(f, "Route has no points"),
            TrackError::MalformedRoute { error } => write!(f, "Malformed route: {}", error),
            TrackError::DuplicateSource { source_id } => {
                write!(f, "Source {} is already registered", source_id)
            }
            TrackError::UnknownSource { source_id } => {
                write!(f, "No source registered with id {}", source_id)
            }
            TrackError::UnknownCallback { id } => {
                write!(f, "No callback registered with handle {}", id)
            }
            TrackError::Transport { error } => write!(f, "Transport failure: {}", error),
            TrackError::ConfigurationError { parameter, value } => {
                write!(f, "Configuration error: invalid {} = {}", parameter, value)
            }
        }
    }
}

impl std::error::Error for TrackError {}

impl From<TransportError> for TrackError {
    fn from(error: TransportError) -> Self {
        TrackError::Transport { error }
    }
}

impl From<PolylineError> for TrackError {
    fn from(error: PolylineError) -> Self {
        TrackError::MalformedRoute { error }
    }
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Distance below which the leading route point counts as passed (meters)
    pub trim_threshold_m: f64,
    /// Distance to the destination that counts as arrival (meters)
    pub arrival_threshold_m: f64,
    /// Maximum age of an incoming fix before it is discarded (milliseconds)
    pub max_fix_age_ms: u64,
    /// Maximum plausible movement between consecutive fixes (meters)
    pub max_position_jump_m: f64,
    /// Delay before a lost source is reconnected (milliseconds)
    pub reconnect_delay_ms: u64,
    /// Cadence for outbound location reports (milliseconds)
    pub report_interval_ms: u64,
    /// Booking to report positions for; reporting is off when unset
    pub booking_id: Option<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            trim_threshold_m: PASSED_POINT_THRESHOLD_M,
            arrival_threshold_m: ARRIVAL_THRESHOLD_M,
            max_fix_age_ms: 30_000,
            max_position_jump_m: 500.0,
            reconnect_delay_ms: RECONNECT_DELAY_MS,
            report_interval_ms: REPORT_INTERVAL_MS,
            booking_id: None,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> TrackResult<()> {
        if !self.trim_threshold_m.is_finite() || self.trim_threshold_m <= 0.0 {
            return Err(TrackError::ConfigurationError {
                parameter: "trim_threshold_m".to_string(),
                value: self.trim_threshold_m.to_string(),
            });
        }
        if !self.arrival_threshold_m.is_finite() || self.arrival_threshold_m <= 0.0 {
            return Err(TrackError::ConfigurationError {
                parameter: "arrival_threshold_m".to_string(),
                value: self.arrival_threshold_m.to_string(),
            });
        }
        if !self.max_position_jump_m.is_finite() || self.max_position_jump_m <= 0.0 {
            return Err(TrackError::ConfigurationError {
                parameter: "max_position_jump_m".to_string(),
                value: self.max_position_jump_m.to_string(),
            });
        }
        if self.max_fix_age_ms == 0 {
            return Err(TrackError::ConfigurationError {
                parameter: "max_fix_age_ms".to_string(),
                value: self.max_fix_age_ms.to_string(),
            });
        }
        if self.report_interval_ms == 0 {
            return Err(TrackError::ConfigurationError {
                parameter: "report_interval_ms".to_string(),
                value: self.report_interval_ms.to_string(),
            });
        }
        Ok(())
    }
}

/// Snapshot of how far along the route the vehicle is
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteProgress {
    /// Latest accepted position
    pub position: GeoPoint,
    /// Distance left to drive along the remaining route (meters)
    pub remaining_m: f64,
    /// Points still on the route (at least 1)
    pub points_remaining: usize,
    /// Waypoints trimmed off since the session started
    pub points_passed: usize,
    /// Server-supplied arrival estimate, passed through verbatim
    pub eta: Option<String>,
    /// Whether the vehicle has reached the destination
    pub destination_reached: bool,
    /// Timestamp of the fix this snapshot reflects (milliseconds)
    pub updated_at_ms: u64,
}

/// Counters describing a session's lifetime
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub active_sources: u8,
    pub fixes_accepted: u32,
    pub fixes_rejected: u32,
    pub updates_discarded: u32,
    pub reports_published: u32,
    pub error_count: u32,
    pub last_fix_ms: Option<u64>,
    pub uptime_ms: u64,
}

/// Events observed while processing updates
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A fix passed validation and replaced the tracked position
    FixAccepted { fix: PositionFix },
    /// A fix was rejected by validation
    FixRejected { rejection: FixRejection },
    /// An update could not be parsed
    UpdateDiscarded { source_id: u8, details: String },
    /// Leading waypoints were trimmed off the route
    WaypointsPassed { count: usize, points_remaining: usize },
    /// The vehicle arrived at the destination
    DestinationReached { position: GeoPoint },
    /// A source dropped; a reconnect is scheduled
    SourceLost { source_id: u8, retry_at_ms: u64 },
    /// A lost source was reconnected
    SourceReconnected { source_id: u8 },
}

/// Outcome of one processing pass
#[derive(Debug, Default)]
pub struct ProcessOutcome {
    /// Updates drained from sources during this pass
    pub updates_handled: u32,
    /// Events observed during this pass, in order
    pub events: Vec<SessionEvent>,
}

impl ProcessOutcome {
    /// Whether any fix was accepted during this pass
    pub fn position_changed(&self) -> bool {
        self.events
            .iter()
            .any(|event| matches!(event, SessionEvent::FixAccepted { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(TrackerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_non_positive_thresholds_are_rejected() {
        let config = TrackerConfig {
            trim_threshold_m: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TrackError::ConfigurationError { .. })
        ));

        let config = TrackerConfig {
            arrival_threshold_m: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = TrackerConfig {
            trim_threshold_m: 5.0,
            booking_id: Some("bkg-8".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let restored: TrackerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn test_partial_config_files_fill_in_defaults() {
        let restored: TrackerConfig = serde_json::from_str(r#"{"trim_threshold_m": 2.0}"#).unwrap();
        assert_eq!(restored.trim_threshold_m, 2.0);
        assert_eq!(restored.reconnect_delay_ms, RECONNECT_DELAY_MS);
    }
}
