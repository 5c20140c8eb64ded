//! Validation of incoming position fixes
//!
//! The geometry in `algorithms` accepts whatever numbers it is given, so
//! every fix is screened here before it reaches the route: coordinate
//! ranges, staleness, timestamp ordering, and plausibility of the jump from
//! the previously accepted fix.

use crate::algorithms::distance::haversine_m;
use crate::core::PositionFix;
use std::fmt;

/// Configuration for fix validation parameters
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Maximum age of a fix before it is considered stale (milliseconds)
    pub max_fix_age_ms: u64,
    /// Maximum plausible movement between consecutive fixes (meters)
    pub max_position_jump_m: f64,
    /// Reject fixes whose timestamp does not advance
    pub require_monotonic_time: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_fix_age_ms: 30_000,
            max_position_jump_m: 500.0,
            require_monotonic_time: true,
        }
    }
}

/// Reasons a fix is rejected
#[derive(Debug, Clone, PartialEq)]
pub enum FixRejection {
    LatitudeOutOfRange { latitude: f64 },
    LongitudeOutOfRange { longitude: f64 },
    StaleFix { age_ms: u64 },
    PositionJump { distance_m: f64 },
    TimestampRegression { previous_ms: u64, received_ms: u64 },
}

impl fmt::Display for FixRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixRejection::LatitudeOutOfRange { latitude } => {
                write!(f, "Latitude out of range: {}", latitude)
            }
            FixRejection::LongitudeOutOfRange { longitude } => {
                write!(f, "Longitude out of range: {}", longitude)
            }
            FixRejection::StaleFix { age_ms } => {
                write!(f, "Stale fix: {} ms old", age_ms)
            }
            FixRejection::PositionJump { distance_m } => {
                write!(f, "Implausible position jump: {:.1} m", distance_m)
            }
            FixRejection::TimestampRegression {
                previous_ms,
                received_ms,
            } => {
                write!(
                    f,
                    "Timestamp regression: {} after {}",
                    received_ms, previous_ms
                )
            }
        }
    }
}

impl std::error::Error for FixRejection {}

/// Screens fixes before they reach the route state
#[derive(Debug)]
pub struct FixValidator {
    config: ValidationConfig,
    last_accepted: Option<PositionFix>,
}

impl FixValidator {
    /// Create a validator with default configuration
    pub fn new() -> Self {
        Self::with_config(ValidationConfig::default())
    }

    pub fn with_config(config: ValidationConfig) -> Self {
        Self {
            config,
            last_accepted: None,
        }
    }

    pub fn update_config(&mut self, config: ValidationConfig) {
        self.config = config;
    }

    /// Validate a fix against the configured limits and the previously
    /// accepted fix. Accepted fixes become the new reference point.
    pub fn validate(&mut self, fix: PositionFix, now_ms: u64) -> Result<PositionFix, FixRejection> {
        if !(-90.0..=90.0).contains(&fix.point.latitude) {
            return Err(FixRejection::LatitudeOutOfRange {
                latitude: fix.point.latitude,
            });
        }
        if !(-180.0..=180.0).contains(&fix.point.longitude) {
            return Err(FixRejection::LongitudeOutOfRange {
                longitude: fix.point.longitude,
            });
        }

        let age_ms = now_ms.saturating_sub(fix.timestamp_ms);
        if age_ms > self.config.max_fix_age_ms {
            return Err(FixRejection::StaleFix { age_ms });
        }

        if let Some(previous) = self.last_accepted {
            if self.config.require_monotonic_time && fix.timestamp_ms <= previous.timestamp_ms {
                return Err(FixRejection::TimestampRegression {
                    previous_ms: previous.timestamp_ms,
                    received_ms: fix.timestamp_ms,
                });
            }

            let distance_m = haversine_m(previous.point, fix.point);
            if distance_m > self.config.max_position_jump_m {
                return Err(FixRejection::PositionJump { distance_m });
            }
        }

        self.last_accepted = Some(fix);
        Ok(fix)
    }

    /// The most recently accepted fix, if any
    pub fn last_accepted(&self) -> Option<PositionFix> {
        self.last_accepted
    }

    /// Forget the accepted-fix history, e.g. when tracking a new booking
    pub fn reset(&mut self) {
        self.last_accepted = None;
    }
}

impl Default for FixValidator {
    fn default() -> Self {
        Self::new()
    }
}
