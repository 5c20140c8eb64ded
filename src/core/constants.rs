//! Tracking constants and system parameters

/// Mean Earth radius used by the haversine distance (meters)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Distance below which the leading route point counts as passed (meters)
pub const PASSED_POINT_THRESHOLD_M: f64 = 10.0;

/// Distance below which the vehicle counts as arrived at the destination (meters)
pub const ARRIVAL_THRESHOLD_M: f64 = 25.0;

/// Delay before a lost position source is reconnected (milliseconds)
pub const RECONNECT_DELAY_MS: u64 = 5_000;

/// Cadence for outbound location reports on the tracking channel (milliseconds)
pub const REPORT_INTERVAL_MS: u64 = 3_000;

/// Default interval between polls of a live booking location (milliseconds)
pub const POLL_INTERVAL_MS: u64 = 3_000;
