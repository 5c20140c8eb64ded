//! Core data types for the tracking client

use serde::{Deserialize, Serialize};
use std::fmt;

/// Geographic point in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check that both coordinates are inside the valid geographic range
    pub fn in_valid_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.latitude, self.longitude)
    }
}

/// A timestamped position fix for the tracked vehicle
///
/// Replaced wholesale on every update, never merged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFix {
    pub point: GeoPoint,
    pub timestamp_ms: u64,
}

impl PositionFix {
    pub fn new(point: GeoPoint, timestamp_ms: u64) -> Self {
        Self {
            point,
            timestamp_ms,
        }
    }
}

/// Ordered route to drive: front = next waypoint, back = destination
///
/// The only mutation a route supports is removal from the front; points are
/// never reordered or inserted after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    points: Vec<GeoPoint>,
}

impl Route {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }

    /// The next waypoint to reach, if any
    pub fn front(&self) -> Option<GeoPoint> {
        self.points.first().copied()
    }

    /// The final point of the route
    pub fn destination(&self) -> Option<GeoPoint> {
        self.points.last().copied()
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn into_points(self) -> Vec<GeoPoint> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub(crate) fn pop_front(&mut self) -> Option<GeoPoint> {
        if self.points.is_empty() {
            None
        } else {
            Some(self.points.remove(0))
        }
    }
}
