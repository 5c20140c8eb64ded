//! Route trimming against the live vehicle position
//!
//! As the vehicle advances, waypoints it has already passed are dropped from
//! the front of the route so the rendered line always starts near the
//! vehicle. The threshold for "passed" is an explicit parameter; call sites
//! pick their own value (see `PASSED_POINT_THRESHOLD_M` for the default).

use crate::algorithms::distance::{haversine_m, path_length_m};
use crate::core::{GeoPoint, Route};

/// Drop leading waypoints the vehicle has already passed.
///
/// Pops the front of the route while more than one point remains and the
/// front point lies within `threshold_m` of `position`. The final point is
/// never removed, so a route is never trimmed empty. Returns the number of
/// points removed; calling again with the same position removes nothing.
pub fn trim_passed_points(route: &mut Route, position: GeoPoint, threshold_m: f64) -> usize {
    let mut removed = 0;
    while route.len() > 1 {
        match route.front() {
            Some(front) if haversine_m(front, position) < threshold_m => {
                route.pop_front();
                removed += 1;
            }
            _ => break,
        }
    }
    removed
}

/// Distance left to drive, in meters: current position to the route front,
/// plus the length of the remaining route.
pub fn remaining_distance_m(route: &Route, position: GeoPoint) -> f64 {
    match route.front() {
        Some(front) => haversine_m(position, front) + path_length_m(route.points()),
        None => 0.0,
    }
}
