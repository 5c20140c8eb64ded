//! Great-circle distance between geographic points

use crate::core::{GeoPoint, EARTH_RADIUS_M};

/// Haversine distance between two points, in meters.
///
/// Inputs are decimal degrees. Coordinates outside the valid geographic
/// range still produce a mathematically defined result; range checks belong
/// to the validation layer, not here.
pub fn haversine_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = lat2 - lat1;
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Total length of a point sequence in meters, summed leg by leg.
///
/// Sequences with fewer than two points have zero length.
pub fn path_length_m(points: &[GeoPoint]) -> f64 {
    points.windows(2).map(|leg| haversine_m(leg[0], leg[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_self_is_zero() {
        let p = GeoPoint::new(18.9634, 72.8351);
        assert_eq!(haversine_m(p, p), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = GeoPoint::new(19.0760, 72.8777);
        let b = GeoPoint::new(18.9220, 72.8347);
        let forward = haversine_m(a, b);
        let back = haversine_m(b, a);
        assert!((forward - back).abs() < 1e-9);
    }

    #[test]
    fn test_one_degree_of_longitude_at_equator() {
        // One degree of arc on a 6,371 km sphere is about 111.195 km
        let d = haversine_m(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0));
        assert!((d - 111_195.0).abs() / 111_195.0 < 0.01);
    }

    #[test]
    fn test_one_degree_of_latitude_matches_longitude_at_equator() {
        let along_meridian = haversine_m(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
        let along_equator = haversine_m(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0));
        assert!((along_meridian - along_equator).abs() < 1.0);
    }

    #[test]
    fn test_path_length_sums_legs() {
        let points = [
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.5),
            GeoPoint::new(0.0, 1.0),
        ];
        let total = path_length_m(&points);
        let direct = haversine_m(points[0], points[2]);
        assert!((total - direct).abs() < 1.0);
    }

    #[test]
    fn test_path_length_degenerate_inputs() {
        assert_eq!(path_length_m(&[]), 0.0);
        assert_eq!(path_length_m(&[GeoPoint::new(10.0, 10.0)]), 0.0);
    }
}
