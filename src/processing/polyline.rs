//! Encoded polyline codec
//!
//! Routes arrive from the routing backend as encoded polyline strings:
//! coordinates scaled by 1e5, delta-encoded, zig-zag signed, then packed
//! into 5-bit chunks offset by 63 with bit 0x20 marking continuation.

use crate::core::GeoPoint;
use std::fmt;

const PRECISION: f64 = 1e5;

/// Errors raised while decoding an encoded polyline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolylineError {
    /// Input ended in the middle of a chunk sequence
    Truncated { offset: usize },
    /// Byte outside the printable encoding alphabet
    InvalidCharacter { offset: usize, byte: u8 },
    /// Chunk sequence too long to fit a coordinate delta
    Overflow { offset: usize },
}

impl fmt::Display for PolylineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolylineError::Truncated { offset } => {
                write!(f, "Polyline truncated mid-chunk at byte {}", offset)
            }
            PolylineError::InvalidCharacter { offset, byte } => {
                write!(f, "Invalid polyline byte 0x{:02X} at offset {}", byte, offset)
            }
            PolylineError::Overflow { offset } => {
                write!(f, "Coordinate delta overflow at byte {}", offset)
            }
        }
    }
}

impl std::error::Error for PolylineError {}

/// Decode an encoded polyline string into route points.
///
/// An empty string decodes to an empty point list.
pub fn decode_polyline(encoded: &str) -> Result<Vec<GeoPoint>, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut offset = 0;
    let mut lat: i64 = 0;
    let mut lon: i64 = 0;

    while offset < bytes.len() {
        let (d_lat, next) = decode_delta(bytes, offset)?;
        lat += d_lat;
        let (d_lon, next) = decode_delta(bytes, next)?;
        lon += d_lon;
        offset = next;

        points.push(GeoPoint::new(lat as f64 / PRECISION, lon as f64 / PRECISION));
    }

    Ok(points)
}

/// Encode route points into the compact polyline representation.
pub fn encode_polyline(points: &[GeoPoint]) -> String {
    let mut out = String::new();
    let mut prev_lat: i64 = 0;
    let mut prev_lon: i64 = 0;

    for point in points {
        let lat = (point.latitude * PRECISION).round() as i64;
        let lon = (point.longitude * PRECISION).round() as i64;
        encode_delta(lat - prev_lat, &mut out);
        encode_delta(lon - prev_lon, &mut out);
        prev_lat = lat;
        prev_lon = lon;
    }

    out
}

fn decode_delta(bytes: &[u8], mut offset: usize) -> Result<(i64, usize), PolylineError> {
    let mut accumulator: i64 = 0;
    let mut shift: u32 = 0;

    loop {
        let byte = *bytes
            .get(offset)
            .ok_or(PolylineError::Truncated { offset })?;
        if !(63..=126).contains(&byte) {
            return Err(PolylineError::InvalidCharacter { offset, byte });
        }
        if shift > 30 {
            return Err(PolylineError::Overflow { offset });
        }

        let chunk = (byte - 63) as i64;
        accumulator |= (chunk & 0x1f) << shift;
        offset += 1;

        if chunk & 0x20 == 0 {
            break;
        }
        shift += 5;
    }

    // Undo zig-zag: even values are positive, odd values negative
    let delta = if accumulator & 1 != 0 {
        !(accumulator >> 1)
    } else {
        accumulator >> 1
    };

    Ok((delta, offset))
}

fn encode_delta(delta: i64, out: &mut String) {
    let mut value = if delta < 0 { !(delta << 1) } else { delta << 1 };

    while value >= 0x20 {
        out.push(((0x20 | (value & 0x1f)) as u8 + 63) as char);
        value >>= 5;
    }
    out.push((value as u8 + 63) as char);
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reference vector from the polyline format documentation
    const REFERENCE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

    fn reference_points() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(38.5, -120.2),
            GeoPoint::new(40.7, -120.95),
            GeoPoint::new(43.252, -126.453),
        ]
    }

    #[test]
    fn test_decode_reference_vector() {
        let points = decode_polyline(REFERENCE).unwrap();
        assert_eq!(points.len(), 3);
        for (decoded, expected) in points.iter().zip(reference_points()) {
            assert!((decoded.latitude - expected.latitude).abs() < 1e-9);
            assert!((decoded.longitude - expected.longitude).abs() < 1e-9);
        }
    }

    #[test]
    fn test_encode_reference_vector() {
        assert_eq!(encode_polyline(&reference_points()), REFERENCE);
    }

    #[test]
    fn test_empty_string_decodes_to_no_points() {
        assert_eq!(decode_polyline("").unwrap(), Vec::new());
    }

    #[test]
    fn test_round_trip_preserves_points() {
        let points = vec![
            GeoPoint::new(18.9634, 72.8351),
            GeoPoint::new(18.96412, 72.83488),
            GeoPoint::new(18.97011, 72.83105),
            GeoPoint::new(-33.86882, 151.20929),
        ];
        let decoded = decode_polyline(&encode_polyline(&points)).unwrap();
        assert_eq!(decoded.len(), points.len());
        for (a, b) in decoded.iter().zip(&points) {
            // Precision is 1e-5 degrees, about a meter
            assert!((a.latitude - b.latitude).abs() < 1e-5);
            assert!((a.longitude - b.longitude).abs() < 1e-5);
        }
    }

    #[test]
    fn test_truncated_chunk_is_rejected() {
        // '_' carries the continuation bit, so a lone trailing one cuts a
        // chunk sequence short
        let result = decode_polyline("_p~iF~ps|U_");
        assert!(matches!(result, Err(PolylineError::Truncated { .. })));
    }

    #[test]
    fn test_invalid_byte_is_rejected() {
        let result = decode_polyline("_p~iF ~ps|U");
        assert!(matches!(
            result,
            Err(PolylineError::InvalidCharacter { byte: b' ', .. })
        ));
    }

    #[test]
    fn test_runaway_chunk_sequence_is_rejected() {
        // Every byte asks for another chunk; the accumulator would overflow
        let runaway = "_".repeat(10);
        let result = decode_polyline(&runaway);
        assert!(matches!(result, Err(PolylineError::Overflow { .. })));
    }
}
