//! JSON wire messages exchanged with the dispatch backend
//!
//! Field names follow the backend's camelCase convention. The dispatch
//! channel has a quirk worth keeping in mind: offers arrive either as a
//! single object or as an array whose items are JSON-encoded strings, and
//! both forms must parse.

use crate::core::GeoPoint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Driver position report for a specific booking (tracking channel)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationReport {
    pub booking_id: String,
    pub lat: f64,
    pub lon: f64,
}

/// Periodic availability ping from an idle vehicle (availability channel)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePing {
    pub ambulance_id: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Live vehicle position pushed to the customer, with the server's ETA
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingUpdate {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta: Option<String>,
}

impl TrackingUpdate {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Emergency offer broadcast to nearby vehicles
///
/// The backend identifies an offer by `bookingId` when the booking already
/// exists, or by `requestId` before it does; either may be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOffer {
    #[serde(default)]
    pub booking_id: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
    pub pickup_lat: f64,
    pub pickup_lon: f64,
    /// Straight-line distance to the pickup as computed by the backend (km)
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub other_ambulances: Vec<String>,
}

impl DispatchOffer {
    /// Stable identifier for deduplication: the booking id when present,
    /// the request id otherwise
    pub fn offer_id(&self) -> Option<&str> {
        self.booking_id
            .as_deref()
            .or(self.request_id.as_deref())
    }

    pub fn pickup(&self) -> GeoPoint {
        GeoPoint::new(self.pickup_lat, self.pickup_lon)
    }
}

/// Errors raised while parsing wire messages
#[derive(Debug, Clone, PartialEq)]
pub enum MessageError {
    /// Payload is not valid JSON or does not match the expected shape
    MalformedPayload { details: String },
    /// An array item could not be parsed as an offer
    MalformedItem { index: usize, details: String },
}

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageError::MalformedPayload { details } => {
                write!(f, "Malformed message payload: {}", details)
            }
            MessageError::MalformedItem { index, details } => {
                write!(f, "Malformed offer at index {}: {}", index, details)
            }
        }
    }
}

impl std::error::Error for MessageError {}

/// Parse a tracking-channel payload into a position update.
pub fn parse_tracking_update(payload: &str) -> Result<TrackingUpdate, MessageError> {
    serde_json::from_str(payload).map_err(|e| MessageError::MalformedPayload {
        details: e.to_string(),
    })
}

/// Parse a dispatch-channel payload into offers.
///
/// Accepts both delivery forms: a single offer object, or an array whose
/// items are JSON-encoded offer strings (the backend's batch replay form).
pub fn parse_dispatch_payload(payload: &str) -> Result<Vec<DispatchOffer>, MessageError> {
    let value: serde_json::Value =
        serde_json::from_str(payload).map_err(|e| MessageError::MalformedPayload {
            details: e.to_string(),
        })?;

    match value {
        serde_json::Value::Array(items) => {
            let mut offers = Vec::with_capacity(items.len());
            for (index, item) in items.into_iter().enumerate() {
                let offer = match item {
                    serde_json::Value::String(inner) => serde_json::from_str(&inner),
                    other => serde_json::from_value(other),
                };
                offers.push(offer.map_err(|e| MessageError::MalformedItem {
                    index,
                    details: e.to_string(),
                })?);
            }
            Ok(offers)
        }
        other => {
            let offer =
                serde_json::from_value(other).map_err(|e| MessageError::MalformedPayload {
                    details: e.to_string(),
                })?;
            Ok(vec![offer])
        }
    }
}
