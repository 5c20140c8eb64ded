//! REST client for the dispatch backend
//!
//! Mirrors the backend's `/ambulance` endpoints: registering the vehicle,
//! accepting a booking, walking the booking status chain, and setting the
//! drop-off point. Status transitions are checked client-side before any
//! request leaves the machine.

use crate::booking::status::BookingStatus;
use crate::core::{GeoPoint, Route};
use crate::processing::polyline::{decode_polyline, PolylineError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors raised by dispatch requests
#[derive(Debug)]
pub enum DispatchError {
    /// Request failed before a response arrived
    Http { details: String },
    /// Backend answered with a non-success status
    Status { status: u16 },
    /// Response body did not match the expected shape
    MalformedResponse { details: String },
    /// The requested status change is not legal from the current status
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
    /// Invalid client configuration
    ConfigurationError { parameter: String, value: String },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Http { details } => write!(f, "Dispatch request failed: {}", details),
            DispatchError::Status { status } => write!(f, "Dispatch returned HTTP {}", status),
            DispatchError::MalformedResponse { details } => {
                write!(f, "Malformed dispatch response: {}", details)
            }
            DispatchError::InvalidTransition { from, to } => {
                write!(f, "Illegal status change {} -> {}", from, to)
            }
            DispatchError::ConfigurationError { parameter, value } => {
                write!(f, "Configuration error: invalid {} = {}", parameter, value)
            }
        }
    }
}

impl std::error::Error for DispatchError {}

impl From<reqwest::Error> for DispatchError {
    fn from(error: reqwest::Error) -> Self {
        DispatchError::Http {
            details: error.to_string(),
        }
    }
}

/// Vehicle classes offered to customers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleClass {
    /// Basic transport vehicle
    Mini,
    /// Fully equipped vehicle for critical cases
    Xl,
}

impl VehicleClass {
    pub fn as_str(self) -> &'static str {
        match self {
            VehicleClass::Mini => "mini",
            VehicleClass::Xl => "xl",
        }
    }
}

/// Acceptance request for a dispatch offer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptBooking {
    pub ambulance_id: String,
    pub booking_id: Option<String>,
    pub request_id: Option<String>,
    pub other_ambulances: Vec<String>,
    /// Driver position at the moment of acceptance
    pub latitude: f64,
    pub longitude: f64,
}

/// Booking as returned by the accept endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSummary {
    #[serde(default)]
    pub booking_id: Option<String>,
    /// Encoded polyline from the driver to the pickup point
    pub route_to_customer: String,
}

impl BookingSummary {
    /// Decode the route to the customer into points.
    pub fn decode_route(&self) -> Result<Route, PolylineError> {
        Ok(Route::new(decode_polyline(&self.route_to_customer)?))
    }
}

#[derive(Debug, Deserialize)]
struct AcceptResponse {
    booking: BookingSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusUpdate<'a> {
    updated_status: BookingStatus,
    booking_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DropoffRequest<'a> {
    lat: f64,
    lon: f64,
    booking_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DropoffResponse {
    gmaps_url: String,
}

/// Blocking REST client for the dispatch backend
pub struct DispatchClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl DispatchClient {
    pub fn new(base_url: &str) -> Result<Self, DispatchError> {
        if base_url.is_empty() {
            return Err(DispatchError::ConfigurationError {
                parameter: "base_url".to_string(),
                value: base_url.to_string(),
            });
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Announce the vehicle and its class to the dispatcher.
    pub fn register_vehicle(
        &self,
        ambulance_id: &str,
        class: VehicleClass,
    ) -> Result<(), DispatchError> {
        let response = self
            .client
            .post(format!("{}/ambulance/send-type", self.base_url))
            .form(&[("ambulanceId", ambulance_id), ("type", class.as_str())])
            .send()?;
        Self::check_status(&response)?;
        Ok(())
    }

    /// Accept a dispatch offer; the backend answers with the booking and
    /// its encoded route to the customer.
    pub fn accept_booking(&self, accept: &AcceptBooking) -> Result<BookingSummary, DispatchError> {
        let response = self
            .client
            .post(format!("{}/ambulance/accept-booking", self.base_url))
            .json(accept)
            .send()?;
        Self::check_status(&response)?;

        let parsed: AcceptResponse =
            response
                .json()
                .map_err(|e| DispatchError::MalformedResponse {
                    details: e.to_string(),
                })?;
        Ok(parsed.booking)
    }

    /// Move a booking to the next status.
    ///
    /// The transition is checked against `current` before the request is
    /// sent, so an out-of-order update never reaches the backend.
    pub fn update_status(
        &self,
        booking_id: &str,
        current: BookingStatus,
        target: BookingStatus,
    ) -> Result<BookingStatus, DispatchError> {
        if !current.can_transition_to(target) {
            return Err(DispatchError::InvalidTransition {
                from: current,
                to: target,
            });
        }

        let response = self
            .client
            .post(format!("{}/ambulance/update-booking-status", self.base_url))
            .json(&StatusUpdate {
                updated_status: target,
                booking_id,
            })
            .send()?;
        Self::check_status(&response)?;
        Ok(target)
    }

    /// Set the drop-off point for a booking; the backend answers with a
    /// Google Maps navigation URL for the driver.
    pub fn set_dropoff(
        &self,
        booking_id: &str,
        point: GeoPoint,
    ) -> Result<String, DispatchError> {
        let response = self
            .client
            .post(format!("{}/ambulance/set-dropoff-location", self.base_url))
            .json(&DropoffRequest {
                lat: point.latitude,
                lon: point.longitude,
                booking_id,
            })
            .send()?;
        Self::check_status(&response)?;

        let parsed: DropoffResponse =
            response
                .json()
                .map_err(|e| DispatchError::MalformedResponse {
                    details: e.to_string(),
                })?;
        Ok(parsed.gmaps_url)
    }

    fn check_status(response: &reqwest::blocking::Response) -> Result<(), DispatchError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(DispatchError::Status {
                status: status.as_u16(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_base_url_is_rejected() {
        assert!(matches!(
            DispatchClient::new(""),
            Err(DispatchError::ConfigurationError { .. })
        ));
    }

    #[test]
    fn test_illegal_transition_is_caught_before_any_request() {
        // The host does not resolve; reaching the network would error very
        // differently from the transition check
        let client = DispatchClient::new("http://dispatch.invalid").unwrap();
        let result = client.update_status("bkg-1", BookingStatus::EnRoute, BookingStatus::Reached);
        assert!(matches!(
            result,
            Err(DispatchError::InvalidTransition {
                from: BookingStatus::EnRoute,
                to: BookingStatus::Reached,
            })
        ));
    }

    #[test]
    fn test_accept_request_wire_shape() {
        let accept = AcceptBooking {
            ambulance_id: "amb-7".to_string(),
            booking_id: Some("bkg-1".to_string()),
            request_id: None,
            other_ambulances: vec!["amb-9".to_string()],
            latitude: 18.96,
            longitude: 72.83,
        };
        let json = serde_json::to_value(&accept).unwrap();
        assert_eq!(json["ambulanceId"], "amb-7");
        assert_eq!(json["bookingId"], "bkg-1");
        assert_eq!(json["otherAmbulances"][0], "amb-9");
    }

    #[test]
    fn test_booking_summary_decodes_route() {
        let summary: BookingSummary = serde_json::from_str(
            r#"{"bookingId":"bkg-1","routeToCustomer":"_p~iF~ps|U_ulLnnqC"}"#,
        )
        .unwrap();
        let route = summary.decode_route().unwrap();
        assert_eq!(route.len(), 2);

        let broken: BookingSummary =
            serde_json::from_str(r#"{"routeToCustomer":"_"}"#).unwrap();
        assert!(broken.decode_route().is_err());
    }

    #[test]
    fn test_vehicle_class_wire_names() {
        assert_eq!(serde_json::to_string(&VehicleClass::Mini).unwrap(), "\"mini\"");
        assert_eq!(VehicleClass::Xl.as_str(), "xl");
    }
}
