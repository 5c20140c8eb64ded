//! Ambulance Tracking Client Core
//!
//! Client-side logic for a live ambulance-dispatch service: route trimming
//! against the vehicle's position, position-fix validation, live update
//! transports, and the booking lifecycle against the dispatch backend.

pub mod core;
pub mod algorithms;
pub mod processing;
pub mod validation;
pub mod transport;
pub mod api;
pub mod booking;
pub mod utils;

// Re-export commonly used types
pub use crate::core::{GeoPoint, PositionFix, Route, EARTH_RADIUS_M, PASSED_POINT_THRESHOLD_M};
pub use crate::algorithms::distance::{haversine_m, path_length_m};
pub use crate::algorithms::trim::{remaining_distance_m, trim_passed_points};
pub use crate::processing::message::{DispatchOffer, LocationReport, TrackingUpdate, VehiclePing};
pub use crate::processing::polyline::{decode_polyline, encode_polyline, PolylineError};
pub use crate::validation::data::{FixRejection, FixValidator, ValidationConfig};
pub use crate::transport::{
    HttpPollingSource, MockPositionSource, PositionSource, RawUpdate, SourceConfig, SourceStatus,
    TransportError,
};
pub use crate::api::{
    CallbackTracker, ProcessOutcome, RouteProgress, SessionEvent, SessionState, TrackError,
    TrackResult, TrackerConfig, TrackingSession,
};
pub use crate::booking::{BookingStatus, DispatchClient, DispatchError, OfferBoard, VehicleClass};
pub use crate::utils::ConfigurationManager;
