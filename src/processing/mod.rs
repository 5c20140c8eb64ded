//! Boundary codecs: encoded polylines and wire messages

pub mod message;
pub mod polyline;

pub use message::{
    parse_dispatch_payload, parse_tracking_update, DispatchOffer, LocationReport, MessageError,
    TrackingUpdate, VehiclePing,
};
pub use polyline::{decode_polyline, encode_polyline, PolylineError};
