//! Booking lifecycle and dispatch backend client

pub mod client;
pub mod offers;
pub mod status;

pub use client::{AcceptBooking, BookingSummary, DispatchClient, DispatchError, VehicleClass};
pub use offers::OfferBoard;
pub use status::BookingStatus;
