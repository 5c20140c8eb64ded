//! Booking lifecycle
//!
//! A booking walks a fixed chain: EN_ROUTE when the driver accepts, ARRIVED
//! at the pickup, IN_TRANSIT with the patient aboard, REACHED at the
//! drop-off. Each status unlocks exactly the next one; skipping ahead or
//! moving backwards is an error.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of an active booking, in lifecycle order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    EnRoute,
    Arrived,
    InTransit,
    Reached,
}

impl BookingStatus {
    /// The status that follows this one, if any
    pub fn next(self) -> Option<BookingStatus> {
        match self {
            BookingStatus::EnRoute => Some(BookingStatus::Arrived),
            BookingStatus::Arrived => Some(BookingStatus::InTransit),
            BookingStatus::InTransit => Some(BookingStatus::Reached),
            BookingStatus::Reached => None,
        }
    }

    /// Whether moving from this status to `target` is legal
    pub fn can_transition_to(self, target: BookingStatus) -> bool {
        self.next() == Some(target)
    }

    /// The drop-off can only be set once the patient has been picked up
    pub fn allows_dropoff_change(self) -> bool {
        matches!(
            self,
            BookingStatus::Arrived | BookingStatus::InTransit | BookingStatus::Reached
        )
    }

    pub fn is_terminal(self) -> bool {
        self == BookingStatus::Reached
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookingStatus::EnRoute => "EN_ROUTE",
            BookingStatus::Arrived => "ARRIVED",
            BookingStatus::InTransit => "IN_TRANSIT",
            BookingStatus::Reached => "REACHED",
        };
        write!(f, "{}", s)
    }
}
