//! Core types and constants for the tracking client

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
