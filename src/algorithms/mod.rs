//! Pure route geometry

pub mod distance;
pub mod trim;

pub use distance::{haversine_m, path_length_m};
pub use trim::{remaining_distance_m, trim_passed_points};
