//! Output formatting for progress snapshots

use crate::api::types::RouteProgress;

/// Human-readable progress lines
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFormatter {
    /// Single-line output for dashboards and logs
    pub compact: bool,
}

impl TextFormatter {
    pub fn format(&self, progress: &RouteProgress) -> String {
        let eta = progress.eta.as_deref().unwrap_or("unknown");
        if self.compact {
            let arrived = if progress.destination_reached {
                " [arrived]"
            } else {
                ""
            };
            format!(
                "{} | {:.0} m left | {} pts | ETA {}{}",
                progress.position, progress.remaining_m, progress.points_remaining, eta, arrived
            )
        } else {
            let mut out = String::new();
            out.push_str(&format!("Position:  {}\n", progress.position));
            out.push_str(&format!("Remaining: {:.0} m\n", progress.remaining_m));
            out.push_str(&format!(
                "Waypoints: {} left, {} passed\n",
                progress.points_remaining, progress.points_passed
            ));
            out.push_str(&format!("ETA:       {}\n", eta));
            if progress.destination_reached {
                out.push_str("Arrived at destination\n");
            }
            out
        }
    }
}

/// JSON progress output
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter {
    pub pretty: bool,
}

impl JsonFormatter {
    pub fn format(&self, progress: &RouteProgress) -> serde_json::Result<String> {
        if self.pretty {
            serde_json::to_string_pretty(progress)
        } else {
            serde_json::to_string(progress)
        }
    }
}

/// CSV row output for progress logs
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvFormatter;

impl CsvFormatter {
    pub fn header(&self) -> &'static str {
        "timestamp_ms,latitude,longitude,remaining_m,points_remaining,points_passed,eta,arrived"
    }

    pub fn format_row(&self, progress: &RouteProgress) -> String {
        format!(
            "{},{:.6},{:.6},{:.1},{},{},{},{}",
            progress.updated_at_ms,
            progress.position.latitude,
            progress.position.longitude,
            progress.remaining_m,
            progress.points_remaining,
            progress.points_passed,
            progress.eta.as_deref().unwrap_or(""),
            progress.destination_reached
        )
    }
}
