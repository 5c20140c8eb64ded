//! Tracking session: route state driven by live position sources
//!
//! One session tracks one route. Each processing pass drains every
//! registered source, validates the fixes, trims passed waypoints, and
//! recomputes progress; one trim per accepted fix, so calls into the pure
//! geometry stay serialized.

use crate::algorithms::distance::haversine_m;
use crate::algorithms::trim::{remaining_distance_m, trim_passed_points};
use crate::api::types::{
    ProcessOutcome, RouteProgress, SessionEvent, SessionState, TrackError, TrackResult,
    TrackerConfig,
};
use crate::core::{PositionFix, Route};
use crate::processing::message::{parse_tracking_update, LocationReport};
use crate::processing::polyline::decode_polyline;
use crate::transport::{unix_time_ms, PositionSource, RawUpdate, RecoveryStrategy, SourceStatus};
use crate::validation::data::{FixValidator, ValidationConfig};
use log::{debug, warn};
use std::collections::HashMap;
use std::time::Instant;

/// Live tracking of one route against its position sources
pub struct TrackingSession {
    route: Route,
    validator: FixValidator,
    sources: HashMap<u8, Box<dyn PositionSource>>,
    config: TrackerConfig,
    state: SessionState,
    position: Option<PositionFix>,
    eta: Option<String>,
    points_passed: usize,
    arrived: bool,
    /// Source id mapped to the earliest time a reconnect may run
    pending_reconnects: HashMap<u8, u64>,
    last_report_ms: Option<u64>,
    started: Instant,
}

impl TrackingSession {
    /// Create a session for an already-decoded route.
    pub fn new(route: Route, config: TrackerConfig) -> TrackResult<Self> {
        config.validate()?;
        if route.is_empty() {
            return Err(TrackError::EmptyRoute);
        }

        let validator = FixValidator::with_config(ValidationConfig {
            max_fix_age_ms: config.max_fix_age_ms,
            max_position_jump_m: config.max_position_jump_m,
            ..Default::default()
        });

        Ok(Self {
            route,
            validator,
            sources: HashMap::new(),
            config,
            state: SessionState::default(),
            position: None,
            eta: None,
            points_passed: 0,
            arrived: false,
            pending_reconnects: HashMap::new(),
            last_report_ms: None,
            started: Instant::now(),
        })
    }

    /// Create a session from the backend's encoded route string.
    pub fn from_encoded_route(encoded: &str, config: TrackerConfig) -> TrackResult<Self> {
        let points = decode_polyline(encoded)?;
        Self::new(Route::new(points), config)
    }

    /// Register a position source.
    pub fn add_source(&mut self, source: Box<dyn PositionSource>) -> TrackResult<()> {
        let id = source.id();
        if self.sources.contains_key(&id) {
            return Err(TrackError::DuplicateSource { source_id: id });
        }
        self.sources.insert(id, source);
        self.state.active_sources = self.sources.len() as u8;
        Ok(())
    }

    pub fn remove_source(&mut self, id: u8) -> TrackResult<()> {
        if self.sources.remove(&id).is_none() {
            return Err(TrackError::UnknownSource { source_id: id });
        }
        self.pending_reconnects.remove(&id);
        self.state.active_sources = self.sources.len() as u8;
        Ok(())
    }

    /// Drain all sources and fold the updates into the route state.
    ///
    /// Source failures are handled inside the pass (reconnects scheduled,
    /// counters bumped); the call itself only fails on unrecoverable
    /// session-level problems.
    pub fn process(&mut self) -> TrackResult<ProcessOutcome> {
        let now = unix_time_ms();
        let mut outcome = ProcessOutcome::default();

        self.run_due_reconnects(now, &mut outcome.events);

        let mut source_ids: Vec<u8> = self.sources.keys().copied().collect();
        source_ids.sort_unstable();
        for id in source_ids {
            if self.pending_reconnects.contains_key(&id) {
                continue;
            }
            self.drain_source(id, now, &mut outcome);
        }

        if self.config.booking_id.is_some() && self.position.is_some() && self.report_due(now) {
            let published = self.publish_report()?;
            if published > 0 {
                self.last_report_ms = Some(now);
            }
        }

        Ok(outcome)
    }

    /// Send the current position upstream as a location report for the
    /// configured booking. Returns how many sources accepted it.
    pub fn publish_report(&mut self) -> TrackResult<u32> {
        let booking_id = match &self.config.booking_id {
            Some(id) => id.clone(),
            None => {
                return Err(TrackError::ConfigurationError {
                    parameter: "booking_id".to_string(),
                    value: "unset".to_string(),
                })
            }
        };
        let fix = match self.position {
            Some(fix) => fix,
            None => return Ok(0),
        };

        let report = LocationReport {
            booking_id,
            lat: fix.point.latitude,
            lon: fix.point.longitude,
        };
        let payload = match serde_json::to_string(&report) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("failed to serialize location report: {}", e);
                return Ok(0);
            }
        };

        let mut published = 0;
        for source in self.sources.values_mut() {
            if !source.is_connected() {
                continue;
            }
            match source.publish(&payload) {
                Ok(()) => published += 1,
                Err(error) => {
                    self.state.error_count += 1;
                    warn!("publish on source {} failed: {}", source.id(), error);
                }
            }
        }
        self.state.reports_published += published;
        Ok(published)
    }

    /// Progress snapshot; `None` until the first fix is accepted.
    pub fn progress(&self) -> Option<RouteProgress> {
        let fix = self.position?;
        Some(RouteProgress {
            position: fix.point,
            remaining_m: remaining_distance_m(&self.route, fix.point),
            points_remaining: self.route.len(),
            points_passed: self.points_passed,
            eta: self.eta.clone(),
            destination_reached: self.arrived,
            updated_at_ms: fix.timestamp_ms,
        })
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn state(&mut self) -> SessionState {
        self.state.uptime_ms = self.started.elapsed().as_millis() as u64;
        self.state.clone()
    }

    pub fn source_statuses(&self) -> Vec<SourceStatus> {
        self.sources.values().map(|s| s.status()).collect()
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn update_config(&mut self, config: TrackerConfig) -> TrackResult<()> {
        config.validate()?;
        self.validator.update_config(ValidationConfig {
            max_fix_age_ms: config.max_fix_age_ms,
            max_position_jump_m: config.max_position_jump_m,
            ..Default::default()
        });
        self.config = config;
        Ok(())
    }

    fn report_due(&self, now: u64) -> bool {
        match self.last_report_ms {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.config.report_interval_ms,
        }
    }

    fn run_due_reconnects(&mut self, now: u64, events: &mut Vec<SessionEvent>) {
        let due: Vec<u8> = self
            .pending_reconnects
            .iter()
            .filter(|(_, &retry_at)| retry_at <= now)
            .map(|(&id, _)| id)
            .collect();

        for id in due {
            let source = match self.sources.get_mut(&id) {
                Some(source) => source,
                None => {
                    self.pending_reconnects.remove(&id);
                    continue;
                }
            };
            match source.reconnect() {
                Ok(()) => {
                    self.pending_reconnects.remove(&id);
                    events.push(SessionEvent::SourceReconnected { source_id: id });
                }
                Err(error) => {
                    self.state.error_count += 1;
                    let retry_at = now + self.config.reconnect_delay_ms;
                    self.pending_reconnects.insert(id, retry_at);
                    warn!("reconnect of source {} failed: {}", id, error);
                }
            }
        }
    }

    fn drain_source(&mut self, id: u8, now: u64, outcome: &mut ProcessOutcome) {
        loop {
            let polled = match self.sources.get_mut(&id) {
                Some(source) => source.poll_update(),
                None => return,
            };
            match polled {
                Ok(Some(update)) => {
                    outcome.updates_handled += 1;
                    self.handle_update(update, &mut outcome.events);
                }
                Ok(None) => return,
                Err(error) => {
                    self.state.error_count += 1;
                    match error.recovery_strategy() {
                        RecoveryStrategy::ReconnectWithDelay { .. } => {
                            let retry_at = now + self.config.reconnect_delay_ms;
                            self.pending_reconnects.insert(id, retry_at);
                            outcome.events.push(SessionEvent::SourceLost {
                                source_id: id,
                                retry_at_ms: retry_at,
                            });
                        }
                        _ => warn!("source {} failed: {}", id, error),
                    }
                    return;
                }
            }
        }
    }

    fn handle_update(&mut self, update: RawUpdate, events: &mut Vec<SessionEvent>) {
        let tracking = match parse_tracking_update(&update.payload) {
            Ok(tracking) => tracking,
            Err(error) => {
                self.state.updates_discarded += 1;
                debug!("discarding update from source {}: {}", update.source_id, error);
                events.push(SessionEvent::UpdateDiscarded {
                    source_id: update.source_id,
                    details: error.to_string(),
                });
                return;
            }
        };

        let fix = PositionFix::new(tracking.point(), update.received_at_ms);
        let fix = match self.validator.validate(fix, unix_time_ms()) {
            Ok(fix) => fix,
            Err(rejection) => {
                self.state.fixes_rejected += 1;
                debug!("rejected fix: {}", rejection);
                events.push(SessionEvent::FixRejected { rejection });
                return;
            }
        };

        self.state.fixes_accepted += 1;
        self.state.last_fix_ms = Some(fix.timestamp_ms);
        self.position = Some(fix);
        if tracking.eta.is_some() {
            self.eta = tracking.eta;
        }
        events.push(SessionEvent::FixAccepted { fix });

        let removed = trim_passed_points(&mut self.route, fix.point, self.config.trim_threshold_m);
        if removed > 0 {
            self.points_passed += removed;
            events.push(SessionEvent::WaypointsPassed {
                count: removed,
                points_remaining: self.route.len(),
            });
        }

        if !self.arrived && self.at_destination(fix) {
            self.arrived = true;
            events.push(SessionEvent::DestinationReached {
                position: fix.point,
            });
        }
    }

    fn at_destination(&self, fix: PositionFix) -> bool {
        if self.route.len() > 1 {
            return false;
        }
        match self.route.destination() {
            Some(destination) => {
                haversine_m(fix.point, destination) < self.config.arrival_threshold_m
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GeoPoint;
    use crate::transport::MockPositionSource;

    fn session_with_route(points: &[(f64, f64)]) -> TrackingSession {
        let route = Route::new(
            points
                .iter()
                .map(|&(lat, lon)| GeoPoint::new(lat, lon))
                .collect(),
        );
        TrackingSession::new(route, TrackerConfig::default()).unwrap()
    }

    #[test]
    fn test_empty_route_is_rejected() {
        let result = TrackingSession::new(Route::new(Vec::new()), TrackerConfig::default());
        assert!(matches!(result, Err(TrackError::EmptyRoute)));
    }

    #[test]
    fn test_encoded_route_construction() {
        let points = vec![GeoPoint::new(18.9634, 72.8351), GeoPoint::new(18.97, 72.84)];
        let encoded = crate::processing::polyline::encode_polyline(&points);
        let session =
            TrackingSession::from_encoded_route(&encoded, TrackerConfig::default()).unwrap();
        assert_eq!(session.route().len(), 2);

        let result = TrackingSession::from_encoded_route("_", TrackerConfig::default());
        assert!(matches!(result, Err(TrackError::MalformedRoute { .. })));
    }

    #[test]
    fn test_duplicate_sources_are_rejected() {
        let mut session = session_with_route(&[(0.0, 0.0), (0.0, 1.0)]);
        session
            .add_source(Box::new(MockPositionSource::new(1)))
            .unwrap();
        let result = session.add_source(Box::new(MockPositionSource::new(1)));
        assert!(matches!(
            result,
            Err(TrackError::DuplicateSource { source_id: 1 })
        ));
        assert_eq!(session.state().active_sources, 1);
    }

    #[test]
    fn test_fixes_drive_trimming_and_progress() {
        let mut session = session_with_route(&[(0.0, 0.0), (0.0, 0.001), (0.0, 1.0)]);
        let now = unix_time_ms();
        let mut source = MockPositionSource::new(1);
        // Directly on the first waypoint, then just past the second
        source.add_tracking_update_at(0.0, 0.0, None, now - 200);
        source.add_tracking_update_at(0.0, 0.00101, Some("9 min"), now - 100);
        session.add_source(Box::new(source)).unwrap();

        let outcome = session.process().unwrap();
        assert_eq!(outcome.updates_handled, 2);
        assert!(outcome.position_changed());

        let progress = session.progress().unwrap();
        assert_eq!(progress.points_passed, 2);
        assert_eq!(progress.points_remaining, 1);
        assert_eq!(progress.eta.as_deref(), Some("9 min"));
        assert!(!progress.destination_reached);

        let state = session.state();
        assert_eq!(state.fixes_accepted, 2);
        assert_eq!(state.fixes_rejected, 0);
    }

    #[test]
    fn test_progress_is_none_before_first_fix() {
        let session = session_with_route(&[(0.0, 0.0), (0.0, 1.0)]);
        assert!(session.progress().is_none());
    }

    #[test]
    fn test_malformed_updates_are_counted_not_fatal() {
        let mut session = session_with_route(&[(0.0, 0.0), (0.0, 1.0)]);
        let mut source = MockPositionSource::new(1);
        source.add_payload("definitely not json");
        session.add_source(Box::new(source)).unwrap();

        let outcome = session.process().unwrap();
        assert_eq!(outcome.updates_handled, 1);
        assert!(matches!(
            outcome.events[0],
            SessionEvent::UpdateDiscarded { source_id: 1, .. }
        ));
        assert_eq!(session.state().updates_discarded, 1);
        assert!(session.progress().is_none());
    }

    #[test]
    fn test_out_of_range_fix_is_rejected() {
        let mut session = session_with_route(&[(0.0, 0.0), (0.0, 1.0)]);
        let now = unix_time_ms();
        let mut source = MockPositionSource::new(1);
        source.add_tracking_update_at(95.0, 0.0, None, now);
        session.add_source(Box::new(source)).unwrap();

        let outcome = session.process().unwrap();
        assert!(matches!(
            outcome.events[0],
            SessionEvent::FixRejected { .. }
        ));
        assert_eq!(session.state().fixes_rejected, 1);
    }

    #[test]
    fn test_arrival_at_destination() {
        let mut session = session_with_route(&[(0.0, 0.0), (0.0, 0.001)]);
        let now = unix_time_ms();
        let mut source = MockPositionSource::new(1);
        source.add_tracking_update_at(0.0, 0.0, None, now - 300);
        // Within the trim threshold of the first point and the arrival
        // threshold of the destination
        source.add_tracking_update_at(0.0, 0.00099, None, now - 100);
        session.add_source(Box::new(source)).unwrap();

        let outcome = session.process().unwrap();
        assert!(outcome
            .events
            .iter()
            .any(|e| matches!(e, SessionEvent::DestinationReached { .. })));
        assert!(session.progress().unwrap().destination_reached);
    }

    #[test]
    fn test_lost_source_is_scheduled_for_reconnect() {
        let mut session = session_with_route(&[(0.0, 0.0), (0.0, 1.0)]);
        let mut source = MockPositionSource::new(1);
        source.disconnect();
        session.add_source(Box::new(source)).unwrap();

        let outcome = session.process().unwrap();
        assert!(matches!(
            outcome.events[0],
            SessionEvent::SourceLost { source_id: 1, .. }
        ));

        // The delay has not elapsed, so the source is left alone
        let outcome = session.process().unwrap();
        assert!(outcome.events.is_empty());
    }

    #[test]
    fn test_reconnect_runs_once_delay_elapses() {
        let config = TrackerConfig {
            reconnect_delay_ms: 0,
            ..Default::default()
        };
        let route = Route::new(vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0)]);
        let mut session = TrackingSession::new(route, config).unwrap();
        let mut source = MockPositionSource::new(1);
        source.disconnect();
        session.add_source(Box::new(source)).unwrap();

        let outcome = session.process().unwrap();
        assert!(matches!(outcome.events[0], SessionEvent::SourceLost { .. }));

        // Zero delay: the next pass reconnects and the source polls clean
        let outcome = session.process().unwrap();
        assert!(matches!(
            outcome.events[0],
            SessionEvent::SourceReconnected { source_id: 1 }
        ));
    }

    #[test]
    fn test_driver_mode_publishes_reports() {
        let config = TrackerConfig {
            booking_id: Some("bkg-17".to_string()),
            ..Default::default()
        };
        let route = Route::new(vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0)]);
        let mut session = TrackingSession::new(route, config).unwrap();
        let now = unix_time_ms();
        let mut source = MockPositionSource::new(1);
        source.add_tracking_update_at(0.0, 0.5, None, now - 100);
        session.add_source(Box::new(source)).unwrap();

        session.process().unwrap();
        assert_eq!(session.state().reports_published, 1);

        // The published payload carries the booking id and coordinates
        let statuses = session.source_statuses();
        assert_eq!(statuses.len(), 1);
    }

    #[test]
    fn test_publish_report_without_booking_is_a_config_error() {
        let mut session = session_with_route(&[(0.0, 0.0), (0.0, 1.0)]);
        assert!(matches!(
            session.publish_report(),
            Err(TrackError::ConfigurationError { .. })
        ));
    }
}
