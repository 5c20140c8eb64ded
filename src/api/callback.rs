//! Callback-style tracking for event-driven callers
//!
//! Wraps a `TrackingSession` and fans its events out to registered
//! observers, so map screens and dispatch consoles can subscribe to
//! position changes instead of polling progress themselves.

use crate::api::session::TrackingSession;
use crate::api::types::{ProcessOutcome, RouteProgress, SessionEvent, TrackError, TrackResult};
use std::collections::HashMap;

/// Callback invoked with fresh progress after each accepted fix
pub type ProgressCallback = Box<dyn Fn(&RouteProgress) + Send>;

/// Callback invoked for every session event
pub type EventCallback = Box<dyn Fn(&SessionEvent) + Send>;

/// Handle identifying a registered callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackHandle(u32);

impl CallbackHandle {
    fn new(id: u32) -> Self {
        CallbackHandle(id)
    }

    pub fn id(&self) -> u32 {
        self.0
    }
}

/// Observer layer over a tracking session
pub struct CallbackTracker {
    session: TrackingSession,
    callback_counter: u32,
    progress_callbacks: HashMap<CallbackHandle, ProgressCallback>,
    event_callbacks: HashMap<CallbackHandle, EventCallback>,
}

impl CallbackTracker {
    pub fn new(session: TrackingSession) -> Self {
        Self {
            session,
            callback_counter: 0,
            progress_callbacks: HashMap::new(),
            event_callbacks: HashMap::new(),
        }
    }

    /// Register an observer for progress snapshots
    pub fn register_progress_callback(&mut self, callback: ProgressCallback) -> CallbackHandle {
        self.callback_counter += 1;
        let handle = CallbackHandle::new(self.callback_counter);
        self.progress_callbacks.insert(handle, callback);
        handle
    }

    /// Register an observer for session events
    pub fn register_event_callback(&mut self, callback: EventCallback) -> CallbackHandle {
        self.callback_counter += 1;
        let handle = CallbackHandle::new(self.callback_counter);
        self.event_callbacks.insert(handle, callback);
        handle
    }

    /// Remove a previously registered callback
    pub fn unregister_callback(&mut self, handle: CallbackHandle) -> TrackResult<()> {
        let removed = self.progress_callbacks.remove(&handle).is_some()
            || self.event_callbacks.remove(&handle).is_some();
        if removed {
            Ok(())
        } else {
            Err(TrackError::UnknownCallback { id: handle.id() })
        }
    }

    /// Process pending updates and notify observers.
    ///
    /// Event callbacks see every event in order; progress callbacks fire
    /// once per pass, after the last accepted fix of that pass.
    pub fn process(&mut self) -> TrackResult<ProcessOutcome> {
        let outcome = self.session.process()?;

        for event in &outcome.events {
            for callback in self.event_callbacks.values() {
                callback(event);
            }
        }

        if outcome.position_changed() {
            if let Some(progress) = self.session.progress() {
                for callback in self.progress_callbacks.values() {
                    callback(&progress);
                }
            }
        }

        Ok(outcome)
    }

    pub fn session(&self) -> &TrackingSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut TrackingSession {
        &mut self.session
    }

    pub fn into_session(self) -> TrackingSession {
        self.session
    }

    /// Number of registered (progress, event) callbacks
    pub fn callback_count(&self) -> (usize, usize) {
        (self.progress_callbacks.len(), self.event_callbacks.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::TrackerConfig;
    use crate::core::{GeoPoint, Route};
    use crate::transport::{unix_time_ms, MockPositionSource};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn tracker_with_fixes() -> CallbackTracker {
        let route = Route::new(vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.001),
            GeoPoint::new(0.0, 1.0),
        ]);
        let mut session = TrackingSession::new(route, TrackerConfig::default()).unwrap();
        let now = unix_time_ms();
        let mut source = MockPositionSource::new(1);
        source.add_tracking_update_at(0.0, 0.0, None, now - 200);
        source.add_tracking_update_at(0.0, 0.00101, Some("4 min"), now - 100);
        session.add_source(Box::new(source)).unwrap();
        CallbackTracker::new(session)
    }

    #[test]
    fn test_event_callbacks_see_every_event() {
        let mut tracker = tracker_with_fixes();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        tracker.register_event_callback(Box::new(move |event| {
            sink.lock().unwrap().push(event.clone());
        }));

        let outcome = tracker.process().unwrap();
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), outcome.events.len());
        assert!(seen
            .iter()
            .any(|e| matches!(e, SessionEvent::WaypointsPassed { .. })));
    }

    #[test]
    fn test_progress_callback_fires_after_accepted_fixes() {
        let mut tracker = tracker_with_fixes();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        tracker.register_progress_callback(Box::new(move |progress| {
            counter.fetch_add(1, Ordering::SeqCst);
            assert_eq!(progress.eta.as_deref(), Some("4 min"));
        }));

        tracker.process().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Nothing queued: no new fix, no progress notification
        tracker.process().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unregister_callback() {
        let mut tracker = tracker_with_fixes();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let handle = tracker.register_progress_callback(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(tracker.callback_count(), (1, 0));

        tracker.unregister_callback(handle).unwrap();
        assert_eq!(tracker.callback_count(), (0, 0));
        tracker.process().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let result = tracker.unregister_callback(handle);
        assert!(matches!(result, Err(TrackError::UnknownCallback { .. })));
    }
}
