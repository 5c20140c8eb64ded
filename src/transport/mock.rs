//! Mock position source for tests and demos

use crate::processing::message::TrackingUpdate;
use crate::transport::{
    PositionSource, RawUpdate, SourceStatus, TransportError, TransportResult,
};
use std::collections::VecDeque;

/// Scripted position source with fault injection
pub struct MockPositionSource {
    id: u8,
    status: SourceStatus,
    update_queue: VecDeque<RawUpdate>,
    published: Vec<String>,
    simulate_errors: bool,
    error_probability: f32,
    connected: bool,
}

impl MockPositionSource {
    pub fn new(id: u8) -> Self {
        let mut status = SourceStatus::new(id);
        status.connected = true;

        Self {
            id,
            status,
            update_queue: VecDeque::new(),
            published: Vec::new(),
            simulate_errors: false,
            error_probability: 0.0,
            connected: true,
        }
    }

    /// Queue a raw payload for delivery
    pub fn add_payload(&mut self, payload: &str) {
        self.update_queue
            .push_back(RawUpdate::new(payload.to_string(), self.id));
    }

    /// Queue a raw payload stamped with an explicit receipt time
    pub fn add_payload_at(&mut self, payload: &str, received_at_ms: u64) {
        self.update_queue.push_back(
            RawUpdate::new(payload.to_string(), self.id).with_received_at(received_at_ms),
        );
    }

    /// Queue a well-formed tracking update for the given coordinates
    pub fn add_tracking_update(&mut self, latitude: f64, longitude: f64, eta: Option<&str>) {
        let update = TrackingUpdate {
            latitude,
            longitude,
            eta: eta.map(str::to_string),
        };
        // Serializing a plain struct cannot fail
        let payload = serde_json::to_string(&update).unwrap_or_default();
        self.add_payload(&payload);
    }

    /// Same as `add_tracking_update` with an explicit receipt timestamp
    pub fn add_tracking_update_at(
        &mut self,
        latitude: f64,
        longitude: f64,
        eta: Option<&str>,
        received_at_ms: u64,
    ) {
        let update = TrackingUpdate {
            latitude,
            longitude,
            eta: eta.map(str::to_string),
        };
        let payload = serde_json::to_string(&update).unwrap_or_default();
        self.add_payload_at(&payload, received_at_ms);
    }

    /// Enable random poll failures with the given probability (0.0 to 1.0)
    pub fn simulate_errors(&mut self, enable: bool, probability: f32) {
        self.simulate_errors = enable;
        self.error_probability = probability.clamp(0.0, 1.0);
    }

    /// Simulate a dropped connection
    pub fn disconnect(&mut self) {
        self.connected = false;
        self.status.connected = false;
    }

    pub fn queued_update_count(&self) -> usize {
        self.update_queue.len()
    }

    /// Payloads published through this source, in order
    pub fn published(&self) -> &[String] {
        &self.published
    }

    pub fn clear_published(&mut self) {
        self.published.clear();
    }

    fn should_fail(&self) -> bool {
        if !self.simulate_errors {
            return false;
        }
        use rand::Rng;
        rand::thread_rng().gen::<f32>() < self.error_probability
    }
}

impl PositionSource for MockPositionSource {
    fn poll_update(&mut self) -> TransportResult<Option<RawUpdate>> {
        if !self.connected {
            return Err(TransportError::ConnectionLost { source_id: self.id });
        }

        if self.should_fail() {
            self.status.error_count += 1;
            return Err(TransportError::Timeout { timeout_ms: 0 });
        }

        if let Some(update) = self.update_queue.pop_front() {
            self.status.updates_received += 1;
            self.status.last_update_ms = Some(update.received_at_ms);
            Ok(Some(update))
        } else {
            Ok(None)
        }
    }

    fn publish(&mut self, payload: &str) -> TransportResult<()> {
        if !self.connected {
            return Err(TransportError::ConnectionLost { source_id: self.id });
        }

        if self.should_fail() {
            self.status.error_count += 1;
            return Err(TransportError::RequestFailed {
                details: "simulated publish failure".to_string(),
            });
        }

        self.published.push(payload.to_string());
        Ok(())
    }

    fn status(&self) -> SourceStatus {
        self.status.clone()
    }

    fn reconnect(&mut self) -> TransportResult<()> {
        self.connected = true;
        self.status.connected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn id(&self) -> u8 {
        self.id
    }
}
