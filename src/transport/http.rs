//! HTTP polling source against the dispatch backend
//!
//! Polls the live-location endpoint for one booking on a fixed cadence and
//! reports driver positions back over the matching report endpoint. The
//! backend exposes these under `/ambulance`.

use crate::transport::{
    PositionSource, RawUpdate, SourceConfig, SourceStatus, TransportError, TransportResult,
};
use log::debug;
use std::time::{Duration, Instant};

/// Position source that polls the backend over HTTP
pub struct HttpPollingSource {
    endpoint: String,
    report_endpoint: String,
    client: reqwest::blocking::Client,
    config: SourceConfig,
    status: SourceStatus,
    last_poll: Option<Instant>,
    connected: bool,
}

impl HttpPollingSource {
    /// Create a polling source for one booking's live location.
    ///
    /// `base_url` is the backend root, e.g. `https://dispatch.example.com`.
    pub fn new(base_url: &str, booking_id: &str, config: SourceConfig) -> TransportResult<Self> {
        config.validate()?;
        if base_url.is_empty() {
            return Err(TransportError::ConfigurationError {
                parameter: "base_url".to_string(),
                value: base_url.to_string(),
            });
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| TransportError::RequestFailed {
                details: e.to_string(),
            })?;

        let base = base_url.trim_end_matches('/');
        let mut status = SourceStatus::new(config.id);
        status.connected = true;

        Ok(Self {
            endpoint: format!(
                "{}/ambulance/booking-location?bookingId={}",
                base, booking_id
            ),
            report_endpoint: format!("{}/ambulance/report-location", base),
            client,
            config,
            status,
            last_poll: None,
            connected: true,
        })
    }

    fn classify(&mut self, error: reqwest::Error) -> TransportError {
        self.status.error_count += 1;
        if error.is_timeout() {
            TransportError::Timeout {
                timeout_ms: self.config.request_timeout_ms,
            }
        } else if error.is_connect() {
            self.connected = false;
            self.status.connected = false;
            TransportError::ConnectionLost {
                source_id: self.config.id,
            }
        } else {
            TransportError::RequestFailed {
                details: error.to_string(),
            }
        }
    }
}

impl PositionSource for HttpPollingSource {
    fn poll_update(&mut self) -> TransportResult<Option<RawUpdate>> {
        if !self.connected {
            return Err(TransportError::ConnectionLost {
                source_id: self.config.id,
            });
        }

        // Respect the poll cadence; between polls there is nothing new
        if let Some(last) = self.last_poll {
            if last.elapsed() < Duration::from_millis(self.config.poll_interval_ms) {
                return Ok(None);
            }
        }
        self.last_poll = Some(Instant::now());

        debug!("polling {}", self.endpoint);
        let result = self.client.get(&self.endpoint).send();
        let response = result.map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            self.status.error_count += 1;
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(|e| TransportError::InvalidResponse {
            details: e.to_string(),
        })?;

        let update = RawUpdate::new(body, self.config.id);
        self.status.updates_received += 1;
        self.status.last_update_ms = Some(update.received_at_ms);
        Ok(Some(update))
    }

    fn publish(&mut self, payload: &str) -> TransportResult<()> {
        if !self.connected {
            return Err(TransportError::ConnectionLost {
                source_id: self.config.id,
            });
        }

        let result = self
            .client
            .post(&self.report_endpoint)
            .header("content-type", "application/json")
            .body(payload.to_string())
            .send();
        let response = result.map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            self.status.error_count += 1;
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    fn status(&self) -> SourceStatus {
        self.status.clone()
    }

    fn reconnect(&mut self) -> TransportResult<()> {
        // The connection is stateless; mark it live again and let the next
        // poll prove it
        self.connected = true;
        self.status.connected = true;
        self.last_poll = None;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn id(&self) -> u8 {
        self.config.id
    }
}
