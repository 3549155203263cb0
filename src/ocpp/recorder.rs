//! # Event Recorder
//!
//! Adapter between the central-system engine's notification hooks and the
//! event hub.
//!
//! The engine reports once when a request arrives and once when its
//! response goes out. The recorder wraps both in a uniform envelope and
//! publishes them; a UUID correlation id ties the pair together and the
//! response carries the elapsed processing time.

use std::sync::Arc;
use std::time::Instant;

use serde_json::{json, Value};
use uuid::Uuid;

use super::operation::Operation;
use crate::hub::EventHub;

/// Ties a response notification back to its request
#[derive(Debug)]
pub struct RequestToken {
    correlation_id: Uuid,
    operation: &'static Operation,
    charge_box_id: String,
    started: Instant,
}

impl RequestToken {
    /// Correlation id shared by the request and response events
    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    /// OCPP action this token belongs to
    pub fn action(&self) -> &'static str {
        self.operation.action
    }
}

/// Publishes request/response notification pairs to the hub
#[derive(Debug, Clone)]
pub struct EventRecorder {
    hub: Arc<EventHub>,
}

impl EventRecorder {
    pub fn new(hub: Arc<EventHub>) -> Self {
        Self { hub }
    }

    /// Record a request notification.
    ///
    /// Returns the token the caller hands back with the matching response.
    pub fn request(
        &self,
        operation: &'static Operation,
        charge_box_id: &str,
        body: Value,
    ) -> RequestToken {
        let started = Instant::now();
        let correlation_id = Uuid::new_v4();

        let sequence = self.hub.publish(
            operation.request_event(),
            json!({
                "chargeBoxId": charge_box_id,
                "correlationId": correlation_id,
                "request": body,
            }),
        );
        tracing::debug!(
            action = operation.action,
            charge_box_id,
            %correlation_id,
            sequence,
            "recorded request"
        );

        RequestToken {
            correlation_id,
            operation,
            charge_box_id: charge_box_id.to_string(),
            started,
        }
    }

    /// Record the response belonging to `token`
    pub fn response(&self, token: RequestToken, body: Value) -> u64 {
        let RequestToken {
            correlation_id,
            operation,
            charge_box_id,
            started,
        } = token;
        let processing_millis = started.elapsed().as_millis() as u64;

        let sequence = self.hub.publish(
            operation.response_event(),
            json!({
                "chargeBoxId": charge_box_id.as_str(),
                "correlationId": correlation_id,
                "response": body,
                "processingMillis": processing_millis,
            }),
        );
        tracing::debug!(
            action = operation.action,
            charge_box_id = charge_box_id.as_str(),
            %correlation_id,
            sequence,
            processing_millis,
            "recorded response"
        );
        sequence
    }
}
