// policy-stream-core/src/core/event.rs
// ============================================================================
// Module: Policy Stream Events
// Description: Event document wrapper and the ingress result carrier.
// Purpose: Represent the structured documents flowing through pipelines.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! An [`Event`] carries one structured document (a tree of null, bool,
//! integer, double, string, array, and object nodes) through a pipeline.
//! The runtime treats it as an opaque value until egress, where the
//! pretty-printed form is latched as the policy output. [`EventResult`] is
//! the success/failure carrier handed to the controller on ingress.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Event
// ============================================================================

/// Structured document flowing through a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event(Value);

impl Event {
    /// Creates an event from a document tree.
    #[must_use]
    pub fn new(document: Value) -> Self {
        Self(document)
    }

    /// Parses an event from a raw JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::Parse`] when the payload is not valid JSON.
    pub fn from_json(raw: &str) -> Result<Self, EventError> {
        Ok(Self(serde_json::from_str(raw)?))
    }

    /// Returns the underlying document tree.
    #[must_use]
    pub fn document(&self) -> &Value {
        &self.0
    }

    /// Returns the pretty-printed form of the document.
    #[must_use]
    pub fn pretty_str(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
    }
}

impl Default for Event {
    fn default() -> Self {
        Self(Value::Null)
    }
}

impl From<Value> for Event {
    fn from(document: Value) -> Self {
        Self::new(document)
    }
}

/// Event construction errors.
#[derive(Debug, Error)]
pub enum EventError {
    /// Raw payload failed to parse as JSON.
    #[error("event parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

// ============================================================================
// SECTION: Result Carrier
// ============================================================================

/// Result carrier submitted to a controller on ingress.
///
/// Events always enter the pipeline wrapped in a success carrier; failure
/// carriers exist so upstream decoders can hand partial results to the same
/// channel, and the pipeline worker skips them.
#[derive(Debug, Clone)]
pub struct EventResult {
    /// Carried event payload.
    payload: Event,
    /// Whether upstream processing succeeded.
    success: bool,
}

impl EventResult {
    /// Wraps an event in a success carrier.
    #[must_use]
    pub fn success(payload: Event) -> Self {
        Self {
            payload,
            success: true,
        }
    }

    /// Wraps an event in a failure carrier.
    #[must_use]
    pub fn failure(payload: Event) -> Self {
        Self {
            payload,
            success: false,
        }
    }

    /// Returns whether upstream processing succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Returns the carried event.
    #[must_use]
    pub fn payload(&self) -> &Event {
        &self.payload
    }

    /// Consumes the carrier and returns the event.
    #[must_use]
    pub fn into_payload(self) -> Event {
        self.payload
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
