// policy-stream-core/src/runtime/policy.rs
// ============================================================================
// Module: Policy Stream Runtime Policy
// Description: Stateful owner of one built pipeline and its debug buffers.
// Purpose: Build, ingest, and render for interactive policy test sessions.
// Dependencies: crate::{core, interfaces, runtime}, tracing
// ============================================================================

//! ## Overview
//! A [`RuntimePolicy`] is created unbuilt with a policy identifier. `build`
//! compiles the policy through a [`PolicyBuilder`], wraps the expression in
//! a [`Controller`], and subscribes the output latch and the trace
//! demultiplexer to the controller's streams; the transition to built is
//! permanent for the instance's lifetime. `ingest` submits events without
//! waiting for them to traverse the pipeline, and `render` combines the
//! latched output with the buffered traces at the requested verbosity.
//!
//! Dropping the policy tears down the controller, which joins the pipeline
//! worker before returning, so no trace is delivered after destruction.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;
use tracing::debug;

use crate::core::DebugMode;
use crate::core::Event;
use crate::core::EventResult;
use crate::core::PolicyId;
use crate::core::classify_trace;
use crate::interfaces::PolicyBuilder;
use crate::runtime::buffer::OutputLatch;
use crate::runtime::buffer::TraceBuffer;
use crate::runtime::controller::Controller;
use crate::runtime::render::render_traces;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Runtime policy operation errors.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// `build` was invoked on an instance that already owns a pipeline.
    #[error("policy '{0}' is already built")]
    AlreadyBuilt(PolicyId),
    /// `ingest` was invoked before a successful `build`.
    #[error("policy '{0}' is not built")]
    NotBuilt(PolicyId),
    /// The builder or the controller construction failed; the instance
    /// remains unbuilt with no partial wiring.
    #[error("error building policy [{policy_id}]: {cause}")]
    Build {
        /// Policy that failed to build.
        policy_id: PolicyId,
        /// Flattened cause chain.
        cause: String,
    },
}

// ============================================================================
// SECTION: Runtime Policy
// ============================================================================

/// Stateful policy instance owning a built pipeline and its debug buffers.
#[derive(Debug)]
pub struct RuntimePolicy {
    /// Identifier of the policy asset this instance executes.
    policy_id: PolicyId,
    /// Controller for the built pipeline; `None` while unbuilt.
    controller: Option<Controller>,
    /// Demultiplexed trace store fed by the trace subscriber.
    traces: TraceBuffer,
    /// Latest terminal output fed by the output subscriber.
    output: OutputLatch,
}

impl RuntimePolicy {
    /// Creates an unbuilt runtime policy for the named policy asset.
    #[must_use]
    pub fn new(policy_id: impl Into<PolicyId>) -> Self {
        Self {
            policy_id: policy_id.into(),
            controller: None,
            traces: TraceBuffer::new(),
            output: OutputLatch::new(),
        }
    }

    /// Returns the policy identifier.
    #[must_use]
    pub fn policy_id(&self) -> &PolicyId {
        &self.policy_id
    }

    /// Returns whether the instance owns a built pipeline.
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.controller.is_some()
    }

    /// Compiles the policy and wires the pipeline streams.
    ///
    /// On success the instance is built for the rest of its lifetime; there
    /// is no rebuild. On failure it stays unbuilt and a later `build` may
    /// succeed.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::AlreadyBuilt`] when a pipeline already exists,
    /// or [`PolicyError::Build`] when the builder or the controller
    /// construction fails.
    pub fn build<B>(&mut self, builder: &B) -> Result<(), PolicyError>
    where
        B: PolicyBuilder + ?Sized,
    {
        if self.controller.is_some() {
            return Err(PolicyError::AlreadyBuilt(self.policy_id.clone()));
        }

        let expression =
            builder.build_policy(&self.policy_id).map_err(|err| PolicyError::Build {
                policy_id: self.policy_id.clone(),
                cause: err.to_string(),
            })?;
        let controller = Controller::new(expression).map_err(|err| PolicyError::Build {
            policy_id: self.policy_id.clone(),
            cause: err.to_string(),
        })?;

        let latch = self.output.clone();
        controller.subscribe_output(move |event| {
            let mut rendered = event.pretty_str();
            rendered.push('\n');
            latch.store(rendered);
        });

        let buffer = self.traces.clone();
        controller.subscribe_traces(move |line| {
            let classification = classify_trace(line);
            if classification.is_empty() {
                debug!(line, "dropping unclassifiable trace line");
                return;
            }
            buffer.append(classification);
        });

        self.controller = Some(controller);
        Ok(())
    }

    /// Submits one event to the pipeline.
    ///
    /// The call returns as soon as the event is accepted; output and traces
    /// become visible asynchronously, before or after the return.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::NotBuilt`] when no pipeline has been built.
    pub fn ingest(&self, event: Event) -> Result<(), PolicyError> {
        let Some(controller) = &self.controller else {
            return Err(PolicyError::NotBuilt(self.policy_id.clone()));
        };
        controller.ingest(EventResult::success(event));
        Ok(())
    }

    /// Renders the latched output and the buffered traces at the requested
    /// verbosity, returning `(output, trace_json)`.
    ///
    /// The condition history is drained on every call regardless of mode;
    /// the detailed mode additionally consumes the verbose bucket of each
    /// rendered asset. The output latch is locked before the trace buffer,
    /// never the other way around.
    #[must_use]
    pub fn render(&self, mode: DebugMode) -> (String, String) {
        let output = self.output.snapshot();
        let history = self.traces.drain_history();
        let trace = render_traces(mode, &history, &self.traces);
        (output, trace)
    }
}
