// policy-stream-core/src/interfaces/mod.rs
// ============================================================================
// Module: Policy Stream Interfaces
// Description: Builder seam and the compiled pipeline expression it produces.
// Purpose: Define the contract surface between policy compilation and runtime.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how the runtime consumes a policy compiler without
//! embedding one. A [`PolicyBuilder`] resolves a policy identifier into a
//! [`PipelineExpression`]: an opaque compiled dataflow that maps one event
//! to an optional terminal event while emitting trace lines. The runtime
//! wraps the expression in a [`crate::runtime::Controller`] and never
//! inspects it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;

use crate::core::Event;
use crate::core::PolicyId;

// ============================================================================
// SECTION: Pipeline Expression
// ============================================================================

/// Compiled dataflow produced by a [`PolicyBuilder`].
///
/// The expression is invoked once per ingested event with a trace emitter;
/// every string handed to the emitter is delivered to the controller's trace
/// subscribers. Returning `Some(event)` marks the event as terminal output.
pub struct PipelineExpression {
    /// Compiled operator chain.
    op: Box<dyn FnMut(&Event, &mut dyn FnMut(&str)) -> Option<Event> + Send>,
}

impl PipelineExpression {
    /// Wraps a compiled operator chain into an expression.
    #[must_use]
    pub fn new(
        op: impl FnMut(&Event, &mut dyn FnMut(&str)) -> Option<Event> + Send + 'static,
    ) -> Self {
        Self {
            op: Box::new(op),
        }
    }

    /// Runs one event through the expression.
    pub(crate) fn apply(
        &mut self,
        event: &Event,
        emit: &mut dyn FnMut(&str),
    ) -> Option<Event> {
        (self.op)(event, emit)
    }
}

impl fmt::Debug for PipelineExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineExpression").finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Policy Builder
// ============================================================================

/// Builder errors surfaced while compiling a policy asset.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Policy asset failed to parse or resolve into a pipeline expression.
    #[error("policy compilation failed: {0}")]
    Compile(String),
}

/// Backend-agnostic policy compiler.
pub trait PolicyBuilder {
    /// Compiles the named policy into an executable pipeline expression.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] when the policy cannot be parsed or one of its
    /// assets cannot be resolved.
    fn build_policy(&self, policy_id: &PolicyId) -> Result<PipelineExpression, BuildError>;
}
