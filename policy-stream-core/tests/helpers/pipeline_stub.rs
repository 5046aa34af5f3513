// policy-stream-core/tests/helpers/pipeline_stub.rs
// ============================================================================
// Module: Pipeline Stub
// Description: Scripted policy builder for integration tests.
// Purpose: Compile every policy into a pipeline with predetermined traces.
// Dependencies: policy-stream-core
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use policy_stream_core::BuildError;
use policy_stream_core::PipelineExpression;
use policy_stream_core::PolicyBuilder;
use policy_stream_core::PolicyId;

/// Builder stub that compiles every policy into a scripted pipeline.
///
/// The compiled pipeline emits the scripted trace lines for each event and
/// echoes the event as terminal output unless `without_output` was chosen.
/// Events carrying a top-level `sync` member are applied as no-ops; paired
/// with the processed-event counter they let tests wait for the worker to
/// quiesce (see `helpers::sync::quiesce`).
pub struct ScriptedBuilder {
    trace_lines: Vec<String>,
    emit_output: bool,
    processed: Arc<AtomicUsize>,
}

impl ScriptedBuilder {
    /// Creates a builder whose pipelines emit the given trace lines.
    pub fn new<I, S>(trace_lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            trace_lines: trace_lines.into_iter().map(Into::into).collect(),
            emit_output: true,
            processed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Drops terminal output so only traces flow.
    pub fn without_output(mut self) -> Self {
        self.emit_output = false;
        self
    }

    /// Returns the counter of events the pipeline worker has applied.
    pub fn processed(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.processed)
    }
}

impl PolicyBuilder for ScriptedBuilder {
    fn build_policy(&self, _policy_id: &PolicyId) -> Result<PipelineExpression, BuildError> {
        let lines = self.trace_lines.clone();
        let emit_output = self.emit_output;
        let processed = Arc::clone(&self.processed);
        Ok(PipelineExpression::new(move |event, emit| {
            let result = if event.document().get("sync").is_some() {
                None
            } else {
                for line in &lines {
                    emit(line);
                }
                emit_output.then(|| event.clone())
            };
            processed.fetch_add(1, Ordering::SeqCst);
            result
        }))
    }
}

/// Builder stub whose compilation always fails with the given cause.
pub struct FailingBuilder {
    cause: String,
}

impl FailingBuilder {
    /// Creates a builder failing with the given cause.
    pub fn new(cause: impl Into<String>) -> Self {
        Self {
            cause: cause.into(),
        }
    }
}

impl PolicyBuilder for FailingBuilder {
    fn build_policy(&self, _policy_id: &PolicyId) -> Result<PipelineExpression, BuildError> {
        Err(BuildError::Compile(self.cause.clone()))
    }
}
