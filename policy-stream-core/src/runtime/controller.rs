// policy-stream-core/src/runtime/controller.rs
// ============================================================================
// Module: Policy Stream Pipeline Controller
// Description: Channel-driven executor for a compiled pipeline expression.
// Purpose: Drive events through a pipeline and fan out output and traces.
// Dependencies: crate::{core, interfaces}, tracing
// ============================================================================

//! ## Overview
//! A [`Controller`] owns one compiled [`PipelineExpression`] and a worker
//! thread fed by an unbounded channel. `ingest` is a non-blocking
//! submission; the worker runs the expression per event, delivering trace
//! lines to trace subscribers as the expression emits them and the terminal
//! event (when any) to output subscribers afterwards. All subscriber
//! callbacks run on the worker thread.
//!
//! Dropping the controller closes the channel and joins the worker, so no
//! callback is delivered after drop returns. A controller is owned by
//! exactly one runtime policy.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::mpsc;
use std::thread;

use thiserror::Error;
use tracing::warn;

use crate::core::Event;
use crate::core::EventResult;
use crate::interfaces::PipelineExpression;

// ============================================================================
// SECTION: Subscriber Types
// ============================================================================

/// Callback invoked on the worker thread for each terminal event.
pub type OutputSubscriber = Box<dyn Fn(&Event) + Send>;

/// Callback invoked on the worker thread for each emitted trace line.
pub type TraceSubscriber = Box<dyn Fn(&str) + Send>;

/// Shared subscriber list readable from the worker thread.
type SubscriberList<T> = Arc<Mutex<Vec<T>>>;

// ============================================================================
// SECTION: Controller
// ============================================================================

/// Controller construction errors.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Pipeline worker thread could not be spawned.
    #[error("pipeline worker spawn failed: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Runtime handle that drives events through one compiled pipeline.
pub struct Controller {
    /// Ingress side of the worker channel. Taken on drop to end the worker.
    sender: Option<mpsc::Sender<EventResult>>,
    /// Worker thread handle, joined on drop.
    worker: Option<thread::JoinHandle<()>>,
    /// Output subscribers shared with the worker.
    outputs: SubscriberList<OutputSubscriber>,
    /// Trace subscribers shared with the worker.
    traces: SubscriberList<TraceSubscriber>,
}

impl Controller {
    /// Wraps a compiled expression in a controller with a live worker.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Spawn`] when the worker thread cannot be
    /// created.
    pub fn new(expression: PipelineExpression) -> Result<Self, ControllerError> {
        let (sender, receiver) = mpsc::channel();
        let outputs: SubscriberList<OutputSubscriber> = Arc::default();
        let traces: SubscriberList<TraceSubscriber> = Arc::default();

        let worker = thread::Builder::new().name("policy-pipeline".to_string()).spawn({
            let outputs = Arc::clone(&outputs);
            let traces = Arc::clone(&traces);
            move || run_pipeline(receiver, expression, &outputs, &traces)
        })?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
            outputs,
            traces,
        })
    }

    /// Submits one result carrier to the pipeline without waiting for it to
    /// traverse. Output and traces become visible asynchronously.
    pub fn ingest(&self, carrier: EventResult) {
        if let Some(sender) = &self.sender {
            if sender.send(carrier).is_err() {
                warn!("event dropped: pipeline worker is gone");
            }
        }
    }

    /// Registers a callback for terminal events.
    pub fn subscribe_output(&self, subscriber: impl Fn(&Event) + Send + 'static) {
        self.outputs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(subscriber));
    }

    /// Registers a callback for raw trace lines from every operator.
    pub fn subscribe_traces(&self, subscriber: impl Fn(&str) + Send + 'static) {
        self.traces
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(subscriber));
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop after it drains the queue.
        drop(self.sender.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("worker_alive", &self.worker.is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Worker Loop
// ============================================================================

/// Drains carriers until the channel closes, running each successful event
/// through the expression and fanning out traces and output.
fn run_pipeline(
    receiver: mpsc::Receiver<EventResult>,
    mut expression: PipelineExpression,
    outputs: &SubscriberList<OutputSubscriber>,
    traces: &SubscriberList<TraceSubscriber>,
) {
    for carrier in receiver {
        if !carrier.is_success() {
            continue;
        }
        let event = carrier.into_payload();
        let mut emit = |line: &str| {
            let subscribers = traces.lock().unwrap_or_else(PoisonError::into_inner);
            for subscriber in subscribers.iter() {
                subscriber(line);
            }
        };
        let output = expression.apply(&event, &mut emit);
        if let Some(terminal) = output {
            let subscribers = outputs.lock().unwrap_or_else(PoisonError::into_inner);
            for subscriber in subscribers.iter() {
                subscriber(&terminal);
            }
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
